//! Replay scripted user interactions against a [`SliceControl`] session.
//!
//! A [`Script`] names a shape, optional [`SliceControlSettings`] and a list of [`Event`]s (toggles,
//! text edits, submissions, selector changes, host updates). [`replay`] runs them in order and
//! records, per event, what the session did and the state it ended in. The `slicer-replay` binary
//! wraps this (see [`cli`]).

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use slicer_control::{
    ControlError, Outcome, RequestLog, SessionState, SliceControl, SliceControlSettings,
    SliceRequest,
};
use slicer_model::{AxisSelection, Shape};

pub mod cli;

/// A scripted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub shape: Shape,
    #[serde(default)]
    pub settings: SliceControlSettings,
    /// Slice the host already has in effect when the session starts.
    #[serde(default)]
    pub applied: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Script {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One user or host action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Toggle {
        enable: bool,
    },
    EditText {
        text: String,
    },
    Submit,
    SelectAxis {
        slot: usize,
        #[serde(default)]
        axis: Option<usize>,
    },
    SelectIndex {
        slot: usize,
        #[serde(default)]
        index: Option<usize>,
    },
    Select {
        slot: usize,
        axis: usize,
        index: usize,
    },
    SetLoading {
        loading: bool,
    },
    SyncApplied {
        #[serde(default)]
        slice: Option<String>,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: Option<usize>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }

        match self {
            Event::Toggle { enable: true } => f.write_str("enable slicing"),
            Event::Toggle { enable: false } => f.write_str("disable slicing"),
            Event::EditText { text } => write!(f, "type `{text}`"),
            Event::Submit => f.write_str("submit"),
            Event::SelectAxis { slot, axis } => write!(f, "slot {slot}: axis {}", opt(*axis)),
            Event::SelectIndex { slot, index } => {
                write!(f, "slot {slot}: index {}", opt(*index))
            }
            Event::Select { slot, axis, index } => {
                write!(f, "slot {slot}: axis {axis}, index {index}")
            }
            Event::SetLoading { loading } => write!(f, "loading = {loading}"),
            Event::SyncApplied { slice: Some(slice) } => write!(f, "host applied `{slice}`"),
            Event::SyncApplied { slice: None } => f.write_str("host cleared slice"),
        }
    }
}

/// What happened when one event was replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// 1-based position in the script.
    pub step: usize,
    pub event: Event,
    /// `None` when the event was rejected with `error`.
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
    pub text: String,
    pub applied: Option<String>,
    pub selections: Vec<AxisSelection>,
    /// Why the current text would not validate, if it would not.
    pub validation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub shape: Shape,
    pub initial_text: String,
    pub steps: Vec<StepReport>,
    /// Every request the host received, in order.
    pub requests: Vec<SliceRequest>,
    pub final_state: SessionState,
}

impl ReplayReport {
    /// Number of events rejected as caller errors.
    pub fn error_count(&self) -> usize {
        self.steps.iter().filter(|step| step.error.is_some()).count()
    }
}

/// Run every event of `script` against a fresh session.
///
/// Rejected selector events are recorded in the step's `error` and the replay continues.
pub fn replay(script: &Script) -> ReplayReport {
    let mut control = SliceControl::with_settings(
        script.shape.clone(),
        script.settings.clone(),
        RequestLog::new(),
    );
    if script.applied.is_some() {
        control.sync_applied(script.applied.clone());
    }
    let initial_text = control.current_text().to_string();

    let steps = script
        .events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            let result = apply_event(&mut control, event);
            if let Err(err) = &result {
                log::warn!("step {}: {event} rejected: {err}", idx + 1);
            }
            let (outcome, error) = match result {
                Ok(outcome) => (Some(outcome), None),
                Err(err) => (None, Some(err.to_string())),
            };
            StepReport {
                step: idx + 1,
                event: event.clone(),
                outcome,
                error,
                text: control.current_text().to_string(),
                applied: control.applied().map(str::to_string),
                selections: control.selections().to_vec(),
                validation: control.error_message(),
            }
        })
        .collect();

    let final_state = control.state().clone();
    ReplayReport {
        shape: script.shape.clone(),
        initial_text,
        steps,
        requests: control.into_handler().take(),
        final_state,
    }
}

fn apply_event(
    control: &mut SliceControl<RequestLog>,
    event: &Event,
) -> Result<Outcome, ControlError> {
    match event {
        Event::Toggle { enable } => Ok(control.toggle(*enable)),
        Event::EditText { text } => Ok(control.on_text_edited(text.as_str())),
        Event::Submit => Ok(control.on_text_submitted()),
        Event::SelectAxis { slot, axis } => control.on_axis_selection_changed(*slot, *axis),
        Event::SelectIndex { slot, index } => control.on_index_selection_changed(*slot, *index),
        Event::Select { slot, axis, index } => control.apply_selection(*slot, *axis, *index),
        Event::SetLoading { loading } => {
            control.set_loading(*loading);
            Ok(Outcome::Silent)
        }
        Event::SyncApplied { slice } => {
            control.sync_applied(slice.clone());
            Ok(Outcome::Silent)
        }
    }
}

/// Render `report` as human-readable lines.
pub fn format_report(report: &ReplayReport) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut impl Write, report: &ReplayReport) -> fmt::Result {
    writeln!(out, "shape {}", report.shape)?;
    writeln!(out, "initial text `{}`", report.initial_text)?;
    for step in &report.steps {
        write!(out, "#{} {}: ", step.step, step.event)?;
        match (&step.outcome, &step.error) {
            (_, Some(err)) => writeln!(out, "error: {err}")?,
            (Some(Outcome::Requested(request)), None) => match &request.slice {
                Some(slice) => writeln!(out, "request `{slice}`")?,
                None => writeln!(out, "request no slicing")?,
            },
            (Some(Outcome::Ignored { reason }), None) => writeln!(out, "ignored ({reason:?})")?,
            (Some(Outcome::Silent), None) | (None, None) => writeln!(out, "silent")?,
        }
        write!(out, "    text `{}`  slots [", step.text)?;
        for (slot, selection) in step.selections.iter().enumerate() {
            if slot > 0 {
                out.write_char(' ')?;
            }
            write_selection(out, selection)?;
        }
        writeln!(out, "]")?;
        if let Some(message) = &step.validation {
            writeln!(out, "    invalid: {message}")?;
        }
    }
    writeln!(out, "{} request(s)", report.requests.len())
}

fn write_selection(out: &mut impl Write, selection: &AxisSelection) -> fmt::Result {
    match (selection.axis, selection.index) {
        (Some(axis), Some(index)) => write!(out, "{axis}={index}"),
        (Some(axis), None) => write!(out, "{axis}=?"),
        (None, _) => out.write_char('-'),
    }
}
