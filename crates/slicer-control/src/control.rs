use serde::{Deserialize, Serialize};
use slicer_model::{
    full_slice_expression, is_valid_slice_expression, selections_from_text_with_slots,
    text_from_selections, AxisSelection, Shape,
};

use crate::{ControlError, SliceControlSettings, SliceRequest, SliceRequestHandler};

/// The mutable state of a slicing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Slicing is switched on. While off, the host never receives a slice.
    pub enabled: bool,
    /// Exactly what the text field shows, including transiently invalid text.
    pub current_text: String,
    /// The expression last sent to (or reported by) the host. `None` means no slicing.
    pub applied: Option<String>,
    /// One entry per selector slot.
    pub selections: Vec<AxisSelection>,
    /// The host is fetching data; every mutating entry point is ignored.
    pub loading: bool,
}

/// What an entry point did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    /// The handler received this request.
    Requested(SliceRequest),
    /// State may have changed but the handler was not notified.
    Silent,
    /// Nothing changed.
    Ignored { reason: IgnoreReason },
}

impl Outcome {
    /// The request sent to the handler, if any.
    pub fn request(&self) -> Option<&SliceRequest> {
        match self {
            Outcome::Requested(request) => Some(request),
            Outcome::Silent | Outcome::Ignored { .. } => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IgnoreReason {
    /// The host is loading data.
    Loading,
    /// Slicing is switched off, so the text field and selectors are inert.
    Disabled,
}

/// Which representation must be re-derived before an entry point returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Derivation {
    TextFromSelections,
    SelectionsFromText,
}

/// An interactive slicing session over a fixed [`Shape`].
///
/// Keeps the slice text and the slot selections consistent and notifies `H` whenever the slice the
/// host should display changes. See the crate docs for the overall model.
#[derive(Debug)]
pub struct SliceControl<H> {
    shape: Shape,
    settings: SliceControlSettings,
    full_slice: String,
    state: SessionState,
    pending: Option<Derivation>,
    handler: H,
}

impl<H: SliceRequestHandler> SliceControl<H> {
    pub fn new(shape: Shape, handler: H) -> Self {
        Self::with_settings(shape, SliceControlSettings::default(), handler)
    }

    /// Start a disabled session showing [`SliceControlSettings::initial_text`] with every slot unset.
    pub fn with_settings(shape: Shape, settings: SliceControlSettings, handler: H) -> Self {
        let full_slice = full_slice_expression(&shape);
        let slots = settings.slot_count(&shape);
        let state = SessionState {
            enabled: false,
            current_text: settings.initial_text(&shape),
            applied: None,
            selections: vec![AxisSelection::UNSET; slots],
            loading: false,
        };
        Self {
            shape,
            settings,
            full_slice,
            state,
            pending: None,
            handler,
        }
    }

    /// Switch slicing on or off.
    ///
    /// Enabling requests the current text unless the host already has it, it is the full slice, or it
    /// does not validate (text edited and left invalid before slicing was last switched off).
    /// Disabling requests "no slicing" unless the current text is the full slice. Slots are then
    /// re-derived from the current text either way. Toggling into the current state changes nothing.
    pub fn toggle(&mut self, will_enable: bool) -> Outcome {
        if self.state.loading {
            return self.ignore("toggle", IgnoreReason::Loading);
        }
        if will_enable == self.state.enabled {
            log::trace!("toggle to enabled={will_enable} ignored: already in that state");
            return Outcome::Silent;
        }
        self.state.enabled = will_enable;

        let outcome = if will_enable {
            let text = self.state.current_text.clone();
            if !self.is_new_slice(&text) {
                log::debug!("enabled slicing without request: `{text}` already in effect or full");
                Outcome::Silent
            } else if !is_valid_slice_expression(&text, &self.shape) {
                log::debug!("enabled slicing without request: `{text}` is not valid");
                Outcome::Silent
            } else {
                self.request(Some(text))
            }
        } else if self.state.current_text != self.full_slice {
            self.request(None)
        } else {
            log::debug!("disabled slicing without request: text is the full slice");
            Outcome::Silent
        };

        self.schedule(Derivation::SelectionsFromText);
        self.settle();
        outcome
    }

    /// Record what the user typed. Never validates and never notifies.
    pub fn on_text_edited(&mut self, text: impl Into<String>) -> Outcome {
        if let Some(reason) = self.edit_gate() {
            return self.ignore("text edit", reason);
        }
        self.state.current_text = text.into();
        Outcome::Silent
    }

    /// Apply the current text if it is valid and differs from what the host has.
    ///
    /// Invalid or unchanged text is a silent no-op; [`SliceControl::error_message`] explains why.
    pub fn on_text_submitted(&mut self) -> Outcome {
        if let Some(reason) = self.edit_gate() {
            return self.ignore("submit", reason);
        }
        let text = self.state.current_text.clone();
        if self.state.applied.as_deref() == Some(text.as_str()) {
            log::debug!("submit of `{text}` ignored: already applied");
            return Outcome::Silent;
        }
        if !is_valid_slice_expression(&text, &self.shape) {
            log::debug!("submit of `{text}` ignored: not valid for shape {}", self.shape);
            return Outcome::Silent;
        }

        self.schedule(Derivation::SelectionsFromText);
        self.settle();
        self.request(Some(text))
    }

    /// Point `slot` at `axis` (or clear it), then re-derive the text from every slot.
    ///
    /// An index that does not fit the new axis is dropped, as is any index once the axis is
    /// cleared.
    pub fn on_axis_selection_changed(
        &mut self,
        slot: usize,
        axis: Option<usize>,
    ) -> Result<Outcome, ControlError> {
        self.check_slot(slot)?;
        if let Some(axis) = axis {
            self.check_axis(axis)?;
        }
        if let Some(reason) = self.edit_gate() {
            return Ok(self.ignore("axis selection", reason));
        }

        let selection = &mut self.state.selections[slot];
        selection.axis = axis;
        match (axis, selection.index) {
            (Some(axis), Some(index)) if index >= self.shape.dims()[axis] => {
                log::debug!("slot {slot}: dropping index {index}, out of range for axis {axis}");
                selection.index = None;
            }
            (None, Some(_)) => selection.index = None,
            _ => {}
        }
        self.warn_on_shared_axis(slot);

        self.schedule(Derivation::TextFromSelections);
        Ok(self.settle())
    }

    /// Select `index` within the axis of `slot` (or clear it), then re-derive the text.
    pub fn on_index_selection_changed(
        &mut self,
        slot: usize,
        index: Option<usize>,
    ) -> Result<Outcome, ControlError> {
        self.check_slot(slot)?;
        if let Some(index) = index {
            let axis = self.state.selections[slot]
                .axis
                .ok_or(ControlError::AxisNotSelected { slot })?;
            self.check_index(slot, axis, index)?;
        }
        if let Some(reason) = self.edit_gate() {
            return Ok(self.ignore("index selection", reason));
        }

        self.state.selections[slot].index = index;
        self.schedule(Derivation::TextFromSelections);
        Ok(self.settle())
    }

    /// Set both fields of `slot` and re-derive the text once.
    pub fn apply_selection(
        &mut self,
        slot: usize,
        axis: usize,
        index: usize,
    ) -> Result<Outcome, ControlError> {
        self.check_slot(slot)?;
        self.check_axis(axis)?;
        self.check_index(slot, axis, index)?;
        if let Some(reason) = self.edit_gate() {
            return Ok(self.ignore("selection", reason));
        }

        self.state.selections[slot] = AxisSelection::new(axis, index);
        self.warn_on_shared_axis(slot);
        self.schedule(Derivation::TextFromSelections);
        Ok(self.settle())
    }

    /// Record the expression the host actually has in effect. Never notifies.
    pub fn sync_applied(&mut self, applied: Option<String>) {
        log::trace!("host reports applied slice {applied:?}");
        self.state.applied = applied;
    }

    /// Gate every mutating entry point while the host loads data.
    pub fn set_loading(&mut self, loading: bool) {
        self.state.loading = loading;
    }

    /// `text` differs from both the applied expression and the full slice.
    fn is_new_slice(&self, text: &str) -> bool {
        self.state.applied.as_deref() != Some(text) && text != self.full_slice
    }

    fn request(&mut self, slice: Option<String>) -> Outcome {
        match slice.as_deref() {
            Some(text) => log::debug!("requesting slice `{text}`"),
            None => log::debug!("requesting no slicing"),
        }
        self.state.applied = slice.clone();
        let request = SliceRequest { slice };
        self.handler.handle_slice_request(request.clone());
        Outcome::Requested(request)
    }

    fn schedule(&mut self, derivation: Derivation) {
        debug_assert!(
            self.pending.is_none() || self.pending == Some(derivation),
            "conflicting derivations scheduled in one turn"
        );
        self.pending = Some(derivation);
    }

    /// Run the derivation scheduled by the current entry point, if any.
    fn settle(&mut self) -> Outcome {
        let Some(derivation) = self.pending.take() else {
            return Outcome::Silent;
        };
        log::trace!("settling {derivation:?}");
        match derivation {
            Derivation::SelectionsFromText => {
                if let Some(selections) = selections_from_text_with_slots(
                    &self.state.current_text,
                    &self.shape,
                    self.slot_count(),
                ) {
                    self.state.selections = selections;
                }
                Outcome::Silent
            }
            Derivation::TextFromSelections => {
                let derived = text_from_selections(&self.shape, &self.state.selections);
                let notify = derived.is_complete() && self.is_new_slice(&derived.text);
                self.state.current_text = derived.text;
                if notify {
                    let text = self.state.current_text.clone();
                    self.request(Some(text))
                } else {
                    log::debug!(
                        "selections give `{}` ({} of {} slots set); not requested",
                        self.state.current_text,
                        derived.specified,
                        derived.slots
                    );
                    Outcome::Silent
                }
            }
        }
    }

    fn edit_gate(&self) -> Option<IgnoreReason> {
        if self.state.loading {
            Some(IgnoreReason::Loading)
        } else if !self.state.enabled {
            Some(IgnoreReason::Disabled)
        } else {
            None
        }
    }

    fn ignore(&self, what: &str, reason: IgnoreReason) -> Outcome {
        log::debug!("{what} ignored: {reason:?}");
        Outcome::Ignored { reason }
    }

    fn check_slot(&self, slot: usize) -> Result<(), ControlError> {
        if slot < self.slot_count() {
            Ok(())
        } else {
            Err(ControlError::SlotOutOfRange {
                slot,
                slots: self.slot_count(),
            })
        }
    }

    fn check_axis(&self, axis: usize) -> Result<(), ControlError> {
        if axis < self.shape.num_axes() {
            Ok(())
        } else {
            Err(ControlError::AxisOutOfRange {
                axis,
                num_axes: self.shape.num_axes(),
            })
        }
    }

    fn check_index(&self, slot: usize, axis: usize, index: usize) -> Result<(), ControlError> {
        let extent = self.shape.dims()[axis];
        if index < extent {
            Ok(())
        } else {
            Err(ControlError::IndexOutOfRange {
                slot,
                axis,
                index,
                extent,
            })
        }
    }

    fn warn_on_shared_axis(&self, slot: usize) {
        let Some(axis) = self.state.selections[slot].axis else {
            return;
        };
        let shared = self
            .state
            .selections
            .iter()
            .enumerate()
            .any(|(other, selection)| other != slot && selection.axis == Some(axis));
        if shared {
            log::warn!("slot {slot} selects axis {axis}, which another slot already uses");
        }
    }
}

impl<H> SliceControl<H> {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn settings(&self) -> &SliceControlSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn current_text(&self) -> &str {
        &self.state.current_text
    }

    pub fn applied(&self) -> Option<&str> {
        self.state.applied.as_deref()
    }

    pub fn selections(&self) -> &[AxisSelection] {
        &self.state.selections
    }

    pub fn slot_count(&self) -> usize {
        self.state.selections.len()
    }

    /// `[:, ..., :]` for this session's shape.
    pub fn full_slice(&self) -> &str {
        &self.full_slice
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}
