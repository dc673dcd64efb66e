use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slicer_control::SliceControlSettings;
use slicer_model::{
    full_slice_expression, preselected_slice_expression_with_displayed_axes,
    slot_count_with_displayed_axes, Shape, SliceErrorKind, SliceExpression, DEFAULT_DISPLAYED_AXES,
};
use tracing_subscriber::filter::LevelFilter;

use crate::{format_report, replay, Script};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(about = "Validate slice expressions and replay slicing-control sessions.")]
pub struct Cli {
    /// Log session decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a slice expression against a shape. Exits non-zero when it is invalid.
    Validate {
        /// Array shape, e.g. `3,4,5,6` or `[3, 4, 5, 6]`.
        #[arg(long)]
        shape: Shape,

        /// Slice expression, e.g. `[0, :, 1:3, -1]`.
        expression: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the full slice, the preselected slice and the slot count for a shape.
    Defaults {
        #[arg(long)]
        shape: Shape,

        /// Trailing axes left unnarrowed.
        #[arg(long, default_value_t = DEFAULT_DISPLAYED_AXES)]
        displayed_axes: usize,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Replay a JSON event script. Reads stdin when no path is given.
    Run {
        script: Option<PathBuf>,

        /// JSON settings document overriding the script's `settings`.
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonValidation<'a> {
    expression: &'a str,
    shape: &'a Shape,
    valid: bool,
    kind: Option<SliceErrorKind>,
    axis: Option<usize>,
    message: Option<String>,
    view_shape: Option<Vec<usize>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDefaults<'a> {
    shape: &'a Shape,
    full: String,
    preselected: String,
    slots: usize,
}

pub fn run() -> Result<()> {
    run_with_args(Cli::parse())
}

pub fn run_with_args(cli: Cli) -> Result<()> {
    if cli.verbose {
        // The session crates log through `log`; `try_init` also installs the `log` bridge. A
        // subscriber already set by an embedding process is kept.
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(LevelFilter::DEBUG)
            .with_ansi(false)
            .try_init();
    }

    match cli.command {
        Command::Validate {
            shape,
            expression,
            format,
        } => validate(&shape, &expression, format),
        Command::Defaults {
            shape,
            displayed_axes,
            format,
        } => defaults(&shape, displayed_axes, format),
        Command::Run {
            script,
            settings,
            format,
        } => run_script(script, settings, format),
    }
}

fn validate(shape: &Shape, expression: &str, format: OutputFormat) -> Result<()> {
    let result = SliceExpression::parse(expression).and_then(|expr| expr.resolve(shape));
    match format {
        OutputFormat::Text => {
            let line = match &result {
                Ok(resolved) => format!("ok: view shape {:?}\n", resolved.view_dims()),
                Err(err) => format!("invalid: {err}\n"),
            };
            write_stdout(line.as_bytes())?;
        }
        OutputFormat::Json => {
            let report = JsonValidation {
                expression,
                shape,
                valid: result.is_ok(),
                kind: result.as_ref().err().map(|err| err.kind()),
                axis: result.as_ref().err().and_then(|err| err.axis()),
                message: result.as_ref().err().map(ToString::to_string),
                view_shape: result.as_ref().ok().map(|resolved| resolved.view_dims()),
            };
            write_json(&report)?;
        }
    }

    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn defaults(shape: &Shape, displayed_axes: usize, format: OutputFormat) -> Result<()> {
    let report = JsonDefaults {
        shape,
        full: full_slice_expression(shape),
        preselected: preselected_slice_expression_with_displayed_axes(shape, displayed_axes),
        slots: slot_count_with_displayed_axes(shape, displayed_axes),
    };
    match format {
        OutputFormat::Text => {
            let text = format!(
                "full:        {}\npreselected: {}\nslots:       {}\n",
                report.full, report.preselected, report.slots
            );
            write_stdout(text.as_bytes())
        }
        OutputFormat::Json => write_json(&report),
    }
}

fn run_script(
    script_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let json = match &script_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read script {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read script from stdin")?;
            buf
        }
    };
    let mut script = Script::from_json(&json).context("parse script")?;

    if let Some(path) = &settings_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        script.settings = serde_json::from_str::<SliceControlSettings>(&raw)
            .with_context(|| format!("parse settings {}", path.display()))?;
    }

    let report = replay(&script);
    match format {
        OutputFormat::Text => write_stdout(format_report(&report).as_bytes())?,
        OutputFormat::Json => write_json(&report)?,
    }

    if report.error_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    write_stdout(&bytes)
}

/// Write to stdout, treating a closed pipe (e.g. `slicer-replay ... | head`) as success.
fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match handle.write_all(bytes).and_then(|()| handle.flush()) {
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
