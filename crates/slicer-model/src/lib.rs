//! `slicer-model` defines the data model behind N-dimensional slicing controls.
//!
//! The crate holds no session state so it can be reused by:
//! - the `slicer-control` synchronizer (slice text <-> per-slot axis/index selections)
//! - command-line tooling that validates or replays slice expressions
//! - IPC boundaries via `serde` (shapes and selections are JSON-safe)
//!
//! A slice expression is the bracketed, comma-separated text users type, e.g. `[2, :, 1:3]`.
//! [`SliceExpression`] parses the structure; [`validate_slice_expression`] additionally checks
//! arity and bounds against a [`Shape`].

mod defaults;
mod expression;
mod selection;
mod shape;

pub use defaults::{
    full_slice_expression, preselected_slice_expression,
    preselected_slice_expression_with_displayed_axes, slot_count, slot_count_with_displayed_axes,
    DEFAULT_DISPLAYED_AXES,
};
pub use expression::{
    is_valid_slice_expression, slice_expression_error_message, validate_slice_expression,
    ResolvedComponent, ResolvedSlice, SliceComponent, SliceErrorKind, SliceExpression,
    SliceExpressionError,
};
pub use selection::{
    selections_from_text, selections_from_text_with_slots, text_from_selections, AxisSelection,
    DerivedText,
};
pub use shape::{Shape, ShapeError, ShapeParseError};
