use serde::{Deserialize, Serialize};
use slicer_model::{
    is_valid_slice_expression, preselected_slice_expression_with_displayed_axes,
    slot_count_with_displayed_axes, Shape, DEFAULT_DISPLAYED_AXES,
};

/// Per-session configuration for a [`SliceControl`](crate::SliceControl).
///
/// Missing fields take their defaults when deserialized, so `{}` is a valid settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliceControlSettings {
    /// Trailing axes shown by the host's grid and therefore never pre-narrowed.
    ///
    /// Also fixes the slot count at `max(n - displayed_axes, 1)`.
    pub displayed_axes: usize,
    /// Text shown when the session starts. Ignored unless it is valid for the session's shape.
    pub initial_expression: Option<String>,
}

impl Default for SliceControlSettings {
    fn default() -> Self {
        Self {
            // Data viewers render the last two axes as rows and columns.
            displayed_axes: DEFAULT_DISPLAYED_AXES,
            initial_expression: None,
        }
    }
}

impl SliceControlSettings {
    #[must_use]
    pub fn slot_count(&self, shape: &Shape) -> usize {
        slot_count_with_displayed_axes(shape, self.displayed_axes)
    }

    /// The text a new session starts with.
    #[must_use]
    pub fn initial_text(&self, shape: &Shape) -> String {
        match self.initial_expression.as_deref() {
            Some(text) if is_valid_slice_expression(text, shape) => text.to_string(),
            Some(text) => {
                log::warn!("ignoring initial slice expression `{text}`: not valid for shape {shape}");
                preselected_slice_expression_with_displayed_axes(shape, self.displayed_axes)
            }
            None => preselected_slice_expression_with_displayed_axes(shape, self.displayed_axes),
        }
    }
}
