use serde::{Deserialize, Serialize};
use slicer_model::slice_expression_error_message;

use crate::SliceControl;

/// One entry of a slot's axis selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisOption {
    pub axis: usize,
    pub label: String,
    /// The axis is already selected in some slot (including the slot being rendered).
    pub disabled: bool,
}

/// One entry of a slot's index selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOption {
    pub index: usize,
    pub label: String,
}

impl<H> SliceControl<H> {
    /// Axis choices offered to every slot. Axes selected in any slot are disabled so the same axis
    /// is not narrowed twice.
    pub fn axis_options(&self) -> Vec<AxisOption> {
        let selections = self.selections();
        (0..self.shape().num_axes())
            .map(|axis| AxisOption {
                axis,
                label: axis.to_string(),
                disabled: selections
                    .iter()
                    .any(|selection| selection.axis == Some(axis)),
            })
            .collect()
    }

    /// Index choices for `slot`: every index of its axis, or nothing while no axis is selected
    /// (or the slot does not exist).
    pub fn index_options(&self, slot: usize) -> Vec<IndexOption> {
        let Some(extent) = self
            .selections()
            .get(slot)
            .and_then(|selection| selection.axis)
            .and_then(|axis| self.shape().extent(axis))
        else {
            return Vec::new();
        };
        (0..extent)
            .map(|index| IndexOption {
                index,
                label: index.to_string(),
            })
            .collect()
    }

    /// The enable/disable checkbox accepts input.
    pub fn toggle_enabled(&self) -> bool {
        !self.is_loading()
    }

    /// The text field, submit button and axis selectors accept input.
    pub fn inputs_enabled(&self) -> bool {
        self.is_enabled() && !self.is_loading()
    }

    /// The index selector of `slot` accepts input.
    pub fn index_input_enabled(&self, slot: usize) -> bool {
        self.inputs_enabled()
            && self
                .selections()
                .get(slot)
                .is_some_and(|selection| selection.axis.is_some())
    }

    /// The slice in effect, shown next to the control's title while slicing is on.
    pub fn readonly_indicator(&self) -> Option<&str> {
        if self.is_enabled() {
            self.applied()
        } else {
            None
        }
    }

    /// Why the current text cannot be submitted, or `None` if it is valid.
    pub fn error_message(&self) -> Option<String> {
        slice_expression_error_message(self.current_text(), self.shape())
    }
}

#[cfg(test)]
mod tests {
    use slicer_model::Shape;

    use crate::{RequestLog, SliceControl};

    #[test]
    fn index_options_follow_slot_axis() {
        let mut c = SliceControl::new(Shape::new(vec![3, 4, 5, 6]).unwrap(), RequestLog::new());
        assert!(c.index_options(0).is_empty());
        assert!(c.index_options(9).is_empty());

        c.toggle(true);
        let labels: Vec<_> = c
            .index_options(1)
            .into_iter()
            .map(|option| option.label)
            .collect();
        assert_eq!(labels, ["0", "1", "2", "3"]);
    }
}
