/// Caller mistakes when driving a [`SliceControl`](crate::SliceControl).
///
/// User-typed text never produces these; malformed expressions are reported through
/// [`SliceControl::error_message`](crate::SliceControl::error_message) instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("slot {slot} does not exist (the control has {slots} slots)")]
    SlotOutOfRange { slot: usize, slots: usize },
    #[error("axis {axis} does not exist (the shape has {num_axes} axes)")]
    AxisOutOfRange { axis: usize, num_axes: usize },
    #[error("index {index} is out of range for axis {axis} of extent {extent} (slot {slot})")]
    IndexOutOfRange {
        slot: usize,
        axis: usize,
        index: usize,
        extent: usize,
    },
    #[error("slot {slot} has no axis selected")]
    AxisNotSelected { slot: usize },
}
