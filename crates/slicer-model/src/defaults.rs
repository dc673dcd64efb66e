use crate::{Shape, SliceComponent, SliceExpression};

/// Number of trailing axes left as full ranges by default (the axes a 2-D grid view displays).
pub const DEFAULT_DISPLAYED_AXES: usize = 2;

/// `[:, :, ..., :]` with one `:` per axis: the expression meaning "no slicing applied".
pub fn full_slice_expression(shape: &Shape) -> String {
    SliceExpression::full(shape).to_string()
}

/// The slice expression a new session shows before the user edits anything.
///
/// Shapes with at most two axes are never pre-narrowed. Higher-rank shapes narrow every axis but
/// the last two to index `0`, e.g. `[3, 4, 5, 6]` gives `[0, 0, :, :]`.
pub fn preselected_slice_expression(shape: &Shape) -> String {
    preselected_slice_expression_with_displayed_axes(shape, DEFAULT_DISPLAYED_AXES)
}

/// Like [`preselected_slice_expression`], keeping `displayed_axes` trailing axes unnarrowed.
pub fn preselected_slice_expression_with_displayed_axes(
    shape: &Shape,
    displayed_axes: usize,
) -> String {
    let num_axes = shape.num_axes();
    if num_axes <= displayed_axes {
        return full_slice_expression(shape);
    }
    let narrowed = num_axes - displayed_axes;
    let components = (0..num_axes)
        .map(|axis| {
            if axis < narrowed {
                SliceComponent::Index(0)
            } else {
                SliceComponent::Full
            }
        })
        .collect();
    SliceExpression::new(components).to_string()
}

/// Number of axis/index selector slots offered for `shape`: `max(n - 2, 1)`.
pub fn slot_count(shape: &Shape) -> usize {
    slot_count_with_displayed_axes(shape, DEFAULT_DISPLAYED_AXES)
}

/// `max(n - displayed_axes, 1)`; there is always at least one slot, even for 1-D and 2-D data.
pub fn slot_count_with_displayed_axes(shape: &Shape, displayed_axes: usize) -> usize {
    shape.num_axes().saturating_sub(displayed_axes).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(dims: &[usize]) -> Shape {
        Shape::new(dims.to_vec()).unwrap()
    }

    #[test]
    fn full_slice_has_one_colon_per_axis() {
        assert_eq!(full_slice_expression(&shape(&[7])), "[:]");
        assert_eq!(full_slice_expression(&shape(&[3, 4, 5])), "[:, :, :]");
    }

    #[test]
    fn preselection_keeps_trailing_two_axes() {
        assert_eq!(preselected_slice_expression(&shape(&[5, 6])), "[:, :]");
        assert_eq!(preselected_slice_expression(&shape(&[2, 3, 4])), "[0, :, :]");
        assert_eq!(
            preselected_slice_expression(&shape(&[3, 4, 5, 6])),
            "[0, 0, :, :]"
        );
        assert_eq!(
            preselected_slice_expression_with_displayed_axes(&shape(&[3, 4, 5, 6]), 1),
            "[0, 0, 0, :]"
        );
    }

    #[test]
    fn slot_count_never_drops_below_one() {
        assert_eq!(slot_count(&shape(&[4])), 1);
        assert_eq!(slot_count(&shape(&[5, 6])), 1);
        assert_eq!(slot_count(&shape(&[2, 3, 4])), 1);
        assert_eq!(slot_count(&shape(&[3, 4, 5, 6])), 2);
        assert_eq!(slot_count_with_displayed_axes(&shape(&[3, 4, 5, 6]), 0), 4);
    }
}
