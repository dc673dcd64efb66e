use serde::{Deserialize, Serialize};

use crate::expression::{bracket_body, resolve_index};
use crate::{slot_count, Shape, SliceComponent, SliceExpression};

/// The state of one axis/index selector slot.
///
/// `index` is only meaningful once `axis` is set, and then lies in `0..shape[axis]`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisSelection {
    #[serde(default)]
    pub axis: Option<usize>,
    #[serde(default)]
    pub index: Option<usize>,
}

impl AxisSelection {
    /// A slot with nothing selected.
    pub const UNSET: Self = Self {
        axis: None,
        index: None,
    };

    /// A fully-specified slot narrowing `axis` to `index`.
    #[inline]
    pub const fn new(axis: usize, index: usize) -> Self {
        Self {
            axis: Some(axis),
            index: Some(index),
        }
    }

    /// Both the axis and the index are selected.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.axis.is_some() && self.index.is_some()
    }

    #[inline]
    pub const fn is_unset(&self) -> bool {
        self.axis.is_none() && self.index.is_none()
    }
}

/// Slice text derived from a set of slot selections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedText {
    pub text: String,
    /// Slots with both an axis and an index.
    pub specified: usize,
    /// Slots that exist.
    pub slots: usize,
}

impl DerivedText {
    /// Every slot contributed a point component. Only complete text is worth broadcasting.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.specified == self.slots
    }
}

/// Build slice text from `selections`: `:` everywhere, with each fully-specified slot's axis
/// overwritten by its index. When two slots name the same axis the later slot wins.
///
/// Slots whose axis does not exist in `shape` are skipped and do not count as specified.
pub fn text_from_selections(shape: &Shape, selections: &[AxisSelection]) -> DerivedText {
    let mut components = vec![SliceComponent::Full; shape.num_axes()];
    let mut specified = 0usize;
    for selection in selections {
        let (Some(axis), Some(index)) = (selection.axis, selection.index) else {
            continue;
        };
        let Some(component) = components.get_mut(axis) else {
            continue;
        };
        *component = SliceComponent::Index(i64::try_from(index).unwrap_or(i64::MAX));
        specified += 1;
    }
    DerivedText {
        text: SliceExpression::new(components).to_string(),
        specified,
        slots: selections.len(),
    }
}

/// Derive slot selections from slice text, using [`slot_count`] slots.
///
/// See [`selections_from_text_with_slots`].
pub fn selections_from_text(text: &str, shape: &Shape) -> Option<Vec<AxisSelection>> {
    selections_from_text_with_slots(text, shape, slot_count(shape))
}

/// Derive `slots` slot selections from slice text.
///
/// Returns `None` when `text` is not bracket-delimited; callers keep their current slots.
///
/// Otherwise every point component becomes a candidate `{axis: position, index}`. When the text
/// has no range components and exactly `slots` candidates, slot `i` takes the `i`-th candidate in
/// order of appearance (not by axis). Any other text cannot be represented by the slots and yields
/// all-unset selections. Bare `:` components are ignored; a point outside its axis or a malformed
/// component makes the text unrepresentable.
pub fn selections_from_text_with_slots(
    text: &str,
    shape: &Shape,
    slots: usize,
) -> Option<Vec<AxisSelection>> {
    let body = bracket_body(text)?;

    let mut candidates = Vec::with_capacity(slots);
    let mut ranges = 0usize;
    let mut representable = true;
    for (axis, raw) in body.split(',').enumerate() {
        match SliceComponent::parse(axis, raw) {
            Ok(SliceComponent::Full) => {}
            Ok(SliceComponent::Range { .. }) => ranges += 1,
            Ok(SliceComponent::Index(index)) => {
                match shape
                    .extent(axis)
                    .and_then(|extent| resolve_index(index, extent))
                {
                    Some(index) => candidates.push(AxisSelection::new(axis, index)),
                    None => representable = false,
                }
            }
            Err(_) => representable = false,
        }
    }

    if representable && ranges == 0 && candidates.len() == slots {
        Some(candidates)
    } else {
        Some(vec![AxisSelection::UNSET; slots])
    }
}
