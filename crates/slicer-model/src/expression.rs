use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Shape;

/// One comma-separated entry of a slice expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SliceComponent {
    /// `:` keeps the whole axis.
    Full,
    /// `k` narrows the axis to a single index, collapsing it. Negative values count from the end.
    Index(i64),
    /// `start:stop` keeps a contiguous sub-range. At least one bound is present; a missing start
    /// means `0` and a missing stop means the axis extent.
    Range { start: Option<i64>, stop: Option<i64> },
}

impl SliceComponent {
    /// Parse a single component (surrounding whitespace is ignored).
    ///
    /// `axis` is only used to label errors.
    pub fn parse(axis: usize, text: &str) -> Result<Self, SliceExpressionError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(SliceExpressionError::EmptyComponent { axis });
        }

        let invalid = || SliceExpressionError::InvalidComponent {
            axis,
            text: s.to_string(),
        };

        match s.split_once(':') {
            None => parse_integer(s).map(SliceComponent::Index).ok_or_else(invalid),
            Some((start, stop)) => {
                let (start, stop) = (start.trim(), stop.trim());
                if start.is_empty() && stop.is_empty() {
                    return Ok(SliceComponent::Full);
                }
                let start = parse_bound(start).ok_or_else(invalid)?;
                let stop = parse_bound(stop).ok_or_else(invalid)?;
                Ok(SliceComponent::Range { start, stop })
            }
        }
    }

    /// Returns true for point components (`k`).
    #[inline]
    pub const fn is_point(&self) -> bool {
        matches!(self, SliceComponent::Index(_))
    }

    /// Returns true for explicit ranges (`a:`, `:b`, `a:b`). A bare `:` is not a range.
    #[inline]
    pub const fn is_range(&self) -> bool {
        matches!(self, SliceComponent::Range { .. })
    }

    /// Resolve against an axis of the given extent.
    pub fn resolve(
        &self,
        axis: usize,
        extent: usize,
    ) -> Result<ResolvedComponent, SliceExpressionError> {
        match *self {
            SliceComponent::Full => Ok(ResolvedComponent::Span {
                start: 0,
                stop: extent,
            }),
            SliceComponent::Index(index) => resolve_index(index, extent)
                .map(ResolvedComponent::Point)
                .ok_or(SliceExpressionError::IndexOutOfRange {
                    axis,
                    index,
                    extent,
                }),
            SliceComponent::Range { start, stop } => {
                let out_of_range = || SliceExpressionError::RangeOutOfRange {
                    axis,
                    range: self.to_string(),
                    extent,
                };
                let start = match start {
                    Some(v) => resolve_bound(v, extent).ok_or_else(out_of_range)?,
                    None => 0,
                };
                let stop = match stop {
                    Some(v) => resolve_bound(v, extent).ok_or_else(out_of_range)?,
                    None => extent,
                };
                if start >= stop {
                    return Err(SliceExpressionError::EmptyRange {
                        axis,
                        range: self.to_string(),
                    });
                }
                Ok(ResolvedComponent::Span { start, stop })
            }
        }
    }
}

impl fmt::Display for SliceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceComponent::Full => f.write_str(":"),
            SliceComponent::Index(index) => write!(f, "{index}"),
            SliceComponent::Range { start, stop } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(stop) = stop {
                    write!(f, "{stop}")?;
                }
                Ok(())
            }
        }
    }
}

/// A component after negative-index wraparound and default filling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedComponent {
    /// A single index; the axis is collapsed in the sliced view.
    Point(usize),
    /// The half-open range `start..stop`, never empty.
    Span { start: usize, stop: usize },
}

/// A slice expression resolved against a [`Shape`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSlice {
    components: Vec<ResolvedComponent>,
}

impl ResolvedSlice {
    pub fn components(&self) -> &[ResolvedComponent] {
        &self.components
    }

    /// Extents of the sliced view. Point axes are dropped; an all-point slice yields `[]`.
    pub fn view_dims(&self) -> Vec<usize> {
        self.components
            .iter()
            .filter_map(|component| match *component {
                ResolvedComponent::Point(_) => None,
                ResolvedComponent::Span { start, stop } => Some(stop - start),
            })
            .collect()
    }

    /// Number of elements selected by the slice, or `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.view_dims()
            .into_iter()
            .try_fold(1usize, |acc, extent| acc.checked_mul(extent))
    }
}

/// A structurally well-formed slice expression such as `[0, :, 1:3]`.
///
/// Parsing only checks the bracket/comma grammar. Use [`SliceExpression::resolve`] (or
/// [`validate_slice_expression`]) to check arity and bounds against a shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SliceExpression {
    components: Vec<SliceComponent>,
}

impl SliceExpression {
    pub fn new(components: Vec<SliceComponent>) -> Self {
        Self { components }
    }

    /// The "no slicing" expression: `:` for every axis of `shape`.
    pub fn full(shape: &Shape) -> Self {
        Self::new(vec![SliceComponent::Full; shape.num_axes()])
    }

    /// Parse the bracket/comma structure of `text`.
    pub fn parse(text: &str) -> Result<Self, SliceExpressionError> {
        let body = bracket_body(text).ok_or(SliceExpressionError::MissingBrackets)?;
        let components = body
            .split(',')
            .enumerate()
            .map(|(axis, raw)| SliceComponent::parse(axis, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { components })
    }

    pub fn components(&self) -> &[SliceComponent] {
        &self.components
    }

    /// Returns true if every component is `:`.
    pub fn is_full(&self) -> bool {
        self.components
            .iter()
            .all(|component| *component == SliceComponent::Full)
    }

    /// Check arity and per-axis bounds against `shape`, reporting the first violation.
    pub fn resolve(&self, shape: &Shape) -> Result<ResolvedSlice, SliceExpressionError> {
        if self.components.len() != shape.num_axes() {
            return Err(SliceExpressionError::ArityMismatch {
                expected: shape.num_axes(),
                actual: self.components.len(),
            });
        }
        let components = self
            .components
            .iter()
            .zip(shape.dims())
            .enumerate()
            .map(|(axis, (component, &extent))| component.resolve(axis, extent))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedSlice { components })
    }
}

impl fmt::Display for SliceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (axis, component) in self.components.iter().enumerate() {
            if axis > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{component}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for SliceExpression {
    type Err = SliceExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SliceExpression::parse(s)
    }
}

/// Broad classes of [`SliceExpressionError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SliceErrorKind {
    /// The text does not match the bracket/comma grammar.
    Structural,
    /// The number of components differs from the number of axes.
    Arity,
    /// A component falls outside its axis.
    Bounds,
}

/// Reasons a slice expression is rejected.
///
/// None of these are fatal: they describe text the user is still editing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SliceExpressionError {
    #[error("slice expression must be enclosed in square brackets, e.g. `[0, :]`")]
    MissingBrackets,
    #[error("axis {axis} is empty")]
    EmptyComponent { axis: usize },
    #[error("axis {axis} has invalid slice `{text}`")]
    InvalidComponent { axis: usize, text: String },
    #[error("expected {expected} components, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("axis {axis} index out of range ({index} for extent {extent})")]
    IndexOutOfRange {
        axis: usize,
        index: i64,
        extent: usize,
    },
    #[error("axis {axis} range `{range}` out of range for extent {extent}")]
    RangeOutOfRange {
        axis: usize,
        range: String,
        extent: usize,
    },
    #[error("axis {axis} range `{range}` is empty")]
    EmptyRange { axis: usize, range: String },
}

impl SliceExpressionError {
    pub fn kind(&self) -> SliceErrorKind {
        match self {
            SliceExpressionError::MissingBrackets
            | SliceExpressionError::EmptyComponent { .. }
            | SliceExpressionError::InvalidComponent { .. } => SliceErrorKind::Structural,
            SliceExpressionError::ArityMismatch { .. } => SliceErrorKind::Arity,
            SliceExpressionError::IndexOutOfRange { .. }
            | SliceExpressionError::RangeOutOfRange { .. }
            | SliceExpressionError::EmptyRange { .. } => SliceErrorKind::Bounds,
        }
    }

    /// The axis the error refers to, if any.
    pub fn axis(&self) -> Option<usize> {
        match self {
            SliceExpressionError::MissingBrackets
            | SliceExpressionError::ArityMismatch { .. } => None,
            SliceExpressionError::EmptyComponent { axis }
            | SliceExpressionError::InvalidComponent { axis, .. }
            | SliceExpressionError::IndexOutOfRange { axis, .. }
            | SliceExpressionError::RangeOutOfRange { axis, .. }
            | SliceExpressionError::EmptyRange { axis, .. } => Some(*axis),
        }
    }
}

/// Parse `text` and check it against `shape`.
pub fn validate_slice_expression(
    text: &str,
    shape: &Shape,
) -> Result<SliceExpression, SliceExpressionError> {
    let expr = SliceExpression::parse(text)?;
    expr.resolve(shape)?;
    Ok(expr)
}

/// Returns true iff `text` is a well-formed slice expression within the bounds of `shape`.
pub fn is_valid_slice_expression(text: &str, shape: &Shape) -> bool {
    validate_slice_expression(text, shape).is_ok()
}

/// Human-readable description of the first problem with `text`, or `None` if it is valid.
pub fn slice_expression_error_message(text: &str, shape: &Shape) -> Option<String> {
    validate_slice_expression(text, shape)
        .err()
        .map(|err| err.to_string())
}

/// The text between the outer `[` and `]`, ignoring surrounding whitespace.
pub(crate) fn bracket_body(text: &str) -> Option<&str> {
    text.trim().strip_prefix('[')?.strip_suffix(']')
}

/// Map a possibly-negative index onto `0..extent`.
pub(crate) fn resolve_index(index: i64, extent: usize) -> Option<usize> {
    let extent = i64::try_from(extent).ok()?;
    let index = if index < 0 { index + extent } else { index };
    if (0..extent).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// Map a possibly-negative range bound onto `0..=extent`.
fn resolve_bound(bound: i64, extent: usize) -> Option<usize> {
    let extent = i64::try_from(extent).ok()?;
    let bound = if bound < 0 { bound + extent } else { bound };
    if (0..=extent).contains(&bound) {
        usize::try_from(bound).ok()
    } else {
        None
    }
}

fn parse_bound(text: &str) -> Option<Option<i64>> {
    if text.is_empty() {
        Some(None)
    } else {
        parse_integer(text).map(Some)
    }
}

/// Parse an optionally-signed decimal literal.
///
/// Literals beyond `i64` saturate; they can never resolve against a real axis, so they surface
/// as bounds errors instead of structural ones.
fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(dims: &[usize]) -> Shape {
        Shape::new(dims.to_vec()).unwrap()
    }

    #[test]
    fn component_grammar() {
        assert_eq!(SliceComponent::parse(0, " : "), Ok(SliceComponent::Full));
        assert_eq!(SliceComponent::parse(0, "-1"), Ok(SliceComponent::Index(-1)));
        assert_eq!(SliceComponent::parse(0, "+2"), Ok(SliceComponent::Index(2)));
        assert_eq!(
            SliceComponent::parse(0, "1 : -1"),
            Ok(SliceComponent::Range {
                start: Some(1),
                stop: Some(-1)
            })
        );
        assert_eq!(
            SliceComponent::parse(0, "3:"),
            Ok(SliceComponent::Range {
                start: Some(3),
                stop: None
            })
        );
        assert_eq!(
            SliceComponent::parse(2, ""),
            Err(SliceExpressionError::EmptyComponent { axis: 2 })
        );
        for bad in ["-", "1.5", "::", "1:2:3", "a", "- 1", "1 2"] {
            assert!(
                matches!(
                    SliceComponent::parse(0, bad),
                    Err(SliceExpressionError::InvalidComponent { .. })
                ),
                "expected `{bad}` to be rejected"
            );
        }
    }

    #[test]
    fn component_display_is_canonical() {
        let expr = SliceExpression::parse("[ 1 ,:, 2: , :-1,0:3 ]").unwrap();
        assert_eq!(expr.to_string(), "[1, :, 2:, :-1, 0:3]");
    }

    #[test]
    fn negative_indices_wrap() {
        assert_eq!(resolve_index(-1, 4), Some(3));
        assert_eq!(resolve_index(-4, 4), Some(0));
        assert_eq!(resolve_index(-5, 4), None);
        assert_eq!(resolve_index(4, 4), None);
        assert_eq!(resolve_bound(4, 4), Some(4));
        assert_eq!(resolve_bound(-4, 4), Some(0));
    }

    #[test]
    fn huge_literals_are_bounds_errors() {
        let s = shape(&[3]);
        let err = validate_slice_expression("[99999999999999999999999]", &s).unwrap_err();
        assert_eq!(err.kind(), SliceErrorKind::Bounds);
        let err = validate_slice_expression("[-99999999999999999999999:]", &s).unwrap_err();
        assert_eq!(err.kind(), SliceErrorKind::Bounds);
    }

    #[test]
    fn resolve_reports_view_dims() {
        let s = shape(&[3, 4, 5, 6]);
        let resolved = SliceExpression::parse("[0, 1:3, :, -2:]")
            .unwrap()
            .resolve(&s)
            .unwrap();
        assert_eq!(
            resolved.components(),
            &[
                ResolvedComponent::Point(0),
                ResolvedComponent::Span { start: 1, stop: 3 },
                ResolvedComponent::Span { start: 0, stop: 5 },
                ResolvedComponent::Span { start: 4, stop: 6 },
            ]
        );
        assert_eq!(resolved.view_dims(), vec![2, 5, 2]);
        assert_eq!(resolved.num_elements(), Some(20));
    }
}
