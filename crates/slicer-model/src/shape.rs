use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// The extents of an N-dimensional array, one entry per axis.
///
/// A shape always has at least one axis and every extent is at least `1`. Shapes are handed to a
/// slicing session once and never change while it is alive.
///
/// Serializes as a plain JSON array (`[3, 4, 5, 6]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Construct a shape from per-axis extents.
    pub fn new(dims: Vec<usize>) -> Result<Self, ShapeError> {
        if dims.is_empty() {
            return Err(ShapeError::Empty);
        }
        if let Some(axis) = dims.iter().position(|&extent| extent == 0) {
            return Err(ShapeError::ZeroExtent { axis });
        }
        Ok(Self { dims })
    }

    /// Per-axis extents.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes (`n`). Always at least `1`.
    #[inline]
    pub fn num_axes(&self) -> usize {
        self.dims.len()
    }

    /// Extent of `axis`, or `None` if the shape has no such axis.
    #[inline]
    pub fn extent(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// Largest extent across all axes.
    pub fn max_extent(&self) -> usize {
        self.dims.iter().copied().max().unwrap_or(0)
    }

    /// Total number of elements, or `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = ShapeError;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        Shape::new(dims)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Self {
        shape.dims
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (axis, extent) in self.dims.iter().enumerate() {
            if axis > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{extent}")?;
        }
        f.write_str("]")
    }
}

/// Parses `3,4,5,6`, `[3, 4, 5, 6]` or a Python-style tuple such as `(5,)`.
impl FromStr for Shape {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let body = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .or_else(|| s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')))
            .unwrap_or(s);

        let mut pieces: Vec<&str> = body.split(',').map(str::trim).collect();
        // A single trailing comma is allowed (`(5,)`).
        if pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
            pieces.pop();
        }
        if pieces.len() == 1 && pieces[0].is_empty() {
            return Err(ShapeParseError::Empty);
        }

        let dims = pieces
            .into_iter()
            .map(|piece| {
                piece
                    .parse::<usize>()
                    .map_err(|_| ShapeParseError::InvalidExtent {
                        text: piece.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Shape::new(dims)?)
    }
}

/// Errors raised when constructing a [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("shape must have at least one axis")]
    Empty,
    #[error("axis {axis} has extent 0")]
    ZeroExtent { axis: usize },
}

/// Errors raised when parsing a [`Shape`] from text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeParseError {
    #[error("empty shape")]
    Empty,
    #[error("invalid extent `{text}`")]
    InvalidExtent { text: String },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
