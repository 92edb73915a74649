#![forbid(unsafe_code)]

//! Floating-point geometry in view coordinates.
//!
//! Coordinates grow rightward (x) and downward (y). A [`Rect`] is an origin
//! plus a size; sizes are expected to be non-negative but negative values are
//! tolerated and simply produce inverted edges.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clamp a value to `>= 0`, mapping NaN to zero.
#[inline]
#[must_use]
pub fn non_negative(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

/// A point in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions clamped to `>= 0`.
    #[must_use]
    pub fn non_negative(self) -> Self {
        Self::new(non_negative(self.width), non_negative(self.height))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    #[inline]
    pub const fn x(&self) -> f64 {
        self.origin.x
    }

    #[inline]
    pub const fn y(&self) -> f64 {
        self.origin.y
    }

    #[inline]
    pub const fn width(&self) -> f64 {
        self.size.width
    }

    #[inline]
    pub const fn height(&self) -> f64 {
        self.size.height
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn mid_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    #[inline]
    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.size.height / 2.0
    }

    /// Center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// The rectangle's own coordinate space (origin at zero).
    #[inline]
    pub fn bounds(&self) -> Self {
        Self::from_size(self.size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Same size, translated by `(dx, dy)`.
    #[must_use]
    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.origin.x + dx,
            self.origin.y + dy,
            self.size.width,
            self.size.height,
        )
    }

    /// Same origin, different size.
    #[must_use]
    pub fn with_size(self, size: Size) -> Self {
        Self {
            origin: self.origin,
            size,
        }
    }

    /// Same size, different origin.
    #[must_use]
    pub fn with_origin(self, origin: Point) -> Self {
        Self {
            origin,
            size: self.size,
        }
    }

    /// A rectangle of `size` centered within `self`.
    ///
    /// The result may extend past `self` when `size` is larger.
    #[must_use]
    pub fn centered(&self, size: Size) -> Self {
        Self::new(
            self.min_x() + (self.size.width - size.width) / 2.0,
            self.min_y() + (self.size.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }

    /// A zero-size rectangle positioned at `point`.
    #[inline]
    pub const fn collapsed_at(point: Point) -> Self {
        Self {
            origin: point,
            size: Size::ZERO,
        }
    }

    /// Component-wise linear interpolation towards `to`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::new(
            mix(self.origin.x, to.origin.x),
            mix(self.origin.y, to.origin.y),
            mix(self.size.width, to.size.width),
            mix(self.size.height, to.size.height),
        )
    }
}
