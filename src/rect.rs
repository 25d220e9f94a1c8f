//! Axis-aligned rectangles with integer coordinates.

use std::fmt;

/// An axis-aligned rectangle.
///
/// Rectangles are allowed to have zero width and/or height.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle extending outwards from a center point.
    pub fn from_center(x_center: i32, y_center: i32, width: u32, height: u32) -> Self {
        Self {
            x: x_center - (width / 2) as i32,
            y: y_center - (height / 2) as i32,
            width,
            height,
        }
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Returns whether this rectangle covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub fn move_by(&self, x: i32, y: i32) -> Rect {
        Rect::from_top_left(self.x + x, self.y + y, self.width, self.height)
    }

    /// Returns whether `self` contains `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && i64::from(self.x) + i64::from(self.width)
                >= i64::from(other.x) + i64::from(other.width)
            && i64::from(self.y) + i64::from(self.height)
                >= i64::from(other.y) + i64::from(other.height)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            x,
            y,
            width,
            height,
        } = *self;
        let bx = i64::from(x) + i64::from(width);
        let by = i64::from(y) + i64::from(height);
        write!(f, "Rect @ ({x},{y})-({bx},{by})/{width}x{height}")
    }
}
