//! Core geometry types for layout
//!
//! Fundamental geometric primitives used by absolutification, the debug
//! tooling, and tests. All units are CSS pixels (1/96th of an inch),
//! independent of device pixels.
//!
//! # Coordinate System
//!
//! The physical coordinate system has its origin at the top-left corner:
//! positive X extends to the right, positive Y extends downward. Before
//! absolutification, layout works in writing-mode-relative axes; the types
//! here describe the physical side of that mapping.

use serde::Serialize;
use std::fmt;

/// A 2D point in CSS pixel space
///
/// # Examples
///
/// ```
/// use blockflow::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f32,
  /// Y coordinate (increases downward)
  pub y: f32,
}

impl Point {
  /// The origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  /// Translates this point by another point's coordinates
  pub fn translate(self, other: Point) -> Self {
    Self {
      x: self.x + other.x,
      y: self.y + other.y,
    }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2D size in CSS pixels
///
/// # Examples
///
/// ```
/// use blockflow::Size;
///
/// let size = Size::new(100.0, 50.0);
/// assert_eq!(size.width, 100.0);
/// assert_eq!(size.height, 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
  /// Width (horizontal extent)
  pub width: f32,
  /// Height (vertical extent)
  pub height: f32,
}

impl Size {
  /// A size with zero width and height
  pub const ZERO: Self = Self {
    width: 0.0,
    height: 0.0,
  };

  /// Creates a new size with the given dimensions
  pub const fn new(width: f32, height: f32) -> Self {
    Self { width, height }
  }

  /// Returns true if either width or height is zero
  pub fn is_empty(self) -> bool {
    self.width == 0.0 || self.height == 0.0
  }
}

impl fmt::Display for Size {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}×{}", self.width, self.height)
  }
}

/// An axis-aligned rectangle in CSS pixel space
///
/// Defined by an origin point (top-left corner) and a size.
///
/// # Examples
///
/// ```
/// use blockflow::Rect;
///
/// let rect = Rect::from_xywh(10.0, 20.0, 100.0, 50.0);
/// assert_eq!(rect.x(), 10.0);
/// assert_eq!(rect.max_y(), 70.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
  /// The top-left corner of the rectangle
  pub origin: Point,
  /// The size (width and height) of the rectangle
  pub size: Size,
}

impl Rect {
  /// A zero-sized rectangle at the origin
  pub const ZERO: Self = Self {
    origin: Point::ZERO,
    size: Size::ZERO,
  };

  /// Creates a new rectangle from an origin point and size
  pub const fn new(origin: Point, size: Size) -> Self {
    Self { origin, size }
  }

  /// Creates a rectangle from x, y, width, height components
  pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self {
      origin: Point::new(x, y),
      size: Size::new(width, height),
    }
  }

  /// Returns the x coordinate of the left edge
  pub fn x(self) -> f32 {
    self.origin.x
  }

  /// Returns the y coordinate of the top edge
  pub fn y(self) -> f32 {
    self.origin.y
  }

  /// Returns the width
  pub fn width(self) -> f32 {
    self.size.width
  }

  /// Returns the height
  pub fn height(self) -> f32 {
    self.size.height
  }

  /// Returns the x coordinate of the right edge
  pub fn max_x(self) -> f32 {
    self.origin.x + self.size.width
  }

  /// Returns the y coordinate of the bottom edge
  pub fn max_y(self) -> f32 {
    self.origin.y + self.size.height
  }

  /// Returns true if `other` lies entirely within this rectangle
  ///
  /// Shared edges count as contained. Used by the area-containment checks
  /// in tests (`content ⊆ padding ⊆ border`).
  pub fn contains_rect(self, other: Rect) -> bool {
    other.x() >= self.x()
      && other.y() >= self.y()
      && other.max_x() <= self.max_x()
      && other.max_y() <= self.max_y()
  }

  /// Translates this rectangle by an offset
  pub fn translate(self, offset: Point) -> Rect {
    Rect {
      origin: self.origin.translate(offset),
      size: self.size,
    }
  }
}

/// Edge offsets representing spacing on all four logical sides
///
/// Used for resolved margin, border, and padding widths in the block
/// container's own writing-mode-relative axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeOffsets {
  /// Block-start edge offset
  pub block_start: f32,
  /// Block-end edge offset
  pub block_end: f32,
  /// Line-left edge offset
  pub line_left: f32,
  /// Line-right edge offset
  pub line_right: f32,
}

impl EdgeOffsets {
  /// Zero offsets on all sides
  pub const ZERO: Self = Self {
    block_start: 0.0,
    block_end: 0.0,
    line_left: 0.0,
    line_right: 0.0,
  };

  /// Creates edge offsets with individual values for each side
  pub const fn new(block_start: f32, block_end: f32, line_left: f32, line_right: f32) -> Self {
    Self {
      block_start,
      block_end,
      line_left,
      line_right,
    }
  }

  /// Returns the sum of the line-left and line-right offsets
  pub fn inline_sum(self) -> f32 {
    self.line_left + self.line_right
  }

  /// Returns the sum of the block-start and block-end offsets
  pub fn block_sum(self) -> f32 {
    self.block_start + self.block_end
  }
}
