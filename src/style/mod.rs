//! Computed style: resolved used values consumed by layout
//!
//! Style cascade and computed-value resolution happen upstream of this
//! crate. What layout consumes is a [`ComputedStyle`] whose fields are
//! already *used* values: plain CSS-pixel numbers, or the `auto` sentinel
//! for the properties that admit it (`margin-block-start/end`,
//! `margin-line-left/right`, `inline-size`, `block-size`).
//!
//! Fields are stored in the box's own writing-mode-relative axes. The
//! physical mapping only matters during absolutification.

pub mod values;

pub use values::UsedValue;

use crate::geometry::EdgeOffsets;
use std::sync::Arc;

/// Writing mode of a block container
///
/// Governs the mapping from (line-left, block-start) to physical (x, y)
/// during absolutification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
  /// Lines stack top to bottom (Latin-style)
  #[default]
  HorizontalTb,
  /// Lines stack left to right, text flows downward
  VerticalLr,
  /// Lines stack right to left, text flows downward
  VerticalRl,
}

/// Inline base direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ltr,
  Rtl,
}

/// The `float` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Float {
  #[default]
  None,
  Left,
  Right,
}

impl Float {
  /// Returns true unless the value is `none`
  pub fn is_floating(self) -> bool {
    self != Float::None
  }
}

/// The `clear` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clear {
  #[default]
  None,
  Left,
  Right,
  Both,
}

impl Clear {
  /// Whether this value clears past left-side floats
  pub fn clears_left(self) -> bool {
    matches!(self, Clear::Left | Clear::Both)
  }

  /// Whether this value clears past right-side floats
  pub fn clears_right(self) -> bool {
    matches!(self, Clear::Right | Clear::Both)
  }
}

/// Outer display type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayOuter {
  #[default]
  Block,
  Inline,
}

/// Inner display type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayInner {
  /// The box is a block container (flow layout)
  #[default]
  Flow,
  /// The box establishes its own block formatting context
  FlowRoot,
}

/// The two-component `display` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Display {
  pub outer: DisplayOuter,
  pub inner: DisplayInner,
}

/// The `white-space` property, reduced to the behaviors line layout needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
  /// Collapse whitespace, wrap lines
  #[default]
  Normal,
  /// Collapse whitespace, never wrap
  Nowrap,
  /// Preserve whitespace and forced breaks, never wrap
  Pre,
}

/// Resolved style consumed by the layout core
///
/// Every field is a used value. Margins and the two axis sizes may be
/// `auto`; border widths and paddings are always definite numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
  pub writing_mode: WritingMode,
  pub direction: Direction,
  pub white_space: WhiteSpace,
  pub float: Float,
  pub clear: Clear,
  pub display: Display,

  pub margin_block_start: UsedValue,
  pub margin_block_end: UsedValue,
  pub margin_line_left: UsedValue,
  pub margin_line_right: UsedValue,

  pub border_block_start_width: f32,
  pub border_block_end_width: f32,
  pub border_line_left_width: f32,
  pub border_line_right_width: f32,

  pub padding_block_start: f32,
  pub padding_block_end: f32,
  pub padding_line_left: f32,
  pub padding_line_right: f32,

  pub inline_size: UsedValue,
  pub block_size: UsedValue,

  /// Font size in CSS pixels; drives the fixed-advance text measurement
  pub font_size: f32,
  /// Used line height in CSS pixels
  pub line_height: f32,
}

impl Default for ComputedStyle {
  fn default() -> Self {
    Self {
      writing_mode: WritingMode::default(),
      direction: Direction::default(),
      white_space: WhiteSpace::default(),
      float: Float::default(),
      clear: Clear::default(),
      display: Display::default(),
      margin_block_start: UsedValue::Px(0.0),
      margin_block_end: UsedValue::Px(0.0),
      margin_line_left: UsedValue::Px(0.0),
      margin_line_right: UsedValue::Px(0.0),
      border_block_start_width: 0.0,
      border_block_end_width: 0.0,
      border_line_left_width: 0.0,
      border_line_right_width: 0.0,
      padding_block_start: 0.0,
      padding_block_end: 0.0,
      padding_line_left: 0.0,
      padding_line_right: 0.0,
      inline_size: UsedValue::Auto,
      block_size: UsedValue::Auto,
      font_size: 16.0,
      line_height: 19.2,
    }
  }
}

impl ComputedStyle {
  /// A freshly allocated shared default style
  pub fn shared_default() -> Arc<ComputedStyle> {
    Arc::new(ComputedStyle::default())
  }

  /// The four border widths as logical edge offsets
  pub fn border_widths(&self) -> EdgeOffsets {
    EdgeOffsets::new(
      self.border_block_start_width,
      self.border_block_end_width,
      self.border_line_left_width,
      self.border_line_right_width,
    )
  }

  /// The four paddings as logical edge offsets
  pub fn paddings(&self) -> EdgeOffsets {
    EdgeOffsets::new(
      self.padding_block_start,
      self.padding_block_end,
      self.padding_line_left,
      self.padding_line_right,
    )
  }

  /// Sum of border and padding on the block-start side
  pub fn border_padding_block_start(&self) -> f32 {
    self.border_block_start_width + self.padding_block_start
  }

  /// Sum of border and padding on the block-end side
  pub fn border_padding_block_end(&self) -> f32 {
    self.border_block_end_width + self.padding_block_end
  }

  /// Sum of border and padding on the line-left side
  pub fn border_padding_line_left(&self) -> f32 {
    self.border_line_left_width + self.padding_line_left
  }

  /// Sum of border and padding on the line-right side
  pub fn border_padding_line_right(&self) -> f32 {
    self.border_line_right_width + self.padding_line_right
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_style_is_static_block() {
    let style = ComputedStyle::default();
    assert_eq!(style.float, Float::None);
    assert_eq!(style.clear, Clear::None);
    assert_eq!(style.display.outer, DisplayOuter::Block);
    assert!(style.inline_size.is_auto());
    assert!(style.block_size.is_auto());
  }

  #[test]
  fn test_clear_sides() {
    assert!(Clear::Left.clears_left());
    assert!(!Clear::Left.clears_right());
    assert!(Clear::Both.clears_left());
    assert!(Clear::Both.clears_right());
    assert!(!Clear::None.clears_left());
  }

  #[test]
  fn test_border_padding_sums() {
    let style = ComputedStyle {
      border_block_start_width: 2.0,
      padding_block_start: 8.0,
      padding_line_left: 4.0,
      ..Default::default()
    };
    assert_eq!(style.border_padding_block_start(), 10.0);
    assert_eq!(style.border_padding_line_left(), 4.0);
  }
}
