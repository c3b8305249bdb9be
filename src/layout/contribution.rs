//! Intrinsic inline-size contributions (CSS Sizing Level 3)
//!
//! Min-content is the narrowest a box can get without overflow; for text
//! that is the widest word under the fixed-advance measure. Max-content
//! is the width needed to avoid wrapping entirely. Floats widen a block's
//! min-content by competition (`max`) and its max-content by sitting on
//! the same band as the text (`sum`).

use crate::layout::inline::{advance_width, collapse_whitespace};
use crate::style::{ComputedStyle, WhiteSpace};
use crate::tree::{BoxContent, BoxId, BoxTree};

/// Intrinsic sizing mode for content-based size queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicSizingMode {
  /// Narrowest size without overflow (`min-content`)
  MinContent,
  /// Widest size without line breaking (`max-content`)
  MaxContent,
}

/// Outer contribution of a box: its definite inline size when it has one,
/// otherwise its intrinsic content measure, plus margins (with `auto` as
/// zero), borders, and padding.
pub fn contribution(tree: &BoxTree, id: BoxId, mode: IntrinsicSizingMode) -> f32 {
  let style = tree.style(id);
  let edges = style.margin_line_left.auto_is_zero()
    + style.margin_line_right.auto_is_zero()
    + style.border_padding_line_left()
    + style.border_padding_line_right();
  if let Some(size) = style.inline_size.to_option() {
    return size + edges;
  }
  intrinsic_content(tree, id, mode) + edges
}

/// Content-box intrinsic measure of a box
pub fn intrinsic_content(tree: &BoxTree, id: BoxId, mode: IntrinsicSizingMode) -> f32 {
  let node = tree.node(id);
  match &node.content {
    BoxContent::Run(text) => text_measure(text, &node.style, mode),
    BoxContent::Break => 0.0,
    BoxContent::InlineWrapper(children) => fold_inline(tree, children, mode),
    BoxContent::BlockContainer(children) => {
      if tree.is_block_container_of_block_containers(id) {
        children
          .iter()
          .map(|&child| contribution(tree, child, mode))
          .fold(0.0, f32::max)
      } else {
        fold_inline(tree, children, mode)
      }
    }
  }
}

/// Inline-level children: alternatives under min-content (any break
/// opportunity separates them), one shared band under max-content
fn fold_inline(tree: &BoxTree, children: &[BoxId], mode: IntrinsicSizingMode) -> f32 {
  match mode {
    IntrinsicSizingMode::MinContent => children
      .iter()
      .map(|&child| contribution(tree, child, mode))
      .fold(0.0, f32::max),
    IntrinsicSizingMode::MaxContent => children
      .iter()
      .map(|&child| contribution(tree, child, mode))
      .sum(),
  }
}

fn text_measure(text: &str, style: &ComputedStyle, mode: IntrinsicSizingMode) -> f32 {
  match style.white_space {
    WhiteSpace::Pre => text
      .split('\n')
      .map(|line| advance_width(line, style.font_size))
      .fold(0.0, f32::max),
    WhiteSpace::Nowrap => advance_width(&collapse_whitespace(text), style.font_size),
    WhiteSpace::Normal => {
      let collapsed = collapse_whitespace(text);
      match mode {
        IntrinsicSizingMode::MinContent => collapsed
          .split(' ')
          .map(|word| advance_width(word, style.font_size))
          .fold(0.0, f32::max),
        IntrinsicSizingMode::MaxContent => advance_width(&collapsed, style.font_size),
      }
    }
  }
}
