//! Box model resolution (CSS 2.2 Sections 10.3.3 and 10.6.3)
//!
//! The inline axis resolves fully before block layout starts: `auto`
//! margins absorb free space, over-constrained declarations give way on
//! the direction-dependent side, and floats shrink to fit. The block axis
//! resolves only definite sizes here; `auto` block sizes wait for the
//! BFC to observe the content extent.

use crate::layout::contribution::{intrinsic_content, IntrinsicSizingMode};
use crate::style::{Direction, UsedValue, WritingMode};
use crate::tree::{AreaId, BoxId, BoxTree};

/// Downward pre-order pass wiring each box to the content area of its
/// containing block. The reference is written once and the border area's
/// parent link and coordinate frame are fixed at the same time.
pub fn assign_containing_blocks(
  tree: &mut BoxTree,
  id: BoxId,
  cb_content: AreaId,
  cb_writing_mode: WritingMode,
) {
  let node = tree.node_mut(id);
  node.containing_block = Some(cb_content);
  let border = node.border_area;
  let own_content = node.content_area;
  let own_writing_mode = node.style.writing_mode;

  let area = tree.area_mut(border);
  area.parent = Some(cb_content);
  area.frame_writing_mode = cb_writing_mode;

  let children: Vec<BoxId> = tree.node(id).children().to_vec();
  for child in children {
    assign_containing_blocks(tree, child, own_content, own_writing_mode);
  }
}

/// Shrink-to-fit width: `min(max(preferred_minimum, available), preferred)`
pub fn shrink_to_fit(tree: &BoxTree, id: BoxId, available: f32) -> f32 {
  let preferred_minimum = intrinsic_content(tree, id, IntrinsicSizingMode::MinContent);
  let preferred = intrinsic_content(tree, id, IntrinsicSizingMode::MaxContent);
  preferred_minimum.max(available).min(preferred.max(preferred_minimum))
}

/// Resolves a box's inline-axis geometry against its containing block's
/// content inline size and writes the three areas' inline quads.
pub fn resolve_inline_box_model(tree: &mut BoxTree, id: BoxId, cb_inline_size: f32) {
  let style = tree.node(id).style.clone();
  let border_padding =
    style.border_padding_line_left() + style.border_padding_line_right();

  if tree.node(id).attrs.is_float {
    // floats never receive auto-margin space and size to their content
    // when no width is given
    let margin_left = style.margin_line_left.auto_is_zero();
    let margin_right = style.margin_line_right.auto_is_zero();
    let content = match style.inline_size.to_option() {
      Some(size) => size,
      None => {
        let available = (cb_inline_size - margin_left - margin_right - border_padding).max(0.0);
        shrink_to_fit(tree, id, available)
      }
    };
    tree.set_inline_geometry(id, margin_left, content + border_padding);
    return;
  }

  match style.inline_size.to_option() {
    None => {
      // auto width fills the containing block; auto margins become zero
      let margin_left = style.margin_line_left.auto_is_zero();
      let margin_right = style.margin_line_right.auto_is_zero();
      let border_box = (cb_inline_size - margin_left - margin_right).max(0.0);
      tree.set_inline_geometry(id, margin_left, border_box);
    }
    Some(content) => {
      let border_box = content + border_padding;
      let free = cb_inline_size - border_box;
      let margin_left = match (style.margin_line_left, style.margin_line_right) {
        (UsedValue::Auto, UsedValue::Auto) => {
          if free >= 0.0 {
            free / 2.0
          } else {
            // over-constrained: auto margins become zero and the box
            // overflows on the direction-dependent side
            match style.direction {
              Direction::Ltr => 0.0,
              Direction::Rtl => free,
            }
          }
        }
        (UsedValue::Auto, UsedValue::Px(right)) => free - right,
        (UsedValue::Px(left), UsedValue::Auto) => left,
        (UsedValue::Px(left), UsedValue::Px(right)) => match style.direction {
          // one declared margin must give way; which one depends on the
          // inline base direction
          Direction::Ltr => left,
          Direction::Rtl => free - right,
        },
      };
      tree.set_inline_geometry(id, margin_left, border_box);
    }
  }
}

/// Resolves the block axis as far as it can be before positioning: a
/// definite block size writes the areas now (floats need their border-box
/// height before placement); `auto` stays deferred.
pub fn resolve_block_box_model(tree: &mut BoxTree, id: BoxId) {
  let style = tree.node(id).style.clone();
  if let Some(size) = style.block_size.to_option() {
    let position = tree.border_box_block_start(id);
    tree.set_block_geometry(id, position, size);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::contribution::contribution;
  use crate::style::{ComputedStyle, Float};
  use std::sync::Arc;

  fn block(tree: &mut BoxTree, f: impl FnOnce(&mut ComputedStyle)) -> BoxId {
    let mut style = ComputedStyle::default();
    f(&mut style);
    tree.new_block(Arc::new(style), vec![])
  }

  #[test]
  fn test_auto_width_fills_containing_block() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.margin_line_left = UsedValue::Px(10.0);
      s.margin_line_right = UsedValue::Px(30.0);
    });
    resolve_inline_box_model(&mut tree, id, 400.0);
    assert_eq!(tree.border_box_inline_size(id), 360.0);
    assert_eq!(tree.area(tree.node(id).border_area).line_left, 10.0);
  }

  #[test]
  fn test_auto_margins_center_fixed_width() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.inline_size = UsedValue::Px(100.0);
      s.margin_line_left = UsedValue::Auto;
      s.margin_line_right = UsedValue::Auto;
    });
    resolve_inline_box_model(&mut tree, id, 400.0);
    assert_eq!(tree.area(tree.node(id).border_area).line_left, 150.0);
  }

  #[test]
  fn test_single_auto_margin_takes_remainder() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.inline_size = UsedValue::Px(100.0);
      s.margin_line_left = UsedValue::Auto;
      s.margin_line_right = UsedValue::Px(40.0);
    });
    resolve_inline_box_model(&mut tree, id, 400.0);
    assert_eq!(tree.area(tree.node(id).border_area).line_left, 260.0);
  }

  #[test]
  fn test_over_constrained_ltr_keeps_left_margin() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.inline_size = UsedValue::Px(300.0);
      s.margin_line_left = UsedValue::Px(80.0);
      s.margin_line_right = UsedValue::Px(80.0);
    });
    resolve_inline_box_model(&mut tree, id, 400.0);
    assert_eq!(tree.area(tree.node(id).border_area).line_left, 80.0);
  }

  #[test]
  fn test_over_constrained_rtl_keeps_right_margin() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.direction = Direction::Rtl;
      s.inline_size = UsedValue::Px(300.0);
      s.margin_line_left = UsedValue::Px(80.0);
      s.margin_line_right = UsedValue::Px(80.0);
    });
    resolve_inline_box_model(&mut tree, id, 400.0);
    // free = 100 - 80 declared right margin leaves 20 for line-left
    assert_eq!(tree.area(tree.node(id).border_area).line_left, 20.0);
  }

  #[test]
  fn test_float_shrinks_to_fit() {
    let mut tree = BoxTree::new();
    let run = tree.new_text(ComputedStyle::shared_default(), "aaaa bb");
    let float = tree.new_float(
      Arc::new(ComputedStyle {
        float: Float::Left,
        ..Default::default()
      }),
      vec![run],
    );
    // max-content 7 chars * 8 = 56, min-content 32; plenty of room
    resolve_inline_box_model(&mut tree, float, 400.0);
    assert_eq!(tree.border_box_inline_size(float), 56.0);

    // narrow containing block clamps to available, floored at min-content
    resolve_inline_box_model(&mut tree, float, 40.0);
    assert_eq!(tree.border_box_inline_size(float), 40.0);
    resolve_inline_box_model(&mut tree, float, 10.0);
    assert_eq!(tree.border_box_inline_size(float), 32.0);
  }

  #[test]
  fn test_definite_block_size_writes_geometry() {
    let mut tree = BoxTree::new();
    let id = block(&mut tree, |s| {
      s.block_size = UsedValue::Px(50.0);
      s.padding_block_start = 4.0;
    });
    resolve_block_box_model(&mut tree, id);
    assert_eq!(tree.border_box_block_size(id), 54.0);
  }

  #[test]
  fn test_shrink_to_fit_is_clamped() {
    let mut tree = BoxTree::new();
    let run = tree.new_text(ComputedStyle::shared_default(), "one two");
    let float = tree.new_float(
      Arc::new(ComputedStyle {
        float: Float::Left,
        ..Default::default()
      }),
      vec![run],
    );
    let min = intrinsic_content(&tree, float, IntrinsicSizingMode::MinContent);
    let max = intrinsic_content(&tree, float, IntrinsicSizingMode::MaxContent);
    for available in [0.0, 10.0, 25.0, 100.0] {
      let chosen = shrink_to_fit(&tree, float, available);
      assert!(chosen >= min && chosen <= max.max(min));
    }
  }

  #[test]
  fn test_contribution_of_sized_float() {
    let mut tree = BoxTree::new();
    let float = tree.new_float(
      Arc::new(ComputedStyle {
        float: Float::Right,
        inline_size: UsedValue::Px(64.0),
        margin_line_left: UsedValue::Px(6.0),
        ..Default::default()
      }),
      vec![],
    );
    assert_eq!(contribution(&tree, float, IntrinsicSizingMode::MaxContent), 70.0);
  }
}
