//! Public layout entry points
//!
//! [`layout_block_box`] lays out a block root against an initial
//! containing block: containing-block assignment, inline then block box
//! model resolution, the BFC event walk, and finalization. BFC roots
//! nested in the tree (explicit `flow-root`, floats) lay out their
//! subtrees through fresh, independent contexts and participate in the
//! outer flow as opaque boxes.

use crate::error::{LayoutError, Result};
use crate::layout::bfc::Bfc;
use crate::layout::box_model;
use crate::style::WritingMode;
use crate::tree::{BoxId, BoxTree};

/// The initial containing block a layout runs against
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput {
  pub inline_size: f32,
  pub block_size: f32,
}

impl LayoutInput {
  pub const fn new(inline_size: f32, block_size: f32) -> Self {
    Self {
      inline_size,
      block_size,
    }
  }
}

impl Default for LayoutInput {
  fn default() -> Self {
    Self::new(800.0, 600.0)
  }
}

/// Lays out a block root, populating every area geometry in its subtree.
///
/// Positions stay relative to each box's containing block until
/// [`BoxTree::absolutify`] converts them to physical coordinates.
pub fn layout_block_box(tree: &mut BoxTree, root: BoxId, input: &LayoutInput) -> Result<()> {
  let icb = tree.alloc_root_area(input.inline_size, input.block_size);
  // the initial containing block takes the root element's writing mode
  let icb_writing_mode = tree.style(root).writing_mode;
  box_model::assign_containing_blocks(tree, root, icb, icb_writing_mode);
  box_model::resolve_inline_box_model(tree, root, input.inline_size);
  box_model::resolve_block_box_model(tree, root);

  let margin_block_start = tree.style(root).margin_block_start.auto_is_zero();
  let border_area = tree.node(root).border_area;
  tree.area_mut(border_area).block_start = margin_block_start;

  layout_independent(tree, root)
}

/// Lays out a float root: shrink-to-fit sizing plus an independent BFC.
/// Used by inline layout for in-flow floats and by intrinsic passes.
///
/// # Panics
///
/// Panics when the box is not a float; that is a caller bug, not a layout
/// outcome.
pub fn layout_float_box(tree: &mut BoxTree, id: BoxId, available_inline: f32) -> Result<()> {
  assert!(
    tree.node(id).attrs.is_float,
    "layout_float_box called on a non-float box"
  );
  if tree.node(id).containing_block.is_none() {
    // standalone use (intrinsic pass): give the float a frame to resolve
    // against
    let icb = tree.alloc_root_area(available_inline, 0.0);
    box_model::assign_containing_blocks(tree, id, icb, WritingMode::HorizontalTb);
  }
  box_model::resolve_inline_box_model(tree, id, available_inline);
  box_model::resolve_block_box_model(tree, id);
  layout_independent(tree, id)
}

/// Runs a fresh BFC over `id`'s subtree and finalizes its geometry
fn layout_independent(tree: &mut BoxTree, id: BoxId) -> Result<()> {
  let content_inline = tree.area(tree.node(id).content_area).inline_size;
  let mut bfc = Bfc::new(id, content_inline);
  layout_box_in_bfc(tree, id, &mut bfc)?;
  bfc.finalize(tree, id);
  Ok(())
}

fn layout_box_in_bfc(tree: &mut BoxTree, id: BoxId, bfc: &mut Bfc) -> Result<()> {
  let node = tree.node(id);
  if node.is_block_container()
    && !node.children().is_empty()
    && !tree.is_block_container_of_inlines(id)
    && !tree.is_block_container_of_block_containers(id)
  {
    return Err(
      LayoutError::UnsupportedBoxType {
        message: format!(
          "box {} mixes block-level and inline-level children; anonymous-box fixup must run first",
          id.0
        ),
      }
      .into(),
    );
  }

  bfc.box_start(tree, id)?;
  if tree.is_block_container_of_block_containers(id) {
    let children: Vec<BoxId> = tree.node(id).children().to_vec();
    for child in children {
      if !tree.node(child).is_block_level() {
        return Err(
          LayoutError::UnsupportedBoxType {
            message: format!("inline-level box {} where a block was required", child.0),
          }
          .into(),
        );
      }
      let cb_inline = bfc.inline_size - bfc.cb_line_left - bfc.cb_line_right;
      box_model::resolve_inline_box_model(tree, child, cb_inline);
      box_model::resolve_block_box_model(tree, child);
      if tree.node(child).attrs.is_bfc_root {
        // independent subtree: lay it out now, then let it take part in
        // the outer flow as a box of known size
        layout_independent(tree, child)?;
        bfc.box_start(tree, child)?;
        bfc.box_end(tree, child);
      } else {
        layout_box_in_bfc(tree, child, bfc)?;
      }
    }
  }
  bfc.box_end(tree, id);
  Ok(())
}
