//! Block formatting context driver (CSS 2.1 Sections 8.3.1, 9.4.1)
//!
//! The driver walks a BFC subtree in document order, receiving a start and
//! an end event per block container. A box's block position cannot be
//! fixed while its margins are still adjoining with margins yet to come,
//! so start events are pushed onto a stack and replayed by
//! [`Bfc::position_block_containers`] at the first non-adjoining boundary,
//! when the collapsed margin is finally known.
//!
//! Collapse-through boxes get their position from the margin collection as
//! it stood at their own end event (the *hypothetical* position), which
//! may differ from where the fully collapsed margin ends up. Clearance
//! breaks adjoinment and seeds a fresh collection that pushes the cleared
//! box past the specified side's floats.
//!
//! Coordinates: the BFC origin is the root box's content-box corner. The
//! root's own margins belong to the outer context and never enter this
//! BFC's margin collection.

use crate::error::Result;
use crate::layout::float_context::FloatContext;
use crate::layout::inline;
use crate::layout::margin_collapse::MarginCollapseCollection;
use crate::style::Clear;
use crate::tree::{BoxId, BoxTree};
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

fn log_bfc() -> bool {
  static LOG: OnceLock<bool> = OnceLock::new();
  *LOG.get_or_init(|| {
    std::env::var("BLOCKFLOW_LOG_BFC")
      .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
      .unwrap_or(false)
  })
}

/// A pending traversal event awaiting position assignment
#[derive(Debug, Clone, Copy)]
enum BfcEvent {
  Start(BoxId),
  End(BoxId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastEvent {
  None,
  Start,
  End,
}

/// The active margin collection and where it belongs
#[derive(Debug, Clone)]
struct MarginRecord {
  /// Level whose extent absorbs this margin when it materializes; demoted
  /// as end events close boxes below it
  level: usize,
  collection: MarginCollapseCollection,
  /// Set when a cleared box could otherwise collapse through; end events
  /// at or above this level must not adjoin, so the clearance survives
  clearance_at_level: Option<usize>,
}

/// One block formatting context
///
/// Lives for the duration of its subtree's layout. Owns the float context
/// (created lazily at the first float) and the deferred-positioning state.
pub struct Bfc {
  root: BoxId,
  /// Content-box inline size of the BFC root; constant per BFC
  pub inline_size: f32,
  /// Block-axis cursor in the BFC's coordinate frame
  pub cb_block_start: f32,
  /// Accumulated line-left insets from ancestors inside this BFC
  pub cb_line_left: f32,
  /// Accumulated line-right insets from ancestors inside this BFC
  pub cb_line_right: f32,
  pub fctx: Option<FloatContext>,
  stack: Vec<BfcEvent>,
  /// Line insets pushed by each open box, unwound at its end event
  inset_stack: Vec<(f32, f32)>,
  /// Per-level block extent accumulated since that level's box started
  size_stack: Vec<f32>,
  /// Per-level content-box top in BFC coordinates
  offset_stack: Vec<f32>,
  last: LastEvent,
  /// Open non-root boxes
  level: usize,
  /// Net margin observed at the moment a collapse-through box ended
  hypotheticals: FxHashMap<BoxId, f32>,
  margin: MarginRecord,
  trace: bool,
}

impl Bfc {
  pub fn new(root: BoxId, inline_size: f32) -> Self {
    Self {
      root,
      inline_size,
      cb_block_start: 0.0,
      cb_line_left: 0.0,
      cb_line_right: 0.0,
      fctx: None,
      stack: Vec::new(),
      inset_stack: Vec::new(),
      size_stack: vec![0.0],
      offset_stack: vec![0.0],
      last: LastEvent::None,
      level: 0,
      hypotheticals: FxHashMap::default(),
      margin: MarginRecord {
        level: 0,
        collection: MarginCollapseCollection::new(),
        clearance_at_level: None,
      },
      trace: false,
    }
  }

  /// The float context, created at the first float
  pub fn ensure_fctx(&mut self) -> &mut FloatContext {
    if self.fctx.is_none() {
      self.fctx = Some(FloatContext::new(self.inline_size));
    }
    self.fctx.as_mut().unwrap()
  }

  fn float_bottom_for(&self, clear: Clear) -> f32 {
    let Some(fctx) = &self.fctx else {
      return 0.0;
    };
    let mut bottom = 0.0f32;
    if clear.clears_left() {
      bottom = bottom.max(fctx.left().bottom());
    }
    if clear.clears_right() {
      bottom = bottom.max(fctx.right().bottom());
    }
    bottom
  }

  /// Content-to-content line insets of a box relative to its containing
  /// block, derived from the resolved inline geometry
  fn line_insets(&self, tree: &BoxTree, id: BoxId) -> (f32, f32) {
    let style = tree.style(id);
    let parent_content = self.inline_size - self.cb_line_left - self.cb_line_right;
    let position = tree.area(tree.node(id).border_area).line_left;
    let line_left = position + style.border_padding_line_left();
    let line_right = parent_content
      - position
      - tree.border_box_inline_size(id)
      + style.border_padding_line_right();
    (line_left, line_right)
  }

  /// Descent event for a box in this BFC
  ///
  /// Decides adjoinment with the previous margin set, applies clearance,
  /// runs text layout for block containers of inlines under a temporary
  /// cursor bias, and defers the box's position onto the event stack.
  pub fn box_start(&mut self, tree: &mut BoxTree, id: BoxId) -> Result<()> {
    if tree.node(id).attrs.enable_logging {
      self.trace = true;
    }
    if id == self.root {
      if tree.is_block_container_of_inlines(id) {
        inline::do_text_layout(tree, id, self)?;
      }
      self.last = LastEvent::Start;
      return Ok(());
    }

    let style = tree.style(id).clone();
    let block_start_inset = style.border_padding_block_start();
    let margin_block_start = style.margin_block_start.auto_is_zero();
    let clear = style.clear;

    let float_bottom = self.float_bottom_for(clear);
    let mut clearance = 0.0;
    if clear != Clear::None {
      let mut hypothetical = self.margin.collection;
      hypothetical.add(margin_block_start);
      clearance = (float_bottom - (self.cb_block_start + hypothetical.get())).max(0.0);
    }

    let adjoins_previous = clearance == 0.0;
    let adjoins_next = block_start_inset == 0.0;

    if adjoins_previous {
      self.margin.collection.add(margin_block_start);
    } else {
      self.position_block_containers(tree);
      let mut collection =
        MarginCollapseCollection::with_margin(float_bottom - self.cb_block_start);
      collection.add(margin_block_start);
      self.margin = MarginRecord {
        level: self.level,
        collection,
        clearance_at_level: None,
      };
      if tree.can_collapse_through(id) {
        self.margin.clearance_at_level = Some(self.level + 1);
      }
    }

    self.stack.push(BfcEvent::Start(id));
    self.level += 1;
    let (line_left, line_right) = self.line_insets(tree, id);
    self.cb_line_left += line_left;
    self.cb_line_right += line_right;
    self.inset_stack.push((line_left, line_right));
    self.last = LastEvent::Start;

    let laid_out_independently = tree.node(id).attrs.is_bfc_root;
    if !laid_out_independently && tree.is_block_container_of_inlines(id) {
      // expose the hypothetical position to the line breaker and the
      // float context without committing the pending margin
      let saved = self.cb_block_start;
      self.cb_block_start += block_start_inset + self.margin.collection.get();
      if let Some(fctx) = self.fctx.as_mut() {
        fctx.box_start(self.cb_block_start);
      }
      inline::do_text_layout(tree, id, self)?;
      self.cb_block_start = saved;
    }

    if !adjoins_next {
      self.position_block_containers(tree);
      self.margin = MarginRecord {
        level: self.level,
        collection: MarginCollapseCollection::new(),
        clearance_at_level: None,
      };
    }
    Ok(())
  }

  /// Ascent event for a box in this BFC
  pub fn box_end(&mut self, tree: &mut BoxTree, id: BoxId) {
    if id == self.root {
      self.last = LastEvent::End;
      return;
    }

    let style = tree.style(id).clone();
    let clearance_ok = match self.margin.clearance_at_level {
      None => true,
      Some(level) => self.level > level,
    };
    let mut adjoins = style.border_padding_block_end() == 0.0 && clearance_ok;
    let collapsed_through = self.last == LastEvent::Start && tree.can_collapse_through(id);
    if adjoins {
      adjoins = if self.last == LastEvent::Start {
        collapsed_through
      } else {
        style.block_size.is_auto() && !tree.node(id).attrs.is_bfc_root
      };
    }

    self.stack.push(BfcEvent::End(id));
    self.level -= 1;
    let (line_left, line_right) = self
      .inset_stack
      .pop()
      .expect("end event without matching start");
    self.cb_line_left -= line_left;
    self.cb_line_right -= line_right;

    if collapsed_through {
      self.hypotheticals.insert(id, self.margin.collection.get());
    }

    if !adjoins {
      self.position_block_containers(tree);
      self.margin = MarginRecord {
        level: self.level,
        collection: MarginCollapseCollection::new(),
        clearance_at_level: None,
      };
    }

    self.margin.collection.add(style.margin_block_end.auto_is_zero());
    if self.level < self.margin.level {
      self.margin.level = self.level;
    }
    self.last = LastEvent::End;
  }

  /// Flush: materializes the pending collapsed margin and assigns block
  /// positions to every queued event
  ///
  /// `size_stack` and `offset_stack` persist across flushes; a flush
  /// replays the queued slice of the traversal against them. Runs at every
  /// non-adjoining boundary, so no two pending start events ever observe
  /// different margins.
  pub fn position_block_containers(&mut self, tree: &mut BoxTree) {
    let margin = self.margin.collection.get();
    let margin_level = self.margin.level;
    self.size_stack[margin_level] += margin;

    // margin value folded into each open level's box position: `margin`
    // at the margin's own level, zero at deeper pre-existing levels
    // (reached by demotion), and per-box for levels opened in this replay
    let mut applied: Vec<f32> = (0..self.size_stack.len())
      .map(|i| if i == margin_level { margin } else { 0.0 })
      .collect();

    let events = std::mem::take(&mut self.stack);
    if (self.trace || log_bfc()) && !events.is_empty() {
      eprintln!(
        "[bfc] flush: margin={} level={} events={}",
        margin,
        margin_level,
        events.len()
      );
    }

    for event in events {
      match event {
        BfcEvent::Start(id) => {
          let parent = self.size_stack.len() - 1;
          let inherited = applied[parent];
          let mut position = self.size_stack[parent];
          let mut own_applied = inherited;
          if let Some(&hypothetical) = self.hypotheticals.get(&id) {
            // the collapse-through box materializes at the margin seen at
            // its own end, not at the fully collapsed position
            position += hypothetical - inherited;
            own_applied = hypothetical;
          }
          let border_area = tree.node(id).border_area;
          tree.area_mut(border_area).block_start = position;

          let inset = tree.style(id).border_padding_block_start();
          let content_top = self.offset_stack[parent] + position + inset;
          self.size_stack.push(0.0);
          self.offset_stack.push(content_top);
          applied.push(own_applied);
          if self.trace || log_bfc() {
            eprintln!("[bfc]   start {:?} at {} (abs {})", id, position, content_top);
          }
        }
        BfcEvent::End(id) => {
          let child_extent = self.size_stack.pop().expect("end event below stack bottom");
          self.offset_stack.pop();
          applied.pop();

          let node = tree.node(id);
          let style = node.style.clone();
          let content_size = if let Some(size) = style.block_size.to_option() {
            size
          } else if node.attrs.is_bfc_root {
            // independent layout already resolved this box's size
            tree.area(node.content_area).block_size
          } else if let Some(paragraph) = &node.paragraph {
            paragraph.height
          } else if tree.is_block_container_of_block_containers(id) {
            child_extent
          } else {
            0.0
          };
          let position = tree.border_box_block_start(id);
          tree.set_block_geometry(id, position, content_size);

          let parent = self.size_stack.len() - 1;
          self.size_stack[parent] += tree.border_box_block_size(id);
          if self.trace || log_bfc() {
            eprintln!(
              "[bfc]   end {:?}: content={} extent={}",
              id, content_size, self.size_stack[parent]
            );
          }
        }
      }
    }

    self.cb_block_start = self.offset_stack.last().unwrap() + self.size_stack.last().unwrap();
  }

  /// Must be called on the BFC root after its end event: flushes pending
  /// events and resolves an auto block size to the content extent
  pub fn finalize(&mut self, tree: &mut BoxTree, root: BoxId) {
    assert!(root == self.root, "finalize must receive the BFC root");
    self.position_block_containers(tree);

    let node = tree.node(root);
    let style = node.style.clone();
    let content_size = if let Some(size) = style.block_size.to_option() {
      size
    } else {
      let paragraph_height = node.paragraph.as_ref().map(|p| p.height).unwrap_or(0.0);
      let float_bottom = self.fctx.as_ref().map(|f| f.both_bottom()).unwrap_or(0.0);
      paragraph_height.max(self.cb_block_start).max(float_bottom)
    };
    let position = tree.border_box_block_start(root);
    tree.set_block_geometry(root, position, content_size);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::style::{ComputedStyle, UsedValue};
  use std::sync::Arc;

  fn block_style(f: impl FnOnce(&mut ComputedStyle)) -> Arc<ComputedStyle> {
    let mut style = ComputedStyle::default();
    f(&mut style);
    Arc::new(style)
  }

  fn sized_child(tree: &mut BoxTree, height: f32, top: f32, bottom: f32) -> BoxId {
    let id = tree.new_block(
      block_style(|s| {
        s.block_size = UsedValue::Px(height);
        s.margin_block_start = UsedValue::Px(top);
        s.margin_block_end = UsedValue::Px(bottom);
      }),
      vec![],
    );
    tree.set_inline_geometry(id, 0.0, 400.0);
    id
  }

  fn drive(tree: &mut BoxTree, root: BoxId, children: &[BoxId]) -> Bfc {
    tree.set_inline_geometry(root, 0.0, 400.0);
    let mut bfc = Bfc::new(root, 400.0);
    bfc.box_start(tree, root).unwrap();
    for &child in children {
      bfc.box_start(tree, child).unwrap();
      bfc.box_end(tree, child);
    }
    bfc.box_end(tree, root);
    bfc.finalize(tree, root);
    bfc
  }

  #[test]
  fn test_sibling_margins_collapse_to_max() {
    let mut tree = BoxTree::new();
    let a = sized_child(&mut tree, 10.0, 20.0, 0.0);
    let b = sized_child(&mut tree, 10.0, 30.0, 0.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![a, b]);
    drive(&mut tree, root, &[a, b]);

    assert_eq!(tree.border_box_block_start(a), 20.0);
    assert_eq!(tree.border_box_block_start(b), 60.0);
    // gap between border boxes is the collapsed 30, not 20 + 30
    assert_eq!(
      tree.border_box_block_start(b) - (tree.border_box_block_start(a) + 10.0),
      30.0
    );
  }

  #[test]
  fn test_adjacent_bottom_top_margins_collapse() {
    let mut tree = BoxTree::new();
    let a = sized_child(&mut tree, 10.0, 0.0, 30.0);
    let b = sized_child(&mut tree, 10.0, -10.0, 0.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![a, b]);
    drive(&mut tree, root, &[a, b]);
    assert_eq!(tree.border_box_block_start(b), 30.0); // 10 + (30 - 10)
  }

  #[test]
  fn test_negative_margins_collapse_to_most_negative() {
    let mut tree = BoxTree::new();
    let a = sized_child(&mut tree, 10.0, 0.0, -10.0);
    let b = sized_child(&mut tree, 10.0, -30.0, 0.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![a, b]);
    drive(&mut tree, root, &[a, b]);
    // gap = -30: b's border box starts 30 above a's bottom edge
    assert_eq!(tree.border_box_block_start(b), -20.0);
  }

  #[test]
  fn test_parent_child_margins_collapse_through_depth() {
    // parent margin-top 10 with an empty child of margin-top 20: both the
    // parent and the child land at the collapsed offset 20
    let mut tree = BoxTree::new();
    let child = tree.new_block(
      block_style(|s| {
        s.margin_block_start = UsedValue::Px(20.0);
        s.margin_block_end = UsedValue::Px(5.0);
      }),
      vec![],
    );
    tree.set_inline_geometry(child, 0.0, 400.0);
    let parent = tree.new_block(
      block_style(|s| s.margin_block_start = UsedValue::Px(10.0)),
      vec![child],
    );
    tree.set_inline_geometry(parent, 0.0, 400.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![parent]);

    tree.set_inline_geometry(root, 0.0, 400.0);
    let mut bfc = Bfc::new(root, 400.0);
    bfc.box_start(&mut tree, root).unwrap();
    bfc.box_start(&mut tree, parent).unwrap();
    bfc.box_start(&mut tree, child).unwrap();
    bfc.box_end(&mut tree, child);
    bfc.box_end(&mut tree, parent);
    bfc.box_end(&mut tree, root);
    bfc.finalize(&mut tree, root);

    assert_eq!(tree.border_box_block_start(parent), 20.0);
    assert_eq!(tree.border_box_block_size(parent), 0.0);
    assert_eq!(tree.border_box_block_start(child), 0.0); // relative to parent
    assert_eq!(tree.border_box_block_size(root), 20.0);
  }

  #[test]
  fn test_collapse_through_box_keeps_hypothetical_position() {
    // a later, larger bottom margin grows the collapsed gap, but the
    // empty box stays where the margins known at its end put it
    let mut tree = BoxTree::new();
    let empty = tree.new_block(
      block_style(|s| {
        s.margin_block_start = UsedValue::Px(20.0);
        s.margin_block_end = UsedValue::Px(50.0);
      }),
      vec![],
    );
    tree.set_inline_geometry(empty, 0.0, 400.0);
    let after = sized_child(&mut tree, 10.0, 0.0, 0.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![empty, after]);
    drive(&mut tree, root, &[empty, after]);

    assert_eq!(tree.border_box_block_start(empty), 20.0);
    assert_eq!(tree.border_box_block_start(after), 50.0);
  }

  #[test]
  fn test_padding_breaks_adjoinment() {
    let mut tree = BoxTree::new();
    let child = sized_child(&mut tree, 10.0, 20.0, 0.0);
    let parent = tree.new_block(
      block_style(|s| {
        s.margin_block_start = UsedValue::Px(5.0);
        s.padding_block_start = 3.0;
      }),
      vec![child],
    );
    tree.set_inline_geometry(parent, 0.0, 400.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![parent]);

    tree.set_inline_geometry(root, 0.0, 400.0);
    let mut bfc = Bfc::new(root, 400.0);
    bfc.box_start(&mut tree, root).unwrap();
    bfc.box_start(&mut tree, parent).unwrap();
    bfc.box_start(&mut tree, child).unwrap();
    bfc.box_end(&mut tree, child);
    bfc.box_end(&mut tree, parent);
    bfc.box_end(&mut tree, root);
    bfc.finalize(&mut tree, root);

    // parent at its own margin; the child's 20 stays inside the padding
    assert_eq!(tree.border_box_block_start(parent), 5.0);
    assert_eq!(tree.border_box_block_start(child), 20.0);
    assert_eq!(tree.border_box_block_size(parent), 3.0 + 20.0 + 10.0);
  }

  #[test]
  fn test_auto_parent_height_excludes_trailing_margin() {
    let mut tree = BoxTree::new();
    let child = sized_child(&mut tree, 10.0, 0.0, 25.0);
    let parent = tree.new_block(ComputedStyle::shared_default(), vec![child]);
    tree.set_inline_geometry(parent, 0.0, 400.0);
    let after = sized_child(&mut tree, 10.0, 0.0, 0.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![parent, after]);

    tree.set_inline_geometry(root, 0.0, 400.0);
    let mut bfc = Bfc::new(root, 400.0);
    bfc.box_start(&mut tree, root).unwrap();
    bfc.box_start(&mut tree, parent).unwrap();
    bfc.box_start(&mut tree, child).unwrap();
    bfc.box_end(&mut tree, child);
    bfc.box_end(&mut tree, parent);
    bfc.box_start(&mut tree, after).unwrap();
    bfc.box_end(&mut tree, after);
    bfc.box_end(&mut tree, root);
    bfc.finalize(&mut tree, root);

    // the child's bottom margin escapes the auto-height parent
    assert_eq!(tree.border_box_block_size(parent), 10.0);
    assert_eq!(tree.border_box_block_start(after), 35.0);
    assert_eq!(tree.border_box_block_size(root), 45.0);
  }

  #[test]
  fn test_root_auto_height_includes_trailing_margin() {
    let mut tree = BoxTree::new();
    let child = sized_child(&mut tree, 10.0, 0.0, 25.0);
    let root = tree.new_block(ComputedStyle::shared_default(), vec![child]);
    drive(&mut tree, root, &[child]);
    // a BFC root's margins never collapse with its children
    assert_eq!(tree.border_box_block_size(root), 35.0);
  }
}
