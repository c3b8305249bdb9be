//! Box Tree - CSS boxes before and after geometry assignment
//!
//! The box tree is built by the caller from a styled DOM (out of scope
//! here) and handed to layout, which writes positions and sizes into each
//! block container's three nested areas.
//!
//! # Representation
//!
//! Boxes and areas live in arenas indexed by [`BoxId`] and [`AreaId`].
//! Area parent pointers are plain indices pointing strictly upward, so no
//! reference cycles arise and absolutification is a parents-first walk.
//!
//! # Areas
//!
//! Each block container owns a border, a padding, and a content area. When
//! the corresponding edge is zero-width the ids alias: no border means
//! `padding_area == border_area`, no padding means
//! `content_area == padding_area`. Before absolutification an area's quad
//! `(line_left, block_start, inline_size, block_size)` is relative to its
//! parent area in writing-mode-relative axes; afterwards it is a physical
//! rectangle in root coordinates.

use crate::geometry::Rect;
use crate::layout::inline::Paragraph;
use crate::style::{ComputedStyle, Float, WritingMode};
use std::sync::Arc;

/// Index of a box in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub usize);

/// Index of an area in the area arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaId(pub usize);

/// Box attributes
///
/// A float is always a BFC root; the constructors maintain that.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxAttrs {
  pub is_anonymous: bool,
  pub is_bfc_root: bool,
  pub is_float: bool,
  pub is_inline: bool,
  /// Scopes the env-gated BFC trace output to this box's subtree
  pub enable_logging: bool,
}

/// What a box contains
#[derive(Debug, Clone)]
pub enum BoxContent {
  /// A block container; children are either all block-level or all
  /// inline-level (anonymous-box fixup upstream guarantees homogeneity)
  BlockContainer(Vec<BoxId>),
  /// An inline wrapper inside an inline formatting context
  InlineWrapper(Vec<BoxId>),
  /// A run of text
  Run(String),
  /// A forced line break
  Break,
}

/// A rectangular area of a block container
///
/// Quad semantics are described in the module docs. `frame_writing_mode`
/// is the writing mode of the coordinate frame the quad is expressed in
/// (the containing block's for a border area, the owning box's for the
/// padding and content areas).
#[derive(Debug, Clone, Copy)]
pub struct Area {
  pub line_left: f32,
  pub block_start: f32,
  pub inline_size: f32,
  pub block_size: f32,
  pub parent: Option<AreaId>,
  pub frame_writing_mode: WritingMode,
}

impl Area {
  fn detached() -> Self {
    Area {
      line_left: 0.0,
      block_start: 0.0,
      inline_size: 0.0,
      block_size: 0.0,
      parent: None,
      frame_writing_mode: WritingMode::HorizontalTb,
    }
  }

  /// The quad as a physical rectangle. Only meaningful after
  /// [`BoxTree::absolutify`].
  pub fn to_rect(&self) -> Rect {
    Rect::from_xywh(self.line_left, self.block_start, self.inline_size, self.block_size)
  }
}

/// A single node of the box tree
#[derive(Debug, Clone)]
pub struct BoxNode {
  pub style: Arc<ComputedStyle>,
  pub attrs: BoxAttrs,
  pub content: BoxContent,
  pub border_area: AreaId,
  pub padding_area: AreaId,
  pub content_area: AreaId,
  /// Content area of the containing block; written once during the
  /// downward pre-order walk and never mutated afterwards
  pub containing_block: Option<AreaId>,
  /// Line layout results for block containers of inlines
  pub paragraph: Option<Paragraph>,
}

impl BoxNode {
  /// Block-level means not inline-level
  pub fn is_block_level(&self) -> bool {
    !self.attrs.is_inline
  }

  pub fn is_block_container(&self) -> bool {
    matches!(self.content, BoxContent::BlockContainer(_))
  }

  /// Children of a block container; empty slice for leaves
  pub fn children(&self) -> &[BoxId] {
    match &self.content {
      BoxContent::BlockContainer(children) | BoxContent::InlineWrapper(children) => children,
      _ => &[],
    }
  }
}

/// The box and area arenas
#[derive(Debug, Default)]
pub struct BoxTree {
  boxes: Vec<BoxNode>,
  areas: Vec<Area>,
}

impl BoxTree {
  pub fn new() -> Self {
    Self::default()
  }

  // ---- constructors ----

  fn push_box(&mut self, style: Arc<ComputedStyle>, attrs: BoxAttrs, content: BoxContent) -> BoxId {
    let (border, padding, content_area) = self.alloc_areas(&style);
    let id = BoxId(self.boxes.len());
    self.boxes.push(BoxNode {
      style,
      attrs,
      content,
      border_area: border,
      padding_area: padding,
      content_area,
      containing_block: None,
      paragraph: None,
    });
    id
  }

  /// Allocates the nested areas for a box, aliasing ids across zero-width
  /// edges and wiring padding→border and content→padding parent links.
  fn alloc_areas(&mut self, style: &ComputedStyle) -> (AreaId, AreaId, AreaId) {
    let has_border = style.border_block_start_width != 0.0
      || style.border_block_end_width != 0.0
      || style.border_line_left_width != 0.0
      || style.border_line_right_width != 0.0;
    let has_padding = style.padding_block_start != 0.0
      || style.padding_block_end != 0.0
      || style.padding_line_left != 0.0
      || style.padding_line_right != 0.0;

    let border = AreaId(self.areas.len());
    self.areas.push(Area::detached());

    let padding = if has_border {
      let id = AreaId(self.areas.len());
      let mut area = Area::detached();
      area.parent = Some(border);
      area.frame_writing_mode = style.writing_mode;
      self.areas.push(area);
      id
    } else {
      border
    };

    let content = if has_padding {
      let id = AreaId(self.areas.len());
      let mut area = Area::detached();
      area.parent = Some(padding);
      area.frame_writing_mode = style.writing_mode;
      self.areas.push(area);
      id
    } else {
      padding
    };

    (border, padding, content)
  }

  /// Creates a block container with the given children
  pub fn new_block(&mut self, style: Arc<ComputedStyle>, children: Vec<BoxId>) -> BoxId {
    let attrs = BoxAttrs {
      is_bfc_root: style.float.is_floating()
        || style.display.inner == crate::style::DisplayInner::FlowRoot,
      is_float: style.float.is_floating(),
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::BlockContainer(children))
  }

  /// Creates a block container that establishes its own BFC
  pub fn new_bfc_root(&mut self, style: Arc<ComputedStyle>, children: Vec<BoxId>) -> BoxId {
    let attrs = BoxAttrs {
      is_bfc_root: true,
      is_float: style.float.is_floating(),
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::BlockContainer(children))
  }

  /// Creates a floated block container (always a BFC root)
  ///
  /// # Panics
  ///
  /// Panics if the style's `float` is `none`; a float box without a float
  /// side is a caller bug.
  pub fn new_float(&mut self, style: Arc<ComputedStyle>, children: Vec<BoxId>) -> BoxId {
    assert!(
      style.float.is_floating(),
      "new_float requires style.float to be left or right"
    );
    let attrs = BoxAttrs {
      is_bfc_root: true,
      is_float: true,
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::BlockContainer(children))
  }

  /// Creates an inline wrapper
  pub fn new_inline(&mut self, style: Arc<ComputedStyle>, children: Vec<BoxId>) -> BoxId {
    let attrs = BoxAttrs {
      is_inline: true,
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::InlineWrapper(children))
  }

  /// Creates a text run
  pub fn new_text(&mut self, style: Arc<ComputedStyle>, text: impl Into<String>) -> BoxId {
    let attrs = BoxAttrs {
      is_inline: true,
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::Run(text.into()))
  }

  /// Creates a forced line break
  pub fn new_break(&mut self, style: Arc<ComputedStyle>) -> BoxId {
    let attrs = BoxAttrs {
      is_inline: true,
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::Break)
  }

  /// Creates an anonymous block container (builder-generated fixup box)
  pub fn new_anonymous_block(&mut self, style: Arc<ComputedStyle>, children: Vec<BoxId>) -> BoxId {
    let attrs = BoxAttrs {
      is_anonymous: true,
      ..Default::default()
    };
    self.push_box(style, attrs, BoxContent::BlockContainer(children))
  }

  // ---- access ----

  pub fn node(&self, id: BoxId) -> &BoxNode {
    &self.boxes[id.0]
  }

  pub fn node_mut(&mut self, id: BoxId) -> &mut BoxNode {
    &mut self.boxes[id.0]
  }

  pub fn style(&self, id: BoxId) -> &ComputedStyle {
    &self.boxes[id.0].style
  }

  pub fn area(&self, id: AreaId) -> &Area {
    &self.areas[id.0]
  }

  pub fn area_mut(&mut self, id: AreaId) -> &mut Area {
    &mut self.areas[id.0]
  }

  /// Allocates a free-standing area (the initial containing block)
  pub fn alloc_root_area(&mut self, inline_size: f32, block_size: f32) -> AreaId {
    let id = AreaId(self.areas.len());
    self.areas.push(Area {
      line_left: 0.0,
      block_start: 0.0,
      inline_size,
      block_size,
      parent: None,
      frame_writing_mode: WritingMode::HorizontalTb,
    });
    id
  }

  pub fn len(&self) -> usize {
    self.boxes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.boxes.is_empty()
  }

  // ---- predicates ----

  /// True when every child is inline-level or a float (empty counts: an
  /// empty block container holds an empty inline formatting context)
  pub fn is_block_container_of_inlines(&self, id: BoxId) -> bool {
    let node = self.node(id);
    if !node.is_block_container() {
      return false;
    }
    let children = node.children();
    children
      .iter()
      .all(|&c| self.node(c).attrs.is_inline || self.node(c).attrs.is_float)
  }

  /// True when the container has children and all are in-flow block-level
  pub fn is_block_container_of_block_containers(&self, id: BoxId) -> bool {
    let node = self.node(id);
    if !node.is_block_container() {
      return false;
    }
    let children = node.children();
    !children.is_empty()
      && children
        .iter()
        .all(|&c| self.node(c).is_block_level() && !self.node(c).attrs.is_float)
  }

  /// A box collapses through when it has auto block size, no block-axis
  /// border or padding, and produced no content between its start and end.
  /// A BFC root never collapses through: it contains its own margins.
  ///
  /// Only meaningful for block containers; consulted by the BFC when a
  /// box's end event directly follows its start event.
  pub fn can_collapse_through(&self, id: BoxId) -> bool {
    let node = self.node(id);
    if node.attrs.is_bfc_root {
      return false;
    }
    if !node.style.block_size.is_auto() {
      return false;
    }
    if node.style.border_padding_block_start() != 0.0 || node.style.border_padding_block_end() != 0.0
    {
      return false;
    }
    match &node.paragraph {
      Some(paragraph) => paragraph.lineboxes.is_empty() && paragraph.height == 0.0,
      None => node.children().is_empty(),
    }
  }

  /// Which side a float box goes to
  ///
  /// # Panics
  ///
  /// Panics when called on a non-float; the caller must check `is_float`.
  pub fn float_side(&self, id: BoxId) -> Float {
    let side = self.style(id).float;
    assert!(side.is_floating(), "float_side called on a non-float box");
    side
  }

  // ---- geometry helpers ----

  /// Writes the inline-axis geometry of a box's three areas.
  ///
  /// `line_left` is the border box's offset from the containing block's
  /// content area; `border_inline_size` is the border-box inline size.
  pub fn set_inline_geometry(&mut self, id: BoxId, line_left: f32, border_inline_size: f32) {
    let node = self.node(id);
    let style = node.style.clone();
    let (border, padding, content) = (node.border_area, node.padding_area, node.content_area);

    let area = self.area_mut(border);
    area.line_left = line_left;
    area.inline_size = border_inline_size;

    if padding != border {
      let area = self.area_mut(padding);
      area.line_left = style.border_line_left_width;
      area.inline_size = border_inline_size - style.border_widths().inline_sum();
    }
    if content != padding {
      let inner = self.area(padding).inline_size;
      let area = self.area_mut(content);
      area.line_left = style.padding_line_left;
      area.inline_size = inner - style.paddings().inline_sum();
    }
  }

  /// Writes the block-axis geometry of a box's three areas.
  ///
  /// `block_start` positions the border box relative to the containing
  /// block's content area; `content_block_size` is the content-box size.
  pub fn set_block_geometry(&mut self, id: BoxId, block_start: f32, content_block_size: f32) {
    let node = self.node(id);
    let style = node.style.clone();
    let (border, padding, content) = (node.border_area, node.padding_area, node.content_area);

    let padding_size = content_block_size + style.paddings().block_sum();
    let border_size = padding_size + style.border_widths().block_sum();

    let area = self.area_mut(border);
    area.block_start = block_start;
    area.block_size = border_size;

    if padding != border {
      let area = self.area_mut(padding);
      area.block_start = style.border_block_start_width;
      area.block_size = padding_size;
    }
    if content != padding {
      let area = self.area_mut(content);
      area.block_start = style.padding_block_start;
      area.block_size = content_block_size;
    }
  }

  /// Border-box block size of a laid-out box
  pub fn border_box_block_size(&self, id: BoxId) -> f32 {
    self.area(self.node(id).border_area).block_size
  }

  /// Border-box inline size of a laid-out box
  pub fn border_box_inline_size(&self, id: BoxId) -> f32 {
    self.area(self.node(id).border_area).inline_size
  }

  /// Block-start of the border box relative to the containing block
  pub fn border_box_block_start(&self, id: BoxId) -> f32 {
    self.area(self.node(id).border_area).block_start
  }

  // ---- absolutification ----

  /// Converts every area in `root`'s subtree from writing-mode-relative,
  /// containing-block-relative quads to physical rectangles in root
  /// coordinates.
  ///
  /// Four cases per area: `horizontal-tb` identity translation,
  /// `vertical-lr` rotation, `vertical-rl` rotation plus mirror, and
  /// pass-through for areas with no parent (the root frame). Running it on
  /// an already-physical parentless area leaves it untouched, so the
  /// operation is idempotent at the root.
  pub fn absolutify(&mut self, root: BoxId) {
    self.absolutify_box(root);
  }

  fn absolutify_box(&mut self, id: BoxId) {
    let node = self.node(id);
    let chain = [node.border_area, node.padding_area, node.content_area];
    let children: Vec<BoxId> = node.children().to_vec();

    // aliasing is always with the previous id in the chain, so a one-back
    // comparison is enough to convert each distinct area exactly once
    let mut seen: Option<AreaId> = None;
    for area_id in chain {
      if seen == Some(area_id) {
        continue;
      }
      self.absolutify_area(area_id);
      seen = Some(area_id);
    }

    for child in children {
      self.absolutify_box(child);
    }
  }

  fn absolutify_area(&mut self, id: AreaId) {
    let area = *self.area(id);
    let Some(parent_id) = area.parent else {
      return; // root frame: already physical
    };
    let parent = *self.area(parent_id);
    let (x, y, w, h) = match area.frame_writing_mode {
      WritingMode::HorizontalTb => (
        parent.line_left + area.line_left,
        parent.block_start + area.block_start,
        area.inline_size,
        area.block_size,
      ),
      WritingMode::VerticalLr => (
        parent.line_left + area.block_start,
        parent.block_start + area.line_left,
        area.block_size,
        area.inline_size,
      ),
      WritingMode::VerticalRl => (
        parent.line_left + parent.inline_size - area.block_start - area.block_size,
        parent.block_start + area.line_left,
        area.block_size,
        area.inline_size,
      ),
    };
    let area = self.area_mut(id);
    area.line_left = x;
    area.block_start = y;
    area.inline_size = w;
    area.block_size = h;
    // children of this area now compose against physical coordinates
    area.parent = None;
  }
}
