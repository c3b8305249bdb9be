//! Tree printing and geometry snapshots
//!
//! Deterministic, plain-text views of a laid-out box tree for tests and
//! bug reports. [`print_tree`] gives an indented one-line-per-box dump;
//! [`geometry_snapshot`] captures per-box rectangles as a serializable
//! structure (run [`BoxTree::absolutify`] first if physical coordinates
//! are wanted).

use crate::geometry::Rect;
use crate::tree::{BoxContent, BoxId, BoxTree};
use serde::Serialize;
use std::fmt::Write as _;

fn kind_label(tree: &BoxTree, id: BoxId) -> String {
  let node = tree.node(id);
  let mut label = match &node.content {
    BoxContent::BlockContainer(_) if node.attrs.is_float => "float".to_string(),
    BoxContent::BlockContainer(_) => "block".to_string(),
    BoxContent::InlineWrapper(_) => "inline".to_string(),
    BoxContent::Run(text) => {
      let short: String = text.chars().take(16).collect();
      format!("run \"{}\"", short)
    }
    BoxContent::Break => "break".to_string(),
  };
  if node.attrs.is_anonymous {
    label.push_str(" (anonymous)");
  }
  if node.attrs.is_bfc_root && !node.attrs.is_float {
    label.push_str(" (bfc root)");
  }
  label
}

/// Indented dump of a subtree with each block container's border-box quad
pub fn print_tree(tree: &BoxTree, root: BoxId) -> String {
  let mut out = String::new();
  print_into(tree, root, 0, &mut out);
  out
}

fn print_into(tree: &BoxTree, id: BoxId, depth: usize, out: &mut String) {
  let node = tree.node(id);
  let area = tree.area(node.border_area);
  let _ = writeln!(
    out,
    "{}#{} {} [{} {} {}x{}]",
    "  ".repeat(depth),
    id.0,
    kind_label(tree, id),
    area.line_left,
    area.block_start,
    area.inline_size,
    area.block_size,
  );
  for &child in node.children() {
    print_into(tree, child, depth + 1, out);
  }
}

/// One box in a [`geometry_snapshot`]
#[derive(Debug, Serialize)]
pub struct SnapshotNode {
  pub index: usize,
  pub kind: String,
  pub border_box: Rect,
  pub children: Vec<SnapshotNode>,
}

/// Captures the border-box rectangle of every box in the subtree
pub fn geometry_snapshot(tree: &BoxTree, root: BoxId) -> SnapshotNode {
  let node = tree.node(root);
  SnapshotNode {
    index: root.0,
    kind: kind_label(tree, root),
    border_box: tree.area(node.border_area).to_rect(),
    children: node
      .children()
      .iter()
      .map(|&child| geometry_snapshot(tree, child))
      .collect(),
  }
}

/// The snapshot as pretty-printed JSON
pub fn snapshot_json(tree: &BoxTree, root: BoxId) -> String {
  serde_json::to_string_pretty(&geometry_snapshot(tree, root))
    .expect("geometry snapshot serialization cannot fail")
}
