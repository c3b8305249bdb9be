//! Debug tooling smoke tests: the tree printer and the JSON geometry
//! snapshot over a laid-out tree.

use blockflow::debug::{print_tree, snapshot_json};
use blockflow::layout::{layout_block_box, LayoutInput};
use blockflow::style::{Float, UsedValue};
use blockflow::{BoxTree, ComputedStyle};
use std::sync::Arc;

#[test]
fn printer_walks_the_whole_tree() {
  let mut tree = BoxTree::new();
  let run = tree.new_text(ComputedStyle::shared_default(), "hello there");
  let ifc = tree.new_block(ComputedStyle::shared_default(), vec![run]);
  let float = tree.new_float(
    Arc::new(ComputedStyle {
      float: Float::Left,
      inline_size: UsedValue::Px(20.0),
      block_size: UsedValue::Px(20.0),
      ..Default::default()
    }),
    vec![],
  );
  let holder = tree.new_block(ComputedStyle::shared_default(), vec![float]);
  let root = tree.new_block(ComputedStyle::shared_default(), vec![holder, ifc]);
  layout_block_box(&mut tree, root, &LayoutInput::new(200.0, 200.0)).unwrap();

  let printed = print_tree(&tree, root);
  assert_eq!(printed.lines().count(), 5);
  assert!(printed.contains("float"));
  assert!(printed.contains("run \"hello there\""));
}

#[test]
fn snapshot_serializes_absolute_geometry() {
  let mut tree = BoxTree::new();
  let child = tree.new_block(
    Arc::new(ComputedStyle {
      block_size: UsedValue::Px(50.0),
      margin_block_start: UsedValue::Px(10.0),
      ..Default::default()
    }),
    vec![],
  );
  let root = tree.new_block(ComputedStyle::shared_default(), vec![child]);
  layout_block_box(&mut tree, root, &LayoutInput::new(320.0, 200.0)).unwrap();
  tree.absolutify(root);

  let json = snapshot_json(&tree, root);
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["kind"], "block");
  assert_eq!(value["border_box"]["size"]["width"], 320.0);
  assert_eq!(value["children"][0]["border_box"]["origin"]["y"], 10.0);
}
