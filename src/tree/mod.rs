//! Box tree structures consumed and annotated by layout

pub mod box_tree;

pub use box_tree::{Area, AreaId, BoxAttrs, BoxContent, BoxId, BoxNode, BoxTree};
