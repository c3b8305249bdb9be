pub mod debug;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod style;
pub mod tree;

pub use error::{Error, Result};
pub use geometry::{EdgeOffsets, Point, Rect, Size};
pub use layout::{layout_block_box, layout_float_box, IntrinsicSizingMode, LayoutInput};
pub use style::{ComputedStyle, UsedValue};
pub use tree::{BoxId, BoxTree};
