//! Layout algorithms
//!
//! The block formatting context driver ([`bfc`]) positions block
//! containers and resolves margin collapsing; [`float_context`] owns the
//! per-side float shelves; [`inline`] supplies the minimal line layer the
//! BFC invokes on block containers of inlines. [`engine`] is the public
//! entry surface.

pub mod bfc;
pub mod box_model;
pub mod contribution;
pub mod engine;
pub mod float_context;
pub mod inline;
pub mod margin_collapse;

pub use bfc::Bfc;
pub use contribution::{contribution, IntrinsicSizingMode};
pub use engine::{layout_block_box, layout_float_box, LayoutInput};
pub use float_context::{FloatContext, FloatSide, FloatSideKind, PlacementContext, Vacancy};
pub use inline::{Linebox, Paragraph};
pub use margin_collapse::MarginCollapseCollection;
