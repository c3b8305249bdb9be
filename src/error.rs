//! Error types for blockflow
//!
//! The layout core distinguishes three kinds of conditions:
//!
//! 1. **Programmer contract violations**: a used-value accessor saw `auto`,
//!    a float placement disagreed with the shelf, `layout_float_box` was
//!    called on a non-float. These are bugs in the caller or in the style
//!    resolution stage; they panic immediately and loudly and are never
//!    represented here.
//! 2. **Structural unsupported cases**: known gaps such as an inline-level
//!    box where a block was required. These are the [`LayoutError`] variants.
//! 3. **Normal layout outcomes**: a float that did not fit, a deferred auto
//!    block size. These are ordinary control flow, not errors.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use thiserror::Error;

/// Result type alias for blockflow operations
///
/// # Examples
///
/// ```
/// use blockflow::Result;
///
/// fn run_layout() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for blockflow
#[derive(Error, Debug)]
pub enum Error {
  /// Layout error
  #[error("Layout error: {0}")]
  Layout(#[from] LayoutError),
}

/// Errors that occur during layout computation
///
/// These mark known structural gaps in the box tree handed to the layout
/// core, not runtime conditions to recover from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
  /// Box type not supported where it appeared
  ///
  /// For example, an inline-level box as a direct child of a block
  /// formatting context driver, or an unknown child kind inside an inline
  /// formatting context.
  #[error("Unsupported box type: {message}")]
  UnsupportedBoxType { message: String },
}
