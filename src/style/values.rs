//! Used-value sentinel
//!
//! The cascade hands layout fully reduced values: a CSS-pixel number, or
//! `auto` where the property admits it. Reading a number out of an `auto`
//! is a bug in the caller or the style-resolution stage, so the accessor
//! fails fast rather than propagating a bogus zero through layout.

/// A used value that may be the `auto` sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsedValue {
  /// A definite length in CSS pixels
  Px(f32),
  /// The `auto` keyword, to be resolved by the layout algorithm
  Auto,
}

impl UsedValue {
  /// Returns the definite value.
  ///
  /// # Panics
  ///
  /// Panics if the value is `auto`. Callers must branch on [`is_auto`]
  /// (or use [`auto_is_zero`]) first; reaching this with `auto` is a
  /// programmer error.
  ///
  /// [`is_auto`]: UsedValue::is_auto
  /// [`auto_is_zero`]: UsedValue::auto_is_zero
  pub fn px(self) -> f32 {
    match self {
      UsedValue::Px(v) => v,
      UsedValue::Auto => panic!("used-value accessor saw `auto`; value was never reduced"),
    }
  }

  /// Returns the definite value, treating `auto` as zero
  ///
  /// This is the margin behavior in the contexts where `auto` margins
  /// resolve to nothing: float sizing and intrinsic contributions.
  pub fn auto_is_zero(self) -> f32 {
    match self {
      UsedValue::Px(v) => v,
      UsedValue::Auto => 0.0,
    }
  }

  /// True when the value is the `auto` sentinel
  pub fn is_auto(self) -> bool {
    matches!(self, UsedValue::Auto)
  }

  /// The definite value, or `None` for `auto`
  pub fn to_option(self) -> Option<f32> {
    match self {
      UsedValue::Px(v) => Some(v),
      UsedValue::Auto => None,
    }
  }
}

impl From<f32> for UsedValue {
  fn from(v: f32) -> Self {
    UsedValue::Px(v)
  }
}
