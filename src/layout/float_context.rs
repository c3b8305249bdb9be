//! Float placement (CSS 2.1 Section 9.5)
//!
//! Floats in a block formatting context are placed onto two "shelves", one
//! per side. Each side partitions the block axis into *tracks*: contiguous
//! bands within which that side's occupancy is constant. The shelf is the
//! block-axis cursor at which the next float of that side will be tried;
//! it only moves down through [`FloatSide::drop_shelf`], with the single
//! deliberate exception documented on [`FloatSide::box_start`].
//!
//! Floats that do not fit at the current shelf position are queued as
//! *misfits* and retried after the shelf advances (after a line break, or
//! before the next text content). Document order is preserved: once a
//! misfit exists, every following float queues behind it.

use crate::style::Float;
use crate::tree::{BoxId, BoxTree};
use std::collections::VecDeque;
use std::sync::OnceLock;

fn log_floats() -> bool {
  static LOG: OnceLock<bool> = OnceLock::new();
  *LOG.get_or_init(|| {
    std::env::var("BLOCKFLOW_LOG_FLOATS")
      .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
      .unwrap_or(false)
  })
}

/// Which side of the containing block a float is aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatSideKind {
  Left,
  Right,
}

/// The containing-block geometry a placement happens against
///
/// All fields are in the owning BFC's coordinates: the accumulated line
/// insets of the float's containing block and the block position of its
/// content-box top at placement time.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext {
  pub cb_line_left: f32,
  pub cb_line_right: f32,
  pub cb_block_start: f32,
}

/// Horizontal space available at some block offset
///
/// `left_offset` and `right_offset` are measured inward from the BFC's
/// line-left and line-right edges; `inline_size` is what remains between
/// them. The float counts describe the queried band and let callers
/// distinguish "no room" from "no floats at all".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vacancy {
  pub left_offset: f32,
  pub right_offset: f32,
  pub block_offset: f32,
  pub inline_size: f32,
  pub left_float_count: u32,
  pub right_float_count: u32,
}

/// Margin-box metrics of a float about to be placed
#[derive(Debug, Clone, Copy)]
struct FloatMetrics {
  border_inline: f32,
  border_block: f32,
  margin_line_left: f32,
  margin_line_right: f32,
  margin_block_start: f32,
  margin_block_end: f32,
}

impl FloatMetrics {
  fn read(tree: &BoxTree, id: BoxId) -> Self {
    let style = tree.style(id);
    Self {
      border_inline: tree.border_box_inline_size(id),
      border_block: tree.border_box_block_size(id),
      margin_line_left: style.margin_line_left.auto_is_zero(),
      margin_line_right: style.margin_line_right.auto_is_zero(),
      margin_block_start: style.margin_block_start.auto_is_zero(),
      margin_block_end: style.margin_block_end.auto_is_zero(),
    }
  }

  fn margin_box_inline(&self) -> f32 {
    self.margin_line_left + self.border_inline + self.margin_line_right
  }

  /// Block extent the float occupies; negative margins never shrink the
  /// band below zero
  fn margin_box_block(&self) -> f32 {
    (self.margin_block_start + self.border_block + self.margin_block_end).max(0.0)
  }
}

/// One side's occupancy state
///
/// `block_offsets` is strictly increasing and one longer than the
/// per-track arrays; the final entry is `f32::INFINITY`, which makes the
/// last real track open-ended. `inline_offsets[i]` stores the negated
/// containing-block line offset recorded when track `i` first became
/// occupied; queries pass their own negated offset so occupancy composes
/// across containing blocks at different insets.
#[derive(Debug, Clone)]
pub struct FloatSide {
  kind: FloatSideKind,
  items: Vec<BoxId>,
  block_offsets: Vec<f32>,
  inline_sizes: Vec<f32>,
  inline_offsets: Vec<f32>,
  float_counts: Vec<u32>,
  shelf_block_offset: f32,
  shelf_track_index: usize,
  bottom: f32,
}

impl FloatSide {
  pub fn new(kind: FloatSideKind) -> Self {
    Self {
      kind,
      items: Vec::new(),
      block_offsets: vec![0.0, f32::INFINITY],
      inline_sizes: vec![0.0],
      inline_offsets: vec![0.0],
      float_counts: vec![0],
      shelf_block_offset: 0.0,
      shelf_track_index: 0,
      bottom: 0.0,
    }
  }

  pub fn shelf_block_offset(&self) -> f32 {
    self.shelf_block_offset
  }

  /// Lowest margin-box bottom edge among placed floats; 0 when empty
  pub fn bottom(&self) -> f32 {
    self.bottom
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  fn track_containing(&self, block_offset: f32) -> usize {
    let upper = self
      .block_offsets
      .partition_point(|&top| top <= block_offset);
    upper.saturating_sub(1).min(self.inline_sizes.len() - 1)
  }

  /// `[start, end)` of the tracks intersecting the given band
  ///
  /// `start` is the track containing `block_offset`; `end` is the first
  /// track whose top is at or below `block_offset + block_size`.
  pub fn track_range(&self, block_offset: f32, block_size: f32) -> (usize, usize) {
    let start = self.track_containing(block_offset);
    let bottom = block_offset + block_size;
    let end = self.block_offsets[..self.block_offsets.len() - 1]
      .partition_point(|&top| top < bottom);
    (start, end.max(start))
  }

  /// Maximum occupied extent over `[start, end)`, relative to a containing
  /// block whose negated line offset is `inline_offset`; 0 if every track
  /// in the range is unoccupied
  pub fn size_of_tracks(&self, start: usize, end: usize, inline_offset: f32) -> f32 {
    let mut size = 0.0f32;
    for i in start..end.min(self.inline_sizes.len()) {
      if self.float_counts[i] > 0 {
        size = size.max(inline_offset + self.inline_sizes[i] - self.inline_offsets[i]);
      }
    }
    size
  }

  /// Occupied extent over the band, measured from the BFC's own edge
  fn occupancy_in_band(&self, block_offset: f32, block_size: f32) -> f32 {
    let (start, end) = self.track_range(block_offset, block_size);
    self.size_of_tracks(start, end, 0.0)
  }

  fn float_count_in_band(&self, block_offset: f32, block_size: f32) -> u32 {
    let (start, end) = self.track_range(block_offset, block_size);
    (start..end.min(self.float_counts.len()))
      .map(|i| self.float_counts[i])
      .max()
      .unwrap_or(0)
  }

  /// Inserts a boundary at `at`, cloning track `i`'s occupancy into the
  /// new track below it.
  ///
  /// # Panics
  ///
  /// Panics unless `at` lies strictly inside track `i`; boundaries must
  /// stay strictly increasing.
  fn split_track(&mut self, i: usize, at: f32) {
    assert!(
      self.block_offsets[i] < at && at < self.block_offsets[i + 1],
      "split point {at} not strictly inside track {i}"
    );
    self.block_offsets.insert(i + 1, at);
    self.inline_sizes.insert(i + 1, self.inline_sizes[i]);
    self.inline_offsets.insert(i + 1, self.inline_offsets[i]);
    self.float_counts.insert(i + 1, self.float_counts[i]);
  }

  /// Unconditionally resets the shelf to the incoming block offset.
  ///
  /// For a box whose block-axis start precedes the current shelf (reachable
  /// through negative margins) this moves the shelf backward, which reads
  /// as a violation of CSS 2.1 § 9.5.1 rule 5; it matches observed browser
  /// behavior and is kept deliberately.
  pub fn box_start(&mut self, block_offset: f32) {
    self.shelf_block_offset = block_offset;
    self.shelf_track_index = self.track_containing(block_offset);
  }

  /// Moves the shelf downward only
  pub fn drop_shelf(&mut self, block_offset: f32) {
    if block_offset > self.shelf_block_offset {
      self.shelf_block_offset = block_offset;
      self.shelf_track_index = self.track_containing(block_offset);
    }
  }

  /// First finite track boundary strictly below `block_offset`
  pub fn next_boundary_after(&self, block_offset: f32) -> Option<f32> {
    self
      .block_offsets
      .iter()
      .copied()
      .find(|&top| top > block_offset && top.is_finite())
  }

  /// Splits the shelf's track so the shelf sits on a boundary
  fn split_if_shelf_dropped(&mut self) {
    if self.block_offsets[self.shelf_track_index] != self.shelf_block_offset {
      self.split_track(self.shelf_track_index, self.shelf_block_offset);
      self.shelf_track_index += 1;
    }
  }

  /// Records a float at the shelf and returns the border box's line-left
  /// position relative to the containing block's content area.
  ///
  /// # Panics
  ///
  /// Panics when the vacancy's block offset disagrees with the shelf; the
  /// caller must have computed the vacancy at the current shelf position.
  fn place_float(
    &mut self,
    id: BoxId,
    metrics: &FloatMetrics,
    vacancy: &Vacancy,
    cb_offset: f32,
    cb_inline_size: f32,
  ) -> f32 {
    assert!(
      vacancy.block_offset == self.shelf_block_offset,
      "float placement vacancy at {} disagrees with shelf at {}",
      vacancy.block_offset,
      self.shelf_block_offset
    );
    self.split_if_shelf_dropped();

    let block_size = metrics.margin_box_block();
    let start = self.shelf_track_index;
    let mut end = start;
    if block_size > 0.0 {
      let (_, e) = self.track_range(self.shelf_block_offset, block_size);
      end = e;
      let band_bottom = self.shelf_block_offset + block_size;
      if self.block_offsets[end] != band_bottom {
        self.split_track(end - 1, band_bottom);
      }
    }

    let (margin_offset, margin_end) = match self.kind {
      FloatSideKind::Left => (metrics.margin_line_left, metrics.margin_line_right),
      FloatSideKind::Right => (metrics.margin_line_right, metrics.margin_line_left),
    };
    let occupancy = self.size_of_tracks(start, end, -cb_offset);
    let inline_position = match self.kind {
      FloatSideKind::Left => occupancy + margin_offset,
      FloatSideKind::Right => {
        cb_inline_size - occupancy - margin_offset - metrics.border_inline
      }
    };

    let stacked_extent = margin_offset + metrics.border_inline + margin_end;
    for track in start..end {
      if self.float_counts[track] == 0 {
        self.inline_offsets[track] = -cb_offset;
        self.inline_sizes[track] = stacked_extent;
      } else {
        self.inline_sizes[track] += stacked_extent;
      }
      self.float_counts[track] += 1;
    }

    self.items.push(id);
    self.bottom = self.bottom.max(self.shelf_block_offset + block_size);

    if log_floats() {
      eprintln!(
        "[floats] placed {:?} on {:?}: shelf={} inline={} band=[{}, {})",
        id, self.kind, self.shelf_block_offset, inline_position, start, end
      );
    }

    inline_position
  }

  #[cfg(test)]
  pub(crate) fn check_invariants(&self) {
    assert_eq!(self.block_offsets.len(), self.inline_sizes.len() + 1);
    assert_eq!(self.inline_sizes.len(), self.inline_offsets.len());
    assert_eq!(self.inline_sizes.len(), self.float_counts.len());
    for pair in self.block_offsets.windows(2) {
      assert!(pair[0] < pair[1], "track boundaries must strictly increase");
    }
    for (i, &count) in self.float_counts.iter().enumerate() {
      if count > 0 {
        assert!(self.inline_sizes[i] > 0.0, "occupied track has zero width");
      }
    }
    let shelf_top = self.block_offsets[self.shelf_track_index];
    assert!(shelf_top <= self.shelf_block_offset);
    assert!(self.shelf_block_offset < self.block_offsets[self.shelf_track_index + 1]);
  }
}

/// A float waiting for the shelf to advance
#[derive(Debug, Clone, Copy)]
struct Misfit {
  id: BoxId,
  placement: PlacementContext,
}

/// Float state of one block formatting context
///
/// Owns both [`FloatSide`]s, decides placement eligibility, enforces
/// `clear`, keeps the misfit queue, and answers vacancy queries for lines
/// and boxes. Created lazily by the BFC at the first float.
#[derive(Debug)]
pub struct FloatContext {
  left: FloatSide,
  right: FloatSide,
  bfc_inline_size: f32,
  misfits: VecDeque<Misfit>,
}

impl FloatContext {
  pub fn new(bfc_inline_size: f32) -> Self {
    Self {
      left: FloatSide::new(FloatSideKind::Left),
      right: FloatSide::new(FloatSideKind::Right),
      bfc_inline_size,
      misfits: VecDeque::new(),
    }
  }

  pub fn left(&self) -> &FloatSide {
    &self.left
  }

  pub fn right(&self) -> &FloatSide {
    &self.right
  }

  pub fn has_floats(&self) -> bool {
    !self.left.is_empty() || !self.right.is_empty()
  }

  /// Bottom edge of the lowest float on either side; 0 when there are none
  pub fn both_bottom(&self) -> f32 {
    self.left.bottom().max(self.right.bottom())
  }

  fn side_of(&self, float: Float) -> FloatSideKind {
    match float {
      Float::Left => FloatSideKind::Left,
      Float::Right => FloatSideKind::Right,
      Float::None => panic!("side_of called for a non-floating box"),
    }
  }

  fn side(&self, kind: FloatSideKind) -> &FloatSide {
    match kind {
      FloatSideKind::Left => &self.left,
      FloatSideKind::Right => &self.right,
    }
  }

  fn side_mut(&mut self, kind: FloatSideKind) -> &mut FloatSide {
    match kind {
      FloatSideKind::Left => &mut self.left,
      FloatSideKind::Right => &mut self.right,
    }
  }

  /// Resets both shelves to a box's block-start position; see
  /// [`FloatSide::box_start`] for the backward-movement caveat
  pub fn box_start(&mut self, block_offset: f32) {
    self.left.box_start(block_offset);
    self.right.box_start(block_offset);
  }

  /// Moves both shelves down to at least `block_offset`
  pub fn drop_shelf(&mut self, block_offset: f32) {
    self.left.drop_shelf(block_offset);
    self.right.drop_shelf(block_offset);
  }

  /// Available space for a line box occupying the given band
  pub fn vacancy_for_line(
    &self,
    block_offset: f32,
    block_size: f32,
    placement: &PlacementContext,
  ) -> Vacancy {
    let band = block_size.max(f32::MIN_POSITIVE);
    let left_offset = placement
      .cb_line_left
      .max(self.left.occupancy_in_band(block_offset, band));
    let right_offset = placement
      .cb_line_right
      .max(self.right.occupancy_in_band(block_offset, band));
    Vacancy {
      left_offset,
      right_offset,
      block_offset,
      inline_size: self.bfc_inline_size - left_offset - right_offset,
      left_float_count: 0,
      right_float_count: 0,
    }
  }

  /// Available space for a float box at its own side's shelf
  ///
  /// Uses the shelf block offset of the box's side, the box's own vertical
  /// extent on that side, the intersecting band on the opposite side, and
  /// reports the float counts of both.
  pub fn vacancy_for_box(
    &self,
    tree: &BoxTree,
    id: BoxId,
    placement: &PlacementContext,
  ) -> Vacancy {
    let metrics = FloatMetrics::read(tree, id);
    let kind = self.side_of(tree.float_side(id));
    let own = self.side(kind);
    let block_offset = own.shelf_block_offset();
    let band = metrics.margin_box_block().max(f32::MIN_POSITIVE);

    let left_occ = self.left.occupancy_in_band(block_offset, band);
    let right_occ = self.right.occupancy_in_band(block_offset, band);
    let left_offset = placement.cb_line_left.max(left_occ);
    let right_offset = placement.cb_line_right.max(right_occ);
    Vacancy {
      left_offset,
      right_offset,
      block_offset,
      inline_size: self.bfc_inline_size - left_offset - right_offset,
      left_float_count: self.left.float_count_in_band(block_offset, band),
      right_float_count: self.right.float_count_in_band(block_offset, band),
    }
  }

  /// Scans downward from `block_offset` for the first band at least
  /// `inline_size` wide, advancing through track boundaries on both sides
  /// (lower boundary first, both when tied). Returns the last attempted
  /// vacancy when both sides run out of boundaries.
  pub fn find_line_position(
    &self,
    block_offset: f32,
    block_size: f32,
    inline_size: f32,
    placement: &PlacementContext,
  ) -> Vacancy {
    let mut offset = block_offset;
    loop {
      let vacancy = self.vacancy_for_line(offset, block_size, placement);
      if inline_size <= vacancy.inline_size {
        return vacancy;
      }
      let next = match (
        self.left.next_boundary_after(offset),
        self.right.next_boundary_after(offset),
      ) {
        (Some(l), Some(r)) => l.min(r),
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => return vacancy,
      };
      offset = next;
    }
  }

  /// Places a float encountered during line layout, or queues it
  ///
  /// `line_width` is the inline extent already consumed by the current
  /// line; `line_is_empty` admits a float that will be alone in its band
  /// even when it is wider than the vacancy.
  pub fn place_float(
    &mut self,
    tree: &mut BoxTree,
    id: BoxId,
    line_width: f32,
    line_is_empty: bool,
    placement: PlacementContext,
  ) {
    if !self.misfits.is_empty() {
      // strict document order: nothing places ahead of a waiting misfit
      self.misfits.push_back(Misfit { id, placement });
      return;
    }
    if !self.try_place(tree, id, line_width, line_is_empty, placement) {
      self.misfits.push_back(Misfit { id, placement });
    }
  }

  fn try_place(
    &mut self,
    tree: &mut BoxTree,
    id: BoxId,
    line_width: f32,
    line_is_empty: bool,
    placement: PlacementContext,
  ) -> bool {
    let metrics = FloatMetrics::read(tree, id);
    let kind = self.side_of(tree.float_side(id));
    let clear = tree.style(id).clear;
    if clear.clears_left() {
      let bottom = self.left.bottom();
      self.side_mut(kind).drop_shelf(bottom);
    }
    if clear.clears_right() {
      let bottom = self.right.bottom();
      self.side_mut(kind).drop_shelf(bottom);
    }

    let vacancy = self.vacancy_for_box(tree, id, &placement);
    let fits = metrics.margin_box_inline() <= vacancy.inline_size - line_width
      || (line_is_empty && vacancy.left_float_count == 0 && vacancy.right_float_count == 0);

    if log_floats() {
      eprintln!(
        "[floats] try {:?} on {:?}: vacancy={}x? at {} line_width={} fits={}",
        id, kind, vacancy.inline_size, vacancy.block_offset, line_width, fits
      );
    }

    if !fits {
      self.advance_after_failure(kind, &metrics, &vacancy);
      return false;
    }

    let cb_inline_size =
      self.bfc_inline_size - placement.cb_line_left - placement.cb_line_right;
    let cb_offset = match kind {
      FloatSideKind::Left => placement.cb_line_left,
      FloatSideKind::Right => placement.cb_line_right,
    };
    let side = self.side_mut(kind);
    let block_position =
      side.shelf_block_offset() + metrics.margin_block_start - placement.cb_block_start;
    let inline_position = side.place_float(id, &metrics, &vacancy, cb_offset, cb_inline_size);

    let border_area = tree.node(id).border_area;
    let area = tree.area_mut(border_area);
    area.block_start = block_position;
    area.line_left = inline_position;
    true
  }

  /// After a failed placement, advance the shelf past at least one
  /// boundary where possible so retries make progress
  fn advance_after_failure(&mut self, kind: FloatSideKind, metrics: &FloatMetrics, vacancy: &Vacancy) {
    if metrics.margin_box_inline() <= vacancy.inline_size {
      // only the current line is in the way; postLine will move the shelf
      return;
    }
    let shelf = self.side(kind).shelf_block_offset();
    if let Some(next) = self.side(kind).next_boundary_after(shelf) {
      self.side_mut(kind).drop_shelf(next);
      return;
    }
    let opposite = match kind {
      FloatSideKind::Left => FloatSideKind::Right,
      FloatSideKind::Right => FloatSideKind::Left,
    };
    if let Some(next) = self.side(opposite).next_boundary_after(shelf) {
      self.side_mut(kind).drop_shelf(next);
    }
  }

  /// Drains the misfit queue, retrying each float against an empty line.
  ///
  /// Terminates because every failed retry strictly advances a shelf past
  /// a boundary, and a float alone in an unoccupied band always places.
  pub fn consume_misfits(&mut self, tree: &mut BoxTree) {
    while let Some(misfit) = self.misfits.pop_front() {
      if !self.try_place(tree, misfit.id, 0.0, true, misfit.placement) {
        // the failed attempt advanced a shelf; the same float retries
        // first so document order holds
        self.misfits.push_front(misfit);
      }
    }
  }

  /// Notifies the context that a line box was committed
  ///
  /// `line_block_end` is the bottom of the line in BFC coordinates. When
  /// the line broke or misfits are waiting, both shelves drop below the
  /// line before the queue drains.
  pub fn post_line(&mut self, tree: &mut BoxTree, line_block_end: f32, did_break: bool) {
    if did_break || !self.misfits.is_empty() {
      self.drop_shelf(line_block_end);
    }
    self.consume_misfits(tree);
  }

  /// Floats introduced before any line must be positioned before line
  /// layout proceeds
  pub fn pre_text_content(&mut self, tree: &mut BoxTree) {
    self.consume_misfits(tree);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::style::{Clear, ComputedStyle, UsedValue};
  use std::sync::Arc;

  const NO_INSETS: PlacementContext = PlacementContext {
    cb_line_left: 0.0,
    cb_line_right: 0.0,
    cb_block_start: 0.0,
  };

  fn float_box(tree: &mut BoxTree, side: Float, inline: f32, block: f32) -> BoxId {
    let style = Arc::new(ComputedStyle {
      float: side,
      inline_size: UsedValue::Px(inline),
      block_size: UsedValue::Px(block),
      ..Default::default()
    });
    let id = tree.new_float(style, vec![]);
    tree.set_inline_geometry(id, 0.0, inline);
    tree.set_block_geometry(id, 0.0, block);
    id
  }

  // ==================== FloatSide Tests ====================

  #[test]
  fn test_new_side_has_single_open_track() {
    let side = FloatSide::new(FloatSideKind::Left);
    side.check_invariants();
    assert_eq!(side.block_offsets, vec![0.0, f32::INFINITY]);
  }

  #[test]
  fn test_track_range_spans_band() {
    let mut side = FloatSide::new(FloatSideKind::Left);
    side.split_track(0, 50.0);
    side.split_track(1, 120.0);
    // boundaries: 0, 50, 120, inf
    assert_eq!(side.track_range(0.0, 50.0), (0, 1));
    assert_eq!(side.track_range(0.0, 60.0), (0, 2));
    assert_eq!(side.track_range(50.0, 70.0), (1, 2));
    assert_eq!(side.track_range(60.0, 100.0), (1, 3));
    side.check_invariants();
  }

  #[test]
  #[should_panic(expected = "not strictly inside")]
  fn test_split_track_rejects_boundary() {
    let mut side = FloatSide::new(FloatSideKind::Left);
    side.split_track(0, 0.0);
  }

  #[test]
  fn test_drop_shelf_is_monotone() {
    let mut side = FloatSide::new(FloatSideKind::Left);
    side.drop_shelf(30.0);
    assert_eq!(side.shelf_block_offset(), 30.0);
    side.drop_shelf(10.0);
    assert_eq!(side.shelf_block_offset(), 30.0);
    side.check_invariants();
  }

  #[test]
  fn test_box_start_resets_shelf_backward() {
    let mut side = FloatSide::new(FloatSideKind::Left);
    side.drop_shelf(40.0);
    side.box_start(10.0);
    assert_eq!(side.shelf_block_offset(), 10.0);
    side.check_invariants();
  }

  // ==================== FloatContext Tests ====================

  #[test]
  fn test_single_left_float_occupies_band() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(800.0);
    let float = float_box(&mut tree, Float::Left, 200.0, 100.0);
    fctx.place_float(&mut tree, float, 0.0, true, NO_INSETS);

    assert_eq!(tree.border_box_block_start(float), 0.0);
    let v = fctx.vacancy_for_line(50.0, 10.0, &NO_INSETS);
    assert_eq!(v.left_offset, 200.0);
    assert_eq!(v.inline_size, 600.0);
    let v = fctx.vacancy_for_line(150.0, 10.0, &NO_INSETS);
    assert_eq!(v.left_offset, 0.0);
    assert_eq!(v.inline_size, 800.0);
    fctx.left().check_invariants();
  }

  #[test]
  fn test_left_and_right_floats() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(800.0);
    let left = float_box(&mut tree, Float::Left, 200.0, 100.0);
    let right = float_box(&mut tree, Float::Right, 300.0, 60.0);
    fctx.place_float(&mut tree, left, 0.0, true, NO_INSETS);
    fctx.place_float(&mut tree, right, 0.0, true, NO_INSETS);

    assert_eq!(tree.area(tree.node(left).border_area).line_left, 0.0);
    assert_eq!(tree.area(tree.node(right).border_area).line_left, 500.0);

    let v = fctx.vacancy_for_line(30.0, 10.0, &NO_INSETS);
    assert_eq!(v.left_offset, 200.0);
    assert_eq!(v.right_offset, 300.0);
    assert_eq!(v.inline_size, 300.0);

    // below the right float, only the left one constrains
    let v = fctx.vacancy_for_line(80.0, 10.0, &NO_INSETS);
    assert_eq!(v.inline_size, 600.0);
  }

  #[test]
  fn test_two_left_floats_stack_inline() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(800.0);
    let a = float_box(&mut tree, Float::Left, 200.0, 100.0);
    let b = float_box(&mut tree, Float::Left, 150.0, 50.0);
    fctx.place_float(&mut tree, a, 0.0, true, NO_INSETS);
    fctx.place_float(&mut tree, b, 0.0, true, NO_INSETS);

    assert_eq!(tree.area(tree.node(b).border_area).line_left, 200.0);
    let v = fctx.vacancy_for_line(25.0, 10.0, &NO_INSETS);
    assert_eq!(v.left_offset, 350.0);
    fctx.left().check_invariants();
  }

  #[test]
  fn test_narrow_container_pushes_second_float_down() {
    // container 100 wide, two 60x50 floats: B cannot sit beside A
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(100.0);
    let a = float_box(&mut tree, Float::Left, 60.0, 50.0);
    let b = float_box(&mut tree, Float::Left, 60.0, 50.0);
    fctx.place_float(&mut tree, a, 0.0, true, NO_INSETS);
    fctx.place_float(&mut tree, b, 0.0, true, NO_INSETS);
    fctx.pre_text_content(&mut tree);

    assert_eq!(tree.area(tree.node(a).border_area).line_left, 0.0);
    assert_eq!(tree.area(tree.node(a).border_area).block_start, 0.0);
    assert_eq!(tree.area(tree.node(b).border_area).line_left, 0.0);
    assert_eq!(tree.area(tree.node(b).border_area).block_start, 50.0);
    assert_eq!(fctx.left().shelf_block_offset(), 50.0);
    assert_eq!(fctx.both_bottom(), 100.0);
    fctx.left().check_invariants();
  }

  #[test]
  fn test_find_line_position_moves_past_float() {
    // container 200, left float 80x40: a 180-wide line lands at y=40
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(200.0);
    let float = float_box(&mut tree, Float::Left, 80.0, 40.0);
    fctx.place_float(&mut tree, float, 0.0, true, NO_INSETS);

    let narrow = fctx.vacancy_for_line(0.0, 10.0, &NO_INSETS);
    assert_eq!(narrow.inline_size, 120.0);

    let found = fctx.find_line_position(0.0, 10.0, 180.0, &NO_INSETS);
    assert_eq!(found.block_offset, 40.0);
    assert_eq!(found.inline_size, 200.0);
  }

  #[test]
  fn test_find_line_position_exhausts_to_last_vacancy() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(100.0);
    let float = float_box(&mut tree, Float::Left, 60.0, 40.0);
    fctx.place_float(&mut tree, float, 0.0, true, NO_INSETS);

    // wider than the container: never fits, returns the final attempt
    let found = fctx.find_line_position(0.0, 10.0, 400.0, &NO_INSETS);
    assert_eq!(found.block_offset, 40.0);
    assert_eq!(found.inline_size, 100.0);
  }

  #[test]
  fn test_clear_left_drops_shelf() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(300.0);
    let first = float_box(&mut tree, Float::Left, 100.0, 80.0);
    fctx.place_float(&mut tree, first, 0.0, true, NO_INSETS);

    let style = Arc::new(ComputedStyle {
      float: Float::Left,
      clear: Clear::Left,
      inline_size: UsedValue::Px(100.0),
      block_size: UsedValue::Px(10.0),
      ..Default::default()
    });
    let cleared = tree.new_float(style, vec![]);
    tree.set_inline_geometry(cleared, 0.0, 100.0);
    tree.set_block_geometry(cleared, 0.0, 10.0);
    fctx.place_float(&mut tree, cleared, 0.0, true, NO_INSETS);

    assert_eq!(tree.area(tree.node(cleared).border_area).block_start, 80.0);
    assert_eq!(tree.area(tree.node(cleared).border_area).line_left, 0.0);
  }

  #[test]
  fn test_misfits_preserve_document_order() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(100.0);
    let a = float_box(&mut tree, Float::Left, 60.0, 50.0);
    let b = float_box(&mut tree, Float::Left, 60.0, 50.0);
    let c = float_box(&mut tree, Float::Left, 10.0, 10.0);
    fctx.place_float(&mut tree, a, 0.0, true, NO_INSETS);
    fctx.place_float(&mut tree, b, 0.0, true, NO_INSETS);
    // c would fit beside a, but must queue behind the misfit b
    fctx.place_float(&mut tree, c, 0.0, true, NO_INSETS);
    fctx.pre_text_content(&mut tree);

    assert_eq!(tree.area(tree.node(b).border_area).block_start, 50.0);
    let c_area = tree.area(tree.node(c).border_area);
    assert_eq!(c_area.block_start, 50.0);
    assert_eq!(c_area.line_left, 60.0);
  }

  #[test]
  fn test_oversized_float_places_alone() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(100.0);
    let wide = float_box(&mut tree, Float::Left, 250.0, 30.0);
    fctx.place_float(&mut tree, wide, 0.0, true, NO_INSETS);
    assert_eq!(tree.area(tree.node(wide).border_area).block_start, 0.0);
    assert!(fctx.has_floats());
  }

  #[test]
  fn test_shelf_monotone_across_lifetime() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(120.0);
    let mut last = fctx.left().shelf_block_offset();
    for _ in 0..4 {
      let f = float_box(&mut tree, Float::Left, 70.0, 20.0);
      fctx.place_float(&mut tree, f, 0.0, true, NO_INSETS);
      fctx.pre_text_content(&mut tree);
      let shelf = fctx.left().shelf_block_offset();
      assert!(shelf >= last);
      last = shelf;
    }
    fctx.left().check_invariants();
    fctx.right().check_invariants();
  }

  #[test]
  fn test_post_line_drops_shelf_and_drains() {
    let mut tree = BoxTree::new();
    let mut fctx = FloatContext::new(100.0);
    let a = float_box(&mut tree, Float::Left, 80.0, 30.0);
    let b = float_box(&mut tree, Float::Left, 80.0, 30.0);
    fctx.place_float(&mut tree, a, 0.0, true, NO_INSETS);
    fctx.place_float(&mut tree, b, 15.0, false, NO_INSETS);
    assert_eq!(tree.area(tree.node(b).border_area).block_size, 30.0);

    fctx.post_line(&mut tree, 30.0, true);
    assert_eq!(tree.area(tree.node(b).border_area).block_start, 30.0);
    assert!(fctx.left().shelf_block_offset() >= 30.0);
  }
}
