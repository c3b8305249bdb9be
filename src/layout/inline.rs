//! Inline formatting context layout
//!
//! Text shaping is outside this crate; runs are measured with a
//! deterministic fixed advance of half the run's font size per character.
//! On top of that measure this module does the pieces the block core
//! needs from a line layer: whitespace collapsing, greedy line breaking
//! against float vacancies, forced breaks, and in-flow float placement
//! with `post_line` notifications back to the float context.
//!
//! Line boxes are recorded relative to the container's content box; the
//! float context works in BFC coordinates, so queries add the cursor bias
//! the BFC set up before invoking text layout.

use crate::error::{LayoutError, Result};
use crate::layout::bfc::Bfc;
use crate::layout::engine;
use crate::layout::float_context::PlacementContext;
use crate::style::WhiteSpace;
use crate::tree::{BoxContent, BoxId, BoxTree};

/// Line layout results of one inline formatting context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
  pub lineboxes: Vec<Linebox>,
  /// Bottom edge of the last line, relative to the content box; 0 when
  /// there are no lines
  pub height: f32,
}

/// One laid-out line
#[derive(Debug, Clone, PartialEq)]
pub struct Linebox {
  /// Block offset of the line's top, relative to the container's content
  /// box
  pub block_offset: f32,
  /// Line-left offset of the line's first run
  pub inline_offset: f32,
  /// Inline extent actually used by the line's runs
  pub inline_size: f32,
  pub block_size: f32,
  pub runs: Vec<LineRun>,
}

/// A measured fragment of a text run on a line
#[derive(Debug, Clone, PartialEq)]
pub struct LineRun {
  pub box_id: BoxId,
  pub text: String,
  /// Offset from the line's start
  pub inline_offset: f32,
  pub advance: f32,
}

/// Fixed-advance measurement: half the font size per character
pub fn advance_width(text: &str, font_size: f32) -> f32 {
  text.chars().count() as f32 * font_size * 0.5
}

/// Collapses runs of ASCII whitespace to single spaces and trims the
/// edges, approximating `white-space: normal` segment processing.
/// Non-breaking spaces are preserved.
pub fn collapse_whitespace(input: &str) -> String {
  let mut output = String::with_capacity(input.len());
  let mut in_whitespace = false;
  for ch in input.chars() {
    match ch {
      ' ' | '\t' | '\n' | '\r' => {
        if !in_whitespace && !output.is_empty() {
          output.push(' ');
        }
        in_whitespace = true;
      }
      _ => {
        output.push(ch);
        in_whitespace = false;
      }
    }
  }
  if output.ends_with(' ') {
    output.pop();
  }
  output
}

#[derive(Debug)]
enum InlineItem {
  Text {
    id: BoxId,
    text: String,
    advance: f32,
    is_space: bool,
  },
  Break,
  Float(BoxId),
}

fn collect_items(
  tree: &BoxTree,
  id: BoxId,
  white_space: WhiteSpace,
  items: &mut Vec<InlineItem>,
) -> Result<()> {
  let node = tree.node(id);
  if node.attrs.is_float {
    items.push(InlineItem::Float(id));
    return Ok(());
  }
  match &node.content {
    BoxContent::InlineWrapper(children) => {
      for &child in children {
        collect_items(tree, child, white_space, items)?;
      }
      Ok(())
    }
    BoxContent::Break => {
      items.push(InlineItem::Break);
      Ok(())
    }
    BoxContent::Run(text) => {
      let font_size = node.style.font_size;
      match white_space {
        WhiteSpace::Normal | WhiteSpace::Nowrap => {
          let collapsed = collapse_whitespace(text);
          for (index, word) in collapsed.split(' ').enumerate() {
            if index > 0 {
              items.push(InlineItem::Text {
                id,
                text: " ".to_string(),
                advance: advance_width(" ", font_size),
                is_space: true,
              });
            }
            if !word.is_empty() {
              items.push(InlineItem::Text {
                id,
                text: word.to_string(),
                advance: advance_width(word, font_size),
                is_space: false,
              });
            }
          }
          Ok(())
        }
        WhiteSpace::Pre => {
          for (index, segment) in text.split('\n').enumerate() {
            if index > 0 {
              items.push(InlineItem::Break);
            }
            if !segment.is_empty() {
              items.push(InlineItem::Text {
                id,
                text: segment.to_string(),
                advance: advance_width(segment, font_size),
                is_space: false,
              });
            }
          }
          Ok(())
        }
      }
    }
    BoxContent::BlockContainer(_) => Err(
      LayoutError::UnsupportedBoxType {
        message: format!(
          "in-flow block container (box {}) inside an inline formatting context",
          id.0
        ),
      }
      .into(),
    ),
  }
}

#[derive(Debug)]
struct OpenLine {
  block_offset: f32,
  left: f32,
  available: f32,
  width: f32,
  runs: Vec<LineRun>,
}

fn open_line(
  bfc: &Bfc,
  placement: &PlacementContext,
  cursor: f32,
  needed: f32,
  line_height: f32,
  content_width: f32,
) -> OpenLine {
  match &bfc.fctx {
    Some(fctx) => {
      let vacancy = fctx.find_line_position(
        placement.cb_block_start + cursor,
        line_height,
        needed,
        placement,
      );
      OpenLine {
        block_offset: vacancy.block_offset - placement.cb_block_start,
        left: vacancy.left_offset - placement.cb_line_left,
        available: vacancy.inline_size,
        width: 0.0,
        runs: Vec::new(),
      }
    }
    None => OpenLine {
      block_offset: cursor,
      left: 0.0,
      available: content_width,
      width: 0.0,
      runs: Vec::new(),
    },
  }
}

fn commit_line(
  tree: &mut BoxTree,
  bfc: &mut Bfc,
  placement: &PlacementContext,
  lineboxes: &mut Vec<Linebox>,
  mut line: OpenLine,
  line_height: f32,
  did_break: bool,
) {
  // trailing collapsible spaces do not occupy the line end
  while line
    .runs
    .last()
    .map_or(false, |run| run.text.trim().is_empty())
  {
    let run = line.runs.pop().expect("checked non-empty");
    line.width -= run.advance;
  }
  let block_end = placement.cb_block_start + line.block_offset + line_height;
  lineboxes.push(Linebox {
    block_offset: line.block_offset,
    inline_offset: line.left,
    inline_size: line.width,
    block_size: line_height,
    runs: line.runs,
  });
  if let Some(fctx) = bfc.fctx.as_mut() {
    fctx.post_line(tree, block_end, did_break);
  }
}

/// Lays out the inline content of `ifc`, writing its [`Paragraph`].
///
/// `bfc.cb_block_start` must already be biased to the container's
/// content-box top; floats placed here commit against that position.
pub(crate) fn do_text_layout(tree: &mut BoxTree, ifc: BoxId, bfc: &mut Bfc) -> Result<()> {
  let style = tree.node(ifc).style.clone();
  let white_space = style.white_space;
  let line_height = style.line_height;
  let wrap = white_space == WhiteSpace::Normal;

  let mut items = Vec::new();
  let children: Vec<BoxId> = tree.node(ifc).children().to_vec();
  for child in children {
    collect_items(tree, child, white_space, &mut items)?;
  }

  let placement = PlacementContext {
    cb_line_left: bfc.cb_line_left,
    cb_line_right: bfc.cb_line_right,
    cb_block_start: bfc.cb_block_start,
  };
  let content_width = bfc.inline_size - bfc.cb_line_left - bfc.cb_line_right;

  if let Some(fctx) = bfc.fctx.as_mut() {
    fctx.pre_text_content(tree);
  }

  let mut lineboxes: Vec<Linebox> = Vec::new();
  let mut cursor = 0.0f32;
  let mut line: Option<OpenLine> = None;

  for item in items {
    match item {
      InlineItem::Float(id) => {
        engine::layout_float_box(tree, id, content_width)?;
        let (line_width, line_is_empty, line_top) = match &line {
          Some(open) => (open.width, open.runs.is_empty(), open.block_offset),
          None => (0.0, true, cursor),
        };
        let newly_created = bfc.fctx.is_none();
        let fctx = bfc.ensure_fctx();
        if newly_created {
          // a context born mid-paragraph starts its shelves at the
          // current line, not at the top of the BFC
          fctx.box_start(placement.cb_block_start + line_top);
        }
        fctx.place_float(tree, id, line_width, line_is_empty, placement);
        if let Some(open) = line.as_mut() {
          // the float may have landed beside the current line; requery
          // the band so remaining content respects it
          let vacancy = fctx.vacancy_for_line(
            placement.cb_block_start + open.block_offset,
            line_height,
            &placement,
          );
          open.left = vacancy.left_offset - placement.cb_line_left;
          open.available = vacancy.inline_size;
        }
      }
      InlineItem::Break => {
        let finished = line.take().unwrap_or_else(|| OpenLine {
          block_offset: cursor,
          left: 0.0,
          available: content_width,
          width: 0.0,
          runs: Vec::new(),
        });
        cursor = finished.block_offset + line_height;
        commit_line(
          tree,
          bfc,
          &placement,
          &mut lineboxes,
          finished,
          line_height,
          true,
        );
      }
      InlineItem::Text {
        id,
        text,
        advance,
        is_space,
      } => {
        if is_space && line.as_ref().map_or(true, |open| open.runs.is_empty()) {
          continue; // collapsed leading space
        }
        loop {
          if line.is_none() {
            let opened = open_line(bfc, &placement, cursor, advance, line_height, content_width);
            cursor = opened.block_offset;
            line = Some(opened);
          }
          let open = line.as_mut().expect("line was just opened");
          let fits = open.width + advance <= open.available;
          if fits || !wrap || open.runs.is_empty() {
            open.runs.push(LineRun {
              box_id: id,
              text: text.clone(),
              inline_offset: open.width,
              advance,
            });
            open.width += advance;
            break;
          }
          let finished = line.take().expect("wrapping a live line");
          cursor = finished.block_offset + line_height;
          commit_line(
            tree,
            bfc,
            &placement,
            &mut lineboxes,
            finished,
            line_height,
            true,
          );
          if is_space {
            break; // a space at a wrap point vanishes
          }
        }
      }
    }
  }

  if let Some(finished) = line.take() {
    commit_line(
      tree,
      bfc,
      &placement,
      &mut lineboxes,
      finished,
      line_height,
      false,
    );
  }

  // floats still queued after the last line must land before the block
  // flow continues past this paragraph
  if let Some(fctx) = bfc.fctx.as_mut() {
    fctx.consume_misfits(tree);
  }

  let height = lineboxes
    .last()
    .map(|line| line.block_offset + line.block_size)
    .unwrap_or(0.0);
  tree.node_mut(ifc).paragraph = Some(Paragraph { lineboxes, height });
  Ok(())
}
