//! Splits HTML carrying `<style>` / `<script>` regions into ordered segments.
//!
//! The split is driven by a fixed transition table. Which states run depends
//! only on which markers the input contains, so skipping a state is a
//! property of the table rather than of scattered conditionals.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};

use super::fences::render_fenced_block;
use super::html_entities::decode_html_entities;

static STYLE_OPEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)<style\b[^>]*>").expect("STYLE_OPEN regex is valid"));
static STYLE_CLOSE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)</style\s*>").expect("STYLE_CLOSE regex is valid"));
static SCRIPT_OPEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)<script\b[^>]*>").expect("SCRIPT_OPEN regex is valid"));
static SCRIPT_CLOSE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)</script\s*>").expect("SCRIPT_CLOSE regex is valid"));

/// Rendering language of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
  Html,
  Css,
  Js,
}

impl SegmentKind {
  /// Tag placed after the opening fence.
  pub fn fence_language(self) -> &'static str {
    match self {
      SegmentKind::Html => "html",
      SegmentKind::Css => "css",
      SegmentKind::Js => "javascript",
    }
  }
}

/// One contiguous, entity-decoded slice of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
  pub kind: SegmentKind,
  pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
  Initial,
  HtmlBeforeStyle,
  InStyle,
  HtmlBetweenStyleAndScript,
  InScript,
  HtmlAfterScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
  Style,
  Script,
}

impl Marker {
  fn open(self) -> &'static Regex {
    match self {
      Marker::Style => &STYLE_OPEN,
      Marker::Script => &SCRIPT_OPEN,
    }
  }

  fn close(self) -> &'static Regex {
    match self {
      Marker::Style => &STYLE_CLOSE,
      Marker::Script => &SCRIPT_CLOSE,
    }
  }
}

/// Which markers must be present for a state to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requires {
  Style,
  Script,
  Either,
}

/// Where a state's substring ends.
#[derive(Debug, Clone, Copy)]
enum Boundary {
  /// Up to the opening tag; resumes after it.
  UntilOpen(Marker),
  /// Up to the closing tag; resumes after it.
  UntilClose(Marker),
  ToEnd,
}

struct Extent {
  text: Range<usize>,
  resume: usize,
}

impl Boundary {
  fn locate(self, html: &str, cursor: usize) -> Option<Extent> {
    let delimiter = match self {
      Boundary::UntilOpen(marker) => marker.open().find_at(html, cursor)?,
      Boundary::UntilClose(marker) => marker.close().find_at(html, cursor)?,
      Boundary::ToEnd => {
        return Some(Extent {
          text: cursor..html.len(),
          resume: html.len(),
        });
      }
    };

    Some(Extent {
      text: cursor..delimiter.start(),
      resume: delimiter.end(),
    })
  }
}

struct Transition {
  state: SplitState,
  requires: Requires,
  kind: SegmentKind,
  boundary: Boundary,
}

const TRANSITIONS: &[Transition] = &[
  Transition {
    state: SplitState::HtmlBeforeStyle,
    requires: Requires::Style,
    kind: SegmentKind::Html,
    boundary: Boundary::UntilOpen(Marker::Style),
  },
  Transition {
    state: SplitState::InStyle,
    requires: Requires::Style,
    kind: SegmentKind::Css,
    boundary: Boundary::UntilClose(Marker::Style),
  },
  Transition {
    state: SplitState::HtmlBetweenStyleAndScript,
    requires: Requires::Script,
    kind: SegmentKind::Html,
    boundary: Boundary::UntilOpen(Marker::Script),
  },
  Transition {
    state: SplitState::InScript,
    requires: Requires::Script,
    kind: SegmentKind::Js,
    boundary: Boundary::UntilClose(Marker::Script),
  },
  Transition {
    state: SplitState::HtmlAfterScript,
    requires: Requires::Either,
    kind: SegmentKind::Html,
    boundary: Boundary::ToEnd,
  },
];

#[derive(Debug, Clone, Copy)]
struct Markers {
  style: bool,
  script: bool,
}

impl Markers {
  fn detect(html: &str) -> Self {
    Self {
      style: STYLE_OPEN.is_match(html),
      script: SCRIPT_OPEN.is_match(html),
    }
  }

  fn allows(self, requires: Requires) -> bool {
    match requires {
      Requires::Style => self.style,
      Requires::Script => self.script,
      Requires::Either => self.style || self.script,
    }
  }
}

/// Returns `true` when the HTML contains a `<style>` or `<script>` open tag.
pub fn has_auxiliary_regions(html: &str) -> bool {
  let markers = Markers::detect(html);
  markers.style || markers.script
}

/// Splits HTML into HTML/CSS/JS segments in document order.
///
/// States whose marker is absent are skipped entirely. A state whose closing
/// delimiter cannot be found emits an empty segment and leaves the cursor
/// where it was; splitting never fails.
///
/// # Arguments
/// * `html` - Turn markup containing auxiliary regions.
///
/// # Returns
/// The segments produced by every state that ran, or an empty vector when the
/// input has no auxiliary regions.
pub fn split_auxiliary_regions(html: &str) -> Vec<Segment> {
  let markers = Markers::detect(html);
  let mut state = SplitState::Initial;
  let mut cursor = 0;
  let mut segments = Vec::new();

  for transition in TRANSITIONS.iter().filter(|t| markers.allows(t.requires)) {
    trace!("Splitter transition {:?} -> {:?}", state, transition.state);
    state = transition.state;

    let text = match transition.boundary.locate(html, cursor) {
      Some(extent) => {
        cursor = extent.resume;
        &html[extent.text]
      }
      None => {
        warn!("Missing delimiter in {:?} at byte {cursor}, emitting empty segment", state);
        ""
      }
    };

    segments.push(Segment {
      kind: transition.kind,
      text: decode_html_entities(text.trim()),
    });
  }

  segments
}

/// Renders segments as fenced blocks separated by blank lines.
///
/// Empty segments (absent content or a missing delimiter) are omitted.
pub fn render_segments(segments: &[Segment]) -> String {
  segments
    .iter()
    .filter(|segment| !segment.text.is_empty())
    .map(|segment| render_fenced_block(segment.kind.fence_language(), &segment.text))
    .collect::<Vec<_>>()
    .join("\n\n")
}
