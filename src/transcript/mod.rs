//! Transcript-level conversion: turns in, one Markdown document out.
//!
//! Each turn is converted independently. A turn whose fragment fails to
//! convert is replaced by an error marker, so one bad turn never takes the
//! rest of the transcript down with it.
//!
//! # Example
//!
//! ```
//! use transcript_md::transcript::{Role, Turn, convert_transcript};
//!
//! let turns = vec![
//!   Turn::new(Role::User, "<p>Hi</p>"),
//!   Turn::new(Role::Assistant, "<p>Hello!</p>"),
//! ];
//! assert_eq!(convert_transcript(&turns), "## You\n\nHi\n\n---\n\n## ChatGPT\n\nHello!\n");
//! ```

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::markdown::{FragmentHints, MarkdownOptions, convert_fragment};

mod extract;
mod observer;

pub use extract::extract_turns;
pub use observer::{ConversionObserver, TracingObserver};

/// Prefix of the content that replaces a turn which failed to convert.
pub const ERROR_MARKER_PREFIX: &str = "Error converting message:";

const TURN_SEPARATOR: &str = "\n\n---\n\n";

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Assistant => "assistant",
    }
  }

  /// Parses a `data-message-author-role` value.
  pub fn from_author_attribute(value: &str) -> Option<Self> {
    match value.trim() {
      "user" => Some(Role::User),
      "assistant" => Some(Role::Assistant),
      _ => None,
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One message of a conversation as captured from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
  pub role: Role,
  #[serde(rename = "html", alias = "rawHtml")]
  pub raw_html: String,
  #[serde(default)]
  pub has_code_block: bool,
}

impl Turn {
  /// Builds a turn, flagging code when the markup contains a `<pre`.
  pub fn new(role: Role, raw_html: impl Into<String>) -> Self {
    let raw_html = raw_html.into();
    Self {
      role,
      has_code_block: raw_html.contains("<pre"),
      raw_html,
    }
  }
}

/// Markdown content for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
  pub role: Role,
  pub content: String,
}

/// Options for transcript assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptOptions {
  /// Heading label for user turns.
  pub user_label: String,
  /// Heading label for assistant turns.
  pub assistant_label: String,
  pub markdown: MarkdownOptions,
}

impl Default for TranscriptOptions {
  fn default() -> Self {
    Self {
      user_label: "You".to_string(),
      assistant_label: "ChatGPT".to_string(),
      markdown: MarkdownOptions::default(),
    }
  }
}

impl TranscriptOptions {
  pub fn label_for(&self, role: Role) -> &str {
    match role {
      Role::User => &self.user_label,
      Role::Assistant => &self.assistant_label,
    }
  }
}

/// Converts turns to Markdown, reporting each outcome to an observer.
pub struct TranscriptConverter<O = TracingObserver> {
  options: TranscriptOptions,
  observer: O,
}

impl TranscriptConverter<TracingObserver> {
  pub fn new(options: TranscriptOptions) -> Self {
    Self::with_observer(options, TracingObserver)
  }
}

impl Default for TranscriptConverter<TracingObserver> {
  fn default() -> Self {
    Self::new(TranscriptOptions::default())
  }
}

impl<O: ConversionObserver> TranscriptConverter<O> {
  pub fn with_observer(options: TranscriptOptions, observer: O) -> Self {
    Self { options, observer }
  }

  pub fn options(&self) -> &TranscriptOptions {
    &self.options
  }

  pub fn observer(&self) -> &O {
    &self.observer
  }

  /// Converts a single turn. Never fails: conversion errors become the
  /// turn's content.
  ///
  /// # Arguments
  /// * `index` - Position of the turn, used for reporting only.
  /// * `turn` - The turn to convert.
  pub fn convert_turn(&self, index: usize, turn: &Turn) -> ConversionResult {
    let hints = FragmentHints {
      has_code: turn.role == Role::Assistant && turn.has_code_block,
    };
    let started = Instant::now();

    let content = match convert_fragment(&turn.raw_html, hints, &self.options.markdown) {
      Ok(converted) => {
        self
          .observer
          .turn_converted(index, turn.role, converted.route, started.elapsed());
        converted.markdown
      }
      Err(error) => {
        self.observer.turn_failed(index, turn.role, &error);
        format!("{ERROR_MARKER_PREFIX} {error}")
      }
    };

    ConversionResult {
      role: turn.role,
      content,
    }
  }

  /// Converts every turn, yielding exactly one result per turn in order.
  pub fn convert(&self, turns: &[Turn]) -> Vec<ConversionResult> {
    turns
      .iter()
      .enumerate()
      .map(|(index, turn)| self.convert_turn(index, turn))
      .collect()
  }

  /// Converts every turn and assembles the Markdown document.
  pub fn render(&self, turns: &[Turn]) -> String {
    render_transcript(&self.convert(turns), &self.options)
  }
}

/// Assembles converted turns into one document.
///
/// Each turn becomes a level-two heading with the speaker's label followed by
/// its content; turns are separated by horizontal rules and the document ends
/// with a single newline. An empty transcript renders as an empty string.
pub fn render_transcript(results: &[ConversionResult], options: &TranscriptOptions) -> String {
  if results.is_empty() {
    return String::new();
  }

  let mut document = results
    .iter()
    .map(|result| format!("## {}\n\n{}", options.label_for(result.role), result.content))
    .collect::<Vec<_>>()
    .join(TURN_SEPARATOR);
  document.push('\n');
  document
}

/// Converts turns with default options and the tracing observer.
pub fn convert_transcript(turns: &[Turn]) -> String {
  TranscriptConverter::new(TranscriptOptions::default()).render(turns)
}
