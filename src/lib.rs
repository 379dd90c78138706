//! Chat transcript to Markdown conversion library
//!
//! This library converts saved chat conversations (alternating user and
//! assistant turns rendered as HTML) into Markdown, recovering code blocks
//! with their language and exact whitespace.

pub mod cli;
pub mod color;
pub mod commands;
pub mod error;
pub mod format;
pub mod markdown;
pub mod transcript;

pub use error::ConversionError;
pub use markdown::{FragmentHints, MarkdownOptions, convert_html_fragment};
pub use transcript::{ConversionResult, Role, Turn, convert_transcript, extract_turns};
