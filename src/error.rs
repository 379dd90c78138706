//! Error types for fragment conversion.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Failure converting a single HTML fragment to Markdown.
///
/// These never abort a transcript: the orchestrator catches them per turn and
/// renders them in place of the turn's content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
  #[error("unterminated tag `<{tag}` at byte {offset}")]
  UnterminatedTag { tag: String, offset: usize },

  #[error("fragment is {len} bytes, limit is {limit}")]
  FragmentTooLarge { len: usize, limit: usize },
}
