//! Output format definitions and utilities.

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::transcript::{ConversionResult, TranscriptOptions, render_transcript};

/// Supported output formats for converted transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
  /// Markdown document (default)
  #[default]
  #[value(alias = "md")]
  Markdown,
  /// JSON array of `{role, content}` objects
  Json,
}

impl OutputFormat {
  /// Returns the conventional file extension for this output format.
  pub fn file_extension(&self) -> &'static str {
    match self {
      OutputFormat::Markdown => "md",
      OutputFormat::Json => "json",
    }
  }

  /// Serializes converted turns in this format.
  ///
  /// # Arguments
  /// * `results` - One converted result per turn, in order.
  /// * `options` - Labels used for Markdown headings.
  ///
  /// # Returns
  /// The document text, ending with a newline when non-empty.
  pub fn render(&self, results: &[ConversionResult], options: &TranscriptOptions) -> Result<String> {
    match self {
      OutputFormat::Markdown => Ok(render_transcript(results, options)),
      OutputFormat::Json => {
        let mut json = serde_json::to_string_pretty(results).context("Failed to serialize converted turns")?;
        json.push('\n');
        Ok(json)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::transcript::Role;

  fn results() -> Vec<ConversionResult> {
    vec![
      ConversionResult {
        role: Role::User,
        content: "Hi".to_string(),
      },
      ConversionResult {
        role: Role::Assistant,
        content: "Hello".to_string(),
      },
    ]
  }

  #[test]
  fn test_file_extension() {
    assert_eq!(OutputFormat::Markdown.file_extension(), "md");
    assert_eq!(OutputFormat::Json.file_extension(), "json");
  }

  #[test]
  fn test_default_is_markdown() {
    assert_eq!(OutputFormat::default(), OutputFormat::Markdown);
  }

  #[test]
  fn test_render_markdown() {
    let output = OutputFormat::Markdown
      .render(&results(), &TranscriptOptions::default())
      .unwrap();
    assert_eq!(output, "## You\n\nHi\n\n---\n\n## ChatGPT\n\nHello\n");
  }

  #[test]
  fn test_render_json() {
    let output = OutputFormat::Json
      .render(&results(), &TranscriptOptions::default())
      .unwrap();
    insta::assert_snapshot!(output, @r#"
    [
      {
        "role": "user",
        "content": "Hi"
      },
      {
        "role": "assistant",
        "content": "Hello"
      }
    ]
    "#);
  }
}
