//! Utility functions for tree traversal and Markdown text handling.

use scraper::ElementRef;

use super::fences::{FenceLine, FenceTracker};

/// Private-use characters delimiting the renderer's code-block tokens. They
/// never pass through from the source document.
pub(crate) const STASH_OPEN: char = '\u{E000}';
pub(crate) const STASH_CLOSE: char = '\u{E001}';

fn is_reserved_char(ch: char) -> bool {
  ch == STASH_OPEN || ch == STASH_CLOSE
}

/// Drops the characters reserved for code-block tokens.
pub fn strip_reserved_chars(text: &str) -> String {
  text.chars().filter(|ch| !is_reserved_char(*ch)).collect()
}

/// Collects all text content from an element and its descendants.
///
/// The parser has already decoded entities; only the characters reserved for
/// code-block tokens are dropped.
///
/// # Arguments
/// * `element` - The starting element to collect text from.
///
/// # Returns
/// A `String` containing every descendant text node in document order.
pub fn get_element_text(element: ElementRef<'_>) -> String {
  element.text().map(strip_reserved_chars).collect()
}

/// Tests whether an element carries a class token.
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
  element.value().classes().any(|token| token == class)
}

/// Replaces every whitespace run with a single space.
pub fn collapse_whitespace(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  let mut in_whitespace = false;

  for ch in text.chars() {
    if ch.is_ascii_whitespace() {
      if !in_whitespace {
        result.push(' ');
      }
      in_whitespace = true;
    } else {
      result.push(ch);
      in_whitespace = false;
    }
  }

  result
}

/// Escapes the characters that would otherwise change Markdown meaning in
/// converted text: backslashes and backticks.
pub fn escape_markdown_text(text: &str) -> String {
  let mut result = String::with_capacity(text.len());
  for ch in text.chars().filter(|ch| !is_reserved_char(*ch)) {
    if matches!(ch, '\\' | '`') {
      result.push('\\');
    }
    result.push(ch);
  }
  result
}

/// Clean up the markdown output for more predictable downstream processing.
///
/// Outside fenced regions:
/// - Trailing whitespace is stripped from each line
/// - Runs of blank lines collapse to a single blank line
///
/// Fenced regions are copied through untouched, and the result is trimmed.
///
/// # Arguments
/// * `content` - Raw Markdown emitted by the converter.
///
/// # Returns
/// A normalized Markdown string without leading or trailing whitespace.
pub fn clean_markdown(content: &str) -> String {
  let mut tracker = FenceTracker::new();
  let mut lines: Vec<&str> = Vec::new();
  let mut previous_blank = false;

  for line in content.split('\n') {
    match tracker.observe(line) {
      FenceLine::Inside => {
        lines.push(line);
        previous_blank = false;
      }
      _ => {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
          if previous_blank {
            continue;
          }
          previous_blank = true;
        } else {
          previous_blank = false;
        }
        lines.push(trimmed);
      }
    }
  }

  lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
  use scraper::{Html, Selector};

  use super::*;

  #[test]
  fn test_clean_markdown_removes_excessive_newlines() {
    let input = "Line 1\n\n\n\n\nLine 2";
    let output = clean_markdown(input);
    assert!(!output.contains("\n\n\n"));
    assert_eq!(output, "Line 1\n\nLine 2");
  }

  #[test]
  fn test_clean_markdown_strips_whitespace_only_lines() {
    let input = "\n  \n# Title  \n\n      \n\nText\n   ";
    assert_eq!(clean_markdown(input), "# Title\n\nText");
  }

  #[test]
  fn test_clean_markdown_leaves_fences_alone() {
    let input = "Intro\n\n\n```python\na = 1\n\n\n\nb = 2   \n```\n\n\nOutro";
    assert_eq!(
      clean_markdown(input),
      "Intro\n\n```python\na = 1\n\n\n\nb = 2   \n```\n\nOutro"
    );
  }

  #[test]
  fn test_get_element_text_recursive() {
    let document = Html::parse_fragment("<div><span>Nested <strong>text</strong> &amp; content</span></div>");
    let selector = Selector::parse("div").unwrap();
    let div = document.select(&selector).next().unwrap();
    assert_eq!(get_element_text(div), "Nested text & content");
  }

  #[test]
  fn test_has_class() {
    let document = Html::parse_fragment(r#"<h5 class="sr-only font-bold">You said:</h5>"#);
    let selector = Selector::parse("h5").unwrap();
    let heading = document.select(&selector).next().unwrap();
    assert!(has_class(heading, "sr-only"));
    assert!(!has_class(heading, "sr"));
  }

  #[test]
  fn test_collapse_whitespace() {
    assert_eq!(collapse_whitespace("a \n\t b\n\nc"), "a b c");
    assert_eq!(collapse_whitespace("\n  "), " ");
  }

  #[test]
  fn test_reserved_token_chars_never_pass_through() {
    assert_eq!(escape_markdown_text("x \u{E000}0\u{E001} y"), "x 0 y");
    assert_eq!(strip_reserved_chars("a\u{E001}b"), "ab");

    let document = Html::parse_fragment("<p>\u{E000}1\u{E001}</p>");
    let selector = Selector::parse("p").unwrap();
    let paragraph = document.select(&selector).next().unwrap();
    assert_eq!(get_element_text(paragraph), "1");
  }

  #[test]
  fn test_escape_markdown_text() {
    assert_eq!(escape_markdown_text(r"C:\temp and `ls`"), r"C:\\temp and \`ls\`");
  }
}
