//! HTML to Markdown conversion for transcript fragments.
//!
//! A fragment takes one of three routes depending on whether it is known to
//! contain code and whether it embeds `<style>` / `<script>` regions.
//!
//! # Architecture
//!
//! The conversion is split into focused modules:
//! - [`html_entities`] - HTML entity decoding
//! - [`code_blocks`] - Pattern-based code block extraction from raw markup
//! - [`splitter`] - HTML/CSS/JS segmentation of markup with embedded regions
//! - [`normalize`] - Resolves code containers in a parsed tree
//! - [`elements`] - Tree to Markdown rendering
//! - [`fences`] - Fenced block rendering and fence-aware post-processing
//! - [`tables`] - HTML table to Markdown table conversion
//! - [`utils`] - Text and tree helpers
//!
//! # Example
//!
//! ```
//! use transcript_md::markdown::{FragmentHints, MarkdownOptions, convert_html_fragment};
//!
//! let html = r#"<p>Run this:</p><pre><code class="language-python">print("hi")</code></pre>"#;
//! let markdown = convert_html_fragment(html, FragmentHints { has_code: true }, &MarkdownOptions::default()).unwrap();
//! assert_eq!(markdown, "Run this:\n\n```python\nprint(\"hi\")\n```");
//! ```

use std::fmt;
use std::time::Instant;

use tracing::{debug, trace};

use crate::error::{ConversionError, Result};

pub mod code_blocks;
pub mod elements;
pub mod fences;
pub mod html_entities;
pub mod normalize;
pub mod splitter;
pub mod tables;
pub mod utils;

pub use code_blocks::{CodeBlock, extract_code_blocks, strip_decorations};
pub use html_entities::decode_html_entities;
pub use splitter::{Segment, SegmentKind, split_auxiliary_regions};

/// Default upper bound on a single fragment's size.
pub const DEFAULT_MAX_FRAGMENT_BYTES: usize = 8 * 1024 * 1024;

/// Shell one-liners shorter than this many characters render inline.
pub const DEFAULT_INLINE_SHELL_MAX_CHARS: usize = 50;

/// Options that control Markdown conversion behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
  /// Fragments larger than this are rejected before parsing.
  pub max_fragment_bytes: usize,
  /// Character threshold for rendering `bash` / `sh` one-liners inline.
  pub inline_shell_max_chars: usize,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      max_fragment_bytes: DEFAULT_MAX_FRAGMENT_BYTES,
      inline_shell_max_chars: DEFAULT_INLINE_SHELL_MAX_CHARS,
    }
  }
}

/// What the caller already knows about a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FragmentHints {
  /// The fragment contains at least one code block.
  pub has_code: bool,
}

/// Code path a fragment was converted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionRoute {
  /// Pattern extraction, falling back to HTML/CSS/JS segmentation.
  Auxiliary,
  /// Code containers resolved in the tree, then rich-text rendering.
  Normalized,
  /// Rich-text rendering of the unmodified markup.
  RichText,
}

impl fmt::Display for ConversionRoute {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ConversionRoute::Auxiliary => "auxiliary",
      ConversionRoute::Normalized => "normalized",
      ConversionRoute::RichText => "rich-text",
    };
    f.write_str(name)
  }
}

/// Markdown produced for one fragment along with the route it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFragment {
  pub route: ConversionRoute,
  pub markdown: String,
}

/// Picks the code path for a fragment.
pub fn select_route(html: &str, hints: FragmentHints) -> ConversionRoute {
  if !hints.has_code {
    ConversionRoute::RichText
  } else if splitter::has_auxiliary_regions(html) {
    ConversionRoute::Auxiliary
  } else {
    ConversionRoute::Normalized
  }
}

/// Rejects fragments that are too large or end inside an unterminated tag.
///
/// # Errors
/// [`ConversionError::FragmentTooLarge`] or
/// [`ConversionError::UnterminatedTag`].
pub fn validate_fragment(html: &str, options: &MarkdownOptions) -> Result<()> {
  if html.len() > options.max_fragment_bytes {
    return Err(ConversionError::FragmentTooLarge {
      len: html.len(),
      limit: options.max_fragment_bytes,
    });
  }

  if let Some((offset, tag)) = find_unterminated_tag(html) {
    return Err(ConversionError::UnterminatedTag { tag, offset });
  }

  Ok(())
}

/// Finds the first tag opening (`<` followed by a letter or `/`) that has no
/// `>` anywhere after it.
fn find_unterminated_tag(html: &str) -> Option<(usize, String)> {
  let tail_start = html.rfind('>').map_or(0, |index| index + 1);

  html[tail_start..].match_indices('<').find_map(|(relative, _)| {
    let offset = tail_start + relative;
    let rest = &html[offset + 1..];
    let first = rest.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '/') {
      return None;
    }

    let tag: String = rest
      .chars()
      .take_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '/' | '-' | ':'))
      .collect();
    Some((offset, tag))
  })
}

/// Convert one HTML fragment to Markdown.
///
/// # Arguments
///
/// * `html` - The fragment markup; never modified.
/// * `hints` - Whether the fragment is known to contain code.
/// * `options` - Conversion limits and thresholds.
///
/// # Returns
///
/// The Markdown text, trimmed, or a [`ConversionError`] if the fragment fails
/// validation.
pub fn convert_html_fragment(html: &str, hints: FragmentHints, options: &MarkdownOptions) -> Result<String> {
  convert_fragment(html, hints, options).map(|converted| converted.markdown)
}

/// Like [`convert_html_fragment`], but also reports the route taken.
pub fn convert_fragment(html: &str, hints: FragmentHints, options: &MarkdownOptions) -> Result<ConvertedFragment> {
  validate_fragment(html, options)?;

  let route = select_route(html, hints);
  let started = Instant::now();

  let markdown = match route {
    ConversionRoute::Auxiliary => convert_auxiliary(html, options),
    ConversionRoute::Normalized => elements::render_fragment(normalize::normalize_code_blocks(html), options),
    ConversionRoute::RichText => elements::render_fragment(normalize::NormalizedFragment::parse(html), options),
  };

  debug!(
    "Converted {length} byte fragment via {route} route in {duration:?}",
    length = html.len(),
    duration = started.elapsed()
  );

  Ok(ConvertedFragment { route, markdown })
}

fn convert_auxiliary(html: &str, options: &MarkdownOptions) -> String {
  let blocks = extract_code_blocks(&strip_decorations(html));
  if !blocks.is_empty() {
    return blocks
      .iter()
      .map(|block| fences::render_code_placeholder(&block.language, &block.content, options))
      .collect::<Vec<_>>()
      .join("\n\n");
  }

  trace!("No code blocks extracted, splitting auxiliary regions");
  splitter::render_segments(&split_auxiliary_regions(html))
}

#[cfg(test)]
mod tests {
  use super::*;

  const PLAIN: FragmentHints = FragmentHints { has_code: false };
  const CODE: FragmentHints = FragmentHints { has_code: true };

  fn render(input: &str, hints: FragmentHints) -> String {
    convert_html_fragment(input, hints, &MarkdownOptions::default()).unwrap()
  }

  #[test]
  fn test_route_selection() {
    assert_eq!(select_route("<pre><code>x</code></pre>", PLAIN), ConversionRoute::RichText);
    assert_eq!(select_route("<pre><code>x</code></pre>", CODE), ConversionRoute::Normalized);
    assert_eq!(select_route("<style>a{}</style>", CODE), ConversionRoute::Auxiliary);
    assert_eq!(select_route("<style>a{}</style>", PLAIN), ConversionRoute::RichText);
  }

  #[test]
  fn test_plain_paragraph() {
    assert_eq!(render("<p>Hello <strong>world</strong>!</p>", PLAIN), "Hello **world**!");
  }

  #[test]
  fn test_code_hint_off_uses_generic_fence() {
    let output = render(r#"<pre><code class="language-python">x = 1</code></pre>"#, PLAIN);
    assert_eq!(output, "```\nx = 1\n```");
  }

  #[test]
  fn test_auxiliary_route_prefers_extracted_blocks() {
    let html = r#"<style>.x{}</style><pre><div class="text-xs">css</div><code>.x { color: red; }</code></pre>"#;
    let converted = convert_fragment(html, CODE, &MarkdownOptions::default()).unwrap();
    assert_eq!(converted.route, ConversionRoute::Auxiliary);
    assert_eq!(converted.markdown, "```css\n.x { color: red; }\n```");
  }

  #[test]
  fn test_auxiliary_route_falls_back_to_segments() {
    let html = "<div>Page</div><style>body { margin: 0; }</style><script>init();</script>";
    insta::assert_snapshot!(render(html, CODE), @r"
    ```html
    <div>Page</div>
    ```

    ```css
    body { margin: 0; }
    ```

    ```javascript
    init();
    ```
    ");
  }

  #[test]
  fn test_rejects_oversized_fragment() {
    let options = MarkdownOptions {
      max_fragment_bytes: 16,
      ..Default::default()
    };
    let error = convert_html_fragment("<p>seventeen bytes</p>", PLAIN, &options).unwrap_err();
    assert_eq!(error, ConversionError::FragmentTooLarge { len: 22, limit: 16 });
  }

  #[test]
  fn test_rejects_unterminated_tag() {
    let error = convert_html_fragment("<p>Hi</p><div class=\"broken", PLAIN, &MarkdownOptions::default()).unwrap_err();
    assert_eq!(
      error,
      ConversionError::UnterminatedTag {
        tag: "div".to_string(),
        offset: 9
      }
    );
  }

  #[test]
  fn test_less_than_in_text_is_not_a_tag() {
    assert!(validate_fragment("<p>a</p> 1 < 2", &MarkdownOptions::default()).is_ok());
    assert!(validate_fragment("", &MarkdownOptions::default()).is_ok());
  }
}
