//! Code block extraction from raw transcript HTML.
//!
//! Transcript markup has gone through several revisions, so no single pattern
//! finds every code block. Extraction runs an ordered table of strategies,
//! from most to least specific, and keeps the results of the first strategy
//! that matches anything.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::html_entities::decode_html_entities;

/// Language used when the markup carries no language marker.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Class tokens that mark the small secondary-text label naming a block's
/// language.
pub(crate) const LABEL_CLASSES: &[&str] = &["text-token-text-secondary", "text-xs"];

/// Marker class that highlighted `<code>` elements carry next to
/// `language-<id>`.
const HIGHLIGHT_MARKER_CLASS: &str = "hljs";

static DECORATION_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)</?span\b[^>]*>").expect("DECORATION_TAG regex is valid"));

static PRE_BLOCK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>").expect("PRE_BLOCK regex is valid"));

static CODE_ELEMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<code\b([^>]*)>(.*?)</code\s*>").expect("CODE_ELEMENT regex is valid"));

static LABEL_DIV: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<div\b([^>]*)>([^<]*)").expect("LABEL_DIV regex is valid"));

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("CLASS_ATTR regex is valid")
});

/// A code block recovered from raw HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
  /// Language tag for the fence, `plaintext` when unknown.
  pub language: String,
  /// Entity-decoded source text with internal whitespace intact.
  pub content: String,
  /// Byte range of the block in the HTML it was extracted from.
  pub span: Range<usize>,
}

/// A raw match produced by a strategy before language resolution.
struct Candidate<'h> {
  span: Range<usize>,
  /// Markup the language resolver inspects (preceding label markup or the
  /// `<code>` attributes, depending on the strategy).
  context: &'h str,
  /// Still-encoded code text.
  code: &'h str,
}

type Matcher = for<'h> fn(&'h str) -> Vec<Candidate<'h>>;
type LanguageResolver = fn(&Candidate<'_>) -> Option<String>;

struct Strategy {
  name: &'static str,
  matcher: Matcher,
  language: LanguageResolver,
}

const STRATEGIES: &[Strategy] = &[
  Strategy {
    name: "nested-pre-code",
    matcher: match_nested_pre_code,
    language: label_language,
  },
  Strategy {
    name: "language-class",
    matcher: match_highlighted_code,
    language: class_language,
  },
  Strategy {
    name: "generic-code",
    matcher: match_any_code,
    language: no_language,
  },
];

/// Removes decorative `<span>` wrappers while keeping the text they wrap.
///
/// Syntax highlighters wrap every token in a span, which would otherwise
/// break the code patterns apart.
pub fn strip_decorations(html: &str) -> String {
  DECORATION_TAG.replace_all(html, "").into_owned()
}

/// Extracts code blocks from an HTML string.
///
/// Strategies are tried in order; the first one that yields at least one
/// block wins and its blocks are returned in document order. An empty vector
/// means no strategy matched.
///
/// # Arguments
/// * `html` - Transcript markup, normally already passed through
///   [`strip_decorations`].
///
/// # Returns
/// The code blocks found by the winning strategy.
pub fn extract_code_blocks(html: &str) -> Vec<CodeBlock> {
  for strategy in STRATEGIES {
    let blocks = run_strategy(strategy, html);
    if !blocks.is_empty() {
      debug!(
        "Code block strategy `{}` matched {} block(s)",
        strategy.name,
        blocks.len()
      );
      return blocks;
    }
    trace!("Code block strategy `{}` found no matches", strategy.name);
  }

  Vec::new()
}

fn run_strategy(strategy: &Strategy, html: &str) -> Vec<CodeBlock> {
  (strategy.matcher)(html)
    .into_iter()
    .map(|candidate| CodeBlock {
      language: (strategy.language)(&candidate).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
      content: decode_html_entities(candidate.code.trim()),
      span: candidate.span,
    })
    .collect()
}

fn match_nested_pre_code(html: &str) -> Vec<Candidate<'_>> {
  PRE_BLOCK
    .captures_iter(html)
    .filter_map(|caps| {
      let whole = caps.get(0)?;
      let inner = caps.get(1)?.as_str();
      let code = CODE_ELEMENT.captures(inner)?;
      let code_start = code.get(0)?.start();

      Some(Candidate {
        span: whole.range(),
        context: &inner[..code_start],
        code: code.get(2)?.as_str(),
      })
    })
    .collect()
}

fn match_highlighted_code(html: &str) -> Vec<Candidate<'_>> {
  code_candidates(html)
    .into_iter()
    .filter(|candidate| {
      let classes = class_tokens(candidate.context);
      classes.contains(&HIGHLIGHT_MARKER_CLASS) && classes.iter().any(|token| token.starts_with("language-"))
    })
    .collect()
}

fn match_any_code(html: &str) -> Vec<Candidate<'_>> {
  code_candidates(html)
}

fn code_candidates(html: &str) -> Vec<Candidate<'_>> {
  CODE_ELEMENT
    .captures_iter(html)
    .filter_map(|caps| {
      Some(Candidate {
        span: caps.get(0)?.range(),
        context: caps.get(1)?.as_str(),
        code: caps.get(2)?.as_str(),
      })
    })
    .collect()
}

/// Uses the text of the last non-empty label `div` before the `<code>`.
fn label_language(candidate: &Candidate<'_>) -> Option<String> {
  LABEL_DIV
    .captures_iter(candidate.context)
    .filter_map(|caps| {
      let attrs = caps.get(1)?.as_str();
      if !class_tokens(attrs).iter().any(|token| LABEL_CLASSES.contains(token)) {
        return None;
      }

      let label = decode_html_entities(caps.get(2)?.as_str()).trim().to_string();
      (!label.is_empty()).then_some(label)
    })
    .last()
}

fn class_language(candidate: &Candidate<'_>) -> Option<String> {
  class_tokens(candidate.context)
    .into_iter()
    .find_map(|token| token.strip_prefix("language-"))
    .filter(|id| !id.is_empty())
    .map(str::to_string)
}

fn no_language(_candidate: &Candidate<'_>) -> Option<String> {
  None
}

/// Splits the `class` attribute found in a tag's attribute text into tokens.
fn class_tokens(attrs: &str) -> Vec<&str> {
  CLASS_ATTR
    .captures(attrs)
    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    .map(|value| value.as_str().split_whitespace().collect())
    .unwrap_or_default()
}
