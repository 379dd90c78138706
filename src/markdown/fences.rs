//! Fenced code block rendering and fence-aware post-processing.

use super::MarkdownOptions;

/// Languages whose short one-liners render as inline code.
const INLINE_SHELL_LANGUAGES: &[&str] = &["bash", "sh"];

/// Returns the fence for a literal: three backticks, or one more than the
/// longest backtick run when the literal itself contains three or more.
pub fn fence_for(literal: &str) -> String {
  let longest = longest_backtick_run(literal);
  let width = if longest >= 3 { longest + 1 } else { 3 };
  "`".repeat(width)
}

fn longest_backtick_run(text: &str) -> usize {
  let mut longest = 0;
  let mut current = 0;
  for ch in text.chars() {
    if ch == '`' {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  longest
}

/// Renders a fenced code block with the literal verbatim.
///
/// # Arguments
/// * `language` - Info string placed after the opening fence, may be empty.
/// * `literal` - Code text, emitted unchanged.
///
/// # Returns
/// The fenced block without surrounding blank lines.
pub fn render_fenced_block(language: &str, literal: &str) -> String {
  let fence = fence_for(literal);
  format!("{fence}{language}\n{literal}\n{fence}")
}

/// Renders a normalized code container.
///
/// Short single-line shell commands become inline code; everything else is a
/// fenced block tagged with its language.
pub fn render_code_placeholder(language: &str, literal: &str, options: &MarkdownOptions) -> String {
  if is_inline_shell(language, literal, options) {
    return render_inline_code(literal);
  }

  render_fenced_block(language, literal)
}

fn is_inline_shell(language: &str, literal: &str, options: &MarkdownOptions) -> bool {
  INLINE_SHELL_LANGUAGES.contains(&language)
    && !literal.contains('\n')
    && literal.chars().count() < options.inline_shell_max_chars
}

/// Wraps text in an inline code span, widening the delimiter when the text
/// contains backticks.
pub fn render_inline_code(text: &str) -> String {
  let run = longest_backtick_run(text);
  if run == 0 {
    return format!("`{text}`");
  }

  let delimiter = "`".repeat(run + 1);
  format!("{delimiter} {text} {delimiter}")
}

/// Tracks whether a line sits inside a fenced region.
#[derive(Debug, Default)]
pub struct FenceTracker {
  open: Option<usize>,
}

/// Position of a line relative to fenced regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceLine {
  Opening,
  Inside,
  Closing,
  Outside,
}

impl FenceTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Classifies the next line and updates the fence state.
  pub fn observe(&mut self, line: &str) -> FenceLine {
    let run = line.chars().take_while(|ch| *ch == '`').count();

    match self.open {
      Some(width) => {
        if run >= width && line[run..].trim().is_empty() {
          self.open = None;
          FenceLine::Closing
        } else {
          FenceLine::Inside
        }
      }
      None if run >= 3 => {
        self.open = Some(run);
        FenceLine::Opening
      }
      None => FenceLine::Outside,
    }
  }
}

/// Reverses Markdown escaping inside fenced regions.
///
/// Applies to every fenced region of the document: `\`\`\`` becomes a
/// literal triple backtick, `\\` a single backslash and `` \` `` a backtick.
/// Lines outside fences are returned unchanged.
pub fn unescape_fenced_regions(markdown: &str) -> String {
  let mut tracker = FenceTracker::new();
  let mut lines = Vec::new();

  for line in markdown.split('\n') {
    match tracker.observe(line) {
      FenceLine::Inside => lines.push(unescape_line(line)),
      _ => lines.push(line.to_string()),
    }
  }

  lines.join("\n")
}

fn unescape_line(line: &str) -> String {
  let mut result = String::with_capacity(line.len());
  let mut chars = line.chars().peekable();

  while let Some(ch) = chars.next() {
    if ch == '\\'
      && let Some(&next) = chars.peek()
      && matches!(next, '\\' | '`')
    {
      result.push(next);
      chars.next();
      continue;
    }
    result.push(ch);
  }

  result
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fenced_block_uses_language() {
    let output = render_fenced_block("python", "def f():\n    return 1");
    assert_eq!(output, "```python\ndef f():\n    return 1\n```");
  }

  #[test]
  fn test_fence_grows_only_for_triple_backticks() {
    assert_eq!(fence_for("let s = `x`;"), "```");
    assert_eq!(fence_for("``double``"), "```");
    assert_eq!(fence_for("```rust\nfn main() {}\n```"), "````");
  }

  #[test]
  fn test_shell_one_liner_renders_inline() {
    let options = MarkdownOptions::default();
    assert_eq!(render_code_placeholder("bash", "npm install", &options), "`npm install`");
    assert_eq!(render_code_placeholder("sh", "ls -la", &options), "`ls -la`");
  }

  #[test]
  fn test_python_one_liner_stays_fenced() {
    let options = MarkdownOptions::default();
    assert_eq!(
      render_code_placeholder("python", "print(1)", &options),
      "```python\nprint(1)\n```"
    );
  }

  #[test]
  fn test_multiline_or_long_shell_stays_fenced() {
    let options = MarkdownOptions::default();
    let multiline = "cd app\nnpm install";
    assert_eq!(
      render_code_placeholder("bash", multiline, &options),
      "```bash\ncd app\nnpm install\n```"
    );

    let long = "x".repeat(50);
    assert!(render_code_placeholder("bash", &long, &options).starts_with("```bash\n"));
    let short = "x".repeat(49);
    assert_eq!(render_code_placeholder("bash", &short, &options), format!("`{short}`"));
  }

  #[test]
  fn test_inline_code_with_backticks() {
    assert_eq!(render_inline_code("a`b"), "`` a`b ``");
  }

  #[test]
  fn test_fence_tracker_matches_width() {
    let mut tracker = FenceTracker::new();
    assert_eq!(tracker.observe("````md"), FenceLine::Opening);
    assert_eq!(tracker.observe("```"), FenceLine::Inside);
    assert_eq!(tracker.observe("````"), FenceLine::Closing);
    assert_eq!(tracker.observe("text"), FenceLine::Outside);
  }

  #[test]
  fn test_unescape_only_inside_fences() {
    let input = "a \\` b\n```\nx = \"\\\\n\"\n\\`\\`\\`\n```\nc \\\\ d";
    let output = unescape_fenced_regions(input);
    assert_eq!(output, "a \\` b\n```\nx = \"\\n\"\n```\n```\nc \\\\ d");
  }
}
