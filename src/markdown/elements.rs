//! HTML element to Markdown rendering.
//!
//! Handles headings, paragraphs, links, lists, tables and inline formatting,
//! plus the one rule that matters most: a node registered as a code
//! placeholder is rendered as a fenced block (or inline shell command) from
//! its resolved literal, never from its children.

use std::collections::HashMap;

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Node};
use tracing::{debug, trace};

use super::MarkdownOptions;
use super::fences::{fence_for, render_code_placeholder, render_inline_code, unescape_fenced_regions};
use super::normalize::{NormalizedFragment, Placeholder};
use super::tables::convert_table_to_markdown;
use super::utils::{
  STASH_CLOSE, STASH_OPEN, clean_markdown, collapse_whitespace, escape_markdown_text, get_element_text, has_class,
  strip_reserved_chars,
};

/// Elements whose content never reaches the Markdown output.
const DROPPED_ELEMENTS: &[&str] = &["button", "svg", "style", "script", "template", "noscript"];

/// Class marking screen-reader-only text such as the "You said:" headings.
const SCREEN_READER_CLASS: &str = "sr-only";

fn looks_like_list_marker(line: &str) -> bool {
  let trimmed = line.trim_start();

  if trimmed.starts_with(['-', '*', '+']) {
    return trimmed.len() > 1 && trimmed.as_bytes()[1] == b' ';
  }

  let mut chars = trimmed.chars();
  let mut saw_digit = false;

  while let Some(ch) = chars.next() {
    if ch.is_ascii_digit() {
      saw_digit = true;
      continue;
    }

    if ch == '.' {
      return saw_digit && matches!(chars.next(), Some(' '));
    }

    break;
  }

  false
}

fn format_list_item(item: &str, prefix: &str) -> String {
  let mut formatted = String::new();
  let lines = item.trim_end().lines();
  let indentation = " ".repeat(prefix.chars().count());
  let mut wrote_first_line = false;

  for line in lines {
    if !wrote_first_line {
      if line.trim().is_empty() {
        continue;
      }

      let line_content = line.trim_start();

      if looks_like_list_marker(line_content) {
        formatted.push_str(prefix.trim_end());
        formatted.push('\n');
        formatted.push_str(&indentation);
        formatted.push_str(line_content);
        formatted.push('\n');
      } else {
        formatted.push_str(prefix);
        formatted.push_str(line_content);
        formatted.push('\n');
      }

      wrote_first_line = true;
    } else if line.trim().is_empty() {
      formatted.push('\n');
    } else {
      formatted.push_str(&indentation);
      formatted.push_str(line);
      formatted.push('\n');
    }
  }

  if !wrote_first_line {
    formatted.push_str(prefix.trim_end());
    formatted.push('\n');
  }

  formatted
}

fn push_block(result: &mut String, content: &str) {
  let trimmed = content.trim();
  if !trimmed.is_empty() {
    result.push_str("\n\n");
    result.push_str(trimmed);
    result.push_str("\n\n");
  }
}

fn push_wrapped(result: &mut String, content: &str, marker: &str) {
  if content.trim().is_empty() {
    result.push_str(content);
  } else {
    result.push_str(marker);
    result.push_str(content);
    result.push_str(marker);
  }
}

/// Prefix that continues the container a line opened: blockquote markers are
/// kept and list markers become spaces. Prose before a token yields no prefix.
fn continuation_prefix(line_prefix: &str) -> String {
  let is_container_prefix = line_prefix
    .chars()
    .all(|ch| ch == '>' || ch == ' ' || ch.is_ascii_digit() || matches!(ch, '.' | '-' | '*' | '+'));
  if !is_container_prefix {
    return String::new();
  }

  line_prefix.chars().map(|ch| if ch == '>' { '>' } else { ' ' }).collect()
}

fn push_with_continuation(output: &mut String, block: &str, continuation: &str) {
  for (index, line) in block.split('\n').enumerate() {
    if index > 0 {
      output.push('\n');
      if line.is_empty() {
        output.push_str(continuation.trim_end());
      } else {
        output.push_str(continuation);
      }
    }
    output.push_str(line);
  }
}

/// Renders a parsed fragment to Markdown.
///
/// Rendering runs in three passes: the tree walk (placeholder output is
/// stashed behind private-use tokens), fence-aware post-processing of the
/// remaining Markdown, and finally restoring the stashed code.
///
/// # Arguments
/// * `fragment` - Parsed tree, with or without registered placeholders.
/// * `options` - Conversion options (inline shell threshold).
///
/// # Returns
/// Markdown without leading or trailing whitespace.
pub fn render_fragment(fragment: NormalizedFragment, options: &MarkdownOptions) -> String {
  let (document, placeholders) = fragment.into_parts();
  let mut renderer = MarkdownRenderer::new(placeholders, options);

  let raw = renderer.convert_children(*document.root_element());
  let processed = clean_markdown(&unescape_fenced_regions(&raw));
  renderer.finish(processed)
}

/// Tree walker that accumulates Markdown and owns the placeholder table.
struct MarkdownRenderer<'o> {
  placeholders: HashMap<NodeId, Placeholder>,
  options: &'o MarkdownOptions,
  stash: Vec<String>,
}

impl<'o> MarkdownRenderer<'o> {
  fn new(placeholders: HashMap<NodeId, Placeholder>, options: &'o MarkdownOptions) -> Self {
    Self {
      placeholders,
      options,
      stash: Vec::new(),
    }
  }

  fn stash(&mut self, rendered: String) -> String {
    let token = format!("{STASH_OPEN}{}{STASH_CLOSE}", self.stash.len());
    self.stash.push(rendered);
    token
  }

  /// Swaps every stash token for its rendered code.
  ///
  /// A token that sits behind a list or blockquote prefix carries that
  /// prefix onto each following line of the block, so multi-line fences stay
  /// inside their container.
  fn finish(self, processed: String) -> String {
    if !self.placeholders.is_empty() {
      debug!(
        "{} code placeholder(s) sat inside dropped elements and were not rendered",
        self.placeholders.len()
      );
    }

    let mut output = String::with_capacity(processed.len());
    let mut rest = processed.as_str();

    while let Some(open) = rest.find(STASH_OPEN) {
      let after = &rest[open + STASH_OPEN.len_utf8()..];
      let Some(close) = after.find(STASH_CLOSE) else {
        break;
      };
      let Some(rendered) = after[..close]
        .parse::<usize>()
        .ok()
        .and_then(|index| self.stash.get(index))
      else {
        output.push_str(&rest[..open]);
        rest = after;
        continue;
      };

      output.push_str(&rest[..open]);
      let line_start = output.rfind('\n').map_or(0, |index| index + 1);
      let continuation = continuation_prefix(&output[line_start..]);
      push_with_continuation(&mut output, rendered, &continuation);
      rest = &after[close + STASH_CLOSE.len_utf8()..];
    }

    output.push_str(rest);
    output
  }

  /// Cell text for tables, with code containers flattened to inline code.
  fn table_cell_text(&mut self, cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    self.collect_cell_text(*cell, &mut text);
    text
  }

  fn collect_cell_text(&mut self, node: NodeRef<'_, Node>, text: &mut String) {
    for child in node.children() {
      match child.value() {
        Node::Text(value) => text.push_str(&strip_reserved_chars(value)),
        Node::Element(element) => {
          if let Some(placeholder) = self.placeholders.remove(&child.id()) {
            text.push(' ');
            text.push_str(&render_inline_code(collapse_whitespace(&placeholder.literal).trim()));
            text.push(' ');
          } else if !DROPPED_ELEMENTS.contains(&element.name()) {
            self.collect_cell_text(child, text);
          }
        }
        _ => {}
      }
    }
  }

  /// Converts the children of a node to Markdown recursively.
  fn convert_children(&mut self, node: NodeRef<'_, Node>) -> String {
    let mut result = String::new();

    for child in node.children() {
      match child.value() {
        Node::Text(text) => {
          let collapsed = collapse_whitespace(text);
          let collapsed = if result.is_empty() || result.ends_with('\n') {
            collapsed.trim_start()
          } else {
            collapsed.as_str()
          };
          result.push_str(&escape_markdown_text(collapsed));
        }
        Node::Element(_) => {
          if let Some(element) = ElementRef::wrap(child) {
            self.convert_element(element, &mut result);
          }
        }
        _ => {}
      }
    }

    result
  }

  fn convert_element(&mut self, element: ElementRef<'_>, result: &mut String) {
    if let Some(placeholder) = self.placeholders.remove(&element.id()) {
      trace!("Rendering code placeholder ({})", placeholder.language);
      let rendered = render_code_placeholder(&placeholder.language, &placeholder.literal, self.options);
      let token = self.stash(rendered);
      result.push_str(&format!("\n\n{token}\n\n"));
      return;
    }

    let name = element.value().name();
    if DROPPED_ELEMENTS.contains(&name) || has_class(element, SCREEN_READER_CLASS) {
      return;
    }

    match name {
      // Headings
      "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
        let level = usize::from(name.as_bytes()[1] - b'0');
        let content = self.convert_children(*element).replace('\n', " ");
        let content = content.trim();
        if !content.is_empty() {
          result.push_str(&format!("\n\n{} {}\n\n", "#".repeat(level), content));
        }
      }

      // Paragraphs and generic blocks
      "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "figure" => {
        let content = self.convert_children(*element);
        push_block(result, &content);
      }

      // Text formatting
      "strong" | "b" => push_wrapped(result, &self.convert_children(*element), "**"),
      "em" | "i" | "u" => push_wrapped(result, &self.convert_children(*element), "_"),
      "s" | "del" | "strike" => push_wrapped(result, &self.convert_children(*element), "~~"),
      "code" => {
        let text = collapse_whitespace(&get_element_text(element));
        if !text.trim().is_empty() {
          result.push_str(&render_inline_code(&text));
        }
      }

      // Lists
      "ul" => {
        result.push('\n');
        for li in element.children().filter_map(ElementRef::wrap) {
          let item = self.convert_children(*li);
          result.push_str(&format_list_item(&item, "- "));
        }
        result.push('\n');
      }
      "ol" => {
        let start = element
          .value()
          .attr("start")
          .and_then(|value| value.trim().parse::<usize>().ok())
          .unwrap_or(1);
        result.push('\n');
        for (index, li) in element.children().filter_map(ElementRef::wrap).enumerate() {
          let item = self.convert_children(*li);
          let prefix = format!("{}. ", start + index);
          result.push_str(&format_list_item(&item, &prefix));
        }
        result.push('\n');
      }

      "blockquote" => {
        let content = clean_markdown(&self.convert_children(*element));
        if !content.is_empty() {
          let quoted: Vec<String> = content
            .lines()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {line}") })
            .collect();
          push_block(result, &quoted.join("\n"));
        }
      }

      // Links and images
      "a" => {
        let text = self.convert_children(*element);
        match element.value().attr("href").filter(|href| !href.is_empty()) {
          Some(href) => result.push_str(&format!("[{}]({})", text.trim(), strip_reserved_chars(href))),
          None => result.push_str(&text),
        }
      }
      "img" => {
        if let Some(src) = element.value().attr("src") {
          let alt = strip_reserved_chars(element.value().attr("alt").unwrap_or_default());
          result.push_str(&format!("![{alt}]({})", strip_reserved_chars(src)));
        }
      }

      // Line breaks and horizontal rules
      "br" => result.push('\n'),
      "hr" => result.push_str("\n\n---\n\n"),

      // Preformatted text with no resolved language
      "pre" => {
        let text = get_element_text(element);
        let text = text.trim_start_matches('\n').trim_end();
        if !text.is_empty() {
          let fence = fence_for(text);
          result.push_str(&format!("\n\n{fence}\n{}\n{fence}\n\n", escape_markdown_text(text)));
        }
      }

      "table" => {
        let table = convert_table_to_markdown(element, |cell| self.table_cell_text(cell));
        if !table.is_empty() {
          result.push('\n');
          result.push_str(&table);
          result.push('\n');
        }
      }

      // Unknown elements - extract content
      _ => {
        trace!("Descending into <{name}>");
        let content = self.convert_children(*element);
        result.push_str(&content);
      }
    }
  }
}
