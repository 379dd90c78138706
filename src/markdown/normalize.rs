//! DOM normalization of code containers.
//!
//! Each conversion parses the fragment into its own tree, so the caller's
//! markup is never touched. Every outermost `<pre>` is resolved to a
//! [`Placeholder`] holding the language and the literal code text; the
//! rich-text renderer emits the placeholder in place of the container.
//! Placeholders are keyed by the container's node id, which keeps sibling
//! order and count unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

use ego_tree::{NodeId, NodeRef};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, trace};

use super::code_blocks::{DEFAULT_LANGUAGE, LABEL_CLASSES};

static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").expect("pre selector is valid"));
static CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").expect("code selector is valid"));
static CODE_BODY: LazyLock<Selector> =
  LazyLock::new(|| Selector::parse("div.overflow-y-auto").expect("code body selector is valid"));

/// Resolved content of a code container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
  pub language: String,
  pub literal: String,
}

/// A parsed fragment plus the placeholders standing in for its code
/// containers.
pub struct NormalizedFragment {
  document: Html,
  placeholders: HashMap<NodeId, Placeholder>,
}

impl NormalizedFragment {
  /// Parses a fragment without resolving any code containers.
  pub fn parse(html: &str) -> Self {
    Self {
      document: Html::parse_fragment(html),
      placeholders: HashMap::new(),
    }
  }

  pub fn document(&self) -> &Html {
    &self.document
  }

  pub fn placeholder(&self, id: NodeId) -> Option<&Placeholder> {
    self.placeholders.get(&id)
  }

  pub fn placeholder_count(&self) -> usize {
    self.placeholders.len()
  }

  pub fn into_parts(self) -> (Html, HashMap<NodeId, Placeholder>) {
    (self.document, self.placeholders)
  }
}

/// Parses the fragment and resolves every outermost `<pre>` to a placeholder.
///
/// # Arguments
/// * `html` - Turn markup known to contain code.
///
/// # Returns
/// The parsed tree with a placeholder registered for each code container.
pub fn normalize_code_blocks(html: &str) -> NormalizedFragment {
  let mut fragment = NormalizedFragment::parse(html);

  let resolved: Vec<(NodeId, Placeholder)> = fragment
    .document
    .select(&PRE)
    .filter(|pre| is_outermost(*pre))
    .map(|pre| (pre.id(), resolve_container(pre)))
    .collect();

  for (id, placeholder) in resolved {
    trace!(
      "Code container {:?}: language `{}`, {} byte(s)",
      id,
      placeholder.language,
      placeholder.literal.len()
    );
    fragment.placeholders.insert(id, placeholder);
  }

  debug!("Normalized {} code container(s)", fragment.placeholders.len());
  fragment
}

fn is_outermost(pre: ElementRef<'_>) -> bool {
  !pre
    .ancestors()
    .filter_map(ElementRef::wrap)
    .any(|ancestor| ancestor.value().name() == "pre")
}

fn resolve_container(pre: ElementRef<'_>) -> Placeholder {
  let code = pre.select(&CODE).next();

  let language = pre
    .descendants()
    .filter_map(ElementRef::wrap)
    .filter(|element| is_label(element.value()))
    .find_map(direct_text)
    .or_else(|| code.and_then(class_language))
    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

  let mut text = CodeText::default();
  if let Some(code) = code {
    text.collect(*code, keep_all);
  } else if let Some(body) = pre.select(&CODE_BODY).next() {
    text.collect(*body, keep_all);
  } else {
    text.collect(*pre, is_chrome);
  }

  Placeholder {
    language,
    literal: normalize_line_endings(&text.text).trim().to_string(),
  }
}

fn is_label(element: &Element) -> bool {
  element.name() == "div" && element.classes().any(|class| LABEL_CLASSES.contains(&class))
}

/// Buttons and language labels surrounding the code text.
fn is_chrome(element: &Element) -> bool {
  element.name() == "button" || is_label(element)
}

fn keep_all(_element: &Element) -> bool {
  false
}

fn is_line_wrapper(element: &Element) -> bool {
  element.name() == "div" || element.classes().any(|class| class.contains("line"))
}

fn direct_text(element: ElementRef<'_>) -> Option<String> {
  let text: String = element
    .children()
    .filter_map(|child| child.value().as_text())
    .map(|text| &**text)
    .collect();
  let trimmed = text.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn class_language(code: ElementRef<'_>) -> Option<String> {
  code
    .value()
    .classes()
    .find_map(|class| class.strip_prefix("language-"))
    .filter(|id| !id.is_empty())
    .map(str::to_string)
}

fn normalize_line_endings(text: &str) -> String {
  text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Accumulates code text while flattening decoration elements.
///
/// A line boundary (the end of a line wrapper, or a `<br>`) is held as
/// pending and only becomes a newline once more code follows, and only if
/// that code does not already start with one.
#[derive(Default)]
struct CodeText {
  text: String,
  pending_break: bool,
}

impl CodeText {
  fn collect(&mut self, node: NodeRef<'_, Node>, skip: fn(&Element) -> bool) {
    for child in node.children() {
      match child.value() {
        Node::Text(text) => self.push_text(text),
        Node::Element(element) if skip(element) => {}
        Node::Element(element) if element.name() == "br" => self.line_break(),
        Node::Element(element) if is_line_wrapper(element) => {
          self.flush_break();
          let start = self.text.len();
          self.collect(child, skip);
          let emitted = self.text.len() > start;
          if !(emitted && self.text.ends_with('\n')) {
            self.pending_break = true;
          }
        }
        Node::Element(_) => self.collect(child, skip),
        _ => {}
      }
    }
  }

  fn push_text(&mut self, text: &str) {
    if text.is_empty() {
      return;
    }
    if self.pending_break {
      self.pending_break = false;
      if !text.starts_with(['\n', '\r']) {
        self.text.push('\n');
      }
    }
    self.text.push_str(text);
  }

  fn line_break(&mut self) {
    self.flush_break();
    self.pending_break = true;
  }

  fn flush_break(&mut self) {
    if self.pending_break {
      self.pending_break = false;
      self.text.push('\n');
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn placeholders(html: &str) -> Vec<Placeholder> {
    let fragment = normalize_code_blocks(html);
    fragment
      .document()
      .select(&PRE)
      .filter_map(|pre| fragment.placeholder(pre.id()).cloned())
      .collect()
  }

  fn single(html: &str) -> Placeholder {
    let mut found = placeholders(html);
    assert_eq!(found.len(), 1, "expected exactly one placeholder");
    found.remove(0)
  }

  #[test]
  fn test_legacy_container() {
    let html = r#"<pre><div class="bg-black rounded-md"><div class="flex items-center relative text-token-text-secondary px-4 py-2 text-xs">python<button>Copy code</button></div><div class="overflow-y-auto p-4"><code class="!whitespace-pre hljs language-python"><span class="hljs-keyword">def</span> <span class="hljs-title function_">add</span>(<span class="hljs-params">a, b</span>):
    <span class="hljs-keyword">return</span> a + b
</code></div></div></pre>"#;
    let placeholder = single(html);
    assert_eq!(placeholder.language, "python");
    assert_eq!(placeholder.literal, "def add(a, b):\n    return a + b");
  }

  #[test]
  fn test_modern_container_ignores_copy_button_wrapper() {
    let html = r#"<pre class="!overflow-visible"><div class="contain-inline-size rounded-md"><div class="flex items-center text-token-text-secondary px-4 py-2 text-xs font-sans">rust</div><div class="sticky top-9"><div class="bg-token-sidebar-surface-secondary text-token-text-secondary flex text-xs"><button aria-label="Copy">Copy</button></div></div><div class="overflow-y-auto p-4" dir="ltr"><code class="whitespace-pre! language-rust"><span><span class="hljs-keyword">fn</span> <span class="hljs-title function_">main</span>() {
    <span class="hljs-built_in">println!</span>(<span class="hljs-string">&quot;hi &amp; bye&quot;</span>);
}
</span></code></div></div></pre>"#;
    let placeholder = single(html);
    assert_eq!(placeholder.language, "rust");
    assert_eq!(placeholder.literal, "fn main() {\n    println!(\"hi & bye\");\n}");
  }

  #[test]
  fn test_whitespace_fidelity() {
    let html = "<pre><code>def f():\n\n    if x:\n\t\treturn 1\r\nend\n\n</code></pre>";
    let placeholder = single(html);
    assert_eq!(placeholder.literal, "def f():\n\n    if x:\n\t\treturn 1\nend");
    assert_eq!(placeholder.language, DEFAULT_LANGUAGE);
  }

  #[test]
  fn test_line_wrappers_insert_newlines() {
    let html = r#"<pre><code><div class="line">a = 1</div><div class="line"></div><div class="line">  b = 2</div></code></pre>"#;
    assert_eq!(single(html).literal, "a = 1\n\n  b = 2");
  }

  #[test]
  fn test_line_break_elements() {
    assert_eq!(single("<pre><code>x = 1<br>y = 2<br><br>z</code></pre>").literal, "x = 1\ny = 2\n\nz");
  }

  #[test]
  fn test_newlines_in_tokens_not_doubled() {
    let html = "<pre><code><span class=\"code-line\">a\n</span><span class=\"code-line\">b</span></code></pre>";
    assert_eq!(single(html).literal, "a\nb");
  }

  #[test]
  fn test_nested_line_wrappers_share_one_break() {
    let html = r#"<pre><code><div class="line"><span class="line-content">one</span></div><div class="line"><span class="line-content">two</span></div></code></pre>"#;
    assert_eq!(single(html).literal, "one\ntwo");
  }

  #[test]
  fn test_language_class_fallback() {
    let placeholder = single(r#"<pre><code class="language-go">fmt.Println()</code></pre>"#);
    assert_eq!(placeholder.language, "go");
  }

  #[test]
  fn test_code_body_fallback() {
    let html = "<pre><div class=\"text-xs text-token-text-secondary\">text</div><div class=\"overflow-y-auto\">hello\nworld</div></pre>";
    let placeholder = single(html);
    assert_eq!(placeholder.language, "text");
    assert_eq!(placeholder.literal, "hello\nworld");
  }

  #[test]
  fn test_container_text_excludes_chrome() {
    let placeholder = single(r#"<pre><div class="text-xs">sql</div><button>Copy</button>SELECT 1;</pre>"#);
    assert_eq!(placeholder.language, "sql");
    assert_eq!(placeholder.literal, "SELECT 1;");
  }

  #[test]
  fn test_one_placeholder_per_outermost_container() {
    let fragment = normalize_code_blocks("<pre><code>a</code></pre><p>between</p><pre><pre>b</pre></pre>");
    assert_eq!(fragment.placeholder_count(), 2);
  }

  #[test]
  fn test_parse_registers_nothing() {
    assert_eq!(NormalizedFragment::parse("<pre><code>a</code></pre>").placeholder_count(), 0);
  }
}
