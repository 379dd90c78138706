//! Turn extraction from a saved conversation page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::{Role, Turn};
use crate::markdown::utils::get_element_text;

static TURN_CONTAINER: LazyLock<Selector> = LazyLock::new(|| {
  Selector::parse(r#"[data-testid^="conversation-turn-"]"#).expect("turn container selector is valid")
});
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").expect("article selector is valid"));
static USER_HEADING: LazyLock<Selector> =
  LazyLock::new(|| Selector::parse("h5.sr-only").expect("user heading selector is valid"));
static ASSISTANT_HEADING: LazyLock<Selector> =
  LazyLock::new(|| Selector::parse("h6.sr-only").expect("assistant heading selector is valid"));
static AUTHOR_ROLE: LazyLock<Selector> =
  LazyLock::new(|| Selector::parse("[data-message-author-role]").expect("author role selector is valid"));

const USER_HEADING_TEXT: &str = "You said:";
const ASSISTANT_HEADING_TEXT: &str = "ChatGPT said:";

/// Marker whose presence flags a turn as containing code.
const CODE_MARKER: &str = "<pre";

/// Extracts conversation turns from a page snapshot in document order.
///
/// Turn containers are the elements whose `data-testid` starts with
/// `conversation-turn-`, or every `<article>` when the page has none.
/// Containers whose speaker cannot be determined are skipped.
///
/// # Arguments
/// * `page_html` - Full page (or partial) HTML.
///
/// # Returns
/// One [`Turn`] per classified container.
pub fn extract_turns(page_html: &str) -> Vec<Turn> {
  let document = Html::parse_document(page_html);

  let mut containers: Vec<ElementRef<'_>> = document.select(&TURN_CONTAINER).collect();
  if containers.is_empty() {
    debug!("No conversation-turn containers found, falling back to <article>");
    containers = document.select(&ARTICLE).collect();
  }

  let turns: Vec<Turn> = containers
    .into_iter()
    .enumerate()
    .filter_map(|(index, container)| {
      let Some(role) = classify_container(container) else {
        trace!("Skipping container {index}: speaker not recognised");
        return None;
      };

      let raw_html = container.inner_html();
      Some(Turn {
        role,
        has_code_block: raw_html.contains(CODE_MARKER),
        raw_html,
      })
    })
    .collect();

  debug!("Extracted {} turn(s) from page snapshot", turns.len());
  turns
}

fn classify_container(container: ElementRef<'_>) -> Option<Role> {
  if has_heading(container, &USER_HEADING, USER_HEADING_TEXT) {
    return Some(Role::User);
  }
  if has_heading(container, &ASSISTANT_HEADING, ASSISTANT_HEADING_TEXT) {
    return Some(Role::Assistant);
  }

  container
    .select(&AUTHOR_ROLE)
    .next()
    .and_then(|element| element.value().attr("data-message-author-role"))
    .and_then(Role::from_author_attribute)
}

fn has_heading(container: ElementRef<'_>, selector: &Selector, text: &str) -> bool {
  container
    .select(selector)
    .any(|heading| get_element_text(heading).trim() == text)
}
