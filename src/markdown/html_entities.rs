//! HTML entity decoding utilities.
//!
//! Text pulled out of raw transcript markup with regular expressions still
//! carries character references (`&lt;`, `&#x1F642;`, `&nbsp;`). This module
//! resolves them against the full HTML5 entity table.

/// Decode HTML character references to their Unicode equivalents.
///
/// Handles named entities as well as decimal and hexadecimal numeric
/// references. Malformed or unknown references are left in place untouched,
/// and whitespace outside references is never altered.
///
/// # Arguments
/// * `text` - Text that may contain HTML entity references.
///
/// # Returns
/// A `String` with entity references expanded into their Unicode characters.
pub fn decode_html_entities(text: &str) -> String {
  if !text.contains('&') {
    return text.to_string();
  }

  html_escape::decode_html_entities(text).into_owned()
}
