//! HTML table to Markdown table conversion.

use scraper::ElementRef;

use super::utils::collapse_whitespace;

fn element_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
  element.children().filter_map(ElementRef::wrap)
}

fn is_tag(element: ElementRef<'_>, name: &str) -> bool {
  element.value().name() == name
}

/// Convert an HTML table element into Markdown table syntax.
///
/// Handles tables with `thead`, `tbody`, `tfoot` sections, or direct `tr`
/// children. Cell text is flattened to a single line with pipes escaped.
///
/// # Arguments
/// * `element` - The `<table>` element whose content should be rendered.
/// * `cell_text` - Produces the raw text of one `th`/`td` cell.
///
/// # Returns
/// A Markdown fragment beginning with a newline that contains the formatted
/// table, or an empty string when the table has no meaningful content.
pub fn convert_table_to_markdown<'a>(
  element: ElementRef<'a>,
  mut cell_text: impl FnMut(ElementRef<'a>) -> String,
) -> String {
  let mut tr_elements = Vec::new();

  for child in element_children(element) {
    if is_tag(child, "tr") {
      tr_elements.push(child);
    } else if is_tag(child, "thead") || is_tag(child, "tbody") || is_tag(child, "tfoot") {
      tr_elements.extend(element_children(child).filter(|row| is_tag(*row, "tr")));
    }
  }

  let rows = tr_elements
    .into_iter()
    .map(|tr| {
      element_children(tr)
        .filter(|cell| is_tag(*cell, "th") || is_tag(*cell, "td"))
        .map(|cell| {
          collapse_whitespace(&cell_text(cell))
            .trim()
            .replace('|', "\\|")
        })
        .collect::<Vec<_>>()
    })
    .filter(|cells| !cells.is_empty())
    .collect();

  render_markdown_table(rows).unwrap_or_default()
}

/// Pretty-print Markdown tables with aligned columns.
///
/// Accepts a collection of rows (each a vector of cell strings) and formats
/// them into a Markdown table with padded columns. The first row is treated as
/// the header.
///
/// # Arguments
/// * `rows` - Table rows in display order.
///
/// # Returns
/// `Some(String)` containing the rendered Markdown table (surrounded by leading
/// and trailing newlines) or `None` when the supplied rows are insufficient to
/// produce a valid table.
pub fn render_markdown_table(mut rows: Vec<Vec<String>>) -> Option<String> {
  let column_count = rows.iter().map(|row| row.len()).max()?;
  if column_count == 0 {
    return None;
  }

  for row in &mut rows {
    row.resize(column_count, String::new());
  }

  let mut column_widths = vec![3; column_count];
  for row in &rows {
    for (index, cell) in row.iter().enumerate() {
      column_widths[index] = column_widths[index].max(cell.chars().count());
    }
  }

  let mut result = String::from("\n");
  let mut rows = rows.iter();

  if let Some(header) = rows.next() {
    result.push_str(&format_row(header, &column_widths));

    result.push('|');
    for width in &column_widths {
      result.push(' ');
      result.push_str(&"-".repeat(*width));
      result.push_str(" |");
    }
    result.push('\n');
  }

  for row in rows {
    result.push_str(&format_row(row, &column_widths));
  }

  result.push('\n');
  Some(result)
}

/// Format a single table row with proper column alignment.
fn format_row(row: &[String], column_widths: &[usize]) -> String {
  let mut line = String::from("|");

  for (cell, width) in row.iter().zip(column_widths) {
    line.push(' ');
    line.push_str(cell);
    line.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
    line.push_str(" |");
  }

  line.push('\n');
  line
}

#[cfg(test)]
mod tests {
  use scraper::{Html, Selector};

  use super::*;
  use crate::markdown::utils::get_element_text;

  fn render(input: &str) -> String {
    let document = Html::parse_fragment(input);
    let selector = Selector::parse("table").unwrap();
    let table = document.select(&selector).next().unwrap();
    convert_table_to_markdown(table, get_element_text)
  }

  #[test]
  fn test_convert_table() {
    let output = render(
      r#"
      <table>
        <thead><tr><th>Flag</th><th>Meaning</th></tr></thead>
        <tbody>
          <tr><td><code>-v</code></td><td>More   logging</td></tr>
          <tr><td>-q</td><td>Errors only | quiet</td></tr>
        </tbody>
      </table>
    "#,
    );
    insta::assert_snapshot!(output, @r###"
    | Flag | Meaning              |
    | ---- | -------------------- |
    | -v   | More logging         |
    | -q   | Errors only \| quiet |
    "###);
  }

  #[test]
  fn test_ragged_rows_are_padded() {
    let output = render("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table>");
    assert!(output.contains("| 1   |     |"));
  }

  #[test]
  fn test_convert_table_empty() {
    let output = render("<table></table>");
    assert!(!output.contains('|'));
  }
}
