//! Input loading shared by the export and `turns` commands.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::InputFormat;
use crate::transcript::{Turn, extract_turns};

/// Reads the whole input document from a path, or from stdin for `-` / `None`.
pub fn read_input(input: Option<&str>) -> Result<String> {
  match input {
    None | Some("-") => {
      let mut buffer = String::new();
      io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read input from stdin")?;
      Ok(buffer)
    }
    Some(path) => {
      fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read input file {path}"))
    }
  }
}

/// Interprets an input document as a list of turns.
///
/// # Arguments
/// * `text` - Page snapshot HTML or a JSON turn list.
/// * `format` - Declared format; `Auto` treats a leading `[` as JSON.
///
/// # Errors
/// Returns an error when a JSON turn list fails to deserialize.
pub fn parse_turns(text: &str, format: InputFormat) -> Result<Vec<Turn>> {
  let format = match format {
    InputFormat::Auto if text.trim_start().starts_with('[') => InputFormat::Turns,
    InputFormat::Auto => InputFormat::Page,
    declared => declared,
  };
  debug!("Reading input as {format:?}");

  let turns = match format {
    InputFormat::Turns => serde_json::from_str::<Vec<Turn>>(text).context("Failed to parse JSON turn list")?,
    _ => extract_turns(text),
  };

  info!("Loaded {} turn(s)", turns.len());
  Ok(turns)
}

/// Reads and parses the input in one step.
pub fn load_turns(input: Option<&str>, format: InputFormat) -> Result<Vec<Turn>> {
  let text = read_input(input)?;
  parse_turns(&text, format)
}
