//! Default command: convert an input document and write the result.

use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use super::input::load_turns;
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::error::ConversionError;
use crate::format::OutputFormat;
use crate::markdown::ConversionRoute;
use crate::transcript::{ConversionObserver, Role, TracingObserver, TranscriptConverter};

/// Forwards events to tracing while counting failed turns for the summary.
#[derive(Default)]
struct ExportObserver {
  inner: TracingObserver,
  failed: Cell<usize>,
}

impl ConversionObserver for ExportObserver {
  fn turn_converted(&self, index: usize, role: Role, route: ConversionRoute, elapsed: Duration) {
    self.inner.turn_converted(index, role, route, elapsed);
  }

  fn turn_failed(&self, index: usize, role: Role, error: &ConversionError) {
    self.failed.set(self.failed.get() + 1);
    self.inner.turn_failed(index, role, error);
  }
}

/// Handle the conversion of one input document.
pub(crate) fn handle_export(input: Option<&str>, cli: &Cli, colors: &ColorScheme) {
  if let Err(e) = export(input, cli, colors) {
    eprintln!("{} {}", colors.error("✗"), colors.error("Failed to convert transcript"));
    eprintln!("  {}: {:#}", colors.emphasis("Error"), e);
    process::exit(1);
  }
}

fn export(input: Option<&str>, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let verbose_status = !cli.behavior.quiet;

  if verbose_status {
    eprintln!("{} {}", colors.progress("→"), colors.info("Converting transcript"));
    eprintln!("  {}: {}", colors.emphasis("Input"), colors.path(input.unwrap_or("<stdin>")));
  }

  let turns = load_turns(input, cli.input_options.input_format)?;
  if turns.is_empty() && verbose_status {
    eprintln!("  {} {}", colors.warning("⚠"), colors.warning("No conversation turns found"));
  }

  let converter = TranscriptConverter::with_observer(cli.conversion.transcript_options(), ExportObserver::default());
  let results = converter.convert(&turns);
  let document = cli.output.format.render(&results, converter.options())?;

  match cli.output.output.as_deref() {
    Some(path) => {
      write_output(path, &document, cli.output.overwrite, cli.output.format)?;
      if verbose_status {
        eprintln!("  {}: {}", colors.emphasis("File"), colors.path(path.display()));
      }
    }
    None => {
      let mut stdout = io::stdout().lock();
      stdout
        .write_all(document.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write to stdout")?;
    }
  }

  if verbose_status {
    let failed = converter.observer().failed.get();
    eprintln!(
      "{} Converted {} {}",
      colors.success("✓"),
      colors.number(results.len()),
      if results.len() == 1 { "turn" } else { "turns" }
    );
    if failed > 0 {
      eprintln!(
        "  {} {} {} could not be converted and were replaced by an error marker",
        colors.warning("⚠"),
        colors.number(failed),
        if failed == 1 { "turn" } else { "turns" }
      );
    }
  }

  Ok(())
}

/// Writes the rendered document to disk.
///
/// # Arguments
/// * `path` - Destination file; missing parent directories are created.
/// * `contents` - Rendered document.
/// * `overwrite` - Replace an existing file instead of failing.
/// * `format` - Format the document was rendered in, used to flag an unusual
///   file extension.
///
/// # Errors
/// Fails when the file exists and `overwrite` is `false`, or on any I/O error.
pub(crate) fn write_output(path: &Path, contents: &str, overwrite: bool, format: OutputFormat) -> Result<()> {
  if path.exists() && !overwrite {
    anyhow::bail!("File already exists: {}. Use --overwrite to replace it.", path.display());
  }

  if path.extension().and_then(|ext| ext.to_str()) != Some(format.file_extension()) {
    warn!(
      "Writing {:?} output to {} (expected a .{} extension)",
      format,
      path.display(),
      format.file_extension()
    );
  }

  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create output directory {}", parent.display()))?;
  }

  fs::write(path, contents).with_context(|| format!("Failed to write output to {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_write_output_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/chat.md");
    write_output(&path, "## You\n\nHi\n", false, OutputFormat::Markdown).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "## You\n\nHi\n");
  }

  #[test]
  fn test_write_output_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.md");
    fs::write(&path, "old").unwrap();

    let error = write_output(&path, "new", false, OutputFormat::Markdown).unwrap_err();
    assert!(error.to_string().contains("Use --overwrite"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "old");

    write_output(&path, "new", true, OutputFormat::Markdown).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
  }

  #[test]
  fn test_export_observer_counts_failures() {
    let observer = ExportObserver::default();
    let error = ConversionError::FragmentTooLarge { len: 10, limit: 5 };
    observer.turn_failed(0, Role::User, &error);
    observer.turn_converted(1, Role::Assistant, ConversionRoute::RichText, Duration::ZERO);
    observer.turn_failed(2, Role::Assistant, &error);
    assert_eq!(observer.failed.get(), 2);
  }
}
