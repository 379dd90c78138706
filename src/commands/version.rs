//! Version/metadata reporting.
//!
//! Implements the `transcript-md version` subcommand, which can output either
//! a human-readable summary or a machine-readable JSON document describing the
//! build.

use serde_json::json;

use crate::color::ColorScheme;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build metadata as a JSON value.
fn version_info() -> serde_json::Value {
  json!({
    "name": NAME,
    "version": VERSION,
    "target_os": std::env::consts::OS,
    "target_arch": std::env::consts::ARCH,
    "debug_build": cfg!(debug_assertions),
  })
}

/// Render version and build metadata in JSON or human-readable form.
///
/// # Arguments
/// * `json` - When `true`, emit a JSON document instead of colored text.
/// * `short` - When `true`, print only the semantic version string.
/// * `colors` - Shared color palette for styled terminal output.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  if short {
    println!("{VERSION}");
    return;
  }

  if json {
    // No colors in JSON
    println!("{:#}", version_info());
    return;
  }

  println!("{} {}", colors.emphasis(NAME), colors.number(VERSION));
  println!(
    "{}: {}-{}",
    colors.emphasis("Target"),
    std::env::consts::ARCH,
    std::env::consts::OS
  );
  println!(
    "{}: {}",
    colors.emphasis("Profile"),
    colors.dimmed(if cfg!(debug_assertions) { "debug" } else { "release" })
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_version_info_fields() {
    let info = version_info();
    assert_eq!(info["name"], "transcript-md");
    assert_eq!(info["version"], VERSION);
    assert!(info["target_os"].is_string());
  }
}
