//! Color utilities for terminal output
//!
//! Status lines are written to stderr (stdout carries the converted
//! document), so automatic color detection looks at stderr.

use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::OwoColorize;

use crate::cli::ColorOption;

/// Color scheme for the application
///
/// Semantic color names keep status output consistent across commands.
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Create a new color scheme based on user preference and terminal
  /// capabilities
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => std::io::stderr().is_terminal(),
    };

    Self { enabled }
  }

  /// Check if colors are enabled
  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: Display>(&self, text: T, style: impl FnOnce(&T) -> String) -> String {
    if self.enabled { style(&text) } else { text.to_string() }
  }

  /// Style for success messages (green)
  pub fn success<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.green().to_string())
  }

  /// Style for error messages (bright red)
  pub fn error<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_red().bold().to_string())
  }

  /// Style for warning messages (yellow)
  pub fn warning<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.yellow().to_string())
  }

  /// Style for info messages (cyan)
  pub fn info<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.cyan().to_string())
  }

  /// Style for emphasis/important text (bright white, bold)
  pub fn emphasis<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_white().bold().to_string())
  }

  /// Style for file paths (magenta)
  pub fn path<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.magenta().to_string())
  }

  /// Style for numbers and metrics (bright blue)
  pub fn number<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_blue().to_string())
  }

  /// Style for language tags and code (bright green)
  pub fn code<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_green().to_string())
  }

  /// Style for dimmed/secondary text (gray)
  pub fn dimmed<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.dimmed().to_string())
  }

  /// Style for progress indicators (bright cyan)
  pub fn progress<T: Display>(&self, text: T) -> String {
    self.paint(text, |t| t.bright_cyan().to_string())
  }
}
