//! Command-line interface definitions for transcript-md.
//!
//! This module defines the CLI structure using clap derives, grouping
//! arguments by concern and dispatching to the command handlers.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::completions::{Shell, handle_completions_command};
use crate::commands::export::handle_export;
use crate::commands::turns::handle_turns_command;
use crate::commands::version::handle_version_command;
use crate::format::OutputFormat;
use crate::markdown::{DEFAULT_INLINE_SHELL_MAX_CHARS, DEFAULT_MAX_FRAGMENT_BYTES, MarkdownOptions};
use crate::transcript::TranscriptOptions;

/// transcript-md - Convert saved chat transcripts to Markdown
#[derive(Debug, Parser)]
#[command(
  name = "transcript-md",
  version,
  about = "Convert saved chat transcripts to Markdown",
  long_about = "A command-line tool for converting a saved ChatGPT conversation page (or a JSON list of turns)\n\
                into clean Markdown, recovering code blocks with their language and exact whitespace.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Page snapshot or JSON turn list to convert (`-` or omitted reads stdin)
  #[arg(value_name = "INPUT")]
  pub input: Option<String>,

  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Input options
  #[command(flatten)]
  pub input_options: InputOptions,

  /// Output options
  #[command(flatten)]
  pub output: OutputOptions,

  /// Conversion options
  #[command(flatten)]
  pub conversion: ConversionOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Subcommands for debugging and introspection
#[derive(Debug, Subcommand)]
pub enum Command {
  /// List the turns detected in an input without converting them
  Turns {
    /// Page snapshot or JSON turn list (`-` reads stdin)
    #[arg(value_name = "INPUT")]
    input: String,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// How to interpret the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InputFormat {
  /// JSON array means a turn list, anything else a page snapshot
  #[default]
  Auto,
  /// Saved conversation page (HTML)
  Page,
  /// JSON array of `{role, html, hasCodeBlock}` objects
  Turns,
}

/// Input options
#[derive(Debug, Parser)]
pub struct InputOptions {
  /// Input document type
  #[arg(long, value_enum, default_value = "auto", value_name = "FORMAT")]
  pub input_format: InputFormat,
}

/// Output options
#[derive(Debug, Parser)]
pub struct OutputOptions {
  /// Output file (defaults to stdout)
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Overwrite an existing output file
  #[arg(long)]
  pub overwrite: bool,

  /// Output document format
  #[arg(long, value_enum, default_value = "markdown", value_name = "FORMAT")]
  pub format: OutputFormat,
}

/// Conversion options
#[derive(Debug, Parser)]
pub struct ConversionOptions {
  /// Heading label for user turns
  #[arg(long, env = "TRANSCRIPT_MD_USER_LABEL", default_value = "You", value_name = "LABEL")]
  pub user_label: String,

  /// Heading label for assistant turns
  #[arg(
    long,
    env = "TRANSCRIPT_MD_ASSISTANT_LABEL",
    default_value = "ChatGPT",
    value_name = "LABEL"
  )]
  pub assistant_label: String,

  /// Reject turns whose HTML exceeds this many bytes
  #[arg(long, default_value_t = DEFAULT_MAX_FRAGMENT_BYTES, value_name = "BYTES")]
  pub max_fragment_bytes: usize,

  /// Render bash/sh one-liners shorter than this many characters as inline code
  #[arg(long, default_value_t = DEFAULT_INLINE_SHELL_MAX_CHARS, value_name = "N")]
  pub inline_shell_max_chars: usize,
}

impl ConversionOptions {
  /// Library options built from the command-line values.
  pub fn transcript_options(&self) -> TranscriptOptions {
    TranscriptOptions {
      user_label: self.user_label.clone(),
      assistant_label: self.assistant_label.clone(),
      markdown: MarkdownOptions {
        max_fragment_bytes: self.max_fragment_bytes,
        inline_shell_max_chars: self.inline_shell_max_chars,
      },
    }
  }
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.conversion.user_label.trim().is_empty() || self.conversion.assistant_label.trim().is_empty() {
      return Err("--user-label and --assistant-label must not be empty".to_string());
    }

    if self.conversion.max_fragment_bytes == 0 {
      return Err("--max-fragment-bytes must be at least 1".to_string());
    }

    if self.output.overwrite && self.output.output.is_none() {
      return Err("--overwrite requires --output".to_string());
    }

    if self.command.is_some() && self.input.is_some() {
      return Err("INPUT cannot be combined with a subcommand".to_string());
    }

    Ok(())
  }

  /// Whether the main conversion would read from stdin.
  pub fn reads_stdin(&self) -> bool {
    self.command.is_none() && self.input.as_deref().is_none_or(|input| input == "-")
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  // Create color scheme based on user preference
  let colors = ColorScheme::new(cli.behavior.color);

  // Validate CLI arguments
  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  if cli.reads_stdin() && std::io::stdin().is_terminal() {
    eprintln!(
      "{} Provide an INPUT path or pipe a page snapshot on stdin",
      colors.error("Error:")
    );
    process::exit(4);
  }

  // Handle subcommands
  if let Some(ref command) = cli.command {
    match command {
      Command::Turns { input } => {
        handle_turns_command(input, &cli, &colors);
      }
      Command::Version { json, short } => {
        handle_version_command(*json, *short, &colors);
      }
      Command::Completions { shell } => {
        handle_completions_command(*shell);
      }
    }
    return;
  }

  handle_export(cli.input.as_deref(), &cli, &colors);
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
