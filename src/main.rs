//! transcript-md - Convert saved chat transcripts to Markdown
//!
//! This is the main entry point for the CLI application.

fn main() {
  transcript_md::cli::run();
}
