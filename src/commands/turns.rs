//! `transcript-md turns` - list detected turns without converting them.

use std::process;

use super::input::load_turns;
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::transcript::{Role, Turn};

/// Handle the turns command
pub(crate) fn handle_turns_command(input: &str, cli: &Cli, colors: &ColorScheme) {
  let turns = match load_turns(Some(input), cli.input_options.input_format) {
    Ok(turns) => turns,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to read turns"));
      eprintln!("  {}: {:#}", colors.emphasis("Error"), e);
      process::exit(1);
    }
  };

  if turns.is_empty() {
    println!("{} {}", colors.warning("⚠"), colors.warning("No conversation turns found"));
    return;
  }

  for (index, turn) in turns.iter().enumerate() {
    println!("{}", describe_turn(index, turn, cli, colors));
  }

  let code_turns = turns.iter().filter(|turn| turn.has_code_block).count();
  println!(
    "\n{} {} {}, {} with code",
    colors.success("✓"),
    colors.number(turns.len()),
    if turns.len() == 1 { "turn" } else { "turns" },
    colors.number(code_turns)
  );
}

fn describe_turn(index: usize, turn: &Turn, cli: &Cli, colors: &ColorScheme) -> String {
  let label = match turn.role {
    Role::User => &cli.conversion.user_label,
    Role::Assistant => &cli.conversion.assistant_label,
  };
  let code = if turn.has_code_block {
    colors.code("code")
  } else {
    colors.dimmed("text")
  };

  format!(
    "{:>4}  {:<10} {}  {} bytes",
    colors.number(index),
    colors.emphasis(label),
    code,
    colors.number(turn.raw_html.len())
  )
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;
  use crate::cli::ColorOption;

  #[test]
  fn test_describe_turn() {
    let cli = Cli::try_parse_from(["transcript-md", "turns", "chat.html"]).unwrap();
    let colors = ColorScheme::new(ColorOption::Never);
    let turn = Turn::new(Role::Assistant, "<pre><code>x</code></pre>");
    assert_eq!(describe_turn(3, &turn, &cli, &colors), "   3  ChatGPT    code  25 bytes");
  }
}
