// ABOUTME: Console status lines — success, info, warning and error messages with color.
// ABOUTME: Warnings and errors go to stderr so filter output on stdout stays clean.

use std::fmt::Display;

use console::style;

pub fn success(message: impl Display) {
    println!("{} {}", style("✅").green(), style(message).green());
}

pub fn info(message: impl Display) {
    println!("{}  {}", style("ℹ️").cyan(), style(message).cyan());
}

pub fn warn(message: impl Display) {
    eprintln!("{}  {}", style("⚠️").yellow(), style(message).yellow());
}

pub fn error(message: impl Display) {
    eprintln!(
        "{} {}",
        style("❌ Error:").red().bold(),
        style(message).red()
    );
}

/// Bold blue section header followed by a blank line.
pub fn heading(message: impl Display) {
    println!();
    println!("{}", style(message).blue().bold());
    println!();
}
