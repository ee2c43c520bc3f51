//! Styled terminal output for table mode.

use crossterm::style::Stylize;
use serde_json::Value;

const BANNER_WIDTH: usize = 58;

/// Terminal cell width; wide chars (CJK, emoji) take two cells.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Boxed banner line, e.g. `GET /items -> 200`.
pub fn print_header(title: &str) {
    let padding = BANNER_WIDTH.saturating_sub(display_width(title));
    let left = padding / 2;
    let right = padding - left;

    println!();
    println!("{}", format!("╔{}╗", "═".repeat(BANNER_WIDTH)).dark_cyan());
    println!(
        "{}",
        format!("║{}{}{}║", " ".repeat(left), title, " ".repeat(right)).dark_cyan()
    );
    println!("{}", format!("╚{}╝", "═".repeat(BANNER_WIDTH)).dark_cyan());
    println!();
}

pub fn print_section(title: &str) {
    println!();
    println!("  {} {}", "▸".dark_cyan(), title.white().bold());
    println!("  {}", "─".repeat(50).dark_grey());
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg);
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).dark_grey(), value);
}

pub fn print_hint(msg: &str) {
    eprintln!("  {} {}", "💡".yellow(), msg.dark_grey());
}

pub fn print_empty(msg: &str) {
    println!();
    println!("  {}", msg.dark_grey().italic());
    println!();
}

/// Indented pretty JSON; `null` renders as an empty-state line.
pub fn print_json_block(value: &Value) {
    if value.is_null() {
        print_empty("(empty body)");
        return;
    }
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    for line in text.lines() {
        println!("  {}", line);
    }
}

/// Colored `succeeded` / error-kind badge.
pub fn format_outcome(succeeded: bool, kind: Option<&str>) -> String {
    if succeeded {
        "● ok".green().to_string()
    } else {
        format!("○ {}", kind.unwrap_or("Error")).red().to_string()
    }
}
