//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{Bookmark, List, NavigationNotice};
use crate::infrastructure::traits::Notifier;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data consumed by editors and scripts)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One-line bookmark summary: `[id] name  path:line:col`
pub fn bookmark_line(bookmark: &Bookmark) -> String {
    let id = bookmark
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let location = bookmark
        .location
        .as_ref()
        .map(|loc| loc.to_string())
        .unwrap_or_default();
    format!("[{}] {}  {}", id.yellow(), bookmark.name.bold(), location.dimmed())
}

/// One-line list summary, marking the active list with `*`.
pub fn list_line(list: &List, active: bool) -> String {
    let id = list
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let marker = if active { "*" } else { " " };
    format!(
        "{} [{}] {} ({} children)",
        marker.green().bold(),
        id.yellow(),
        list.name.bold(),
        list.children.len()
    )
}

/// Notifier printing navigation notices as terminal warnings.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &NavigationNotice) {
        warning(notice);
    }
}
