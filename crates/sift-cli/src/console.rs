//! Console output behind a trait so commands can be tested.

use colored::*;
use std::io::{self, BufRead, Write};

/// Where commands print.
pub trait Console: Send + Sync {
    /// A line of regular output on stdout.
    fn out(&self, line: &str);

    /// A progress or informational message on stderr.
    fn notice(&self, line: &str);

    /// A warning on stderr.
    fn warn(&self, line: &str);

    /// An error on stderr.
    fn error(&self, line: &str);

    /// Ask a yes/no question. Non-interactive consoles answer no.
    fn confirm(&self, prompt: &str) -> bool;
}

/// The real terminal.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    fn out(&self, line: &str) {
        println!("{}", line);
    }

    fn notice(&self, line: &str) {
        eprintln!("{}", line.dimmed());
    }

    fn warn(&self, line: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), line);
    }

    fn error(&self, line: &str) {
        eprintln!("{} {}", "Error:".red().bold(), line);
    }

    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Lay out rows as padded columns with a header rule.
pub fn format_table(columns: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(columns));
    lines.push(
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render(row));
    }
    lines
}
