//! Text output formatting with colors.

use std::fmt::Write;

use super::KeyOutput;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Formats the configured key table.
    ///
    /// Quota state lives in a running client, so only configuration is shown.
    pub fn format_keys(&self, keys: &[KeyOutput]) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{} ({} configured)",
            self.paint(BOLD, "API Keys"),
            keys.len()
        );
        let _ = writeln!(out, "{}", "─".repeat(40));

        if keys.is_empty() {
            let _ = writeln!(out, "No keys configured");
            return out;
        }

        for key in keys {
            let _ = writeln!(out, "{:<8} {}", key.id, self.paint(DIM, &key.key));
        }

        out
    }
}
