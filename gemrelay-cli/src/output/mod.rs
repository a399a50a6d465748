//! Output formatting for CLI.

mod json;
mod text;

pub use json::{AnswerOutput, JsonFormatter, KeyOutput};
pub use text::TextFormatter;
#[cfg(test)]
mod tests;
