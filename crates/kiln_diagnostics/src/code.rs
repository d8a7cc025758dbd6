//! Diagnostic codes with category prefixes for structured message identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem a diagnostic comes from. Its letter leads the rendered code,
/// as in `X001` for an execution decision or `H002` for history.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Up-to-date decisions and step execution, prefixed with `X`.
    Execution,
    /// File tree resolution, prefixed with `F`.
    Files,
    /// Execution history loading and storing, prefixed with `H`.
    History,
    /// Configuration loading, prefixed with `C`.
    Config,
}

impl Category {
    /// Letter shown in front of the code number.
    pub fn prefix(self) -> char {
        match self {
            Category::Execution => 'X',
            Category::Files => 'F',
            Category::History => 'H',
            Category::Config => 'C',
        }
    }
}

/// Stable identifier of a diagnostic, rendered as the category letter and a
/// three digit number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Emitting subsystem.
    pub category: Category,
    /// Number within the subsystem.
    pub number: u16,
}

impl DiagnosticCode {
    /// Builds a code from its parts.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_codes_render_padded() {
        let rendered: Vec<String> = [
            DiagnosticCode::new(Category::Execution, 1),
            DiagnosticCode::new(Category::History, 2),
            DiagnosticCode::new(Category::Files, 12),
            DiagnosticCode::new(Category::Config, 100),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, ["X001", "H002", "F012", "C100"]);
    }

    #[test]
    fn codes_compare_by_category_and_number() {
        assert_ne!(
            DiagnosticCode::new(Category::Execution, 1),
            DiagnosticCode::new(Category::History, 1)
        );
        assert_eq!(
            DiagnosticCode::new(Category::History, 1),
            DiagnosticCode::new(Category::History, 1)
        );
    }
}
