//! Dialect detection by content sniffing.

use serde::Serialize;

use crate::error::ScoreError;

/// The two supported input notations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Abc,
    Legacy,
}

impl Dialect {
    /// Parse a dialect name. `None` means "auto" (detect from content).
    pub fn from_name(name: &str) -> Result<Option<Self>, ScoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "abc" => Ok(Some(Self::Abc)),
            "legacy" => Ok(Some(Self::Legacy)),
            "auto" => Ok(None),
            _ => Err(ScoreError::UnknownDialect(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Abc => "abc",
            Self::Legacy => "legacy",
        }
    }
}

/// Header field letters that mark the start of an ABC tune.
const ABC_HEADER_FIELDS: [char; 8] = ['X', 'T', 'M', 'K', 'L', 'C', 'Q', 'P'];

/// Decide the dialect from the first substantive line.
///
/// Blank lines and `%` comment lines are skipped; the first remaining line is
/// ABC if it starts with a header letter immediately followed by `:`. Nothing
/// past that line is inspected.
///
/// ```
/// use score_engine::{detect_dialect, Dialect};
///
/// assert_eq!(detect_dialect("% tune\n\nX:1\nK:C\nCDE"), Dialect::Abc);
/// assert_eq!(detect_dialect("C 4 2\nD 4 2"), Dialect::Legacy);
/// ```
pub fn detect_dialect(content: &str) -> Dialect {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut chars = line.chars();
        let is_abc = matches!(
            (chars.next(), chars.next()),
            (Some(field), Some(':')) if ABC_HEADER_FIELDS.contains(&field)
        );
        return if is_abc { Dialect::Abc } else { Dialect::Legacy };
    }
    Dialect::Legacy
}

pub fn is_abc(content: &str) -> bool {
    detect_dialect(content) == Dialect::Abc
}
