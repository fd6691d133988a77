//! # Public API
//!
//! Entry points of the engine. Every `parse_*` function over a string is total:
//! it always returns a [`ParsedScore`], skipping whatever it cannot read.
//!
//! ## Functions
//!
//! - [`parse_score()`] - Detect the dialect and parse with the default configuration
//! - [`parse_score_with()`] - Same, with a custom [`EngineConfig`]
//! - [`parse_score_as()`] - Force a dialect instead of detecting it
//! - [`parse_score_file()`] - Read a file from disk, then parse it
//!
//! ## Typical Usage
//!
//! ```rust
//! use score_engine::parse_score;
//!
//! let score = parse_score("X:1\nT:Scale\nL:1/8\nK:G\nGABc defg|");
//!
//! assert_eq!(score.metadata.title.as_deref(), Some("Scale"));
//! assert_eq!(score.notes.len(), 8);
//! assert_eq!(score.notes[6].pitch, 6); // f is sharp in G major
//! assert_eq!(score.total_steps, 16);
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use score_engine::{parse_score_with, EngineConfig};
//!
//! let config = EngineConfig::from_yaml("default-bpm: 90")?;
//! let score = parse_score_with("C 4 4", &config);
//! assert_eq!(score.metadata.bpm, 90);
//! # Ok::<(), score_engine::ScoreError>(())
//! ```

use log::debug;
use std::fs;
use std::path::Path;

use crate::abc::parse_abc;
use crate::config::EngineConfig;
use crate::dialect::{detect_dialect, Dialect};
use crate::error::ScoreError;
use crate::legacy::parse_legacy;
use crate::model::ParsedScore;
use crate::schedule::build_score;

/// Parse a score in either dialect with the default configuration.
///
/// Empty or unreadable input yields an empty score at 120 bpm.
///
/// ```
/// let score = score_engine::parse_score("");
/// assert!(score.notes.is_empty());
/// assert_eq!(score.total_steps, 0);
/// assert_eq!(score.metadata.bpm, 120);
/// ```
pub fn parse_score(content: &str) -> ParsedScore {
    parse_score_with(content, &EngineConfig::default())
}

/// Parse a score in either dialect with a custom configuration.
pub fn parse_score_with(content: &str, config: &EngineConfig) -> ParsedScore {
    parse_score_as(content, detect_dialect(content), config)
}

/// Parse `content` as `dialect`, skipping detection.
pub fn parse_score_as(content: &str, dialect: Dialect, config: &EngineConfig) -> ParsedScore {
    let (notes, metadata) = match dialect {
        Dialect::Abc => parse_abc(content, config),
        Dialect::Legacy => parse_legacy(content, config),
    };
    debug!(
        "Parsed {} notes as {} at {} bpm",
        notes.len(),
        dialect.name(),
        metadata.bpm
    );
    build_score(notes, metadata)
}

/// Read and parse a score file. `dialect` of `None` detects it from the content.
pub fn parse_score_file(
    path: impl AsRef<Path>,
    dialect: Option<Dialect>,
    config: &EngineConfig,
) -> Result<ParsedScore, ScoreError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ScoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dialect = dialect.unwrap_or_else(|| detect_dialect(&content));
    Ok(parse_score_as(&content, dialect, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_content() {
        let abc = parse_score("X:1\nK:C\nC");
        assert_eq!((abc.notes[0].octave, abc.notes[0].duration), (4, 2));

        let legacy = parse_score("C 4 3");
        assert_eq!(legacy.notes[0].duration, 3);
    }

    #[test]
    fn test_forced_dialect() {
        // reads the same text as legacy although it looks like ABC
        let score = parse_score_as("X:1\nC 4 2", Dialect::Legacy, &EngineConfig::default());
        assert_eq!(score.notes.len(), 1);
        assert_eq!(score.notes[0].duration, 2);
    }

    #[test]
    fn test_whitespace_only_input() {
        let score = parse_score("   \n\n\t\n");
        assert!(score.is_empty());
        assert_eq!(score.total_steps, 0);
    }

    #[test]
    fn test_missing_file() {
        let result = parse_score_file("/nonexistent/score.abc", None, &EngineConfig::default());
        match result {
            Err(ScoreError::Io { path, .. }) => assert!(path.ends_with("score.abc")),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }
}
