//! # Error Types
//!
//! Parsing a score never fails: malformed notation is skipped or falls back to a
//! default (see [`crate::parse_score`]). The errors here belong to the operations
//! *around* the parser: reading files, loading an engine configuration, choosing a
//! dialect by name and exporting a parsed score.
//!
//! ## Usage
//! ```rust
//! use score_engine::{Dialect, ScoreError};
//!
//! match Dialect::from_name("midi") {
//!     Ok(dialect) => println!("forcing {:?}", dialect),
//!     Err(ScoreError::UnknownDialect(name)) => eprintln!("no such dialect: {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    /// A score or configuration file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid engine configuration.
    ///
    /// # Example
    /// ```
    /// # use score_engine::ScoreError;
    /// let err = ScoreError::Config("steps-per-whole must be greater than 0".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: steps-per-whole must be greater than 0");
    /// ```
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A dialect name other than `abc`, `legacy` or `auto`.
    #[error("Unknown dialect '{0}'. Expected: abc, legacy or auto")]
    UnknownDialect(String),

    /// JSON or YAML export failed.
    #[error("Failed to serialize score: {0}")]
    Serialize(String),
}
