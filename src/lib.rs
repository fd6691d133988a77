//! # Score Engine
//!
//! Parse small hand-written scores into a normalized, playback-ready model.
//!
//! Two notations are accepted and told apart by content alone:
//! - **ABC**: a pragmatic subset of ABC 2.1 (header fields, key signatures,
//!   accidentals with bar memory, chords, rests, voices, ties)
//! - **Legacy**: a line format of `NOTE OCTAVE DURATION` lines with `#@`
//!   directives, `[Track]` switches, `@step` sync points and `+` chords
//!
//! Both produce a [`ParsedScore`]: notes in parse order, metadata, a
//! time-sorted playback schedule with frequencies, a per-step index and the
//! total length in steps (sixteenth notes).
//!
//! ```rust
//! use score_engine::parse_score;
//!
//! let score = parse_score("#@bpm: 100\nC 4 + E 4 + G 4 4\nD 4 4");
//!
//! assert_eq!(score.metadata.bpm, 100);
//! assert_eq!(score.notes_at(0).len(), 3);
//! assert_eq!(score.total_steps, 8);
//! ```

pub mod abc;
pub mod api;
pub mod config;
pub mod dialect;
pub mod duration;
pub mod error;
pub mod legacy;
pub mod model;
pub mod pitch;
pub mod schedule;

pub use api::{parse_score, parse_score_as, parse_score_file, parse_score_with};
pub use config::EngineConfig;
pub use dialect::{detect_dialect, Dialect};
pub use duration::resolve_duration;
pub use error::ScoreError;
pub use model::{
    get_frequency, midi_number, step_duration_ms, Note, ParsedScore, ScheduledNote, ScoreMetadata,
    DEFAULT_BPM, DEFAULT_VOICE,
};
pub use schedule::{build_schedule, build_score, Playhead, Schedule};
