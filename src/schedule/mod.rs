//! # Schedule Module
//!
//! Turn placed notes into playback data: frequencies, a time-sorted schedule,
//! a per-step index and the total length of the piece.
//!
//! ## Sub-modules
//! - `builder` - Builds the schedule and assembles the final [`ParsedScore`](crate::ParsedScore)
//! - `playhead` - Walks a built score against elapsed wall-clock time
//!
//! ## Example
//! ```rust
//! use score_engine::{parse_score, Playhead};
//!
//! let score = parse_score("C 4 4\nE 4 4\n@0\nG 3 8");
//!
//! assert_eq!(score.total_steps, 8);
//! assert_eq!(score.notes_at(0).len(), 2);
//!
//! // 120 bpm: one step is 125ms
//! let mut playhead = Playhead::new(&score);
//! assert_eq!(playhead.advance_to(0.0).len(), 2);
//! assert_eq!(playhead.advance_to(500.0).len(), 1);
//! assert!(playhead.advance_to(999.0).is_empty());
//! assert!(playhead.advance_to(1000.0).is_empty());
//! assert!(playhead.is_finished());
//! ```
//!
//! ## Ordering
//! The schedule is sorted by `start_time` with a stable sort, so notes that
//! start together (chord members, simultaneous voices) keep the order in which
//! the parser placed them.

mod builder;
mod playhead;


pub use builder::{build_schedule, build_score, Schedule};
pub use playhead::Playhead;
