//! Schedule construction.

use std::collections::BTreeMap;

use crate::model::{Note, ParsedScore, ScheduledNote, ScoreMetadata};

/// The playback half of a [`ParsedScore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    /// Every note with its frequency, ascending by `start_time` (stable).
    pub playback_schedule: Vec<ScheduledNote>,
    /// Scheduled notes grouped by their exact start step.
    pub notes_by_step: BTreeMap<u32, Vec<ScheduledNote>>,
    /// `max(start_time + duration)`, or 0 with no notes.
    pub total_steps: u32,
}

/// Build the playback schedule for `notes`.
///
/// Never fails; an empty slice yields an empty schedule with `total_steps = 0`.
pub fn build_schedule(notes: &[Note]) -> Schedule {
    let mut playback_schedule: Vec<ScheduledNote> = notes.iter().map(ScheduledNote::from).collect();
    // sort_by_key is stable
    playback_schedule.sort_by_key(|note| note.start_time);

    let mut notes_by_step: BTreeMap<u32, Vec<ScheduledNote>> = BTreeMap::new();
    for note in &playback_schedule {
        notes_by_step
            .entry(note.start_time)
            .or_default()
            .push(note.clone());
    }

    let total_steps = notes.iter().map(Note::end_time).max().unwrap_or(0);

    Schedule {
        playback_schedule,
        notes_by_step,
        total_steps,
    }
}

/// Assemble a complete [`ParsedScore`] from a parser's output.
pub fn build_score(notes: Vec<Note>, metadata: ScoreMetadata) -> ParsedScore {
    let Schedule {
        playback_schedule,
        notes_by_step,
        total_steps,
    } = build_schedule(&notes);

    ParsedScore {
        notes,
        metadata,
        playback_schedule,
        notes_by_step,
        total_steps,
    }
}
