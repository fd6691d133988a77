//! Real-time traversal of a built score.

use log::trace;

use crate::model::{step_duration_ms, ParsedScore, ScheduledNote};

/// A position in a [`ParsedScore`] that advances with elapsed time.
///
/// Each call to [`advance_to`](Playhead::advance_to) returns the notes whose
/// start step was crossed since the previous call, so every note is reported
/// once per pass. Seeking or resetting moves the position without reporting
/// anything that lies before it. Stopping playback is just dropping the value.
#[derive(Debug, Clone)]
pub struct Playhead<'a> {
    score: &'a ParsedScore,
    /// Index of the first schedule entry not yet reported.
    next: usize,
    current_step: u32,
}

impl<'a> Playhead<'a> {
    pub fn new(score: &'a ParsedScore) -> Self {
        Self {
            score,
            next: 0,
            current_step: 0,
        }
    }

    /// Move to `elapsed_ms` (measured from the start of the score) and return
    /// the newly started notes, in schedule order.
    ///
    /// Going backwards in time reports nothing; use [`seek`](Playhead::seek)
    /// to replay a passage.
    pub fn advance_to(&mut self, elapsed_ms: f64) -> &'a [ScheduledNote] {
        let step = self.step_at(elapsed_ms);
        if step > self.current_step {
            self.current_step = step;
        }

        let schedule = &self.score.playback_schedule;
        let start = self.next;
        let end = start
            + schedule[start..]
                .iter()
                .take_while(|note| note.start_time <= self.current_step)
                .count();
        self.next = end;
        &schedule[start..end]
    }

    /// Jump to `step`. Notes starting exactly at `step` are reported by the
    /// next [`advance_to`](Playhead::advance_to).
    pub fn seek(&mut self, step: u32) {
        trace!("Playhead seek from step {} to {}", self.current_step, step);
        self.current_step = step;
        self.next = self
            .score
            .playback_schedule
            .partition_point(|note| note.start_time < step);
    }

    pub fn reset(&mut self) {
        self.seek(0);
    }

    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Milliseconds from the start of the score to the current step.
    pub fn position_ms(&self) -> f64 {
        self.current_step as f64 * step_duration_ms(self.score.metadata.bpm)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.score.total_steps
    }

    fn step_at(&self, elapsed_ms: f64) -> u32 {
        let steps = elapsed_ms.max(0.0) / step_duration_ms(self.score.metadata.bpm);
        steps.floor().min(u32::MAX as f64) as u32
    }
}
