//! # Score Model
//!
//! The normalized output shared by both notation dialects.
//!
//! ## Type Hierarchy
//! ```text
//! ParsedScore
//!   ├── notes: Vec<Note>                 (parse order, for grid display)
//!   ├── metadata: ScoreMetadata          (bpm, title, meter, key, L:)
//!   ├── playback_schedule: Vec<ScheduledNote>   (sorted by start_time, stable)
//!   ├── notes_by_step: BTreeMap<step, Vec<ScheduledNote>>
//!   └── total_steps: u32
//! ```
//!
//! ## Time
//! All times are integer **steps**. A step is a sixteenth note when
//! `steps-per-whole` is 16 (the default). An ABC note with `L:1/8` lasts 2 steps;
//! a legacy note lasts exactly the duration written on its line.
//!
//! ## Pitch
//! A pitch is a pitch class (C=0 … B=11) plus an octave, with C4 as middle C.
//! Frequencies use 12-tone equal temperament referenced to A4 = 440 Hz.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ScoreError;

/// Voice name used when a score never declares a voice or track.
pub const DEFAULT_VOICE: &str = "default";

/// Tempo used when the score has none (quarter notes per minute).
pub const DEFAULT_BPM: u32 = 120;

/// A placed sound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Pitch class, 0 (C) to 11 (B).
    pub pitch: u8,
    pub octave: i32,
    pub start_time: u32,
    /// Always at least 1.
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl Note {
    /// The voice this note belongs to, falling back to [`DEFAULT_VOICE`].
    pub fn voice_id(&self) -> &str {
        self.voice.as_deref().unwrap_or(DEFAULT_VOICE)
    }

    pub fn end_time(&self) -> u32 {
        self.start_time.saturating_add(self.duration)
    }
}

/// Piece-level facts collected from headers or `#@` directives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreMetadata {
    pub bpm: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// The `L:` fraction exactly as written, e.g. "1/8".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_note_length: Option<String>,
}

impl ScoreMetadata {
    pub fn with_bpm(bpm: u32) -> Self {
        Self {
            bpm,
            title: None,
            composer: None,
            time_signature: None,
            key: None,
            default_note_length: None,
        }
    }
}

impl Default for ScoreMetadata {
    fn default() -> Self {
        Self::with_bpm(DEFAULT_BPM)
    }
}

/// A note annotated with its playback frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNote {
    pub pitch: u8,
    pub octave: i32,
    pub start_time: u32,
    pub duration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Hz, equal temperament, A4 = 440.
    pub frequency: f64,
}

impl ScheduledNote {
    /// Milliseconds from the start of playback until this note sounds.
    pub fn offset_ms(&self, bpm: u32) -> f64 {
        self.start_time as f64 * step_duration_ms(bpm)
    }

    pub fn duration_ms(&self, bpm: u32) -> f64 {
        self.duration as f64 * step_duration_ms(bpm)
    }

    pub fn midi_number(&self) -> i32 {
        midi_number(self.pitch, self.octave)
    }

    pub fn voice_id(&self) -> &str {
        self.voice.as_deref().unwrap_or(DEFAULT_VOICE)
    }
}

impl From<&Note> for ScheduledNote {
    fn from(note: &Note) -> Self {
        Self {
            pitch: note.pitch,
            octave: note.octave,
            start_time: note.start_time,
            duration: note.duration,
            voice: note.voice.clone(),
            frequency: get_frequency(note.pitch, note.octave),
        }
    }
}

/// The engine's sole output. Built once per parse and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScore {
    pub notes: Vec<Note>,
    pub metadata: ScoreMetadata,
    pub playback_schedule: Vec<ScheduledNote>,
    pub notes_by_step: BTreeMap<u32, Vec<ScheduledNote>>,
    pub total_steps: u32,
}

impl ParsedScore {
    /// Notes starting exactly at `step` (empty when none do).
    pub fn notes_at(&self, step: u32) -> &[ScheduledNote] {
        self.notes_by_step
            .get(&step)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct voices in order of first appearance.
    pub fn voices(&self) -> Vec<&str> {
        let mut voices: Vec<&str> = Vec::new();
        for note in &self.notes {
            let id = note.voice_id();
            if !voices.contains(&id) {
                voices.push(id);
            }
        }
        voices
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total playing time at the score's own tempo.
    pub fn duration_ms(&self) -> f64 {
        self.total_steps as f64 * step_duration_ms(self.metadata.bpm)
    }

    pub fn to_json(&self) -> Result<String, ScoreError> {
        serde_json::to_string_pretty(self).map_err(|e| ScoreError::Serialize(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ScoreError> {
        serde_yaml::to_string(self).map_err(|e| ScoreError::Serialize(e.to_string()))
    }
}

/// MIDI note number, with C4 = 60.
pub fn midi_number(pitch: u8, octave: i32) -> i32 {
    octave
        .saturating_add(1)
        .saturating_mul(12)
        .saturating_add(pitch as i32)
}

/// Equal-tempered frequency in Hz, A4 = 440.
///
/// ```
/// use score_engine::get_frequency;
/// assert_eq!(get_frequency(9, 4), 440.0);
/// ```
pub fn get_frequency(pitch: u8, octave: i32) -> f64 {
    let midi = midi_number(pitch, octave);
    440.0 * 2f64.powf((midi as f64 - 69.0) / 12.0)
}

/// Length of one step in milliseconds at `bpm` quarter notes per minute.
/// A zero tempo is treated as the default tempo.
pub fn step_duration_ms(bpm: u32) -> f64 {
    let bpm = if bpm == 0 { DEFAULT_BPM } else { bpm };
    60000.0 / bpm as f64 / 4.0
}
