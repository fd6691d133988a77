//! # Legacy Line Format Parser
//!
//! A line-oriented format with one note or chord per line:
//!
//! ```text
//! #@title: Scale
//! #@bpm: 100
//! # plain comment
//! [Melody]
//! C 4 2            note octave duration
//! C 4 + E 4 + G 4 4   chord, shared duration from the last segment that has one
//! [Bass:0]         switch track, rewinding it to step 0
//! C 3 8
//! @16              move the current track's cursor to step 16
//! ```
//!
//! Every track keeps its own cursor. Lines that do not parse are skipped and
//! leave all cursors untouched.

use log::{debug, trace};
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::model::{Note, ScoreMetadata, DEFAULT_VOICE};

/// Pitch class for a legacy note name, sharps and flats included.
///
/// ```
/// use score_engine::legacy::note_name_to_pitch;
///
/// assert_eq!(note_name_to_pitch("C#"), Some(1));
/// assert_eq!(note_name_to_pitch("Db"), Some(1));
/// assert_eq!(note_name_to_pitch("bb"), Some(10));
/// assert_eq!(note_name_to_pitch("H"), None);
/// ```
pub fn note_name_to_pitch(name: &str) -> Option<u8> {
    let pitch = match name.to_ascii_uppercase().as_str() {
        "C" => 0,
        "C#" | "DB" => 1,
        "D" => 2,
        "D#" | "EB" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "GB" => 6,
        "G" => 7,
        "G#" | "AB" => 8,
        "A" => 9,
        "A#" | "BB" => 10,
        "B" => 11,
        _ => return None,
    };
    Some(pitch)
}

/// Track cursors plus the notes placed so far.
struct LegacyState<'a> {
    config: &'a EngineConfig,
    notes: Vec<Note>,
    metadata: ScoreMetadata,
    positions: HashMap<String, u32>,
    track: String,
}

impl<'a> LegacyState<'a> {
    fn new(config: &'a EngineConfig) -> Self {
        let mut positions = HashMap::new();
        positions.insert(DEFAULT_VOICE.to_string(), 0);
        Self {
            config,
            notes: Vec::new(),
            metadata: ScoreMetadata::with_bpm(config.default_bpm),
            positions,
            track: DEFAULT_VOICE.to_string(),
        }
    }

    fn cursor(&self) -> u32 {
        self.positions.get(&self.track).copied().unwrap_or(0)
    }

    fn set_cursor(&mut self, position: u32) {
        self.positions.insert(self.track.clone(), position);
    }

    fn voice(&self) -> Option<String> {
        if self.track == DEFAULT_VOICE {
            None
        } else {
            Some(self.track.clone())
        }
    }

    fn apply_directive(&mut self, directive: &str) {
        let Some((key, value)) = directive.split_once(':') else {
            debug!("Ignoring directive without a value: '#@{}'", directive);
            return;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "bpm" | "tempo" => {
                self.metadata.bpm = match value.parse::<u32>() {
                    Ok(bpm) if bpm > 0 => bpm,
                    _ => {
                        debug!("Invalid tempo '{}', using {}", value, self.config.default_bpm);
                        self.config.default_bpm
                    }
                };
            }
            "title" => self.metadata.title = Some(value.to_string()),
            "composer" => self.metadata.composer = Some(value.to_string()),
            "time" | "timesignature" => self.metadata.time_signature = Some(value.to_string()),
            "key" => self.metadata.key = Some(value.to_string()),
            other => debug!("Ignoring unknown directive '{}'", other),
        }
    }

    /// `[Name]` or `[Name:position]`
    fn switch_track(&mut self, inner: &str) -> bool {
        let (name, position) = match inner.split_once(':') {
            Some((name, position)) => match position.trim().parse::<u32>() {
                Ok(position) => (name.trim(), Some(position)),
                Err(_) => return false,
            },
            None => (inner.trim(), None),
        };
        if name.is_empty() {
            return false;
        }

        self.track = name.to_string();
        let cursor = self.positions.entry(self.track.clone()).or_insert(0);
        if let Some(position) = position {
            *cursor = position;
        }
        trace!("Switched to track '{}' at step {}", self.track, self.cursor());
        true
    }

    fn place(&mut self, pitch: u8, octave: i32, start_time: u32, duration: u32) {
        self.notes.push(Note {
            pitch,
            octave,
            start_time,
            duration,
            voice: self.voice(),
        });
    }

    /// `NOTE OCTAVE DURATION`
    fn note_line(&mut self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [name, octave, duration] = tokens.as_slice() else {
            return false;
        };
        let (Some(pitch), Ok(octave), Ok(duration)) = (
            note_name_to_pitch(name),
            octave.parse::<i32>(),
            duration.parse::<u32>(),
        ) else {
            return false;
        };

        let start = self.cursor();
        let duration = duration.max(1);
        self.place(pitch, octave, start, duration);
        self.set_cursor(start.saturating_add(duration));
        true
    }

    /// `NOTE OCTAVE [DURATION] (+ NOTE OCTAVE [DURATION])*`
    fn chord_line(&mut self, line: &str) -> bool {
        let mut parts = Vec::new();
        let mut shared_duration = None;

        for segment in line.split('+') {
            let tokens: Vec<&str> = segment.split_whitespace().collect();
            let (name, octave, duration) = match tokens.as_slice() {
                [name, octave] => (*name, *octave, None),
                [name, octave, duration] => (*name, *octave, Some(*duration)),
                _ => return false,
            };
            let (Some(pitch), Ok(octave)) = (note_name_to_pitch(name), octave.parse::<i32>()) else {
                return false;
            };
            if let Some(duration) = duration {
                match duration.parse::<u32>() {
                    Ok(duration) => shared_duration = Some(duration),
                    Err(_) => return false,
                }
            }
            parts.push((pitch, octave));
        }

        let start = self.cursor();
        let duration = shared_duration
            .unwrap_or(self.config.legacy_chord_duration)
            .max(1);
        for (pitch, octave) in parts {
            self.place(pitch, octave, start, duration);
        }
        self.set_cursor(start.saturating_add(duration));
        true
    }

    fn line(&mut self, line: &str) -> bool {
        if let Some(directive) = line.strip_prefix("#@") {
            self.apply_directive(directive);
            return true;
        }
        if line.starts_with('#') {
            return true;
        }
        if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            return self.switch_track(inner);
        }
        if let Some(position) = line.strip_prefix('@') {
            return match position.trim().parse::<u32>() {
                Ok(position) => {
                    self.set_cursor(position);
                    true
                }
                Err(_) => false,
            };
        }
        if line.contains('+') {
            return self.chord_line(line);
        }
        self.note_line(line)
    }
}

/// Parse legacy-format text into notes and metadata. Never fails.
pub fn parse_legacy(content: &str, config: &EngineConfig) -> (Vec<Note>, ScoreMetadata) {
    let mut state = LegacyState::new(config);

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if !state.line(line) {
            debug!("Skipping unparseable line {}: '{}'", index + 1, line);
        }
    }

    (state.notes, state.metadata)
}
