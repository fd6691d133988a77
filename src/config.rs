//! # Engine Configuration
//!
//! Tunable constants of the engine. Every field defaults to the value the
//! notation rules fix, so `EngineConfig::default()` is the normal engine and a
//! YAML document only needs to name what it changes:
//!
//! ```yaml
//! default-bpm: 96
//! default-note-length: 1/4
//! ```

use serde::Deserialize;

use crate::duration::parse_fraction;
use crate::error::ScoreError;
use crate::model::DEFAULT_BPM;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub default_bpm: u32,
    /// Steps in a whole note. An `L:` fraction times this is the base step length.
    pub steps_per_whole: u32,
    /// ABC base note length when no `L:` field is present.
    pub default_note_length: (u32, u32),
    /// Octave clamp applied to ABC notes.
    pub min_octave: i32,
    pub max_octave: i32,
    /// Legacy chord duration when no segment carries one.
    pub legacy_chord_duration: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_bpm: DEFAULT_BPM,
            steps_per_whole: 16,
            default_note_length: (1, 8),
            min_octave: 3,
            max_octave: 5,
            legacy_chord_duration: 4,
        }
    }
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawEngineConfig {
    default_bpm: Option<u32>,
    steps_per_whole: Option<u32>,
    default_note_length: Option<String>,
    min_octave: Option<i32>,
    max_octave: Option<i32>,
    legacy_chord_duration: Option<u32>,
}

impl EngineConfig {
    /// Parse a (possibly partial) YAML document over the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ScoreError> {
        let raw: Option<RawEngineConfig> =
            serde_yaml::from_str(content).map_err(|e| ScoreError::Config(e.to_string()))?;
        let raw = raw.unwrap_or_default();
        let defaults = Self::default();

        let default_note_length = match raw.default_note_length {
            Some(ref s) => parse_fraction(s).ok_or_else(|| {
                ScoreError::Config(format!("default-note-length must be a fraction like 1/8, got '{}'", s))
            })?,
            None => defaults.default_note_length,
        };

        let config = Self {
            default_bpm: raw.default_bpm.unwrap_or(defaults.default_bpm),
            steps_per_whole: raw.steps_per_whole.unwrap_or(defaults.steps_per_whole),
            default_note_length,
            min_octave: raw.min_octave.unwrap_or(defaults.min_octave),
            max_octave: raw.max_octave.unwrap_or(defaults.max_octave),
            legacy_chord_duration: raw.legacy_chord_duration.unwrap_or(defaults.legacy_chord_duration),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.default_bpm == 0 {
            return Err(ScoreError::Config("default-bpm must be greater than 0".to_string()));
        }
        if self.steps_per_whole == 0 {
            return Err(ScoreError::Config("steps-per-whole must be greater than 0".to_string()));
        }
        if self.min_octave > self.max_octave {
            return Err(ScoreError::Config(format!(
                "min-octave ({}) must not exceed max-octave ({})",
                self.min_octave, self.max_octave
            )));
        }
        if self.legacy_chord_duration == 0 {
            return Err(ScoreError::Config(
                "legacy-chord-duration must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Steps covered by a note of length `num/den`, rounded, at least 1.
    pub fn steps_for_fraction(&self, num: u32, den: u32) -> u32 {
        if den == 0 {
            return 1;
        }
        let steps = (num as f64 / den as f64 * self.steps_per_whole as f64).round() as u32;
        steps.max(1)
    }

    /// Base step length when the score has no `L:` field.
    pub fn default_base_steps(&self) -> u32 {
        let (num, den) = self.default_note_length;
        self.steps_for_fraction(num, den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_bpm, 120);
        assert_eq!(config.default_base_steps(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = EngineConfig::from_yaml("default-bpm: 96\ndefault-note-length: 1/4\n").unwrap();
        assert_eq!(config.default_bpm, 96);
        assert_eq!(config.default_note_length, (1, 4));
        assert_eq!(config.default_base_steps(), 4);
        assert_eq!(config.max_octave, 5);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = EngineConfig::from_yaml("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_octave_range() {
        let result = EngineConfig::from_yaml("min-octave: 6\nmax-octave: 2\n");
        match result {
            Err(ScoreError::Config(message)) => assert!(message.contains("min-octave")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(EngineConfig::from_yaml("tempo: 90\n").is_err());
    }

    #[test]
    fn test_bad_note_length() {
        assert!(EngineConfig::from_yaml("default-note-length: eighth\n").is_err());
    }

    #[test]
    fn test_steps_for_fraction() {
        let config = EngineConfig::default();
        assert_eq!(config.steps_for_fraction(1, 16), 1);
        assert_eq!(config.steps_for_fraction(1, 4), 4);
        assert_eq!(config.steps_for_fraction(1, 64), 1);
        assert_eq!(config.steps_for_fraction(3, 8), 6);
    }
}
