//! Header and inline field handling (`K:`, `L:`, `M:`, `Q:`, `V:`, `T:`, `C:`).

use log::{debug, trace};

use super::AbcParser;
use crate::duration::parse_fraction;
use crate::pitch::{abc_key_name, KeySignature};

/// Split a field line like `T:Title` into its letter and value.
///
/// Only uppercase letters and the lyric/remark/symbol letters (`w`, `r`, `s`)
/// start a field line, so lowercase music such as `e:|` is not mistaken for one.
pub(crate) fn split_field_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(field @ ('A'..='Z' | 'w' | 'r' | 's')), Some(':')) => Some((field, &line[2..])),
        _ => None,
    }
}

/// Split the inside of an inline field like `K:G` (from `[K:G]`).
pub(crate) fn split_field(inner: &str) -> Option<(char, &str)> {
    let inner = inner.trim();
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(field), Some(':')) if field.is_ascii_alphabetic() => Some((field, &inner[2..])),
        _ => None,
    }
}

/// Tempo in quarter notes per minute from a `Q:` value.
///
/// Accepts `1/4=120` (scaled so the beat fraction becomes quarter notes:
/// `round(bpm × fraction × 4)`) and a bare `90`. Quoted text is ignored.
/// Returns `None` when neither form matches.
///
/// ```
/// use score_engine::abc::parse_tempo;
///
/// assert_eq!(parse_tempo("1/4=120"), Some(120));
/// assert_eq!(parse_tempo("3/8=60"), Some(90));
/// assert_eq!(parse_tempo("90"), Some(90));
/// assert_eq!(parse_tempo("\"Allegro\" 1/2=60"), Some(120));
/// assert_eq!(parse_tempo("fast"), None);
/// ```
pub fn parse_tempo(value: &str) -> Option<u32> {
    let value = strip_quoted(value);
    let bpm = match value.split_once('=') {
        Some((beat, rate)) => {
            let raw = leading_number(rate.trim())?;
            let (num, den) = beat.split_whitespace().last().and_then(parse_fraction)?;
            (raw as f64 * num as f64 / den as f64 * 4.0).round() as u32
        }
        None => leading_number(value.trim())?,
    };
    (bpm > 0).then_some(bpm)
}

fn leading_number(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

fn strip_quoted(value: &str) -> String {
    value
        .split('"')
        .enumerate()
        .filter(|(index, _)| index % 2 == 0)
        .map(|(_, part)| part)
        .collect::<Vec<_>>()
        .join(" ")
}

impl AbcParser<'_> {
    pub(super) fn apply_field(&mut self, field: char, value: &str) {
        let value = value.trim();
        match field {
            'K' => self.set_key(value),
            'L' => self.set_note_length(value),
            'Q' => self.set_tempo(value),
            'V' => self.switch_voice(value),
            'M' => {
                if !self.in_body || self.metadata.time_signature.is_none() {
                    self.metadata.time_signature = Some(value.to_string());
                }
            }
            'T' if !self.in_body && self.metadata.title.is_none() => {
                self.metadata.title = Some(value.to_string());
            }
            'C' if !self.in_body && self.metadata.composer.is_none() => {
                self.metadata.composer = Some(value.to_string());
            }
            _ => {}
        }
    }

    fn set_key(&mut self, value: &str) {
        let name = abc_key_name(value);
        self.key = match name.as_deref().and_then(KeySignature::from_name) {
            Some(key) => key,
            None => {
                if !value.is_empty() {
                    debug!("Unknown key signature '{}', using no accidentals", value);
                }
                KeySignature::default()
            }
        };

        if self.metadata.key.is_none() && !value.is_empty() {
            self.metadata.key = Some(name.unwrap_or_else(|| value.to_string()));
        }
        self.in_body = true;
    }

    fn set_note_length(&mut self, value: &str) {
        match parse_fraction(value) {
            Some((num, den)) => {
                self.base_steps = self.config.steps_for_fraction(num, den);
                if !self.in_body || self.metadata.default_note_length.is_none() {
                    self.metadata.default_note_length = Some(value.to_string());
                }
            }
            None => debug!("Invalid note length '{}', keeping {} steps", value, self.base_steps),
        }
    }

    fn set_tempo(&mut self, value: &str) {
        match parse_tempo(value) {
            Some(bpm) if !self.tempo_set => {
                self.metadata.bpm = bpm;
                self.tempo_set = true;
            }
            Some(_) => {}
            None => debug!("Invalid tempo '{}', keeping {} bpm", value, self.metadata.bpm),
        }
    }

    fn switch_voice(&mut self, value: &str) {
        let Some(id) = value.split_whitespace().next() else {
            debug!("Ignoring voice field without an id");
            return;
        };
        self.voice = Some(id.to_string());
        self.voice_positions.entry(id.to_string()).or_insert(0);
        trace!("Switched to voice '{}' at step {}", id, self.cursor());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_field_line() {
        assert_eq!(split_field_line("T:My Tune"), Some(('T', "My Tune")));
        assert_eq!(split_field_line("w: la la"), Some(('w', " la la")));
        assert_eq!(split_field_line("e:|"), None);
        assert_eq!(split_field_line("|: abc"), None);
        assert_eq!(split_field_line("K"), None);
    }

    #[test]
    fn test_split_inline_field() {
        assert_eq!(split_field("K:G"), Some(('K', "G")));
        assert_eq!(split_field("V:2 name=\"Bass\""), Some(('V', "2 name=\"Bass\"")));
        assert_eq!(split_field("CEG"), None);
    }

    #[test]
    fn test_tempo_forms() {
        assert_eq!(parse_tempo("1/4=120"), Some(120));
        assert_eq!(parse_tempo("1/8=120"), Some(60));
        assert_eq!(parse_tempo("1/2 = 60"), Some(120));
        assert_eq!(parse_tempo("90"), Some(90));
        assert_eq!(parse_tempo("100 \"Moderato\""), Some(100));
    }

    #[test]
    fn test_tempo_rejects() {
        assert_eq!(parse_tempo(""), None);
        assert_eq!(parse_tempo("C=120"), None);
        assert_eq!(parse_tempo("1/4=fast"), None);
        assert_eq!(parse_tempo("0"), None);
    }
}
