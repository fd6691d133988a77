//! # ABC Parser
//!
//! Parses the supported ABC subset into timed notes.
//!
//! ## Regions
//! A tune starts in the **header**: field lines like `T:`, `M:`, `L:`, `Q:` and
//! `V:`. The first `K:` field switches to the **body** for the rest of the
//! parse; there is no way back.
//!
//! ## Body Tokens
//! Each body line is scanned once, left to right:
//!
//! - bar symbols (`|`, `:`, `[|` and their trailing `|:]` or ending digits)
//!   clear the bar accidentals
//! - decorations (`~ . H L M O P S T u v`, `!..!`, `+..+`) are skipped
//! - tuplet markers (`(3`) are skipped; timing is not scaled
//! - quoted chord names and annotations (`"Am"`) are skipped
//! - grace notes (`{gab}`) are skipped
//! - `[K:G]` is an inline field (colon within the first two characters)
//! - `[CEG]2` is a chord: one shared duration, the cursor advances once
//! - `z`, `x` and `X` are rests with a duration suffix
//! - `Z` is a whole-measure rest of four base lengths
//! - accidentals, a letter, octave marks, a duration and a `-` tie form a note
//!
//! Anything else is skipped one character at a time.
//!
//! ## Voices
//! Every voice keeps its own time cursor. `V:` (or `[V:]`) switches voices and
//! creates the cursor at step 0 the first time a voice is seen; other voices'
//! cursors are never touched.
//!
//! ## Ties
//! A `-` after a note ties it to the next note of the same voice. When that
//! note has the same pitch and octave and starts where the tied note ends, the
//! tied note is lengthened instead of a new note being placed.

mod fields;

#[cfg(test)]
mod tests;

use log::debug;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::config::EngineConfig;
use crate::duration::resolve_duration;
use crate::model::{Note, ScoreMetadata, DEFAULT_VOICE};
use crate::pitch::{resolve_pitch, BarAccidentals, KeySignature, Spelling};

pub use fields::parse_tempo;

/// Parser state for one ABC parse. Created fresh per call.
pub(crate) struct AbcParser<'a> {
    config: &'a EngineConfig,
    notes: Vec<Note>,
    metadata: ScoreMetadata,
    in_body: bool,
    tempo_set: bool,
    /// Steps in one unmodified note (`L:` fraction × steps per whole).
    base_steps: u32,
    key: KeySignature,
    bar: BarAccidentals,
    voice: Option<String>,
    voice_positions: HashMap<String, u32>,
    /// Index of a tied note waiting for its continuation, per voice.
    pending_ties: HashMap<String, usize>,
    octave_range: RangeInclusive<i32>,
}

/// A note scanned from the body, before pitch resolution.
struct ScannedNote {
    letter: char,
    accidentals: String,
    octave_marks: String,
    duration_token: String,
    tied: bool,
}

impl ScannedNote {
    fn spelling(&self) -> Spelling<'_> {
        Spelling {
            letter: self.letter,
            accidentals: &self.accidentals,
            octave_marks: &self.octave_marks,
        }
    }
}

impl<'a> AbcParser<'a> {
    pub(crate) fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            notes: Vec::new(),
            metadata: ScoreMetadata::with_bpm(config.default_bpm),
            in_body: false,
            tempo_set: false,
            base_steps: config.default_base_steps(),
            key: KeySignature::default(),
            bar: BarAccidentals::new(),
            voice: None,
            voice_positions: HashMap::new(),
            pending_ties: HashMap::new(),
            octave_range: config.min_octave..=config.max_octave,
        }
    }

    pub(crate) fn parse(mut self, content: &str) -> (Vec<Note>, ScoreMetadata) {
        for line in join_continuations(content) {
            self.parse_line(&line);
        }
        (self.notes, self.metadata)
    }

    fn parse_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('%') {
            return;
        }
        let line = strip_comment(line);

        // in the body, A-G followed by `:` is music (`G:|`), not a field
        let field = fields::split_field_line(line)
            .filter(|(field, _)| !self.in_body || !matches!(field, 'A'..='G'));
        if let Some((field, value)) = field {
            self.apply_field(field, value);
            return;
        }

        if self.in_body {
            self.parse_body_line(line);
        } else {
            debug!("Ignoring text before the K: field: '{}'", line);
        }
    }

    fn voice_key(&self) -> &str {
        self.voice.as_deref().unwrap_or(DEFAULT_VOICE)
    }

    fn cursor(&self) -> u32 {
        self.voice_positions.get(self.voice_key()).copied().unwrap_or(0)
    }

    fn advance_cursor(&mut self, steps: u32) {
        let key = self.voice_key().to_string();
        let cursor = self.voice_positions.entry(key).or_insert(0);
        *cursor = cursor.saturating_add(steps);
    }

    fn break_tie(&mut self) {
        let key = self.voice_key().to_string();
        self.pending_ties.remove(&key);
    }

    fn bar_line(&mut self) {
        self.bar.clear();
    }

    fn parse_body_line(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            i = match c {
                c if c.is_whitespace() => i + 1,
                '|' | ':' => {
                    self.bar_line();
                    skip_bar_decorations(&chars, i + 1)
                }
                '[' => self.bracket(&chars, i),
                '~' | '.' | 'H' | 'L' | 'M' | 'O' | 'P' | 'S' | 'T' | 'u' | 'v' => i + 1,
                '!' | '+' => match find_from(&chars, i + 1, c) {
                    Some(close) => close + 1,
                    None => i + 1,
                },
                '(' => skip_tuplet(&chars, i),
                '"' => find_from(&chars, i + 1, '"').map_or(chars.len(), |close| close + 1),
                '{' => find_from(&chars, i + 1, '}').map_or(chars.len(), |close| close + 1),
                'z' | 'x' | 'X' => {
                    let (token, next) = scan_duration(&chars, i + 1);
                    let steps = resolve_duration(&token, self.base_steps);
                    self.break_tie();
                    self.advance_cursor(steps);
                    next
                }
                'Z' => {
                    self.break_tie();
                    self.advance_cursor(self.base_steps.saturating_mul(4));
                    skip_while(&chars, i + 1, |c| c.is_ascii_digit())
                }
                '^' | '_' | '=' | 'A'..='G' | 'a'..='g' => self.note(&chars, i),
                _ => i + 1,
            };
        }
    }

    /// Everything that starts with `[`: bar line, ending, inline field or chord.
    fn bracket(&mut self, chars: &[char], start: usize) -> usize {
        match chars.get(start + 1).copied() {
            Some('|') => {
                self.bar_line();
                return skip_bar_decorations(chars, start + 2);
            }
            Some(c) if c.is_ascii_digit() => {
                return skip_while(chars, start + 1, |c| c.is_ascii_digit() || c == ',' || c == '-');
            }
            _ => {}
        }

        let is_field = chars.get(start + 1) == Some(&':') || chars.get(start + 2) == Some(&':');
        let close = find_from(chars, start + 1, ']');

        if is_field {
            let end = close.unwrap_or(chars.len());
            let inner: String = chars[start + 1..end].iter().collect();
            match fields::split_field(&inner) {
                Some((field, value)) => self.apply_field(field, value),
                None => debug!("Ignoring malformed inline field '[{}]'", inner),
            }
            return close.map_or(chars.len(), |close| close + 1);
        }

        match close {
            Some(close) => self.chord(chars, start + 1, close),
            None => {
                debug!("Unterminated chord bracket, skipping '['");
                start + 1
            }
        }
    }

    /// Parse the chord between `open` and `close` (exclusive) and its suffix.
    fn chord(&mut self, chars: &[char], open: usize, close: usize) -> usize {
        let mut members = Vec::new();
        let mut longest = 0;
        let mut i = open;

        while i < close {
            match scan_note(&chars[..close], i) {
                Some((scanned, next)) => {
                    if let Some((pitch, octave)) =
                        resolve_pitch(&scanned.spelling(), &self.key, &mut self.bar, &self.octave_range)
                    {
                        let steps = resolve_duration(&scanned.duration_token, self.base_steps);
                        longest = longest.max(steps);
                        members.push((pitch, octave));
                    }
                    i = next;
                }
                None => i += 1,
            }
        }

        let (token, mut next) = scan_duration(chars, close + 1);
        if chars.get(next) == Some(&'-') {
            next += 1;
        }
        if members.is_empty() {
            return next;
        }

        let duration = if token.is_empty() {
            longest
        } else {
            resolve_duration(&token, self.base_steps)
        };

        self.break_tie();
        let start = self.cursor();
        for (pitch, octave) in members {
            self.notes.push(Note {
                pitch,
                octave,
                start_time: start,
                duration,
                voice: self.voice.clone(),
            });
        }
        self.advance_cursor(duration);
        next
    }

    fn note(&mut self, chars: &[char], start: usize) -> usize {
        let Some((scanned, next)) = scan_note(chars, start) else {
            // accidental marks with no letter after them
            return skip_while(chars, start, |c| matches!(c, '^' | '_' | '='));
        };
        let Some((pitch, octave)) =
            resolve_pitch(&scanned.spelling(), &self.key, &mut self.bar, &self.octave_range)
        else {
            return next;
        };
        let duration = resolve_duration(&scanned.duration_token, self.base_steps);
        self.place_note(pitch, octave, duration, scanned.tied);
        next
    }

    fn place_note(&mut self, pitch: u8, octave: i32, duration: u32, tied: bool) {
        let voice = self.voice_key().to_string();
        let start = self.cursor();

        let continued = self.pending_ties.remove(&voice).filter(|&index| {
            let previous = &self.notes[index];
            previous.pitch == pitch && previous.octave == octave && previous.end_time() == start
        });

        let index = match continued {
            Some(index) => {
                let tied_note = &mut self.notes[index];
                tied_note.duration = tied_note.duration.saturating_add(duration);
                index
            }
            None => {
                self.notes.push(Note {
                    pitch,
                    octave,
                    start_time: start,
                    duration,
                    voice: self.voice.clone(),
                });
                self.notes.len() - 1
            }
        };

        if tied {
            self.pending_ties.insert(voice, index);
        }
        self.advance_cursor(duration);
    }
}

/// Parse ABC text into notes and metadata. Never fails.
pub fn parse_abc(content: &str, config: &EngineConfig) -> (Vec<Note>, ScoreMetadata) {
    AbcParser::new(config).parse(content)
}

/// Join lines ending in `\` with the line that follows.
fn join_continuations(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for line in content.lines() {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(head) => pending.push_str(head),
            None => {
                pending.push_str(trimmed);
                lines.push(std::mem::take(&mut pending));
            }
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

/// Drop a trailing `%` comment. A `%` inside a quoted annotation is text.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (pos, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '%' if !quoted => return line[..pos].trim_end(),
            _ => {}
        }
    }
    line
}

fn find_from(chars: &[char], start: usize, target: char) -> Option<usize> {
    chars
        .get(start..)?
        .iter()
        .position(|&c| c == target)
        .map(|offset| start + offset)
}

fn skip_while(chars: &[char], mut i: usize, pred: impl Fn(char) -> bool) -> usize {
    while i < chars.len() && pred(chars[i]) {
        i += 1;
    }
    i
}

/// Skip the rest of a bar symbol: `||`, `|]`, `|:`, `:|2`, `|[1` ...
fn skip_bar_decorations(chars: &[char], mut i: usize) -> usize {
    loop {
        match chars.get(i).copied() {
            Some('|' | ':' | ']') => i += 1,
            Some(c) if c.is_ascii_digit() => i += 1,
            Some('[') if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => i += 2,
            _ => return i,
        }
    }
}

/// `(3`, `(3:2:4`: skip the marker. A bare `(` is a slur and is skipped alone.
fn skip_tuplet(chars: &[char], start: usize) -> usize {
    if chars.get(start + 1).is_some_and(|c| c.is_ascii_digit()) {
        skip_while(chars, start + 1, |c| c.is_ascii_digit() || c == ':')
    } else {
        start + 1
    }
}

/// Collect a duration suffix (digits, `/`, broken-rhythm marks) starting at `i`.
fn scan_duration(chars: &[char], i: usize) -> (String, usize) {
    let end = skip_while(chars, i, |c| c.is_ascii_digit() || matches!(c, '/' | '>' | '<'));
    (chars[i..end].iter().collect(), end)
}

/// Scan `^_=` marks, a letter, octave marks, a duration and a tie.
/// Returns `None` when no note letter follows the accidentals.
fn scan_note(chars: &[char], start: usize) -> Option<(ScannedNote, usize)> {
    let letter_at = skip_while(chars, start, |c| matches!(c, '^' | '_' | '='));
    let letter = *chars.get(letter_at)?;
    if !matches!(letter, 'A'..='G' | 'a'..='g') {
        return None;
    }

    let marks_end = skip_while(chars, letter_at + 1, |c| matches!(c, '\'' | ','));
    let (duration, mut next) = scan_duration(chars, marks_end);
    let tied = chars.get(next) == Some(&'-');
    if tied {
        next += 1;
    }

    Some((
        ScannedNote {
            letter,
            accidentals: chars[start..letter_at].iter().collect(),
            octave_marks: chars[letter_at + 1..marks_end].iter().collect(),
            duration_token: duration,
            tied,
        },
        next,
    ))
}
