//! # Pitch and Accidental Resolution
//!
//! Turns a written note (letter, octave marks, accidental marks) into a concrete
//! pitch class and octave, applying the standard scoping rule:
//!
//! 1. An explicit accidental on this note wins, and is remembered for the same
//!    letter and octave until the next bar line.
//! 2. Otherwise an accidental remembered earlier in the measure applies.
//! 3. Otherwise the key signature applies.
//!
//! ## Octaves
//! Uppercase letters sit in octave 4 (`C` is middle C), lowercase letters in
//! octave 5. Each `'` raises and each `,` lowers by one octave.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Note letters A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteLetter {
    /// Letter and base octave for an ABC note character.
    pub fn from_abc_char(c: char) -> Option<(Self, i32)> {
        let letter = Self::from_char(c)?;
        let octave = if c.is_ascii_uppercase() { 4 } else { 5 };
        Some((letter, octave))
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }

    /// Semitones above C for the natural letter.
    pub fn semitone(self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }
}

/// Order in which sharps are added: F C G D A E B
const SHARP_ORDER: [NoteLetter; 7] = [
    NoteLetter::F,
    NoteLetter::C,
    NoteLetter::G,
    NoteLetter::D,
    NoteLetter::A,
    NoteLetter::E,
    NoteLetter::B,
];

/// Order in which flats are added: B E A D G C F
const FLAT_ORDER: [NoteLetter; 7] = [
    NoteLetter::B,
    NoteLetter::E,
    NoteLetter::A,
    NoteLetter::D,
    NoteLetter::G,
    NoteLetter::C,
    NoteLetter::F,
];

/// Key signature as a position on the circle of fifths.
/// Positive = sharps, negative = flats, zero = C major / A minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeySignature {
    pub fifths: i8,
    pub minor: bool,
}

impl KeySignature {
    /// Look up a key by canonical name: "G", "F#", "Bb", "Em", "Bbm", ...
    ///
    /// Covers the natural key, 7 sharp keys, 7 flat keys and their 14 relative
    /// minors. Any other name returns `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();

        if let Some(root) = name.strip_suffix('m') {
            let fifths = match root {
                "A" => 0,
                "E" => 1,
                "B" => 2,
                "F#" => 3,
                "C#" => 4,
                "G#" => 5,
                "D#" => 6,
                "A#" => 7,
                "D" => -1,
                "G" => -2,
                "C" => -3,
                "F" => -4,
                "Bb" => -5,
                "Eb" => -6,
                "Ab" => -7,
                _ => return None,
            };
            return Some(Self { fifths, minor: true });
        }

        let fifths = match name {
            "C" => 0,
            "G" => 1,
            "D" => 2,
            "A" => 3,
            "E" => 4,
            "B" => 5,
            "F#" => 6,
            "C#" => 7,
            "F" => -1,
            "Bb" => -2,
            "Eb" => -3,
            "Ab" => -4,
            "Db" => -5,
            "Gb" => -6,
            "Cb" => -7,
            _ => return None,
        };
        Some(Self { fifths, minor: false })
    }

    /// Semitone offset the signature applies to a letter (+1, -1 or 0).
    pub fn offset_for(&self, letter: NoteLetter) -> i32 {
        let count = self.fifths.unsigned_abs() as usize;
        if self.fifths > 0 && SHARP_ORDER[..count.min(7)].contains(&letter) {
            1
        } else if self.fifths < 0 && FLAT_ORDER[..count.min(7)].contains(&letter) {
            -1
        } else {
            0
        }
    }
}

/// Canonical key name from an ABC `K:` value.
///
/// Captures a root (`A`-`G` plus optional `#`/`b`) and a mode word; `m`,
/// `min` and `minor` select the minor table, anything else the major one.
/// Returns `None` when the value has no recognizable root (`K:none`).
///
/// ```
/// use score_engine::pitch::abc_key_name;
///
/// assert_eq!(abc_key_name("G").as_deref(), Some("G"));
/// assert_eq!(abc_key_name("Bb minor").as_deref(), Some("Bbm"));
/// assert_eq!(abc_key_name("F#m clef=bass").as_deref(), Some("F#m"));
/// assert_eq!(abc_key_name("none"), None);
/// ```
pub fn abc_key_name(value: &str) -> Option<String> {
    let value = value.trim();
    let mut chars = value.chars().peekable();

    let root = chars.next()?.to_ascii_uppercase();
    if !('A'..='G').contains(&root) {
        return None;
    }
    let mut name = root.to_string();

    if let Some(&c) = chars.peek() {
        if c == '#' || c == 'b' {
            name.push(c);
            chars.next();
        }
    }

    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
    let mode: String = chars
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();

    if mode == "m" || mode.starts_with("min") {
        name.push('m');
    }
    Some(name)
}

/// Accidental value of a marker run: `^` sharpens, `_` flattens, `=` resets.
///
/// ```
/// use score_engine::pitch::accidental_value;
///
/// assert_eq!(accidental_value("^^"), Some(2));
/// assert_eq!(accidental_value("_"), Some(-1));
/// assert_eq!(accidental_value("="), Some(0));
/// assert_eq!(accidental_value(""), None);
/// ```
pub fn accidental_value(marks: &str) -> Option<i32> {
    if marks.is_empty() {
        return None;
    }
    let mut value = 0;
    for c in marks.chars() {
        match c {
            '^' => value += 1,
            '_' => value -= 1,
            '=' => value = 0,
            _ => {}
        }
    }
    Some(value)
}

/// Accidentals written earlier in the current measure, keyed by letter and
/// octave. Cleared at every bar line.
#[derive(Debug, Clone, Default)]
pub struct BarAccidentals {
    remembered: HashMap<(NoteLetter, i32), i32>,
}

impl BarAccidentals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, letter: NoteLetter, octave: i32, offset: i32) {
        self.remembered.insert((letter, octave), offset);
    }

    pub fn get(&self, letter: NoteLetter, octave: i32) -> Option<i32> {
        self.remembered.get(&(letter, octave)).copied()
    }

    pub fn clear(&mut self) {
        self.remembered.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.remembered.is_empty()
    }
}

/// A note as written in ABC: letter character, accidental marks, octave marks.
#[derive(Debug, Clone, PartialEq)]
pub struct Spelling<'a> {
    pub letter: char,
    pub accidentals: &'a str,
    pub octave_marks: &'a str,
}

/// Resolve a written note to `(pitch class, octave)`.
///
/// An explicit accidental is recorded into `bar` as a side effect. Returns
/// `None` for a character that is not a note letter.
pub fn resolve_pitch(
    spelling: &Spelling<'_>,
    key: &KeySignature,
    bar: &mut BarAccidentals,
    octave_range: &RangeInclusive<i32>,
) -> Option<(u8, i32)> {
    let (letter, base_octave) = NoteLetter::from_abc_char(spelling.letter)?;

    let mut octave = base_octave;
    for mark in spelling.octave_marks.chars() {
        match mark {
            '\'' => octave += 1,
            ',' => octave -= 1,
            _ => {}
        }
    }

    let offset = match accidental_value(spelling.accidentals) {
        Some(explicit) => {
            bar.remember(letter, octave, explicit);
            explicit
        }
        None => bar
            .get(letter, octave)
            .unwrap_or_else(|| key.offset_for(letter)),
    };

    let pitch = (letter.semitone() + offset + 12).rem_euclid(12) as u8;
    let octave = octave.clamp(*octave_range.start(), *octave_range.end());
    Some((pitch, octave))
}
