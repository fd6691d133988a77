use super::*;

fn parse(content: &str) -> (Vec<Note>, ScoreMetadata) {
    parse_abc(content, &EngineConfig::default())
}

fn pitches(notes: &[Note]) -> Vec<u8> {
    notes.iter().map(|n| n.pitch).collect()
}

fn starts(notes: &[Note]) -> Vec<u32> {
    notes.iter().map(|n| n.start_time).collect()
}

#[test]
fn test_key_signature_applies_without_markers() {
    let (notes, _) = parse("X:1\nK:G\nF G F");
    assert_eq!(pitches(&notes), vec![6, 7, 6]);
}

#[test]
fn test_explicit_natural_is_remembered_in_measure() {
    let (notes, _) = parse("X:1\nK:G\n^F G =F F");
    assert_eq!(pitches(&notes), vec![6, 7, 5, 5]);
}

#[test]
fn test_bar_line_clears_accidentals() {
    let (notes, _) = parse("X:1\nK:C\n^F F | F");
    assert_eq!(pitches(&notes), vec![6, 6, 5]);

    let (notes, _) = parse("X:1\nK:G\n=F | F");
    assert_eq!(pitches(&notes), vec![5, 6]);
}

#[test]
fn test_accidental_memory_is_per_octave() {
    let (notes, _) = parse("X:1\nK:C\n^f F f");
    assert_eq!(pitches(&notes), vec![6, 5, 6]);
}

#[test]
fn test_chord_shares_start_and_duration() {
    let (notes, _) = parse("X:1\nL:1/8\nK:C\n[CEG]2 D");
    assert_eq!(notes.len(), 4);
    for note in &notes[..3] {
        assert_eq!(note.start_time, 0);
        assert_eq!(note.duration, 4);
        assert_eq!(note.octave, 4);
    }
    assert_eq!(pitches(&notes), vec![0, 4, 7, 2]);
    // the cursor advanced once
    assert_eq!(notes[3].start_time, 4);
    assert_eq!(notes[3].duration, 2);
}

#[test]
fn test_chord_without_suffix_uses_longest_member() {
    let (notes, _) = parse("X:1\nK:C\n[C2E4G] A");
    assert!(notes[..3].iter().all(|n| n.duration == 8));
    assert_eq!(notes[3].start_time, 8);
}

#[test]
fn test_consecutive_chords() {
    let (notes, _) = parse("X:1\nK:C\n[CE][DF]");
    assert_eq!(starts(&notes), vec![0, 0, 2, 2]);
}

#[test]
fn test_chord_accidentals_carry_to_measure() {
    let (notes, _) = parse("X:1\nK:C\n[^FA] F");
    assert_eq!(pitches(&notes), vec![6, 9, 6]);
}

#[test]
fn test_tempo_from_fraction() {
    let (_, metadata) = parse("X:1\nL:1/8\nQ:1/4=120\nK:C\n");
    assert_eq!(metadata.bpm, 120);

    let (_, metadata) = parse("X:1\nQ:3/8=80\nK:C\n");
    assert_eq!(metadata.bpm, 120);
}

#[test]
fn test_tempo_bare() {
    let (_, metadata) = parse("X:1\nQ:90\nK:C\n");
    assert_eq!(metadata.bpm, 90);
}

#[test]
fn test_tempo_malformed_keeps_default() {
    let (_, metadata) = parse("X:1\nQ:\"Slowly\"\nK:C\n");
    assert_eq!(metadata.bpm, 120);
}

#[test]
fn test_first_tempo_wins() {
    let (_, metadata) = parse("X:1\nQ:1/4=100\nK:C\nQ:60\nC");
    assert_eq!(metadata.bpm, 100);
}

#[test]
fn test_default_note_length() {
    let (notes, metadata) = parse("X:1\nK:C\nCDEF");
    assert_eq!(starts(&notes), vec![0, 2, 4, 6]);
    assert!(notes.iter().all(|n| n.duration == 2));
    assert_eq!(metadata.default_note_length, None);
}

#[test]
fn test_note_length_field() {
    let (notes, metadata) = parse("X:1\nL:1/4\nK:C\nC D");
    assert_eq!(notes[0].duration, 4);
    assert_eq!(notes[1].start_time, 4);
    assert_eq!(metadata.default_note_length.as_deref(), Some("1/4"));

    let (notes, _) = parse("X:1\nL:1/16\nK:C\nC/ D");
    assert_eq!(notes[0].duration, 1);
    assert_eq!(notes[1].start_time, 1);
}

#[test]
fn test_duration_suffixes() {
    let (notes, _) = parse("X:1\nL:1/8\nK:C\nC2 D/ E3/2 F");
    let timing: Vec<(u32, u32)> = notes.iter().map(|n| (n.start_time, n.duration)).collect();
    assert_eq!(timing, vec![(0, 4), (4, 1), (5, 3), (8, 2)]);
}

#[test]
fn test_broken_rhythm_is_ignored() {
    let (notes, _) = parse("X:1\nK:C\nC>D");
    let timing: Vec<(u32, u32)> = notes.iter().map(|n| (n.start_time, n.duration)).collect();
    assert_eq!(timing, vec![(0, 2), (2, 2)]);
}

#[test]
fn test_rests_advance_cursor() {
    let (notes, _) = parse("X:1\nK:C\nC z D x2 E Z F");
    assert_eq!(notes.len(), 4);
    assert_eq!(starts(&notes), vec![0, 4, 10, 20]);
}

#[test]
fn test_invisible_rest() {
    let (notes, _) = parse("X:1\nK:C\nC X D");
    assert_eq!(starts(&notes), vec![0, 4]);
}

#[test]
fn test_octave_marks_and_clamp() {
    let (notes, _) = parse("X:1\nK:C\nC c c' C, c'' C,,");
    let octaves: Vec<i32> = notes.iter().map(|n| n.octave).collect();
    assert_eq!(octaves, vec![4, 5, 5, 3, 5, 3]);
}

#[test]
fn test_decorations_and_annotations_skipped() {
    let (notes, _) = parse("X:1\nK:C\n\"Am\"~C !trill!D .E +fermata+F (3GAB {g}c TC");
    assert_eq!(pitches(&notes), vec![0, 2, 4, 5, 7, 9, 11, 0, 0]);
    assert_eq!(starts(&notes), vec![0, 2, 4, 6, 8, 10, 12, 14, 16]);
}

#[test]
fn test_repeat_and_ending_bars() {
    let (notes, _) = parse("X:1\nK:C\n|: ^C D :|1 C :|2 D |]");
    assert_eq!(pitches(&notes), vec![1, 2, 0, 2]);
}

#[test]
fn test_bracket_bar_and_ending() {
    let (notes, _) = parse("X:1\nK:C\n^F [| F [1 G");
    assert_eq!(pitches(&notes), vec![6, 5, 7]);
    assert_eq!(starts(&notes), vec![0, 2, 4]);
}

#[test]
fn test_voices_keep_separate_cursors() {
    let (notes, _) = parse("X:1\nK:C\nV:1\nCDEF\nV:2\nC,D,\nV:1\nG");
    assert_eq!(notes.len(), 7);
    assert_eq!(notes[4].voice.as_deref(), Some("2"));
    assert_eq!((notes[4].start_time, notes[4].octave), (0, 3));
    assert_eq!(notes[5].start_time, 2);
    assert_eq!(notes[6].voice.as_deref(), Some("1"));
    assert_eq!(notes[6].start_time, 8);
}

#[test]
fn test_notes_before_any_voice_use_default() {
    let (notes, _) = parse("X:1\nK:C\nCD\nV:A clef=bass\nE");
    assert_eq!(notes[0].voice, None);
    assert_eq!(notes[2].voice.as_deref(), Some("A"));
    assert_eq!(notes[2].start_time, 0);
}

#[test]
fn test_inline_voice_and_key() {
    let (notes, _) = parse("X:1\nK:C\n[V:1] C [K:G] F | [V:2] F");
    assert_eq!(pitches(&notes), vec![0, 6, 6]);
    assert_eq!(notes[2].voice.as_deref(), Some("2"));
    assert_eq!(notes[2].start_time, 0);
}

#[test]
fn test_inline_length() {
    let (notes, _) = parse("X:1\nK:C\n[L:1/4]C D");
    assert_eq!(notes[0].duration, 4);
    assert_eq!(notes[1].start_time, 4);
}

#[test]
fn test_body_field_lines() {
    let (notes, _) = parse("X:1\nK:C\nC\nL:1/4\nD\nK:G\nF");
    let timing: Vec<(u8, u32, u32)> = notes.iter().map(|n| (n.pitch, n.start_time, n.duration)).collect();
    assert_eq!(timing, vec![(0, 0, 2), (2, 2, 4), (6, 6, 4)]);
}

#[test]
fn test_line_continuation() {
    let (notes, _) = parse("X:1\nK:C\nC D \\\nE F");
    assert_eq!(starts(&notes), vec![0, 2, 4, 6]);
}

#[test]
fn test_header_continuation() {
    let (_, metadata) = parse("X:1\nT:Long \\\nTitle\nK:C\n");
    assert_eq!(metadata.title.as_deref(), Some("Long Title"));
}

#[test]
fn test_ties_merge_same_pitch() {
    let (notes, _) = parse("X:1\nK:C\nC2-C2 D");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].duration, 8);
    assert_eq!(notes[1].start_time, 8);
}

#[test]
fn test_tie_across_bar_line() {
    let (notes, _) = parse("X:1\nK:C\nC2-|C2-|C");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].duration, 10);
}

#[test]
fn test_tie_to_different_pitch_places_both() {
    let (notes, _) = parse("X:1\nK:C\nC-D");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].duration, 2);
}

#[test]
fn test_rest_breaks_tie() {
    let (notes, _) = parse("X:1\nK:C\nC-zC");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1].start_time, 4);
}

#[test]
fn test_metadata_fields() {
    let (_, metadata) = parse("X:1\nT:Title\nT:Subtitle\nC:Trad\nM:6/8\nL:1/8\nK:Em\n");
    assert_eq!(metadata.title.as_deref(), Some("Title"));
    assert_eq!(metadata.composer.as_deref(), Some("Trad"));
    assert_eq!(metadata.time_signature.as_deref(), Some("6/8"));
    assert_eq!(metadata.default_note_length.as_deref(), Some("1/8"));
    assert_eq!(metadata.key.as_deref(), Some("Em"));
}

#[test]
fn test_minor_keys() {
    let (notes, _) = parse("X:1\nK:Em\nF");
    assert_eq!(pitches(&notes), vec![6]);

    let (notes, _) = parse("X:1\nK:D minor\nB");
    assert_eq!(pitches(&notes), vec![10]);
}

#[test]
fn test_unknown_key_has_no_accidentals() {
    let (notes, metadata) = parse("X:1\nK:Hp\nF B");
    assert_eq!(pitches(&notes), vec![5, 11]);
    assert_eq!(metadata.key.as_deref(), Some("Hp"));
}

#[test]
fn test_text_before_key_is_ignored() {
    let (notes, metadata) = parse("X:1\nT:Title\nfree text here\nK:C\nC");
    assert_eq!(notes.len(), 1);
    assert_eq!(metadata.title.as_deref(), Some("Title"));
}

#[test]
fn test_no_key_field_means_no_body() {
    let (notes, _) = parse("X:1\nT:Only a header\n");
    assert!(notes.is_empty());
}

#[test]
fn test_comments_stripped() {
    let (notes, _) = parse("X:1\nK:C\nC D % E F\n%%MIDI program 1\nE");
    assert_eq!(pitches(&notes), vec![0, 2, 4]);
}

#[test]
fn test_lyrics_lines_skipped() {
    let (notes, _) = parse("X:1\nK:C\nCD\nw: la la\nE");
    assert_eq!(notes.len(), 3);
}

#[test]
fn test_malformed_body_never_panics() {
    let (notes, _) = parse("X:1\nK:C\n[[[ ]]] !!! ^^ _ = [C [K: ]\n(((3 {unclosed \"open");
    assert!(notes.iter().all(|n| n.duration >= 1));
    assert_eq!(pitches(&notes), vec![0]);
}

#[test]
fn test_huge_durations_saturate() {
    let (notes, _) = parse("X:1\nK:C\nC2000000000 D2000000000 E");
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[2].start_time, u32::MAX);
    assert!(notes.iter().all(|n| n.end_time() == n.start_time.saturating_add(n.duration)));

    let (notes, _) = parse("X:1\nL:4294967295/1\nK:C\nZ C");
    assert_eq!(notes[0].start_time, u32::MAX);
}

#[test]
fn test_huge_tied_durations_saturate() {
    let (notes, _) = parse("X:1\nK:C\nC4000000000-C4000000000");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].duration, u32::MAX);
}

#[test]
fn test_note_letter_line_with_colon_is_music() {
    let (notes, _) = parse("X:1\nK:C\nABcd|\nG:| A B c");
    assert_eq!(notes.len(), 8);
    assert_eq!(notes[4].pitch, 7);
}

#[test]
fn test_percent_inside_annotation_is_text() {
    let (notes, _) = parse("X:1\nK:C\n\"50%\"C D % E");
    assert_eq!(pitches(&notes), vec![0, 2]);
}

#[test]
fn test_fresh_state_per_parse() {
    let config = EngineConfig::default();
    let (first, _) = parse_abc("X:1\nK:G\nV:2\n^F F", &config);
    let (second, _) = parse_abc("X:1\nK:C\nF", &config);
    assert_eq!(pitches(&first), vec![6, 6]);
    assert_eq!(pitches(&second), vec![5]);
    assert_eq!(second[0].start_time, 0);
    assert_eq!(second[0].voice, None);
}

#[test]
fn test_custom_octave_range() {
    let config = EngineConfig {
        min_octave: 2,
        max_octave: 7,
        ..EngineConfig::default()
    };
    let (notes, _) = parse_abc("X:1\nK:C\nc'' C,,", &config);
    assert_eq!(notes[0].octave, 7);
    assert_eq!(notes[1].octave, 2);
}
