//! Integration tests for the Harmonia engine
//!
//! Tests the full pipeline from a root and quality (or a chord symbol) to
//! spelled notes, staff positions, key signatures, playback and exports.

use harmonia::advisor::{fetch_advice, Advice, AdviceRequest, JsonAdviceSource};
use harmonia::audio::{arpeggio_plan, AudioSettings};
use harmonia::circle::{minor_label_for, slot_at, slots, CIRCLE_MAJOR};
use harmonia::config::Settings;
use harmonia::explorer::{Explorer, KeyPress, Ring};
use harmonia::key_signature::AccidentalType;
use harmonia::midi::{write_midi, MidiRecorder};
use harmonia::pitch::{Accidental, SUPPORTED_MIDI};
use harmonia::{
    layout_chord, resolve, resolve_symbol, signature_for, staff_y, symbol_to_musicxml, ChordQuality,
    HarmoniaError, Key, NoteName,
};

#[test]
fn test_c_major_end_to_end() {
    let chord = resolve(NoteName::C, ChordQuality::Major).unwrap();
    assert_eq!(chord.notes, vec![NoteName::C, NoteName::E, NoteName::G]);
    assert_eq!(chord.midi_notes, vec![60, 64, 67]);
    assert_eq!(chord.notation, "C");

    let ys: Vec<i32> = layout_chord(&chord).iter().map(|n| n.y).collect();
    assert_eq!(ys, vec![120, 100, 80]);
}

#[test]
fn test_f_minor_seventh_end_to_end() {
    let chord = resolve_symbol("Fm7").unwrap();
    assert_eq!(
        chord.notes,
        vec![NoteName::F, NoteName::AFlat, NoteName::C, NoteName::EFlat]
    );
    assert_eq!(chord.midi_notes, vec![65, 68, 72, 75]);

    let signature = signature_for(Key::major(chord.root));
    assert_eq!(signature.kind, AccidentalType::Flat);
    assert_eq!(signature.count, 1);
}

#[test]
fn test_every_circle_chord_is_well_formed() {
    for root in CIRCLE_MAJOR {
        let flat_key = signature_for(Key::major(root)).is_flat();
        for quality in ChordQuality::ALL {
            let chord = resolve(root, quality).unwrap();
            assert_eq!(chord.notes.len(), quality.intervals().len());
            assert!(chord.midi_notes.iter().all(|m| SUPPORTED_MIDI.contains(m)));
            assert_eq!(chord.notation, format!("{}{}", root, quality.symbol()));
            if flat_key {
                assert!(
                    chord.notes.iter().all(|n| n.accidental() != Accidental::Sharp),
                    "{:?}",
                    chord
                );
            }
            for note in layout_chord(&chord) {
                assert!((-10..=120).contains(&note.y), "{} at {}", note.name, note.y);
            }
        }
    }
}

#[test]
fn test_circle_keys_agree_with_signatures() {
    for (index, slot) in slots().into_iter().enumerate() {
        let major = signature_for(Key::major(slot.major));
        let minor = signature_for(Key::minor(slot.minor));
        // A major key and its relative minor share a signature
        assert_eq!(major, minor, "{} / {}m", slot.major, slot.minor);
        assert_eq!(major.fifths(), if index <= 6 { index as i8 } else { index as i8 - 12 });
    }
    assert_eq!(minor_label_for(slot_at(9).major), Some(NoteName::C));
}

#[test]
fn test_staff_is_monotonic() {
    let ys: Vec<i32> = SUPPORTED_MIDI.map(staff_y).collect();
    assert!(ys.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_unknown_inputs_are_errors() {
    assert!(matches!(resolve_symbol("Hm"), Err(HarmoniaError::UnknownNote(_))));
    assert!(matches!(resolve_symbol("Csus4"), Err(HarmoniaError::UnknownQuality(_))));
    assert!(matches!("Zm".parse::<Key>(), Err(HarmoniaError::UnknownKey(_))));
}

#[test]
fn test_advice_failure_falls_back() {
    let source = JsonAdviceSource::new(|_prompt: &str| Err("connection refused".to_string()));
    let request = AdviceRequest::new(NoteName::BFlat, ChordQuality::Minor);
    let advice = fetch_advice(&source, &request);
    assert!(advice.is_fallback());
    assert_eq!(advice.progression[0], "Bb");
    assert_eq!(advice, Advice::fallback(NoteName::BFlat));
}

#[test]
fn test_musicxml_export() {
    let xml = symbol_to_musicxml("Dbmaj7").unwrap();
    assert!(xml.contains("<fifths>-5</fifths>"));
    assert!(xml.contains("<step>D</step>"));
    assert!(xml.contains("<alter>-1</alter>"));
    assert_eq!(xml.matches("<note>").count(), 4);
}

#[test]
fn test_midi_export_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arpeggio.mid");
    let chord = resolve_symbol("G7").unwrap();
    let plan = arpeggio_plan(&chord.midi_notes, 0.3, &AudioSettings::default());
    write_midi(&plan, &chord.notation, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.tracks.len(), 1);
}

#[test]
fn test_settings_file_drives_explorer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harmonia.yaml");
    std::fs::write(
        &path,
        "root: Ab\nquality: major-7\nadvice:\n  enabled: false\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let recorder = MidiRecorder::new();
    let mut explorer =
        Explorer::new(&settings, recorder, harmonia::advisor::OfflineAdvisor).unwrap();
    assert_eq!(explorer.chord().notation, "Abmaj7");

    explorer.play_chord();
    assert_eq!(explorer.player().output().plan().len(), 4);

    // Key 62 (D) is not in Abmaj7: it becomes the new root
    assert_eq!(explorer.press_key(62).unwrap(), KeyPress::NewRoot(NoteName::D));
    assert_eq!(explorer.chord().notation, "Dmaj7");

    explorer.select_slot(0, Ring::Minor).unwrap();
    assert_eq!(explorer.chord().notation, "Amaj7");
}
