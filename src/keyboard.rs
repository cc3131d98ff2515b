//! Two-octave piano keyboard model (C4 to B5) with the current chord highlighted.
//!
//! Keys are labelled with their sharp spelling; chord members carry an interval
//! label relative to the root ("+0", "+4", "+7").

use crate::pitch::{midi_to_note_name, NoteName, SUPPORTED_MIDI};
use crate::resolver::ChordDefinition;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PianoKey {
    pub midi: u8,
    pub name: NoteName,
    pub black: bool,
    pub highlighted: bool,
    pub interval_label: Option<String>,
}

/// Every key of the keyboard, lowest first
pub fn keyboard(chord: &ChordDefinition) -> Vec<PianoKey> {
    SUPPORTED_MIDI
        .filter_map(|midi| {
            let name = midi_to_note_name(midi).ok()?;
            Some(PianoKey {
                midi,
                name,
                black: name.is_black_key(),
                highlighted: chord.contains(midi),
                interval_label: chord.interval_label(midi),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ChordQuality;
    use crate::resolver::resolve;

    #[test]
    fn test_two_octaves() {
        let chord = resolve(NoteName::C, ChordQuality::Major).unwrap();
        let keys = keyboard(&chord);
        assert_eq!(keys.len(), 24);
        assert_eq!(keys.iter().filter(|k| k.black).count(), 10);
        assert_eq!(keys[0].name, NoteName::C);
        assert_eq!(keys[23].midi, 83);
    }

    #[test]
    fn test_chord_members_are_labelled() {
        let chord = resolve(NoteName::A, ChordQuality::Dominant7).unwrap();
        let keys = keyboard(&chord);
        let labelled: Vec<(u8, String)> = keys
            .iter()
            .filter_map(|k| k.interval_label.clone().map(|l| (k.midi, l)))
            .collect();
        assert_eq!(
            labelled,
            vec![
                (69, "+0".to_string()),
                (73, "+4".to_string()),
                (76, "+7".to_string()),
                (79, "+10".to_string()),
            ]
        );
        assert_eq!(keys.iter().filter(|k| k.highlighted).count(), 4);
    }

    #[test]
    fn test_keys_use_sharp_names_even_in_flat_chords() {
        let chord = resolve(NoteName::DFlat, ChordQuality::Major).unwrap();
        let key = keyboard(&chord).into_iter().find(|k| k.midi == 61).unwrap();
        assert_eq!(key.name, NoteName::CSharp);
        assert!(key.highlighted);
    }
}
