//! # Chord Resolver
//!
//! Turns a root and a chord quality into a fully spelled [`ChordDefinition`].
//!
//! ## Pipeline
//! 1. Look up the root's MIDI anchor (middle-C octave)
//! 2. Add each interval of the quality to get the MIDI notes
//! 3. Spell every MIDI note with the canonical sharp name
//! 4. If the root's major key signature uses flats, respell every sharp as its
//!    flat equivalent (naturals are never touched)
//! 5. Build the notation string: root name immediately followed by the symbol
//!
//! ## Spelling Context
//! Spelling follows the root, not the interval: the pitch class 8 is "G#" in an
//! E major chord but "Ab" in an F minor chord, because F's key signature uses
//! flats. This is what keeps a flat-key chord free of sharp glyphs.
//!
//! ## Example
//! ```rust
//! use harmonia::{resolve, ChordQuality, NoteName};
//!
//! let chord = resolve(NoteName::F, ChordQuality::Minor7)?;
//! assert_eq!(chord.midi_notes, vec![65, 68, 72, 75]);
//! assert_eq!(chord.notation, "Fm7");
//! # Ok::<(), harmonia::HarmoniaError>(())
//! ```

use crate::chord::{parse_chord_symbol, ChordQuality};
use crate::error::Result;
use crate::key_signature::{signature_for, Key};
use crate::pitch::{midi_to_note_name, NoteName};
use serde::Serialize;

/// A resolved chord.
///
/// # Fields
/// - `root`: Root as selected by the user (its spelling is kept in `notation`)
/// - `quality`: Chord quality
/// - `notes`: Spelled notes, one per interval, in interval order
/// - `midi_notes`: MIDI numbers, root MIDI + each interval
/// - `notation`: Compact chord symbol, e.g. "Gm7"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordDefinition {
    pub root: NoteName,
    #[serde(rename = "type")]
    pub quality: ChordQuality,
    pub notes: Vec<NoteName>,
    pub midi_notes: Vec<u8>,
    pub notation: String,
}

impl ChordDefinition {
    pub fn intervals(&self) -> &'static [u8] {
        self.quality.intervals()
    }

    pub fn contains(&self, midi: u8) -> bool {
        self.midi_notes.contains(&midi)
    }

    /// Interval label for a chord member ("+0", "+4", ...), `None` otherwise
    pub fn interval_label(&self, midi: u8) -> Option<String> {
        let index = self.midi_notes.iter().position(|&m| m == midi)?;
        self.intervals()
            .get(index)
            .map(|interval| format!("+{}", interval))
    }

    /// Spelled note and MIDI number pairs
    pub fn spelled(&self) -> impl Iterator<Item = (NoteName, u8)> + '_ {
        self.notes
            .iter()
            .copied()
            .zip(self.midi_notes.iter().copied())
    }
}

/// Resolve a chord from its root and quality
pub fn resolve(root: NoteName, quality: ChordQuality) -> Result<ChordDefinition> {
    let root_midi = root.midi();
    let midi_notes: Vec<u8> = quality
        .intervals()
        .iter()
        .map(|interval| root_midi + interval)
        .collect();

    let prefer_flat = signature_for(Key::major(root)).is_flat();
    let notes = midi_notes
        .iter()
        .map(|&midi| -> Result<NoteName> {
            let name = midi_to_note_name(midi)?;
            Ok(if prefer_flat { name.to_flat() } else { name })
        })
        .collect::<Result<Vec<NoteName>>>()?;

    let notation = format!("{}{}", root, quality.symbol());
    log::debug!("resolved {} -> {:?} {:?}", notation, notes, midi_notes);

    Ok(ChordDefinition {
        root,
        quality,
        notes,
        midi_notes,
        notation,
    })
}

/// Resolve a chord written as a symbol ("C", "Am", "Bbmaj7")
pub fn resolve_symbol(chord_symbol: &str) -> Result<ChordDefinition> {
    let (root, quality) = parse_chord_symbol(chord_symbol)?;
    resolve(root, quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::CIRCLE_MAJOR;
    use crate::pitch::Accidental;
    use NoteName::*;

    fn notes(root: NoteName, quality: ChordQuality) -> Vec<NoteName> {
        resolve(root, quality).unwrap().notes
    }

    #[test]
    fn test_c_major() {
        let chord = resolve(C, ChordQuality::Major).unwrap();
        assert_eq!(chord.notes, vec![C, E, G]);
        assert_eq!(chord.midi_notes, vec![60, 64, 67]);
        assert_eq!(chord.notation, "C");
    }

    #[test]
    fn test_f_minor_seventh_uses_flats() {
        let chord = resolve(F, ChordQuality::Minor7).unwrap();
        assert_eq!(chord.notes, vec![F, AFlat, C, EFlat]);
        assert_eq!(chord.midi_notes, vec![65, 68, 72, 75]);
        assert_eq!(chord.notation, "Fm7");
    }

    #[test]
    fn test_g_minor_seventh_notation() {
        let chord = resolve(G, ChordQuality::Minor7).unwrap();
        assert_eq!(chord.notation, "Gm7");
        assert_eq!(chord.midi_notes, vec![67, 70, 74, 77]);
    }

    #[test]
    fn test_sharp_keys_keep_sharps() {
        assert_eq!(notes(E, ChordQuality::Major), vec![E, GSharp, B]);
        assert_eq!(notes(D, ChordQuality::Dominant7), vec![D, FSharp, A, C]);
        assert_eq!(notes(FSharp, ChordQuality::Minor), vec![FSharp, A, CSharp]);
    }

    #[test]
    fn test_flat_roots_respell_every_chromatic_tone() {
        assert_eq!(notes(DFlat, ChordQuality::Major), vec![DFlat, F, AFlat]);
        assert_eq!(notes(EFlat, ChordQuality::Major7), vec![EFlat, G, BFlat, D]);
        assert_eq!(notes(BFlat, ChordQuality::Minor), vec![BFlat, DFlat, F]);
        assert_eq!(notes(GFlat, ChordQuality::Major), vec![GFlat, BFlat, DFlat]);
    }

    #[test]
    fn test_same_pitch_spelled_by_context() {
        // pitch class 8: G# above E, Ab above F
        assert_eq!(notes(E, ChordQuality::Major)[1], GSharp);
        assert_eq!(notes(F, ChordQuality::Minor)[1], AFlat);
    }

    #[test]
    fn test_seventh_chords_cross_the_octave() {
        let chord = resolve(B, ChordQuality::Major7).unwrap();
        assert_eq!(chord.midi_notes, vec![71, 75, 78, 82]);
        assert_eq!(chord.notes, vec![B, DSharp, FSharp, ASharp]);
    }

    #[test]
    fn test_every_circle_root_and_quality() {
        for root in CIRCLE_MAJOR {
            for quality in ChordQuality::ALL {
                let chord = resolve(root, quality).unwrap();
                let intervals = quality.intervals();
                assert_eq!(chord.notes.len(), intervals.len());
                let expected: Vec<u8> = intervals.iter().map(|i| root.midi() + i).collect();
                assert_eq!(chord.midi_notes, expected);
                assert!(chord.midi_notes.windows(2).all(|w| w[0] < w[1]));
                assert_eq!(chord.notation, format!("{}{}", root, quality.symbol()));
                for (name, midi) in chord.spelled() {
                    assert_eq!(name.pitch_class(), midi % 12, "{} in {}", name, chord.notation);
                }
            }
        }
    }

    #[test]
    fn test_flat_key_chords_have_no_sharps() {
        for root in NoteName::ALL {
            if !signature_for(Key::major(root)).is_flat() {
                continue;
            }
            for quality in ChordQuality::ALL {
                let chord = resolve(root, quality).unwrap();
                assert!(
                    chord.notes.iter().all(|n| n.accidental() != Accidental::Sharp),
                    "{} spelled {:?}",
                    chord.notation,
                    chord.notes
                );
            }
        }
    }

    #[test]
    fn test_interval_labels() {
        let chord = resolve(C, ChordQuality::Dominant7).unwrap();
        assert_eq!(chord.interval_label(60).as_deref(), Some("+0"));
        assert_eq!(chord.interval_label(70).as_deref(), Some("+10"));
        assert_eq!(chord.interval_label(61), None);
        assert!(chord.contains(67));
    }

    #[test]
    fn test_resolve_symbol() {
        let chord = resolve_symbol("Abmaj7").unwrap();
        assert_eq!(chord.notes, vec![AFlat, C, EFlat, G]);
        assert!(resolve_symbol("Xm").is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let chord = resolve(A, ChordQuality::Minor).unwrap();
        let json = serde_json::to_value(&chord).unwrap();
        assert_eq!(json["root"], "A");
        assert_eq!(json["type"], "minor");
        assert_eq!(json["notes"], serde_json::json!(["A", "C", "E"]));
        assert_eq!(json["midiNotes"], serde_json::json!([69, 72, 76]));
        assert_eq!(json["notation"], "Am");
    }
}
