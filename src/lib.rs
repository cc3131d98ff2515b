pub mod advisor;
pub mod audio;
pub mod chord;
pub mod circle;
pub mod config;
pub mod error;
pub mod explorer;
pub mod key_signature;
pub mod keyboard;
pub mod midi;
pub mod musicxml;
pub mod pitch;
pub mod resolver;
pub mod staff;

pub use chord::{parse_chord_symbol, ChordQuality};
pub use error::*;
pub use key_signature::{signature_for, Key, KeySignature, Mode};
pub use musicxml::chord_to_musicxml;
pub use pitch::{midi_to_note_name, note_to_midi, NoteName};
pub use resolver::{resolve, resolve_symbol, ChordDefinition};
pub use staff::{layout_chord, staff_y};

/// Resolve a chord symbol and render it as MusicXML.
pub fn symbol_to_musicxml(chord_symbol: &str) -> Result<String> {
    let chord = resolve_symbol(chord_symbol)?;
    Ok(chord_to_musicxml(&chord))
}
