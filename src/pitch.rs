//! # Pitch Table
//!
//! Static bidirectional mapping between note names and MIDI numbers.
//!
//! ## Note Vocabulary
//! The engine knows exactly 17 spellings: the 7 naturals plus a sharp and a flat
//! spelling for each of the 5 chromatic pitch classes.
//!
//! ```text
//! pitch class:  0   1      2   3      4   5   6      7   8      9   10     11
//! spellings:    C   C#/Db  D   D#/Eb  E   F   F#/Gb  G   G#/Ab  A   A#/Bb  B
//! ```
//!
//! No double accidentals, no E#/Fb/B#/Cb.
//!
//! ## MIDI Anchor
//! Middle C (C4) = MIDI 60 is the tonal center. Every name maps to a pitch in the
//! anchor octave (60-71). The reverse direction covers two octaves (60-83) so that
//! seventh chords built on B can extend past the octave without wrapping.
//! Reverse lookups always produce the sharp spelling; choosing flats is the
//! resolver's job.

use crate::error::{HarmoniaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Middle C, the reference pitch for the whole engine
pub const MIDDLE_C: u8 = 60;

/// MIDI pitches that have a defined spelling and staff position
pub const SUPPORTED_MIDI: RangeInclusive<u8> = 60..=83;

/// Spelled note names (17 enharmonic spellings of the 12 pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName {
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "Db")]
    DFlat,
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "Eb")]
    EFlat,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "Gb")]
    GFlat,
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "Ab")]
    AFlat,
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "Bb")]
    BFlat,
    B,
}

/// Accidental carried by a spelled note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Glyph drawn next to a note head (empty for naturals)
    pub fn glyph(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "\u{266F}",
            Accidental::Flat => "\u{266D}",
        }
    }
}

impl NoteName {
    /// Every spelling in the vocabulary, in pitch order (sharp before flat)
    pub const ALL: [NoteName; 17] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::DFlat,
        NoteName::D,
        NoteName::DSharp,
        NoteName::EFlat,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::GFlat,
        NoteName::G,
        NoteName::GSharp,
        NoteName::AFlat,
        NoteName::A,
        NoteName::ASharp,
        NoteName::BFlat,
        NoteName::B,
    ];

    /// Chromatic scale using sharps, indexed by pitch class
    pub const CHROMATIC: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::DFlat => "Db",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::EFlat => "Eb",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::GFlat => "Gb",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::AFlat => "Ab",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::BFlat => "Bb",
            NoteName::B => "B",
        }
    }

    /// Pitch class (C=0, B=11)
    pub fn pitch_class(self) -> u8 {
        match self {
            NoteName::C => 0,
            NoteName::CSharp | NoteName::DFlat => 1,
            NoteName::D => 2,
            NoteName::DSharp | NoteName::EFlat => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::FSharp | NoteName::GFlat => 6,
            NoteName::G => 7,
            NoteName::GSharp | NoteName::AFlat => 8,
            NoteName::A => 9,
            NoteName::ASharp | NoteName::BFlat => 10,
            NoteName::B => 11,
        }
    }

    /// MIDI number in the anchor octave (C = 60 ... B = 71)
    pub fn midi(self) -> u8 {
        MIDDLE_C + self.pitch_class()
    }

    /// Letter name the note is written on (determines its staff line)
    pub fn letter(self) -> char {
        match self {
            NoteName::C | NoteName::CSharp => 'C',
            NoteName::DFlat | NoteName::D | NoteName::DSharp => 'D',
            NoteName::EFlat | NoteName::E => 'E',
            NoteName::F | NoteName::FSharp => 'F',
            NoteName::GFlat | NoteName::G | NoteName::GSharp => 'G',
            NoteName::AFlat | NoteName::A | NoteName::ASharp => 'A',
            NoteName::BFlat | NoteName::B => 'B',
        }
    }

    pub fn accidental(self) -> Accidental {
        match self {
            NoteName::CSharp
            | NoteName::DSharp
            | NoteName::FSharp
            | NoteName::GSharp
            | NoteName::ASharp => Accidental::Sharp,
            NoteName::DFlat
            | NoteName::EFlat
            | NoteName::GFlat
            | NoteName::AFlat
            | NoteName::BFlat => Accidental::Flat,
            _ => Accidental::Natural,
        }
    }

    /// Rewrite a sharp spelling as its flat equivalent.
    /// Naturals and flats are returned unchanged.
    pub fn to_flat(self) -> NoteName {
        match self {
            NoteName::CSharp => NoteName::DFlat,
            NoteName::DSharp => NoteName::EFlat,
            NoteName::FSharp => NoteName::GFlat,
            NoteName::GSharp => NoteName::AFlat,
            NoteName::ASharp => NoteName::BFlat,
            other => other,
        }
    }

    /// Black key on a piano (any chromatic spelling)
    pub fn is_black_key(self) -> bool {
        self.accidental() != Accidental::Natural
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = HarmoniaError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        NoteName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == trimmed)
            .ok_or_else(|| HarmoniaError::UnknownNote(trimmed.to_string()))
    }
}

/// Look up the MIDI number of a note name (anchor octave)
///
/// # Example
/// ```
/// use harmonia::pitch::note_to_midi;
///
/// assert_eq!(note_to_midi("C").unwrap(), 60);
/// assert_eq!(note_to_midi("Db").unwrap(), 61);
/// assert!(note_to_midi("Fb").is_err());
/// ```
pub fn note_to_midi(name: &str) -> Result<u8> {
    Ok(name.parse::<NoteName>()?.midi())
}

/// Canonical sharp-biased spelling of a MIDI pitch in the supported range.
///
/// Pitches outside [`SUPPORTED_MIDI`] are rejected rather than wrapped.
pub fn midi_to_note_name(midi: u8) -> Result<NoteName> {
    if !SUPPORTED_MIDI.contains(&midi) {
        return Err(HarmoniaError::MidiOutOfRange { midi });
    }
    Ok(NoteName::CHROMATIC[(midi % 12) as usize])
}

/// Octave number of a MIDI pitch (middle C is in octave 4)
pub fn octave_of(midi: u8) -> i8 {
    (midi / 12) as i8 - 1
}

/// Frequency in Hz (A4 = 440 Hz)
pub fn midi_to_frequency(midi: u8) -> f64 {
    440.0 * 2.0_f64.powf((midi as f64 - 69.0) / 12.0)
}
