//! # Key Signature Table
//!
//! Static mapping from a key (major or minor root) to the accidentals written at
//! the start of the staff, plus the vertical slots those accidentals occupy.
//!
//! ## Keys
//! A [`Key`] is a root plus an explicit [`Mode`]. Whether a key is minor is part of
//! its type, never guessed from a name: `Key::minor(NoteName::A)` and
//! `Key::major(NoteName::A)` are different lookups. Text such as `"F#m"` is parsed
//! into a `Key` at the boundary with [`Key::from_str`](std::str::FromStr).
//!
//! ## Lookup Misses
//! Keys that have no conventional signature in the table (G# major, Db minor, ...)
//! resolve to "no accidentals" instead of failing, so a staff can always be drawn.
//! This leniency is part of the contract; it is not a correctness guarantee.
//!
//! ## Accidental Order
//! - Sharps are written F C G D A E B
//! - Flats are written B E A D G C F
//!
//! The slot tables below always hold all seven positions in that order, no matter
//! how many accidentals a signature actually draws.

use crate::error::{HarmoniaError, Result};
use crate::pitch::NoteName;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Vertical slots (treble clef) of the 1st..7th sharp: F, C, G, D, A, E, B
pub const SHARP_SLOTS: [i32; 7] = [10, 40, 0, 30, 60, 20, 50];

/// Vertical slots (treble clef) of the 1st..7th flat: B, E, A, D, G, C, F
pub const FLAT_SLOTS: [i32; 7] = [50, 20, 60, 30, 70, 40, 80];

pub const SHARP_ORDER: [char; 7] = ['F', 'C', 'G', 'D', 'A', 'E', 'B'];
pub const FLAT_ORDER: [char; 7] = ['B', 'E', 'A', 'D', 'G', 'C', 'F'];

/// Mode for key signature lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// A key: tonic plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub root: NoteName,
    pub mode: Mode,
}

impl Key {
    pub fn major(root: NoteName) -> Self {
        Self { root, mode: Mode::Major }
    }

    pub fn minor(root: NoteName) -> Self {
        Self { root, mode: Mode::Minor }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.root),
            Mode::Minor => write!(f, "{}m", self.root),
        }
    }
}

impl FromStr for Key {
    type Err = HarmoniaError;

    /// Parse "C", "Bb", "Am", "F#m", ...
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(root) = trimmed.strip_suffix('m') {
            if let Ok(root) = root.parse::<NoteName>() {
                return Ok(Key::minor(root));
            }
        }
        trimmed
            .parse::<NoteName>()
            .map(Key::major)
            .map_err(|_| HarmoniaError::UnknownKey(trimmed.to_string()))
    }
}

/// Kind of accidental used by a key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccidentalType {
    None,
    Sharp,
    Flat,
}

impl AccidentalType {
    pub fn glyph(self) -> &'static str {
        match self {
            AccidentalType::None => "",
            AccidentalType::Sharp => "\u{266F}",
            AccidentalType::Flat => "\u{266D}",
        }
    }
}

/// Number and kind of accidentals in a key signature.
///
/// `kind` is `None` exactly when `count` is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeySignature {
    #[serde(rename = "type")]
    pub kind: AccidentalType,
    pub count: u8,
}

/// One accidental glyph of a drawn key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccidentalPlacement {
    pub letter: char,
    pub y: i32,
    pub glyph: &'static str,
}

impl KeySignature {
    pub const NONE: KeySignature = KeySignature {
        kind: AccidentalType::None,
        count: 0,
    };

    const fn sharps(count: u8) -> Self {
        Self {
            kind: AccidentalType::Sharp,
            count,
        }
    }

    const fn flats(count: u8) -> Self {
        Self {
            kind: AccidentalType::Flat,
            count,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.kind == AccidentalType::Flat
    }

    pub fn is_sharp(&self) -> bool {
        self.kind == AccidentalType::Sharp
    }

    /// Position on the circle of fifths: positive = sharps, negative = flats
    pub fn fifths(&self) -> i8 {
        match self.kind {
            AccidentalType::None => 0,
            AccidentalType::Sharp => self.count as i8,
            AccidentalType::Flat => -(self.count as i8),
        }
    }

    /// Letters altered by this signature, in writing order
    pub fn altered_letters(&self) -> &'static [char] {
        let order: &'static [char] = match self.kind {
            AccidentalType::None => &[],
            AccidentalType::Sharp => &SHARP_ORDER,
            AccidentalType::Flat => &FLAT_ORDER,
        };
        &order[..(self.count as usize).min(order.len())]
    }

    /// Glyphs to draw, left to right
    pub fn placements(&self) -> Vec<AccidentalPlacement> {
        let slots = placement_slots(self.kind);
        self.altered_letters()
            .iter()
            .zip(slots.iter())
            .map(|(&letter, &y)| AccidentalPlacement {
                letter,
                y,
                glyph: self.kind.glyph(),
            })
            .collect()
    }
}

/// Vertical slots for the given accidental kind, in writing order
pub fn placement_slots(kind: AccidentalType) -> &'static [i32] {
    match kind {
        AccidentalType::None => &[],
        AccidentalType::Sharp => &SHARP_SLOTS,
        AccidentalType::Flat => &FLAT_SLOTS,
    }
}

/// Key signature of a key, or no accidentals when the key is not in the table
///
/// # Example
/// ```
/// use harmonia::key_signature::{signature_for, AccidentalType, Key};
/// use harmonia::pitch::NoteName;
///
/// let sig = signature_for(Key::major(NoteName::EFlat));
/// assert_eq!(sig.kind, AccidentalType::Flat);
/// assert_eq!(sig.count, 3);
///
/// let sig = signature_for(Key::minor(NoteName::E));
/// assert_eq!(sig.kind, AccidentalType::Sharp);
/// assert_eq!(sig.count, 1);
/// ```
pub fn signature_for(key: Key) -> KeySignature {
    lookup(key).unwrap_or_else(|| {
        log::debug!("no key signature for {}, drawing none", key);
        KeySignature::NONE
    })
}

fn lookup(key: Key) -> Option<KeySignature> {
    use NoteName::*;

    let signature = match (key.mode, key.root) {
        (Mode::Major, C) => KeySignature::NONE,
        (Mode::Major, G) => KeySignature::sharps(1),
        (Mode::Major, D) => KeySignature::sharps(2),
        (Mode::Major, A) => KeySignature::sharps(3),
        (Mode::Major, E) => KeySignature::sharps(4),
        (Mode::Major, B) => KeySignature::sharps(5),
        (Mode::Major, FSharp) => KeySignature::sharps(6),
        (Mode::Major, CSharp) => KeySignature::sharps(7),
        (Mode::Major, F) => KeySignature::flats(1),
        (Mode::Major, BFlat) => KeySignature::flats(2),
        (Mode::Major, EFlat) => KeySignature::flats(3),
        (Mode::Major, AFlat) => KeySignature::flats(4),
        (Mode::Major, DFlat) => KeySignature::flats(5),
        (Mode::Major, GFlat) => KeySignature::flats(6),

        (Mode::Minor, A) => KeySignature::NONE,
        (Mode::Minor, E) => KeySignature::sharps(1),
        (Mode::Minor, B) => KeySignature::sharps(2),
        (Mode::Minor, FSharp) => KeySignature::sharps(3),
        (Mode::Minor, CSharp) => KeySignature::sharps(4),
        (Mode::Minor, GSharp) => KeySignature::sharps(5),
        (Mode::Minor, DSharp) => KeySignature::sharps(6),
        (Mode::Minor, ASharp) => KeySignature::sharps(7),
        (Mode::Minor, D) => KeySignature::flats(1),
        (Mode::Minor, G) => KeySignature::flats(2),
        (Mode::Minor, C) => KeySignature::flats(3),
        (Mode::Minor, F) => KeySignature::flats(4),
        (Mode::Minor, BFlat) => KeySignature::flats(5),
        (Mode::Minor, EFlat) => KeySignature::flats(6),
        (Mode::Minor, AFlat) => KeySignature::flats(7),

        _ => return None,
    };
    Some(signature)
}
