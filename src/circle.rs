//! # Circle of Fifths
//!
//! Geometry of the circle-of-fifths selector: twelve slots ordered by ascending
//! perfect fifths, each with a major key on the outer ring and its relative minor
//! on the inner ring.
//!
//! ## Labels
//! ```text
//! index:  0  1  2  3  4  5  6   7   8   9   10  11
//! major:  C  G  D  A  E  B  F#  Db  Ab  Eb  Bb  F
//! minor:  A  E  B  F# C# G# D#  Bb  F   C   G   D
//! ```
//! Spelling flips from sharps to flats between F# and Db. The key signature table
//! and the resolver use the same spellings, so every label on the circle resolves
//! to a chord spelled in its own key.
//!
//! The relative minors are a fixed table rather than "down a minor third", because
//! the minor of a flat-side key is not always spelled with a flat.

use crate::pitch::NoteName;
use serde::Serialize;

/// Major labels, ascending fifths from C
pub const CIRCLE_MAJOR: [NoteName; 12] = [
    NoteName::C,
    NoteName::G,
    NoteName::D,
    NoteName::A,
    NoteName::E,
    NoteName::B,
    NoteName::FSharp,
    NoteName::DFlat,
    NoteName::AFlat,
    NoteName::EFlat,
    NoteName::BFlat,
    NoteName::F,
];

/// Degrees between neighbouring slots
pub const SLOT_ANGLE: f64 = 30.0;

/// One position on the circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleSlot {
    pub index: usize,
    pub major: NoteName,
    pub minor: NoteName,
    /// Clockwise from 12 o'clock
    pub angle_degrees: f64,
}

impl CircleSlot {
    /// The slot a perfect fifth above (wraps from F back to C)
    pub fn next_fifth(&self) -> CircleSlot {
        slot_at(self.index + 1)
    }

    /// The slot a perfect fifth below
    pub fn previous_fifth(&self) -> CircleSlot {
        slot_at(self.index + 11)
    }

    /// Screen position of this slot on a ring of `radius` around `(cx, cy)`,
    /// with y growing downwards
    pub fn point(&self, cx: f64, cy: f64, radius: f64) -> (f64, f64) {
        let radians = (self.angle_degrees - 90.0).to_radians();
        (cx + radius * radians.cos(), cy + radius * radians.sin())
    }
}

/// Slot at a circle index; indices wrap modulo 12
///
/// # Example
/// ```
/// use harmonia::circle::slot_at;
/// use harmonia::pitch::NoteName;
///
/// let slot = slot_at(7);
/// assert_eq!(slot.major, NoteName::DFlat);
/// assert_eq!(slot.minor, NoteName::BFlat);
/// assert_eq!(slot.angle_degrees, 210.0);
/// ```
pub fn slot_at(index: usize) -> CircleSlot {
    let index = index % CIRCLE_MAJOR.len();
    let major = CIRCLE_MAJOR[index];
    CircleSlot {
        index,
        major,
        minor: RELATIVE_MINOR[index],
        angle_degrees: index as f64 * SLOT_ANGLE,
    }
}

/// All twelve slots in circle order
pub fn slots() -> Vec<CircleSlot> {
    (0..CIRCLE_MAJOR.len()).map(slot_at).collect()
}

/// Relative minor of a major label on the circle
pub fn minor_label_for(major: NoteName) -> Option<NoteName> {
    index_of(major).map(|index| RELATIVE_MINOR[index])
}

/// Circle index of a major label
pub fn index_of(major: NoteName) -> Option<usize> {
    CIRCLE_MAJOR.iter().position(|&label| label == major)
}

/// Slot whose inner ring carries the given minor label
pub fn slot_for_minor(minor: NoteName) -> Option<CircleSlot> {
    RELATIVE_MINOR
        .iter()
        .position(|&label| label == minor)
        .map(slot_at)
}

const RELATIVE_MINOR: [NoteName; 12] = [
    NoteName::A,      // C
    NoteName::E,      // G
    NoteName::B,      // D
    NoteName::FSharp, // A
    NoteName::CSharp, // E
    NoteName::GSharp, // B
    NoteName::DSharp, // F#
    NoteName::BFlat,  // Db
    NoteName::F,      // Ab
    NoteName::C,      // Eb
    NoteName::G,      // Bb
    NoteName::D,      // F
];
