//! # Staff Position Mapper
//!
//! Maps pitches to vertical coordinates on a treble staff.
//!
//! ## Coordinate System
//! ```text
//!   y =   0  ---  A5  (ledger line above)
//!   y =  10       G5
//!   y =  20  ===  F5  (top line)
//!   y =  40  ===  D5
//!   y =  60  ===  B4  (middle line)
//!   y =  80  ===  G4
//!   y = 100  ===  E4  (bottom line)
//!   y = 110       D4
//!   y = 120  ---  C4  (ledger line below, middle C)
//! ```
//! Each diatonic step is 10 units; smaller y is higher on the page. A note is
//! placed by its letter, so C and C# share the C4 ledger line and only the
//! accidental glyph tells them apart.
//!
//! ## Lookup Misses
//! Pitches outside the supported two octaves are drawn on the middle line
//! ([`MID_STAFF_Y`]) instead of failing. Like the key signature fallback this keeps
//! rendering robust; it does not make the drawing correct.

use crate::pitch::{Accidental, NoteName, MIDDLE_C, SUPPORTED_MIDI};
use crate::resolver::ChordDefinition;
use serde::Serialize;

/// y of the five staff lines, top to bottom
pub const STAFF_LINES: [i32; 5] = [20, 40, 60, 80, 100];

/// Fallback position for pitches outside the table (the middle line)
pub const MID_STAFF_Y: i32 = 60;

/// Ledger line under the staff (middle C)
pub const LOWER_LEDGER_Y: i32 = 120;

/// Ledger line over the staff (A5)
pub const UPPER_LEDGER_Y: i32 = 0;

const STEP: i32 = 10;

/// A chord member ready to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffNote {
    pub name: NoteName,
    pub midi: u8,
    pub y: i32,
    pub accidental: Accidental,
    /// y of the ledger line through or under the note head, if one is needed
    pub ledger_y: Option<i32>,
}

/// Vertical position of a MIDI pitch, sharp spelling assumed
///
/// # Example
/// ```
/// use harmonia::staff::staff_y;
///
/// assert_eq!(staff_y(60), 120); // middle C, ledger line
/// assert_eq!(staff_y(61), 120); // C# shares the slot
/// assert_eq!(staff_y(64), 100); // E4, bottom line
/// assert_eq!(staff_y(40), 60);  // out of range: middle line
/// ```
pub fn staff_y(midi: u8) -> i32 {
    match midi {
        60 | 61 => 120,
        62 | 63 => 110,
        64 => 100,
        65 | 66 => 90,
        67 | 68 => 80,
        69 | 70 => 70,
        71 => 60,
        72 | 73 => 50,
        74 | 75 => 40,
        76 => 30,
        77 | 78 => 20,
        79 | 80 => 10,
        81 | 82 => 0,
        83 => -10,
        _ => MID_STAFF_Y,
    }
}

/// Vertical position of a spelled note: flats sit on their own letter (Eb on the
/// E line, not the D space).
///
/// Falls back to [`staff_y`] when the name does not spell the pitch.
pub fn staff_y_spelled(name: NoteName, midi: u8) -> i32 {
    if !SUPPORTED_MIDI.contains(&midi) || name.pitch_class() != midi % 12 {
        return staff_y(midi);
    }
    let octave = (midi - MIDDLE_C) as i32 / 12;
    let steps = letter_index(name.letter()) + 7 * octave;
    LOWER_LEDGER_Y - STEP * steps
}

fn letter_index(letter: char) -> i32 {
    match letter {
        'C' => 0,
        'D' => 1,
        'E' => 2,
        'F' => 3,
        'G' => 4,
        'A' => 5,
        _ => 6,
    }
}

/// Ledger line needed for a note drawn at `y`, if any
pub fn ledger_line_y(y: i32) -> Option<i32> {
    if y >= LOWER_LEDGER_Y {
        Some(LOWER_LEDGER_Y)
    } else if y <= UPPER_LEDGER_Y {
        Some(UPPER_LEDGER_Y)
    } else {
        None
    }
}

/// Whether a pitch in the supported range sits on or beyond a ledger line.
/// Middle C, the tonal center, always does.
pub fn needs_ledger_line(midi: u8) -> bool {
    SUPPORTED_MIDI.contains(&midi) && ledger_line_y(staff_y(midi)).is_some()
}

/// Positions of every note of a chord, in chord order
pub fn layout_chord(chord: &ChordDefinition) -> Vec<StaffNote> {
    chord
        .spelled()
        .map(|(name, midi)| {
            let y = staff_y_spelled(name, midi);
            StaffNote {
                name,
                midi,
                y,
                accidental: name.accidental(),
                ledger_y: ledger_line_y(y),
            }
        })
        .collect()
}
