//! # Chord Vocabulary
//!
//! The seven chord qualities the engine understands, their interval sets and the
//! short symbols used in chord notation (C, Am, G7, Dm7, ...).
//!
//! ## Supported Qualities
//! - **Major**: `""` -> root, major 3rd, perfect 5th
//! - **Minor**: `m` -> root, minor 3rd, perfect 5th
//! - **Diminished**: `dim` -> root, minor 3rd, diminished 5th
//! - **Augmented**: `aug` -> root, major 3rd, augmented 5th
//! - **Dominant 7th**: `7` -> major triad + minor 7th
//! - **Major 7th**: `maj7` -> major triad + major 7th
//! - **Minor 7th**: `m7` -> minor triad + minor 7th
//!
//! Intervals: minor 3rd = +3, major 3rd = +4, diminished 5th = +6,
//! perfect 5th = +7, augmented 5th = +8, minor 7th = +10, major 7th = +11

use crate::error::{HarmoniaError, Result};
use crate::pitch::NoteName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    #[serde(rename = "dominant-7")]
    Dominant7,
    #[serde(rename = "major-7")]
    Major7,
    #[serde(rename = "minor-7")]
    Minor7,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 7] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
    ];

    /// Semitone offsets from the root, strictly ascending, always starting at 0
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
        }
    }

    /// Suffix appended to the root name in chord notation
    pub fn symbol(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "Major",
            ChordQuality::Minor => "Minor",
            ChordQuality::Diminished => "Diminished",
            ChordQuality::Augmented => "Augmented",
            ChordQuality::Dominant7 => "Dominant 7th",
            ChordQuality::Major7 => "Major 7th",
            ChordQuality::Minor7 => "Minor 7th",
        }
    }

    pub fn is_seventh(self) -> bool {
        self.intervals().len() == 4
    }

    /// Match a notation suffix, including the common aliases
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "" | "maj" | "M" => Some(ChordQuality::Major),
            "m" | "min" | "-" => Some(ChordQuality::Minor),
            "dim" | "\u{00B0}" => Some(ChordQuality::Diminished),
            "aug" | "+" => Some(ChordQuality::Augmented),
            "7" => Some(ChordQuality::Dominant7),
            "maj7" | "M7" => Some(ChordQuality::Major7),
            "m7" | "min7" | "-7" => Some(ChordQuality::Minor7),
            _ => None,
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordQuality {
    type Err = HarmoniaError;

    /// Accepts display names ("Dominant 7th"), kebab-case names ("dominant-7")
    /// and non-empty symbols ("m7", "dim").
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            if let Some(quality) = ChordQuality::from_symbol(trimmed) {
                return Ok(quality);
            }
        }
        let normalized = trimmed.to_lowercase().replace([' ', '_'], "-");
        let quality = match normalized.as_str() {
            "major" => ChordQuality::Major,
            "minor" => ChordQuality::Minor,
            "diminished" => ChordQuality::Diminished,
            "augmented" => ChordQuality::Augmented,
            "dominant-7" | "dominant-7th" | "dom7" => ChordQuality::Dominant7,
            "major-7" | "major-7th" => ChordQuality::Major7,
            "minor-7" | "minor-7th" => ChordQuality::Minor7,
            _ => return Err(HarmoniaError::UnknownQuality(trimmed.to_string())),
        };
        Ok(quality)
    }
}

/// Split a chord symbol into its root and quality
///
/// The root is the longest note name the symbol starts with ("C#m" is C# minor,
/// not C followed by "#m"); the remainder must be a known quality symbol.
///
/// # Examples
/// ```
/// use harmonia::chord::{parse_chord_symbol, ChordQuality};
/// use harmonia::pitch::NoteName;
///
/// assert_eq!(parse_chord_symbol("C").unwrap(), (NoteName::C, ChordQuality::Major));
/// assert_eq!(parse_chord_symbol("Gm7").unwrap(), (NoteName::G, ChordQuality::Minor7));
/// assert_eq!(parse_chord_symbol("Bbmaj7").unwrap(), (NoteName::BFlat, ChordQuality::Major7));
/// assert!(parse_chord_symbol("Csus4").is_err());
/// ```
pub fn parse_chord_symbol(chord_symbol: &str) -> Result<(NoteName, ChordQuality)> {
    let symbol = chord_symbol.trim();

    let root = NoteName::ALL
        .iter()
        .copied()
        .filter(|name| symbol.starts_with(name.as_str()))
        .max_by_key(|name| name.as_str().len())
        .ok_or_else(|| HarmoniaError::UnknownNote(symbol.to_string()))?;

    let suffix = &symbol[root.as_str().len()..];
    let quality = ChordQuality::from_symbol(suffix)
        .ok_or_else(|| HarmoniaError::UnknownQuality(suffix.to_string()))?;

    Ok((root, quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_are_well_formed() {
        for quality in ChordQuality::ALL {
            let intervals = quality.intervals();
            assert_eq!(intervals[0], 0, "{:?} must start at the root", quality);
            assert!(intervals.len() == 3 || intervals.len() == 4);
            assert!(intervals.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_symbols() {
        let symbols: Vec<&str> = ChordQuality::ALL.iter().map(|q| q.symbol()).collect();
        assert_eq!(symbols, vec!["", "m", "dim", "aug", "7", "maj7", "m7"]);
    }

    #[test]
    fn test_sevenths() {
        assert!(ChordQuality::Dominant7.is_seventh());
        assert!(ChordQuality::Minor7.is_seventh());
        assert!(!ChordQuality::Augmented.is_seventh());
    }

    #[test]
    fn test_parse_quality_names() {
        assert_eq!("major".parse::<ChordQuality>().unwrap(), ChordQuality::Major);
        assert_eq!("Dominant 7th".parse::<ChordQuality>().unwrap(), ChordQuality::Dominant7);
        assert_eq!("minor-7".parse::<ChordQuality>().unwrap(), ChordQuality::Minor7);
        assert_eq!("maj7".parse::<ChordQuality>().unwrap(), ChordQuality::Major7);
        assert_eq!("dim".parse::<ChordQuality>().unwrap(), ChordQuality::Diminished);
        assert!(matches!(
            "sus2".parse::<ChordQuality>(),
            Err(HarmoniaError::UnknownQuality(_))
        ));
        assert!("".parse::<ChordQuality>().is_err());
    }

    #[test]
    fn test_chord_symbol_parsing() {
        assert_eq!(parse_chord_symbol("Dm").unwrap(), (NoteName::D, ChordQuality::Minor));
        assert_eq!(parse_chord_symbol("G7").unwrap(), (NoteName::G, ChordQuality::Dominant7));
        assert_eq!(parse_chord_symbol("F#").unwrap(), (NoteName::FSharp, ChordQuality::Major));
        assert_eq!(parse_chord_symbol("C#m7").unwrap(), (NoteName::CSharp, ChordQuality::Minor7));
        assert_eq!(parse_chord_symbol("Ebaug").unwrap(), (NoteName::EFlat, ChordQuality::Augmented));
        assert_eq!(parse_chord_symbol("Bdim").unwrap(), (NoteName::B, ChordQuality::Diminished));
        assert_eq!(parse_chord_symbol("A-7").unwrap(), (NoteName::A, ChordQuality::Minor7));
    }

    #[test]
    fn test_chord_symbol_errors() {
        assert!(matches!(parse_chord_symbol("Hm"), Err(HarmoniaError::UnknownNote(_))));
        assert!(matches!(parse_chord_symbol("?"), Err(HarmoniaError::UnknownNote(_))));
        assert!(matches!(parse_chord_symbol("C9"), Err(HarmoniaError::UnknownQuality(_))));
    }

    #[test]
    fn test_flat_root_is_not_read_as_b() {
        // "Bb" is B-flat major, "Bbm" is B-flat minor
        assert_eq!(parse_chord_symbol("Bb").unwrap(), (NoteName::BFlat, ChordQuality::Major));
        assert_eq!(parse_chord_symbol("Bbm").unwrap(), (NoteName::BFlat, ChordQuality::Minor));
    }
}
