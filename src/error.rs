//! # Error Types
//!
//! This module defines the error type shared by every part of the Harmonia engine.
//!
//! Only the closed vocabularies (note names, chord qualities, key names) and the
//! supported MIDI range are validated strictly. Lookups that are lenient by contract
//! (key signatures, staff positions) never produce an error; they fall back to a
//! documented default instead.
//!
//! ## Error Types
//! - `UnknownNote` - a note name outside the 17-name vocabulary
//! - `UnknownQuality` - a chord quality name or symbol that is not recognised
//! - `UnknownKey` - a key name that cannot be parsed
//! - `MidiOutOfRange` - a MIDI pitch outside the two supported octaves
//! - `ConfigError` - invalid YAML settings
//! - `Io` - file system failures while loading settings or writing exports
//!
//! ## Usage
//! ```rust
//! use harmonia::{resolve_symbol, HarmoniaError};
//!
//! match resolve_symbol("H7") {
//!     Ok(chord) => println!("{}", chord.notation),
//!     Err(HarmoniaError::UnknownNote(name)) => eprintln!("no such note: {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarmoniaError {
    /// A note name outside the closed vocabulary.
    ///
    /// # Example
    /// ```
    /// # use harmonia::HarmoniaError;
    /// let err = HarmoniaError::UnknownNote("Fb".to_string());
    /// assert_eq!(err.to_string(), "Unknown note name: Fb");
    /// ```
    #[error("Unknown note name: {0}")]
    UnknownNote(String),

    /// A chord quality that is not one of the seven supported qualities.
    ///
    /// # Example
    /// ```
    /// # use harmonia::HarmoniaError;
    /// let err = HarmoniaError::UnknownQuality("sus4".to_string());
    /// assert_eq!(err.to_string(), "Unknown chord quality: sus4");
    /// ```
    #[error("Unknown chord quality: {0}")]
    UnknownQuality(String),

    /// A key name that cannot be parsed into a root and mode.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// A MIDI pitch outside the supported range (anchor octave and the one above).
    ///
    /// # Example
    /// ```
    /// # use harmonia::HarmoniaError;
    /// let err = HarmoniaError::MidiOutOfRange { midi: 84 };
    /// assert_eq!(err.to_string(), "MIDI note 84 is outside the supported range 60-83");
    /// ```
    #[error("MIDI note {midi} is outside the supported range 60-83")]
    MidiOutOfRange { midi: u8 },

    /// Invalid settings file contents.
    #[error("Invalid settings: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarmoniaError>;
