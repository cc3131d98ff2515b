//! # Audio Boundary
//!
//! Everything that crosses from the theory engine to a synthesizer: MIDI numbers,
//! durations and volumes. No theory logic lives on the other side.
//!
//! ## Sub-parts
//! - [`AudioOutput`] - the synthesizer contract (one note at a time)
//! - [`AudioSettings`] - default durations and volumes, loadable from YAML
//! - [`chord_plan`] / [`arpeggio_plan`] - pure scheduling of notes relative to now
//! - [`Player`] - dispatches a plan without blocking the caller
//! - [`LogOutput`] - an output that only logs what it would play
//!
//! ## Scheduling
//! A chord starts every note at offset 0. An arpeggio starts note `i` at
//! `i * delay` and then strikes the full chord at `len * delay`:
//! ```text
//! delay = 0.3, C E G
//!   0.0  C (1.8s)
//!   0.3  E (1.8s)
//!   0.6  G (1.8s)
//!   0.9  C E G (2.8s)
//! ```
//!
//! Dispatch is fire-and-forget: notes due now go straight to the output, later
//! ones are played by a detached thread. Nothing can be cancelled once issued.

use crate::pitch::midi_to_frequency;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A synthesizer that can sound a single note.
///
/// Implementations must return quickly; the note is expected to keep sounding
/// after the call returns.
pub trait AudioOutput: Send + Sync {
    fn play_note(&self, midi: u8, duration_secs: f64, volume: f64);
}

/// Default durations (seconds) and volumes (0.0..=1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AudioSettings {
    pub note_duration: f64,
    pub note_volume: f64,
    pub chord_duration: f64,
    pub chord_volume: f64,
    pub arpeggio_delay: f64,
    pub arpeggio_note_duration: f64,
    pub arpeggio_volume: f64,
    pub arpeggio_final_chord_duration: f64,
    /// Arpeggio delay used when a highlighted piano key is pressed
    pub key_press_arpeggio_delay: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            note_duration: 1.5,
            note_volume: 0.3,
            chord_duration: 2.0,
            chord_volume: 0.18,
            arpeggio_delay: 0.3,
            arpeggio_note_duration: 1.8,
            arpeggio_volume: 0.22,
            arpeggio_final_chord_duration: 2.8,
            key_press_arpeggio_delay: 0.15,
        }
    }
}

impl AudioSettings {
    /// Check that every duration is non-negative and every volume is in 0..=1
    pub fn validate(&self) -> Result<(), String> {
        let durations = [
            ("note-duration", self.note_duration),
            ("chord-duration", self.chord_duration),
            ("arpeggio-delay", self.arpeggio_delay),
            ("arpeggio-note-duration", self.arpeggio_note_duration),
            ("arpeggio-final-chord-duration", self.arpeggio_final_chord_duration),
            ("key-press-arpeggio-delay", self.key_press_arpeggio_delay),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number of seconds, got {}", name, value));
            }
        }
        let volumes = [
            ("note-volume", self.note_volume),
            ("chord-volume", self.chord_volume),
            ("arpeggio-volume", self.arpeggio_volume),
        ];
        for (name, value) in volumes {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0 and 1, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// One note of a playback plan
///
/// # Fields
/// - `offset_secs`: Start time relative to the moment the plan is dispatched
/// - `midi`: MIDI note number
/// - `duration_secs`: How long the note sounds
/// - `volume`: Gain between 0.0 and 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNote {
    pub offset_secs: f64,
    pub midi: u8,
    pub duration_secs: f64,
    pub volume: f64,
}

/// All notes together, at the chord volume
pub fn chord_plan(midi_notes: &[u8], duration_secs: f64, settings: &AudioSettings) -> Vec<ScheduledNote> {
    midi_notes
        .iter()
        .map(|&midi| ScheduledNote {
            offset_secs: 0.0,
            midi,
            duration_secs,
            volume: settings.chord_volume,
        })
        .collect()
}

/// Notes one after another, `delay_secs` apart, followed by the full chord.
///
/// A negative or non-finite delay is replaced by `settings.arpeggio_delay`.
pub fn arpeggio_plan(midi_notes: &[u8], delay_secs: f64, settings: &AudioSettings) -> Vec<ScheduledNote> {
    let delay_secs = if delay_secs.is_finite() && delay_secs >= 0.0 {
        delay_secs
    } else {
        log::warn!(
            "invalid arpeggio delay {}, using {}s",
            delay_secs,
            settings.arpeggio_delay
        );
        settings.arpeggio_delay
    };
    let mut plan: Vec<ScheduledNote> = midi_notes
        .iter()
        .enumerate()
        .map(|(i, &midi)| ScheduledNote {
            offset_secs: i as f64 * delay_secs,
            midi,
            duration_secs: settings.arpeggio_note_duration,
            volume: settings.arpeggio_volume,
        })
        .collect();

    let chord_offset = midi_notes.len() as f64 * delay_secs;
    plan.extend(
        chord_plan(midi_notes, settings.arpeggio_final_chord_duration, settings)
            .into_iter()
            .map(|note| ScheduledNote {
                offset_secs: chord_offset,
                ..note
            }),
    );
    plan
}

/// Total time from the first note starting to the last note ending
pub fn plan_length_secs(plan: &[ScheduledNote]) -> f64 {
    plan.iter()
        .map(|note| note.offset_secs + note.duration_secs)
        .fold(0.0, f64::max)
}

/// Non-blocking front end over an [`AudioOutput`]
pub struct Player<O: AudioOutput + 'static> {
    output: Arc<O>,
    settings: AudioSettings,
}

impl<O: AudioOutput + 'static> Player<O> {
    pub fn new(output: O, settings: AudioSettings) -> Self {
        Self {
            output: Arc::new(output),
            settings,
        }
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn play_note(&self, midi: u8, duration_secs: f64, volume: f64) {
        self.output.play_note(midi, duration_secs, volume);
    }

    /// A single note with the default duration and volume
    pub fn play_default_note(&self, midi: u8) {
        self.play_note(midi, self.settings.note_duration, self.settings.note_volume);
    }

    pub fn play_chord(&self, midi_notes: &[u8], duration_secs: f64) {
        self.dispatch(chord_plan(midi_notes, duration_secs, &self.settings));
    }

    pub fn play_arpeggio(&self, midi_notes: &[u8], delay_secs: f64) {
        self.dispatch(arpeggio_plan(midi_notes, delay_secs, &self.settings));
    }

    /// Hand a plan to the output without blocking.
    ///
    /// Notes at offset 0 are played immediately; the rest are played by a
    /// detached thread. Notes with a non-finite offset are skipped.
    pub fn dispatch(&self, plan: Vec<ScheduledNote>) {
        let (now, later): (Vec<ScheduledNote>, Vec<ScheduledNote>) = plan
            .into_iter()
            .filter(|note| {
                if !note.offset_secs.is_finite() {
                    log::warn!("skipping note {} at offset {}", note.midi, note.offset_secs);
                    return false;
                }
                true
            })
            .partition(|note| note.offset_secs <= 0.0);

        for note in &now {
            self.output.play_note(note.midi, note.duration_secs, note.volume);
        }

        if later.is_empty() {
            return;
        }

        let output = Arc::clone(&self.output);
        thread::spawn(move || {
            let mut elapsed = 0.0_f64;
            for note in later {
                if note.offset_secs > elapsed {
                    match Duration::try_from_secs_f64(note.offset_secs - elapsed) {
                        Ok(wait) => thread::sleep(wait),
                        Err(e) => {
                            log::warn!("skipping note {}: {}", note.midi, e);
                            continue;
                        }
                    }
                    elapsed = note.offset_secs;
                }
                output.play_note(note.midi, note.duration_secs, note.volume);
            }
        });
    }
}

/// Output that logs each note instead of sounding it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutput;

impl AudioOutput for LogOutput {
    fn play_note(&self, midi: u8, duration_secs: f64, volume: f64) {
        log::info!(
            "note {} ({:.1} Hz) for {:.2}s at volume {:.2}",
            midi,
            midi_to_frequency(midi),
            duration_secs,
            volume
        );
    }
}
