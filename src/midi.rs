//! MIDI export of playback plans.
//!
//! Converts the notes scheduled by the audio boundary into a Standard MIDI File
//! so a chord or arpeggio can be opened in any sequencer. Offsets and durations
//! are seconds; at the fixed 120 bpm tempo one second is two quarter notes.
//!
//! Output is SMF Format 0 (a single track on channel 0).

use crate::audio::{AudioOutput, ScheduledNote};
use crate::error::Result;
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;
use std::sync::Mutex;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Tempo of the exported file.
pub const TEMPO_BPM: u32 = 120;

const TICKS_PER_SECOND: f64 = TICKS_PER_QUARTER as f64 * TEMPO_BPM as f64 / 60.0;

fn seconds_to_ticks(secs: f64) -> u32 {
    (secs.max(0.0) * TICKS_PER_SECOND).round() as u32
}

fn velocity(volume: f64) -> u8 {
    (volume.clamp(0.0, 1.0) * 127.0).round().max(1.0) as u8
}

/// Convert a playback plan to an in-memory SMF.
pub fn plan_to_smf<'a>(plan: &[ScheduledNote], track_name: &'a str) -> Smf<'a> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // (tick, is_note_on, key, velocity); note-offs sort before note-ons on the same tick
    let mut events: Vec<(u32, bool, u8, u8)> = Vec::with_capacity(plan.len() * 2);
    for note in plan {
        let key = note.midi.min(127);
        let start = seconds_to_ticks(note.offset_secs);
        let end = start + seconds_to_ticks(note.duration_secs).max(1);
        events.push((start, true, key, velocity(note.volume)));
        events.push((end, false, key, 0));
    }
    events.sort_by_key(|&(tick, on, key, _)| (tick, on, key));

    let mut track: Track<'a> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(track_name.as_bytes())),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / TEMPO_BPM))),
    });

    let channel = u4::new(0);
    let mut last_tick = 0;
    for (tick, on, key, vel) in events {
        let message = if on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);
    smf
}

/// Encode a playback plan as SMF bytes.
pub fn plan_to_bytes(plan: &[ScheduledNote], track_name: &str) -> Result<Vec<u8>> {
    let smf = plan_to_smf(plan, track_name);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Convert a playback plan to MIDI and write it to a file.
pub fn write_midi(plan: &[ScheduledNote], track_name: &str, path: &Path) -> Result<()> {
    let buf = plan_to_bytes(plan, track_name)?;
    std::fs::write(path, &buf)?;
    log::info!("wrote {} notes to {}", plan.len(), path.display());
    Ok(())
}

/// An [`AudioOutput`] that collects notes instead of sounding them, for export.
///
/// Notes are stamped with the offset they were received at relative to the
/// first note, so a recorder fed by a [`crate::audio::Player`] captures real
/// arpeggio timing. For exact timing build the plan directly with
/// [`crate::audio::arpeggio_plan`].
#[derive(Debug, Default)]
pub struct MidiRecorder {
    notes: Mutex<Vec<(std::time::Instant, u8, f64, f64)>>,
}

impl MidiRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far as a playback plan
    pub fn plan(&self) -> Vec<ScheduledNote> {
        let notes = match self.notes.lock() {
            Ok(notes) => notes,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(&(start, ..)) = notes.first() else {
            return Vec::new();
        };
        notes
            .iter()
            .map(|&(at, midi, duration_secs, volume)| ScheduledNote {
                offset_secs: at.duration_since(start).as_secs_f64(),
                midi,
                duration_secs,
                volume,
            })
            .collect()
    }
}

impl AudioOutput for MidiRecorder {
    fn play_note(&self, midi: u8, duration_secs: f64, volume: f64) {
        let mut notes = match self.notes.lock() {
            Ok(notes) => notes,
            Err(poisoned) => poisoned.into_inner(),
        };
        notes.push((std::time::Instant::now(), midi, duration_secs, volume));
    }
}
