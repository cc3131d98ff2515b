//! # Chord Explorer Session
//!
//! The interactive state behind a chord-learning screen: the selected root and
//! quality, the chord resolved from them, and the two collaborators (audio and
//! advice) that react to a selection.
//!
//! ## Interactions
//! | Action | Effect |
//! |---|---|
//! | pick a major label on the circle | root = label |
//! | pick a minor label on the circle | root = minor label, quality unchanged |
//! | pick a quality | quality = selection |
//! | press a highlighted piano key | arpeggio of the chord, fast |
//! | press any other piano key | play that note, root = key's sharp name |
//!
//! Every change of root or quality resolves a fresh [`ChordDefinition`] and,
//! when advice is enabled, issues a new advice request that supersedes the one
//! in flight.

use crate::advisor::{Advice, AdviceDesk, AdviceRequest, AdviceSource};
use crate::audio::{AudioOutput, Player};
use crate::chord::ChordQuality;
use crate::circle::{slot_at, CircleSlot};
use crate::config::Settings;
use crate::error::Result;
use crate::key_signature::{signature_for, Key, KeySignature};
use crate::keyboard::{keyboard, PianoKey};
use crate::pitch::{midi_to_note_name, NoteName};
use crate::resolver::{resolve, ChordDefinition};
use crate::staff::{layout_chord, StaffNote};

/// Which ring of the circle was picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    Major,
    Minor,
}

/// What a piano key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    /// The key belongs to the chord: the chord was arpeggiated
    Arpeggio,
    /// The key was played on its own and became the new root
    NewRoot(NoteName),
}

pub struct Explorer<O: AudioOutput + 'static, S: AdviceSource + 'static> {
    root: NoteName,
    quality: ChordQuality,
    chord: ChordDefinition,
    player: Player<O>,
    desk: AdviceDesk<S>,
    advice: Option<Advice>,
    advice_enabled: bool,
}

impl<O: AudioOutput + 'static, S: AdviceSource + 'static> Explorer<O, S> {
    /// Start a session on the configured chord
    pub fn new(settings: &Settings, output: O, source: S) -> Result<Self> {
        let chord = resolve(settings.root, settings.quality)?;
        let mut explorer = Self {
            root: settings.root,
            quality: settings.quality,
            chord,
            player: Player::new(output, settings.audio.clone()),
            desk: AdviceDesk::with_timeout(
                source,
                std::time::Duration::from_secs(settings.advice.timeout_secs),
            ),
            advice: None,
            advice_enabled: settings.advice.enabled,
        };
        explorer.refresh_advice();
        Ok(explorer)
    }

    pub fn root(&self) -> NoteName {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn chord(&self) -> &ChordDefinition {
        &self.chord
    }

    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    pub fn select_root(&mut self, root: NoteName) -> Result<&ChordDefinition> {
        self.select(root, self.quality)
    }

    pub fn select_quality(&mut self, quality: ChordQuality) -> Result<&ChordDefinition> {
        self.select(self.root, quality)
    }

    /// Pick a label on the circle of fifths
    pub fn select_slot(&mut self, index: usize, ring: Ring) -> Result<&ChordDefinition> {
        let slot = slot_at(index);
        let root = match ring {
            Ring::Major => slot.major,
            Ring::Minor => slot.minor,
        };
        self.select_root(root)
    }

    fn select(&mut self, root: NoteName, quality: ChordQuality) -> Result<&ChordDefinition> {
        if root == self.root && quality == self.quality {
            return Ok(&self.chord);
        }
        self.chord = resolve(root, quality)?;
        self.root = root;
        self.quality = quality;
        log::info!("selected {}", self.chord.notation);
        self.refresh_advice();
        Ok(&self.chord)
    }

    pub fn play_chord(&self) {
        self.player
            .play_chord(&self.chord.midi_notes, self.player.settings().chord_duration);
    }

    pub fn play_arpeggio(&self) {
        self.player
            .play_arpeggio(&self.chord.midi_notes, self.player.settings().arpeggio_delay);
    }

    /// Press a key of the two-octave keyboard
    pub fn press_key(&mut self, midi: u8) -> Result<KeyPress> {
        let name = midi_to_note_name(midi)?;
        if self.chord.contains(midi) {
            let delay = self.player.settings().key_press_arpeggio_delay;
            self.player.play_arpeggio(&self.chord.midi_notes, delay);
            return Ok(KeyPress::Arpeggio);
        }
        self.player.play_default_note(midi);
        self.select_root(name)?;
        Ok(KeyPress::NewRoot(name))
    }

    /// Ask again for advice on the current chord
    pub fn refresh_advice(&mut self) {
        if !self.advice_enabled {
            return;
        }
        self.desk.request(AdviceRequest::new(self.root, self.quality));
    }

    /// Pick up the reply to the latest advice request if it has arrived
    pub fn poll_advice(&mut self) -> Option<&Advice> {
        if let Some(advice) = self.desk.poll() {
            self.advice = Some(advice);
        }
        self.advice.as_ref()
    }

    /// Block up to `timeout` for the latest advice
    pub fn wait_for_advice(&mut self, timeout: std::time::Duration) -> Option<&Advice> {
        if let Some(advice) = self.desk.wait(timeout) {
            self.advice = Some(advice);
        }
        self.advice.as_ref()
    }

    /// Latest advice received, possibly for an earlier chord while a newer
    /// request is loading
    pub fn advice(&self) -> Option<&Advice> {
        self.advice.as_ref()
    }

    pub fn is_advice_loading(&self) -> bool {
        self.desk.is_pending()
    }

    pub fn staff_layout(&self) -> Vec<StaffNote> {
        layout_chord(&self.chord)
    }

    pub fn keyboard(&self) -> Vec<PianoKey> {
        keyboard(&self.chord)
    }

    /// Key signature drawn next to the chord (the root's major key)
    pub fn key_signature(&self) -> KeySignature {
        signature_for(Key::major(self.root))
    }

    /// Circle slot holding the current root, on either ring
    pub fn selected_slot(&self) -> Option<(CircleSlot, Ring)> {
        crate::circle::index_of(self.root)
            .map(|index| (slot_at(index), Ring::Major))
            .or_else(|| crate::circle::slot_for_minor(self.root).map(|slot| (slot, Ring::Minor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{AdviceError, OfflineAdvisor};
    use crate::audio::AudioSettings;
    use crate::config::AdviceSettings;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ChannelOutput(Mutex<mpsc::Sender<u8>>);

    impl AudioOutput for ChannelOutput {
        fn play_note(&self, midi: u8, _duration_secs: f64, _volume: f64) {
            let _ = self.0.lock().unwrap().send(midi);
        }
    }

    struct Themed;

    impl AdviceSource for Themed {
        fn advise(&self, request: &AdviceRequest) -> std::result::Result<Advice, AdviceError> {
            let mut advice = Advice::fallback(request.root);
            advice.theme = format!("{} {}", request.root, request.quality.name());
            Ok(advice)
        }
    }

    fn settings(advice: bool) -> Settings {
        Settings {
            audio: AudioSettings {
                arpeggio_delay: 0.001,
                key_press_arpeggio_delay: 0.001,
                ..AudioSettings::default()
            },
            advice: AdviceSettings {
                enabled: advice,
                ..AdviceSettings::default()
            },
            ..Settings::default()
        }
    }

    fn explorer<S: AdviceSource + 'static>(
        source: S,
        advice: bool,
    ) -> (Explorer<ChannelOutput, S>, mpsc::Receiver<u8>) {
        let (tx, rx) = mpsc::channel();
        let explorer = Explorer::new(&settings(advice), ChannelOutput(Mutex::new(tx)), source).unwrap();
        (explorer, rx)
    }

    #[test]
    fn test_starts_on_c_major() {
        let (explorer, _rx) = explorer(OfflineAdvisor, false);
        assert_eq!(explorer.chord().notation, "C");
        assert_eq!(explorer.key_signature(), KeySignature::NONE);
        assert_eq!(explorer.staff_layout().len(), 3);
        assert_eq!(explorer.keyboard().iter().filter(|k| k.highlighted).count(), 3);
    }

    #[test]
    fn test_quality_and_root_changes() {
        let (mut explorer, _rx) = explorer(OfflineAdvisor, false);
        explorer.select_quality(ChordQuality::Minor7).unwrap();
        let chord = explorer.select_root(NoteName::F).unwrap();
        assert_eq!(chord.notation, "Fm7");
        assert_eq!(chord.notes, vec![NoteName::F, NoteName::AFlat, NoteName::C, NoteName::EFlat]);
        assert_eq!(explorer.key_signature().fifths(), -1);
    }

    #[test]
    fn test_minor_ring_keeps_quality() {
        let (mut explorer, _rx) = explorer(OfflineAdvisor, false);
        explorer.select_quality(ChordQuality::Dominant7).unwrap();
        explorer.select_slot(7, Ring::Minor).unwrap();
        assert_eq!(explorer.root(), NoteName::BFlat);
        assert_eq!(explorer.quality(), ChordQuality::Dominant7);
        // Bb is also a major label, so the outer ring wins
        assert_eq!(explorer.selected_slot().map(|(slot, ring)| (slot.index, ring)), Some((10, Ring::Major)));

        explorer.select_slot(4, Ring::Minor).unwrap();
        assert_eq!(explorer.root(), NoteName::CSharp);
        assert_eq!(explorer.selected_slot().map(|(slot, ring)| (slot.index, ring)), Some((4, Ring::Minor)));
    }

    #[test]
    fn test_play_chord_sends_every_note() {
        let (explorer, rx) = explorer(OfflineAdvisor, false);
        explorer.play_chord();
        assert_eq!(rx.try_iter().collect::<Vec<u8>>(), vec![60, 64, 67]);
    }

    #[test]
    fn test_chord_member_key_arpeggiates() {
        let (mut explorer, rx) = explorer(OfflineAdvisor, false);
        assert_eq!(explorer.press_key(64).unwrap(), KeyPress::Arpeggio);
        assert_eq!(explorer.root(), NoteName::C);

        let mut played = Vec::new();
        while played.len() < 6 {
            played.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        assert_eq!(played, vec![60, 64, 67, 60, 64, 67]);
    }

    #[test]
    fn test_other_key_becomes_root() {
        let (mut explorer, rx) = explorer(OfflineAdvisor, false);
        assert_eq!(explorer.press_key(70).unwrap(), KeyPress::NewRoot(NoteName::ASharp));
        assert_eq!(rx.try_recv().unwrap(), 70);
        assert_eq!(explorer.chord().notation, "A#");
        assert!(explorer.press_key(90).is_err());
    }

    #[test]
    fn test_advice_follows_selection() {
        let (mut explorer, _rx) = explorer(Themed, true);
        explorer.select_root(NoteName::G).unwrap();
        explorer.select_quality(ChordQuality::Minor).unwrap();

        let advice = explorer.wait_for_advice(Duration::from_secs(5)).unwrap();
        assert_eq!(advice.theme, "G Minor");
        assert!(!explorer.is_advice_loading());
    }

    #[test]
    fn test_advice_disabled() {
        let (mut explorer, _rx) = explorer(Themed, false);
        assert!(!explorer.is_advice_loading());
        assert!(explorer.poll_advice().is_none());
    }

    struct Stalled;

    impl AdviceSource for Stalled {
        fn advise(&self, request: &AdviceRequest) -> std::result::Result<Advice, AdviceError> {
            std::thread::sleep(Duration::from_secs(3));
            Themed.advise(request)
        }
    }

    #[test]
    fn test_stalled_advisor_shows_fallback_after_timeout() {
        let (tx, _rx) = mpsc::channel();
        let mut settings = settings(true);
        settings.advice.timeout_secs = 1;
        settings.root = NoteName::D;
        let mut explorer = Explorer::new(&settings, ChannelOutput(Mutex::new(tx)), Stalled).unwrap();
        assert!(explorer.is_advice_loading());
        assert!(explorer.poll_advice().is_none());

        let advice = explorer.wait_for_advice(Duration::from_secs(2)).unwrap();
        assert!(advice.is_fallback());
        assert_eq!(advice.progression[0], "D");
        assert!(!explorer.is_advice_loading());
    }
}
