//! Settings file.
//!
//! ```yaml
//! root: F
//! quality: minor-7
//! audio:
//!   note-duration: 1.5
//!   arpeggio-delay: 0.3
//! advice:
//!   enabled: true
//!   timeout-secs: 10
//! ```
//!
//! Every key is optional. Unknown note names or qualities are rejected with
//! [`HarmoniaError::ConfigError`] rather than silently replaced.

use crate::audio::AudioSettings;
use crate::chord::ChordQuality;
use crate::error::{HarmoniaError, Result};
use crate::pitch::NoteName;
use serde::Deserialize;
use std::path::Path;

/// Raw settings for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawSettings {
    pub root: Option<String>,
    pub quality: Option<String>,
    pub audio: Option<AudioSettings>,
    pub advice: Option<AdviceSettings>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AdviceSettings {
    pub enabled: bool,
    /// Seconds to wait for a reply before showing the fallback
    pub timeout_secs: u64,
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
        }
    }
}

/// Validated settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: NoteName,
    pub quality: ChordQuality,
    pub audio: AudioSettings,
    pub advice: AdviceSettings,
}

impl Default for Settings {
    /// C major, the original starting chord
    fn default() -> Self {
        Self {
            root: NoteName::C,
            quality: ChordQuality::Major,
            audio: AudioSettings::default(),
            advice: AdviceSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. An empty document yields the defaults.
    ///
    /// # Example
    /// ```
    /// use harmonia::config::Settings;
    /// use harmonia::{ChordQuality, NoteName};
    ///
    /// let settings = Settings::from_yaml("root: Bb\nquality: m7\n")?;
    /// assert_eq!(settings.root, NoteName::BFlat);
    /// assert_eq!(settings.quality, ChordQuality::Minor7);
    /// # Ok::<(), harmonia::HarmoniaError>(())
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        let raw: RawSettings = serde_yaml::from_str(content)
            .map_err(|e| HarmoniaError::ConfigError(e.to_string()))?;

        let defaults = Settings::default();

        let root = match &raw.root {
            Some(root) => root
                .parse()
                .map_err(|_| HarmoniaError::ConfigError(format!("Invalid root: {}", root)))?,
            None => defaults.root,
        };

        let quality = match &raw.quality {
            Some(quality) => quality
                .parse()
                .map_err(|_| HarmoniaError::ConfigError(format!("Invalid quality: {}", quality)))?,
            None => defaults.quality,
        };

        let audio = raw.audio.unwrap_or(defaults.audio);
        audio.validate().map_err(HarmoniaError::ConfigError)?;

        let advice = raw.advice.unwrap_or(defaults.advice);
        if advice.timeout_secs == 0 {
            return Err(HarmoniaError::ConfigError(
                "advice timeout-secs must be at least 1".to_string(),
            ));
        }

        Ok(Settings {
            root,
            quality,
            audio,
            advice,
        })
    }

    /// Read settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&content)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml("  \n").unwrap().root, NoteName::C);
    }

    #[test]
    fn test_full_settings() {
        let yaml = r#"
root: F#
quality: dominant-7
audio:
  note-duration: 1.0
  arpeggio-delay: 0.25
advice:
  enabled: false
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.root, NoteName::FSharp);
        assert_eq!(settings.quality, ChordQuality::Dominant7);
        assert_eq!(settings.audio.note_duration, 1.0);
        assert_eq!(settings.audio.arpeggio_delay, 0.25);
        // unspecified audio keys keep their defaults
        assert_eq!(settings.audio.chord_volume, 0.18);
        assert!(!settings.advice.enabled);
        assert_eq!(settings.advice.timeout_secs, 10);
    }

    #[test]
    fn test_invalid_root() {
        let err = Settings::from_yaml("root: H").unwrap_err();
        assert!(matches!(err, HarmoniaError::ConfigError(ref msg) if msg.contains("H")));
    }

    #[test]
    fn test_invalid_quality() {
        assert!(matches!(
            Settings::from_yaml("quality: sus4"),
            Err(HarmoniaError::ConfigError(_))
        ));
    }

    #[test]
    fn test_invalid_volume() {
        let err = Settings::from_yaml("audio:\n  chord-volume: 3.0\n").unwrap_err();
        assert!(err.to_string().contains("chord-volume"));
    }

    #[test]
    fn test_zero_advice_timeout_rejected() {
        let err = Settings::from_yaml("advice:\n  timeout-secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout-secs"));
        let settings = Settings::from_yaml("advice:\n  timeout-secs: 3\n").unwrap();
        assert_eq!(settings.advice.timeout_secs, 3);
        assert!(settings.advice.enabled);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Settings::from_yaml("tempo: 120").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harmonia.yaml");
        std::fs::write(&path, "root: Eb\nquality: maj7\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.root, NoteName::EFlat);
        assert_eq!(settings.quality, ChordQuality::Major7);

        assert!(matches!(
            Settings::load(&dir.path().join("missing.yaml")),
            Err(HarmoniaError::Io(_))
        ));
    }
}
