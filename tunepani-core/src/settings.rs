//! # Settings Module
//!
//! Application settings, loaded from an optional JSON file. Every field has a
//! default, so a partial file (or none at all) is fine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TuneError};
use crate::fft;
use crate::gauge::GaugeScale;
use crate::tone::DEFAULT_VOLUME;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Transform size of the pitch analyser.
    pub fft_size: usize,
    /// Reference tone volume at startup, 0.0 to 1.0.
    pub initial_volume: f32,
    /// Decibel level mapped to magnitude 0.
    pub min_decibels: f32,
    /// Decibel level mapped to magnitude 255.
    pub max_decibels: f32,
    pub gauge_center: f32,
    pub gauge_half_width: f32,
    /// Width of the pad area used for default pad placement.
    pub pad_area_width: f32,
    /// JSON file holding the saved configurations.
    pub storage_path: PathBuf,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fft_size: fft::DEFAULT_FFT_SIZE,
            initial_volume: DEFAULT_VOLUME,
            min_decibels: fft::DEFAULT_MIN_DECIBELS,
            max_decibels: fft::DEFAULT_MAX_DECIBELS,
            gauge_center: 100.0,
            gauge_half_width: 100.0,
            pad_area_width: 600.0,
            storage_path: PathBuf::from("tunepani_configs.json"),
            dark_mode: false,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or returns the defaults when no path is
    /// given. The result is validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let data = fs::read_to_string(path)?;
                let settings: Settings = serde_json::from_str(&data)?;
                log::info!("[SETTINGS] Loaded settings from {}", path.display());
                settings
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        fft::validate_fft_size(self.fft_size)?;
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(TuneError::InvalidSettings(format!(
                "initial volume {} must be between 0 and 1",
                self.initial_volume
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(TuneError::InvalidSettings(format!(
                "min decibels ({}) must be below max decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(self.gauge_half_width > 0.0) || !self.gauge_center.is_finite() {
            return Err(TuneError::InvalidSettings("gauge geometry must be finite with a positive width".into()));
        }
        if !(self.pad_area_width > 0.0) {
            return Err(TuneError::InvalidSettings("pad area width must be positive".into()));
        }
        Ok(())
    }

    pub fn gauge_scale(&self) -> GaugeScale {
        GaugeScale::new(self.gauge_center, self.gauge_half_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.fft_size, 2048);
        assert_eq!(settings.initial_volume, 0.3);
        assert_eq!(settings.gauge_scale(), GaugeScale::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fft_size": 4096, "dark_mode": true }}"#).unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.fft_size, 4096);
        assert!(settings.dark_mode);
        assert_eq!(settings.initial_volume, 0.3);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad = [
            Settings { fft_size: 3000, ..Settings::default() },
            Settings { initial_volume: 1.5, ..Settings::default() },
            Settings { min_decibels: -10.0, max_decibels: -20.0, ..Settings::default() },
            Settings { gauge_half_width: 0.0, ..Settings::default() },
            Settings { pad_area_width: -1.0, ..Settings::default() },
        ];
        for settings in bad {
            assert!(matches!(settings.validate(), Err(TuneError::InvalidSettings(_))));
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load(Some(&dir.path().join("nope.json"))),
            Err(TuneError::Io(_))
        ));
    }
}
