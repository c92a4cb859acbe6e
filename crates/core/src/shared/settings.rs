use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_COLLECTION_ID, DEFAULT_FADE_STEP, DEFAULT_MAX_FACES, DEFAULT_MAX_WORKERS,
    DEFAULT_REGION,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("fade step must be in (0, 1], got {0}")]
    FadeStep(f64),
    #[error("max workers must be at least 1")]
    MaxWorkers,
}

/// Session configuration shared by the CLI and the overlay session.
///
/// Missing keys in a settings file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub region: String,
    /// Overrides the regional service endpoint (e.g. a local signing proxy).
    pub endpoint: Option<String>,
    pub collection_id: String,
    pub fade_step: f64,
    pub max_workers: usize,
    pub max_faces: u32,
    /// Name used when enrolling from the interactive session.
    pub face_name: Option<String>,
    /// Show each recognized face crop in its own preview as results arrive.
    pub show_crop_previews: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
            fade_step: DEFAULT_FADE_STEP,
            max_workers: DEFAULT_MAX_WORKERS,
            max_faces: DEFAULT_MAX_FACES,
            face_name: None,
            show_crop_previews: false,
        }
    }
}

impl OverlaySettings {
    /// Platform config location: `<config_dir>/Rekognition Overlay/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Rekognition Overlay").join("settings.json"))
    }

    /// Loads from the default location, or defaults when there is no file.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |e: std::io::Error| SettingsError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.fade_step > 0.0 && self.fade_step <= 1.0) {
            return Err(SettingsError::FadeStep(self.fade_step));
        }
        if self.max_workers == 0 {
            return Err(SettingsError::MaxWorkers);
        }
        Ok(())
    }

    /// Service endpoint: the override if set, else the regional default.
    pub fn service_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://rekognition.{}.amazonaws.com", self.region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let s = OverlaySettings::default();
        assert_eq!(s.region, "eu-west-1");
        assert_eq!(s.collection_id, "faces");
        assert_relative_eq!(s.fade_step, 0.05);
        assert_eq!(s.max_workers, 8);
        assert_eq!(s.max_faces, 1);
        assert!(s.face_name.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_service_endpoint_uses_region() {
        let s = OverlaySettings {
            region: "us-east-1".into(),
            ..OverlaySettings::default()
        };
        assert_eq!(
            s.service_endpoint(),
            "https://rekognition.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_service_endpoint_override() {
        let s = OverlaySettings {
            endpoint: Some("http://localhost:4566".into()),
            ..OverlaySettings::default()
        };
        assert_eq!(s.service_endpoint(), "http://localhost:4566");
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("settings.json");
        let s = OverlaySettings {
            collection_id: "office".into(),
            fade_step: 0.1,
            face_name: Some("lee".into()),
            ..OverlaySettings::default()
        };
        s.save_to(&path).unwrap();
        assert_eq!(OverlaySettings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{"collection_id": "office"}"#).unwrap();

        let s = OverlaySettings::load_from(&path).unwrap();

        assert_eq!(s.collection_id, "office");
        assert_eq!(s.region, "eu-west-1");
        assert_eq!(s.max_workers, 8);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let result = OverlaySettings::load_from(&tmp.path().join("missing.json"));
        assert!(matches!(result, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        let result = OverlaySettings::load_from(&path);
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.1)]
    #[case::above_one(1.5)]
    #[case::nan(f64::NAN)]
    fn test_invalid_fade_step_rejected(#[case] step: f64) {
        let s = OverlaySettings {
            fade_step: step,
            ..OverlaySettings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::FadeStep(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let s = OverlaySettings {
            max_workers: 0,
            ..OverlaySettings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::MaxWorkers)));
    }
}
