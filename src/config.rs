// ── Settings ──────────────────────────────────────────────────────────────────
//
// Reads `%APPDATA%\Scratchpad4k\settings.json`.  The file is optional and is
// never written by the application; every field falls back to its default.
// No `unsafe`: pure safe Rust + serde_json.

use std::{fs, io, path::PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Largest accepted pixel setting, at 96 DPI.
pub(crate) const MAX_PIXELS: i32 = 10_000;

/// Largest accepted font size, in points.
pub(crate) const MAX_FONT_SIZE: i32 = 200;

/// Pixel values are at 96 DPI and get scaled to the window's DPI at use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) initial_width: i32,
    pub(crate) initial_height: i32,
    /// Smallest size the user can drag the window to.
    pub(crate) min_width: i32,
    pub(crate) min_height: i32,
    /// Height of the statistics strip under the text.
    pub(crate) status_height: i32,
    /// Font size of both controls, in points.
    pub(crate) font_size: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_width: 800,
            initial_height: 600,
            min_width: 400,
            min_height: 200,
            status_height: 24,
            font_size: 16,
        }
    }
}

impl Settings {
    /// Parse settings JSON.  Unknown keys are ignored.
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(json)?.sanitized())
    }

    /// Replace non-positive values with their defaults and cap the rest.
    pub(crate) fn sanitized(self) -> Self {
        let d = Self::default();
        let pick = |v: i32, fallback: i32, max: i32| if v > 0 { v.min(max) } else { fallback };
        Self {
            initial_width: pick(self.initial_width, d.initial_width, MAX_PIXELS),
            initial_height: pick(self.initial_height, d.initial_height, MAX_PIXELS),
            min_width: pick(self.min_width, d.min_width, MAX_PIXELS),
            min_height: pick(self.min_height, d.min_height, MAX_PIXELS),
            status_height: pick(self.status_height, d.status_height, MAX_PIXELS),
            font_size: pick(self.font_size, d.font_size, MAX_FONT_SIZE),
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `%APPDATA%\Scratchpad4k\settings.json`, or `None` if `APPDATA` is unset.
pub(crate) fn settings_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Scratchpad4k");
    p.push("settings.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load the settings file, falling back to defaults.
///
/// A missing file is normal; an unreadable or malformed one is logged.
pub(crate) fn load() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };

    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            log::warn!("cannot read {}: {e}; using defaults", path.display());
            return Settings::default();
        }
    };

    match Settings::from_json(&json) {
        Ok(settings) => {
            log::info!("loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("{}: {e}; using defaults", path.display());
            Settings::default()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Settings::from_json("{}").expect("parse"), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let s = Settings::from_json(r#"{"font_size": 12, "status_height": 30}"#).expect("parse");
        assert_eq!(s.font_size, 12);
        assert_eq!(s.status_height, 30);
        assert_eq!(s.initial_width, 800);
        assert_eq!(s.min_height, 200);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let s = Settings::from_json(r#"{"theme": "dark", "min_width": 500}"#).expect("parse");
        assert_eq!(s.min_width, 500);
    }

    #[test]
    fn non_positive_values_fall_back() {
        let s = Settings::from_json(r#"{"initial_width": 0, "font_size": -3}"#).expect("parse");
        assert_eq!(s.initial_width, 800);
        assert_eq!(s.font_size, 16);
    }

    #[test]
    fn oversized_values_are_capped() {
        let s = Settings::from_json(
            r#"{"min_width": 2147483647, "initial_width": 2000000000, "font_size": 99999}"#,
        )
        .expect("parse");
        assert_eq!(s.min_width, MAX_PIXELS);
        assert_eq!(s.initial_width, MAX_PIXELS);
        assert_eq!(s.font_size, MAX_FONT_SIZE);
        assert_eq!(s.min_height, 200);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
        assert!(Settings::from_json(r#"{"font_size": "big"}"#).is_err());
    }
}
