//! Application configuration: TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lighting::parse_color;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str = "# KeyRGB configuration. Changes made outside keyrgb may be overwritten.\n\n";

/// Shortest accepted poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Key backlight colour (hex, `r,g,b` or name). Default: "white".
    #[serde(default = "default_key_color")]
    pub key_color: String,

    /// Key backlight intensity in percent (0-100). Default: 75.
    #[serde(default = "default_key_intensity")]
    pub key_intensity: u8,

    /// Foreground poll interval for `watch`, in milliseconds. Default: 500.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// HID path to open first. Empty = auto-select the lighting interface.
    #[serde(default)]
    pub device_path: String,
}

fn default_key_color() -> String {
    "white".into()
}
fn default_key_intensity() -> u8 {
    75
}
fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Config {
            key_color: default_key_color(),
            key_intensity: default_key_intensity(),
            poll_interval_ms: default_poll_interval_ms(),
            device_path: String::new(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `key_color` is not a recognised colour expression.
    InvalidColor(String),
    /// `key_intensity` is above 100.
    IntensityOutOfRange(u8),
    /// `poll_interval_ms` is below [`MIN_POLL_INTERVAL_MS`].
    PollIntervalTooShort(u64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidColor(c) => write!(f, "Invalid key color: {c:?}"),
            ValidationError::IntensityOutOfRange(v) => {
                write!(f, "Key intensity {v} is out of range (0-100)")
            }
            ValidationError::PollIntervalTooShort(ms) => write!(
                f,
                "Poll interval {ms} ms is too short (minimum {MIN_POLL_INTERVAL_MS} ms)"
            ),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            dirs::config_dir().map(|p| p.join("KeyRGB"))
        }
        #[cfg(not(windows))]
        {
            dirs::config_dir().map(|p| p.join("keyrgb"))
        }
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// A missing file yields defaults silently; an unparsable one yields
    /// defaults plus a warning.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return (Self::default(), vec![]);
        };
        match toml::from_str(&contents) {
            Ok(config) => (config, vec![]),
            Err(e) => (
                Self::default(),
                vec![format!(
                    "config parse error ({}), using defaults: {e}",
                    path.display()
                )],
            ),
        }
    }

    /// Save config to `path` atomically (temp file, then rename).
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        if std::fs::rename(&tmp, path).is_err() {
            // Rename can fail across filesystems.
            let result = std::fs::write(path, &contents);
            let _ = std::fs::remove_file(&tmp);
            return result;
        }
        Ok(())
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Set one field from its string form, as used by `keyrgb config set`.
    pub fn set_field(&mut self, key: &str, value: &str) -> crate::error::Result<()> {
        let bad = |what: &str| crate::KeyrgbError::Config(format!("{key}: {what}: {value:?}"));
        match key {
            "key_color" => {
                if parse_color(value).is_none() {
                    return Err(crate::KeyrgbError::Color(value.to_string()));
                }
                self.key_color = value.trim().to_string();
            }
            "key_intensity" => {
                self.key_intensity = value.trim().parse().map_err(|_| bad("not a number"))?
            }
            "poll_interval_ms" => {
                self.poll_interval_ms = value.trim().parse().map_err(|_| bad("not a number"))?
            }
            "device_path" => self.device_path = value.trim().to_string(),
            _ => {
                return Err(crate::KeyrgbError::Config(format!(
                    "unknown setting {key:?}"
                )));
            }
        }
        Ok(())
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if parse_color(&self.key_color).is_none() {
            errors.push(ValidationError::InvalidColor(self.key_color.clone()));
        }
        if self.key_intensity > 100 {
            errors.push(ValidationError::IntensityOutOfRange(self.key_intensity));
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            errors.push(ValidationError::PollIntervalTooShort(self.poll_interval_ms));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.key_color, "white");
        assert_eq!(c.key_intensity, 75);
        assert_eq!(c.poll_interval_ms, 500);
        assert!(c.device_path.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: Config = toml::from_str("key_color = \"#00ff00\"").unwrap();
        assert_eq!(c.key_color, "#00ff00");
        assert_eq!(c.key_intensity, 75);
        assert_eq!(c.poll_interval_ms, 500);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn malformed_file_gives_defaults_and_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "key_intensity = \"loud\"").unwrap();
        let (c, warnings) = Config::load_from(&path);
        assert_eq!(c, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("using defaults"));
    }

    #[test]
    fn missing_file_gives_defaults_silently() {
        let dir = tempfile::tempdir().unwrap();
        let (c, warnings) = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let c = Config {
            key_color: "255,128,0".into(),
            key_intensity: 40,
            poll_interval_ms: 250,
            device_path: "/dev/hidraw3".into(),
        };
        c.save_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# KeyRGB configuration"));
        assert!(!path.with_extension("toml.tmp").exists());

        let (loaded, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(loaded, c);
    }

    #[test]
    fn config_path_ends_with_toml() {
        if let Some(p) = Config::path() {
            assert!(p.ends_with("config.toml"));
        }
    }

    // ── set_field ──

    #[test]
    fn set_field_updates_values() {
        let mut c = Config::default();
        c.set_field("key_color", " Orange ").unwrap();
        c.set_field("key_intensity", "30").unwrap();
        c.set_field("poll_interval_ms", "1000").unwrap();
        c.set_field("device_path", "mock://kb").unwrap();
        assert_eq!(c.key_color, "Orange");
        assert_eq!(c.key_intensity, 30);
        assert_eq!(c.poll_interval_ms, 1000);
        assert_eq!(c.device_path, "mock://kb");
    }

    #[test]
    fn set_field_rejects_bad_input() {
        let mut c = Config::default();
        assert!(matches!(
            c.set_field("key_color", "chartreuse"),
            Err(crate::KeyrgbError::Color(_))
        ));
        assert!(matches!(
            c.set_field("key_intensity", "lots"),
            Err(crate::KeyrgbError::Config(_))
        ));
        assert!(matches!(
            c.set_field("hotkey", "x"),
            Err(crate::KeyrgbError::Config(_))
        ));
        assert_eq!(c, Config::default());
    }

    // ── validate ──

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_collects_every_problem() {
        let c = Config {
            key_color: "notacolor".into(),
            key_intensity: 150,
            poll_interval_ms: 10,
            device_path: String::new(),
        };
        let errors = c.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidColor("notacolor".into()),
                ValidationError::IntensityOutOfRange(150),
                ValidationError::PollIntervalTooShort(10),
            ]
        );
    }

    #[test]
    fn validation_error_messages() {
        assert_eq!(
            ValidationError::IntensityOutOfRange(101).to_string(),
            "Key intensity 101 is out of range (0-100)"
        );
        assert_eq!(
            ValidationError::PollIntervalTooShort(5).to_string(),
            "Poll interval 5 ms is too short (minimum 50 ms)"
        );
    }
}
