//! CLI subcommands: lighting control, focus watching, device and config info.

mod apply;
mod config_cmd;
mod devices;
mod status;
mod themes;
mod watch;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use keyrgb_lib::KeyrgbError;
pub(super) use keyrgb_lib::config::Config;
pub(super) use keyrgb_lib::controller::KeyboardController;
pub(super) use keyrgb_lib::device::{DeviceChannel, DiscoveredDevice, HidapiChannel};
pub(super) use keyrgb_lib::error::Result;
pub(super) use keyrgb_lib::lighting;
pub(super) use keyrgb_lib::session::DeviceSession;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Top-level and indented values line up in the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indented keys lose 2 columns to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {}", format_kv(key, value, w - 2));
}

/// Pretty-print `value` as JSON on stdout.
pub(super) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| KeyrgbError::Config(format!("JSON serialization failed: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Load the config from `custom_path` or the platform default, logging
/// parse warnings and validation problems.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    if let Err(problems) = config.validate() {
        for p in &problems {
            log::warn!("[config] {p}");
        }
    }
    config
}

/// Open the keyboard through hidapi, honouring `device_path` from the config.
pub(super) fn open_controller(config: &Config) -> Result<KeyboardController<HidapiChannel>> {
    let channel = HidapiChannel::new()?;
    let session = DeviceSession::new(channel).with_preferred_path(&config.device_path);
    let mut controller = KeyboardController::from_session(session);
    controller.connect()?;
    if let Some(dev) = controller.device() {
        log::info!("using {} ({})", dev.display_name(), dev.path);
    }
    Ok(controller)
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub focus: FocusStatusJson,
    pub keyboard: KeyboardStatusJson,
    pub config: ConfigSummaryJson,
}

#[derive(Serialize)]
pub(super) struct FocusStatusJson {
    pub window_title: String,
    pub process: String,
    pub app_type: String,
    pub theme: u8,
    pub theme_name: String,
}

#[derive(Serialize)]
pub(super) struct KeyboardStatusJson {
    pub present: bool,
    pub path: Option<String>,
    pub endpoints: usize,
}

#[derive(Serialize)]
pub(super) struct ConfigSummaryJson {
    pub key_color: String,
    pub key_intensity: u8,
    pub poll_interval_ms: u64,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub devices: Vec<DiscoveredDevice>,
}

#[derive(Serialize)]
pub(super) struct ThemeJson {
    pub index: u8,
    pub name: String,
    pub line: u8,
    pub volume: u8,
    pub default: bool,
}

#[derive(Serialize)]
pub(super) struct AppliedOutput {
    pub key_color: String,
    pub intensity: i32,
    pub theme: u8,
    pub theme_name: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set key colour, intensity and accent theme
    Apply {
        /// Key colour: #RRGGBB, r,g,b or a name (default: config key_color; invalid = white)
        color: Option<String>,
        /// Key intensity in percent, 0-100 (default: config key_intensity)
        #[arg(allow_negative_numbers = true)]
        intensity: Option<i32>,
        /// Accent theme index 0-7 (default and fallback: 5, purple)
        theme: Option<String>,
    },

    /// Set a solid key colour and pick the matching accent theme
    Solid {
        /// Key colour: #RRGGBB, r,g,b or a name
        color: String,
        /// Key intensity in percent, 0-100 (default: 100)
        #[arg(short, long, default_value_t = 100, allow_negative_numbers = true)]
        intensity: i32,
    },

    /// Follow window focus and re-theme the keyboard per application
    Watch,

    /// Show the focused application, its theme and keyboard presence
    Status,

    /// List connected SONiX keyboard endpoints
    Devices,

    /// List accent themes and their hardware codes
    Themes,

    /// Show current configuration, or change a setting
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Change one setting and save the config file
    Set {
        /// key_color, key_intensity, poll_interval_ms or device_path
        key: String,
        value: String,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Apply {
            color,
            intensity,
            theme,
        } => {
            let config = load_config(config_path);
            apply::cmd_apply(&config, color, intensity, theme, json)
        }
        Command::Solid { color, intensity } => {
            let config = load_config(config_path);
            apply::cmd_solid(&config, &color, intensity, json)
        }
        Command::Watch => {
            let config = load_config(config_path);
            watch::cmd_watch(&config, json)
        }
        Command::Status => status::cmd_status(&load_config(config_path), json),
        Command::Devices => devices::cmd_devices(json),
        Command::Themes => themes::cmd_themes(json),
        Command::Config { action: None } => config_cmd::cmd_config(json, config_path),
        Command::Config {
            action: Some(ConfigAction::Set { key, value }),
        } => {
            if json {
                warn_json_unsupported("config set");
            }
            config_cmd::cmd_config_set(config_path, &key, &value)
        }
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        let w = kv_width(&["A:"], &["poll_interval_ms:"]);
        // 17 + PADDING + 2 = 21
        assert_eq!(w, 21);
    }

    #[test]
    fn kv_width_empty_both() {
        assert_eq!(kv_width(&[], &[]), 0);
    }

    #[test]
    fn values_align_across_levels() {
        let w = kv_width(&["Keyboard:"], &["Process:"]);
        let top = format_kv("Keyboard:", "V", w);
        let indent = format!("  {}", format_kv("Process:", "V", w - 2));
        assert_eq!(top.find('V'), indent.find('V'));
    }

    #[test]
    fn format_kv_overlong_key_gets_no_padding() {
        assert_eq!(format_kv("Key:", "value", 10), "Key:      value");
        assert_eq!(format_kv("ExactWidth:", "val", 10), "ExactWidth:val");
    }
}

#[cfg(test)]
mod json_struct_tests {
    use super::*;

    #[test]
    fn status_output_has_expected_fields() {
        let output = StatusOutput {
            version: "0.1.0".into(),
            focus: FocusStatusJson {
                window_title: "main.rs - Visual Studio Code".into(),
                process: "Code".into(),
                app_type: "Developer IDE".into(),
                theme: 1,
                theme_name: "orange".into(),
            },
            keyboard: KeyboardStatusJson {
                present: false,
                path: None,
                endpoints: 0,
            },
            config: ConfigSummaryJson {
                key_color: "#FFFFFF".into(),
                key_intensity: 75,
                poll_interval_ms: 500,
            },
        };
        let json = serde_json::to_value(&output).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(json["focus"]["theme"], 1);
        assert!(json["keyboard"]["path"].is_null());
    }

    #[test]
    fn theme_json_fields() {
        let t = ThemeJson {
            index: 5,
            name: "purple".into(),
            line: 6,
            volume: 8,
            default: true,
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 5);
        assert_eq!(json["default"], true);
    }
}
