//! `status` subcommand: focused application, its theme and keyboard presence.

use keyrgb_lib::focus::classify;
use keyrgb_lib::probe::{ForegroundProbe, PlatformProbe};
use keyrgb_lib::protocol::{KEYBOARD_PID, SONIX_VID};

use super::{
    Config, ConfigSummaryJson, DeviceChannel, FocusStatusJson, HidapiChannel,
    KeyboardStatusJson, Result, StatusOutput, kv, kv_indent, kv_width, lighting, print_json,
};

pub(super) fn cmd_status(config: &Config, json: bool) -> Result<()> {
    let probe = PlatformProbe::default();
    let process = probe.process_name();
    let title = probe.window_title();
    let category = classify(&process);
    let theme = category.theme();

    let devices = match HidapiChannel::new() {
        Ok(channel) => channel.enumerate(SONIX_VID, KEYBOARD_PID),
        Err(e) => {
            log::warn!("{e}");
            Vec::new()
        }
    };
    let lighting_dev = devices.iter().find(|d| d.is_lighting_interface());
    let key_color = lighting::parse_color_or_default(&config.key_color);

    if json {
        return print_json(&StatusOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            focus: FocusStatusJson {
                window_title: title,
                process,
                app_type: category.label().to_string(),
                theme: theme.index(),
                theme_name: theme.name().to_string(),
            },
            keyboard: KeyboardStatusJson {
                present: lighting_dev.is_some(),
                path: lighting_dev.map(|d| d.path.clone()),
                endpoints: devices.len(),
            },
            config: ConfigSummaryJson {
                key_color: lighting::format_color(key_color),
                key_intensity: config.key_intensity,
                poll_interval_ms: config.poll_interval_ms,
            },
        });
    }

    let w = kv_width(
        &["Focus:", "Keyboard:", "Keys:"],
        &["Window:", "Process:", "App type:", "Theme:"],
    );
    let or_unknown = |s: &str| {
        if s.is_empty() {
            "(unavailable)".to_string()
        } else {
            s.to_string()
        }
    };

    println!("Focus:");
    kv_indent("Window:", or_unknown(&title), w);
    kv_indent("Process:", or_unknown(&process), w);
    kv_indent("App type:", category, w);
    kv_indent("Theme:", theme, w);
    println!();

    match lighting_dev {
        Some(d) => kv(
            "Keyboard:",
            format_args!("{} ({})", d.display_name(), d.path),
            w,
        ),
        None if devices.is_empty() => kv("Keyboard:", "not found", w),
        None => kv(
            "Keyboard:",
            format_args!("{} endpoint(s), no lighting interface", devices.len()),
            w,
        ),
    }
    kv(
        "Keys:",
        format_args!(
            "{} at {}%",
            lighting::format_color(key_color),
            config.key_intensity
        ),
        w,
    );
    Ok(())
}
