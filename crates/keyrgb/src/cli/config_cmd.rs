//! `config` subcommand: show the current configuration, or change one setting.

use std::path::{Path, PathBuf};

use super::{
    Config, ConfigOutput, KeyrgbError, Result, kv, kv_indent, kv_width, lighting, print_json,
};

fn config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    custom_path.map(Path::to_path_buf).or_else(Config::path)
}

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let path = config_path(custom_path);
    let exists = path.as_ref().is_some_and(|p| p.exists());
    let problems: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    };

    if json {
        return print_json(&ConfigOutput {
            config_file: path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: exists,
            settings: config,
            problems,
        });
    }

    let w = kv_width(
        &["Config file:"],
        &[
            "key_color:",
            "key_intensity:",
            "poll_interval_ms:",
            "device_path:",
        ],
    );

    match &path {
        Some(p) if exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    let color_display = match lighting::parse_color(&config.key_color) {
        Some(rgb) => format!("{} -> {}", config.key_color, lighting::format_color(rgb)),
        None => format!("{} (invalid, white is used)", config.key_color),
    };
    kv_indent("key_color:", color_display, w);
    kv_indent("key_intensity:", format_args!("{}%", config.key_intensity), w);
    kv_indent(
        "poll_interval_ms:",
        format_args!("{} ms", config.poll_interval_ms),
        w,
    );
    let device = if config.device_path.is_empty() {
        "(auto)"
    } else {
        config.device_path.as_str()
    };
    kv_indent("device_path:", device, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}

pub(super) fn cmd_config_set(custom_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = config_path(custom_path)
        .ok_or_else(|| KeyrgbError::Config("no config directory".into()))?;
    let mut config = super::load_config(custom_path);
    config.set_field(key, value)?;
    if let Err(errors) = config.validate() {
        let msg: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(KeyrgbError::Config(msg.join("; ")));
    }
    config.save_to(&path)?;
    println!("Saved {key} to {}", path.display());
    Ok(())
}
