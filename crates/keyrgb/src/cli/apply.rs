//! `apply` and `solid` subcommands: one-shot lighting changes.

use super::{
    AppliedOutput, Config, DeviceChannel, KeyboardController, KeyrgbError, Result, lighting,
    open_controller, print_json,
};
use lighting::{
    LightingTheme, Rgb, format_color, parse_color, parse_color_or_default, parse_theme_index,
};

fn report(color: Rgb, intensity: i32, theme: LightingTheme, json: bool) -> Result<()> {
    if json {
        return print_json(&AppliedOutput {
            key_color: format_color(color),
            intensity,
            theme: theme.index(),
            theme_name: theme.name().to_string(),
        });
    }
    println!(
        "Applied keys {} at {intensity}%, theme {theme}",
        format_color(color)
    );
    Ok(())
}

/// Lenient: a bad colour becomes white, a bad theme becomes purple.
pub(super) fn cmd_apply(
    config: &Config,
    color: Option<String>,
    intensity: Option<i32>,
    theme: Option<String>,
    json: bool,
) -> Result<()> {
    let expr = color.unwrap_or_else(|| config.key_color.clone());
    if parse_color(&expr).is_none() {
        log::warn!("unrecognised colour {expr:?}, using white");
    }
    let intensity = intensity.unwrap_or(i32::from(config.key_intensity));
    let theme = theme.as_deref().map(parse_theme_index).unwrap_or_default();

    let mut controller = open_controller(config)?;
    let rgb = send_lighting(&mut controller, &expr, intensity, theme)?;
    report(rgb, intensity, theme, json)
}

/// Send through the lenient colour path. Returns the colour that was used.
fn send_lighting<C: DeviceChannel>(
    controller: &mut KeyboardController<C>,
    expr: &str,
    intensity: i32,
    theme: LightingTheme,
) -> Result<Rgb> {
    controller.apply_lighting(expr, intensity, theme)?;
    Ok(parse_color_or_default(expr))
}

/// Strict: the colour must parse; the accent theme follows from it.
pub(super) fn cmd_solid(config: &Config, color: &str, intensity: i32, json: bool) -> Result<()> {
    let rgb = parse_color(color).ok_or_else(|| KeyrgbError::Color(color.to_string()))?;
    let mut controller = open_controller(config)?;
    let theme = controller.apply_solid_color(rgb, intensity)?;
    report(rgb, intensity, theme, json)
}
