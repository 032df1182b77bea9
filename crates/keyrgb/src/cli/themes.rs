//! `themes` subcommand: list accent themes and their hardware codes.

use super::{Result, ThemeJson, lighting::LightingTheme, print_json};

fn theme_rows() -> Vec<ThemeJson> {
    LightingTheme::ALL
        .iter()
        .map(|&t| {
            let m = t.mapping();
            ThemeJson {
                index: t.index(),
                name: t.name().to_string(),
                line: m.line,
                volume: m.volume,
                default: t == LightingTheme::default(),
            }
        })
        .collect()
}

pub(super) fn cmd_themes(json: bool) -> Result<()> {
    let rows = theme_rows();
    if json {
        return print_json(&rows);
    }

    println!("  #  {:<11} line  volume", "name");
    for row in &rows {
        println!(
            "  {}  {:<11} {:>4}  {:>6}{}",
            row.index,
            row.name,
            row.line,
            row.volume,
            if row.default { "  (default)" } else { "" }
        );
    }
    Ok(())
}
