use super::ui;
use crate::core::settings::{Settings, SettingsStore, Theme};
use anyhow::Result;
use comfy_table::Cell;

pub fn render(settings: &Settings, palette: &ui::Palette) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Setting", palette),
        ui::header_cell("Value", palette),
    ]);
    let theme = match settings.theme {
        Theme::System => format!("system ({})", settings.theme.resolve()),
        other => other.to_string(),
    };
    table.add_row(vec![Cell::new("theme"), Cell::new(theme)]);
    table.add_row(vec![
        Cell::new("calculator pinned"),
        Cell::new(settings.calculator_pinned),
    ]);
    table.to_string()
}

pub fn show(store: &SettingsStore, palette: &ui::Palette) -> Result<()> {
    println!("{}", render(store.settings(), palette));
    Ok(())
}

pub async fn set_theme(store: &mut SettingsStore, theme: Theme) -> Result<()> {
    store.set_theme(theme).await?;
    println!("Theme set to {theme}");
    Ok(())
}

pub async fn set_pinned(store: &mut SettingsStore, pinned: bool) -> Result<()> {
    store.set_calculator_pinned(pinned).await?;
    if pinned {
        println!("Converter pinned: running without a command now opens it");
    } else {
        println!("Converter unpinned: running without a command shows the rates");
    }
    Ok(())
}
