use super::ui;
use crate::core::converter::Converter;
use crate::core::quote::Snapshot;
use crate::core::service::RatesService;
use anyhow::{Result, anyhow};
use comfy_table::{Cell, CellAlignment};
use rust_decimal::Decimal;

const REFERENCE_AMOUNTS: [u32; 5] = [1, 10, 100, 500, 1000];

fn selectable(snapshot: &Snapshot) -> String {
    snapshot
        .quotes()
        .map(|q| q.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn converter<'a>(snapshot: &'a Snapshot, currency: Option<&str>) -> Result<Converter<'a>> {
    Converter::select(snapshot, currency).ok_or_else(|| match currency {
        Some(label) => anyhow!(
            "Unknown currency '{}', available: {}",
            label,
            selectable(snapshot)
        ),
        None => anyhow!("No quotes available to convert with"),
    })
}

/// Reference table for the selected currency in both directions.
pub fn render_table(converter: &Converter, palette: &ui::Palette) -> String {
    let label = converter.quote().label();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(label, palette),
        ui::header_cell("ARS", palette),
        ui::header_cell("ARS", palette),
        ui::header_cell(label, palette),
    ]);

    for amount in REFERENCE_AMOUNTS.map(Decimal::from) {
        let pesos = amount * Decimal::ONE_THOUSAND;
        table.add_row(vec![
            Cell::new(amount).set_alignment(CellAlignment::Right),
            ui::format_optional_cell(converter.to_pesos(amount), palette, ui::format_ars),
            ui::ars_cell(pesos),
            ui::format_optional_cell(converter.from_pesos(pesos), palette, |v| format!("{v:.2}")),
        ]);
    }

    format!(
        "Converter: {} (sell {})\n\n{}",
        ui::style_text(label, ui::StyleType::Title),
        ui::format_ars(converter.quote().sell),
        table
    )
}

/// One conversion, `amount` in the selected currency or, with `reverse`, in pesos.
pub fn render_conversion(converter: &Converter, amount: Decimal, reverse: bool) -> String {
    let label = converter.quote().label();
    if reverse {
        let result = converter
            .from_pesos(amount)
            .map_or("N/A".to_string(), |v| format!("{v:.2}"));
        format!(
            "{} = {} {}",
            ui::format_ars(amount),
            ui::style_text(&result, ui::StyleType::TotalValue),
            label
        )
    } else {
        let result = converter
            .to_pesos(amount)
            .map_or("N/A".to_string(), ui::format_ars);
        format!(
            "{} {} = {}",
            amount,
            label,
            ui::style_text(&result, ui::StyleType::TotalValue)
        )
    }
}

pub async fn run(
    service: &RatesService,
    palette: &ui::Palette,
    amount: Option<Decimal>,
    currency: Option<&str>,
    reverse: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates...");
    let snapshot = service.snapshot(false).await;
    pb.finish_and_clear();
    let snapshot = snapshot?;

    let converter = converter(&snapshot, currency)?;
    match amount {
        Some(amount) => println!("{}", render_conversion(&converter, amount, reverse)),
        None => println!("{}", render_table(&converter, palette)),
    }
    Ok(())
}
