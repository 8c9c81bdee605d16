use super::ui;
use crate::core::alert::{AlertBook, AlertCondition, PriceAlert};
use crate::core::quote::Snapshot;
use crate::core::service::RatesService;
use anyhow::Result;
use comfy_table::{Attribute, Cell};
use rust_decimal::Decimal;

fn short_id(alert: &PriceAlert) -> &str {
    alert.id.get(..8).unwrap_or(&alert.id)
}

pub fn render_list(alerts: &[PriceAlert], palette: &ui::Palette) -> String {
    if alerts.is_empty() {
        return ui::style_text(
            "No alerts configured. Add one with `preciodolar alerts add`.",
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id", palette),
        ui::header_cell("Currency", palette),
        ui::header_cell("Condition", palette),
        ui::header_cell("Target", palette),
        ui::header_cell("Active", palette),
        ui::header_cell("Created", palette),
    ]);
    for alert in alerts {
        table.add_row(vec![
            Cell::new(short_id(alert)),
            Cell::new(&alert.currency),
            Cell::new(alert.condition),
            ui::ars_cell(alert.target_price),
            Cell::new(if alert.active { "yes" } else { "no" }),
            Cell::new(super::rates::format_timestamp(alert.created_at)),
        ]);
    }
    table.to_string()
}

/// Every alert next to the current sell price, triggered active ones highlighted.
pub fn render_check(book: &AlertBook, snapshot: &Snapshot, palette: &ui::Palette) -> String {
    if book.list().is_empty() {
        return render_list(book.list(), palette);
    }

    let prices = snapshot.sell_prices();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id", palette),
        ui::header_cell("Currency", palette),
        ui::header_cell("Condition", palette),
        ui::header_cell("Target", palette),
        ui::header_cell("Current", palette),
        ui::header_cell("Status", palette),
    ]);
    for (alert, triggered) in book.evaluate(snapshot) {
        let status = match (alert.active, triggered) {
            (false, _) => Cell::new("paused").fg(palette.muted),
            (true, true) => Cell::new("TRIGGERED")
                .fg(palette.highlight)
                .add_attribute(Attribute::Bold),
            (true, false) => Cell::new("waiting"),
        };
        table.add_row(vec![
            Cell::new(short_id(alert)),
            Cell::new(&alert.currency),
            Cell::new(alert.condition),
            ui::ars_cell(alert.target_price),
            ui::format_optional_cell(prices.get(&alert.currency).copied(), palette, ui::format_ars),
            status,
        ]);
    }

    let triggered = book.triggered(snapshot).len();
    let summary = if triggered > 0 {
        ui::style_text(
            &format!("{triggered} alert(s) triggered"),
            ui::StyleType::Warning,
        )
    } else {
        ui::style_text("No alerts triggered", ui::StyleType::Subtle)
    };
    format!("{table}\n{summary}")
}

/// One line per triggered alert, for the live view.
pub fn render_triggered(book: &AlertBook, snapshot: &Snapshot) -> Vec<String> {
    let prices = snapshot.sell_prices();
    book.triggered(snapshot)
        .into_iter()
        .map(|alert| {
            let current = prices
                .get(&alert.currency)
                .map_or("N/A".to_string(), |p| ui::format_ars(*p));
            ui::style_text(
                &format!(
                    "🔔 {} is {} (target {} {})",
                    alert.currency,
                    current,
                    alert.condition,
                    ui::format_ars(alert.target_price)
                ),
                ui::StyleType::Warning,
            )
        })
        .collect()
}

pub fn list(book: &AlertBook, palette: &ui::Palette) -> Result<()> {
    println!("{}", render_list(book.list(), palette));
    Ok(())
}

pub async fn add(
    book: &mut AlertBook,
    currency: &str,
    condition: AlertCondition,
    target: Decimal,
) -> Result<()> {
    let alert = book.add(currency, target, condition).await?;
    println!(
        "Created alert {}: {} {} {}",
        ui::style_text(short_id(&alert), ui::StyleType::TotalLabel),
        alert.currency,
        alert.condition,
        ui::format_ars(alert.target_price)
    );
    Ok(())
}

pub async fn toggle(book: &mut AlertBook, id: &str) -> Result<()> {
    let id = book.resolve_id(id)?;
    let active = book.toggle(&id).await?;
    println!(
        "Alert {} is now {}",
        &id[..id.len().min(8)],
        if active { "active" } else { "paused" }
    );
    Ok(())
}

pub async fn remove(book: &mut AlertBook, id: &str) -> Result<()> {
    let id = book.resolve_id(id)?;
    let removed = book.remove(&id).await?;
    println!("Removed alert {} ({})", short_id(&removed), removed.currency);
    Ok(())
}

pub async fn check(book: &AlertBook, service: &RatesService, palette: &ui::Palette) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates...");
    let snapshot = service.snapshot(false).await;
    pb.finish_and_clear();
    let snapshot = snapshot?;

    println!("{}", render_check(book, &snapshot, palette));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::test_support::quote;
    use crate::core::settings::Theme;
    use crate::store::memory::MemoryCollection;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn snapshot() -> Snapshot {
        Snapshot {
            dollars: vec![quote("Blue", "blue", dec!(1205), dec!(1225))],
            real_blue: None,
            euro: None,
            last_updated: Utc::now(),
        }
    }

    fn palette() -> ui::Palette {
        ui::Palette::for_theme(Theme::Dark)
    }

    #[tokio::test]
    async fn test_check_marks_triggered_alerts() {
        let mut book = AlertBook::load(Arc::new(MemoryCollection::new()))
            .await
            .unwrap();
        book.add("Blue", dec!(1200), AlertCondition::Above).await.unwrap();
        book.add("Blue", dec!(1300), AlertCondition::Above).await.unwrap();
        let paused = book.add("Blue", dec!(1000), AlertCondition::Above).await.unwrap();
        book.add("Euro", dec!(1400), AlertCondition::Below).await.unwrap();
        book.toggle(&paused.id).await.unwrap();

        let output =
            console::strip_ansi_codes(&render_check(&book, &snapshot(), &palette())).to_string();
        assert_eq!(output.matches("TRIGGERED").count(), 1);
        assert_eq!(output.matches("waiting").count(), 2);
        assert!(output.contains("paused"));
        assert!(output.contains("1 alert(s) triggered"));

        let lines = render_triggered(&book, &snapshot());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("$ 1.225,00"));
    }

    #[test]
    fn test_empty_list_hint() {
        let output = render_list(&[], &palette());
        assert!(output.contains("No alerts configured"));
    }
}
