use super::ui;
use crate::core::error::QuoteFetchError;
use crate::core::quote::Snapshot;
use crate::core::service::RatesService;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use comfy_table::Cell;

impl Snapshot {
    pub fn display_as_table(&self, palette: &ui::Palette) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency", palette),
            ui::header_cell("Buy", palette),
            ui::header_cell("Sell", palette),
        ]);

        for quote in self.quotes() {
            table.add_row(vec![
                Cell::new(quote.label()),
                ui::ars_cell(quote.buy),
                ui::ars_cell(quote.sell),
            ]);
        }

        format!(
            "{}\n{}",
            table,
            ui::style_text(
                &format!("Last updated: {}", format_timestamp(self.last_updated)),
                ui::StyleType::Subtle
            )
        )
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

/// Renders the latest snapshot, flagging it when it is being kept after a
/// failed refresh.
pub fn render(
    snapshot: &Snapshot,
    stale: Option<&QuoteFetchError>,
    palette: &ui::Palette,
) -> String {
    let mut output = snapshot.display_as_table(palette);
    if let Some(err) = stale {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Showing last known rates, refresh failed: {err}"),
                ui::StyleType::Warning
            )
        ));
    }
    output
}

pub async fn run(service: &RatesService, palette: &ui::Palette) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates...");
    let snapshot = service.snapshot(false).await;
    pb.finish_and_clear();
    let snapshot = snapshot?;

    println!("{}", render(&snapshot, None, palette));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FetchError;
    use crate::core::quote::REAL_BLUE;
    use crate::core::quote::test_support::quote;
    use comfy_table::Color;
    use rust_decimal_macros::dec;

    const PALETTE: ui::Palette = ui::Palette {
        header: Color::Cyan,
        highlight: Color::Green,
        muted: Color::DarkGrey,
    };

    fn snapshot() -> Snapshot {
        Snapshot {
            dollars: vec![
                quote("Blue", "blue", dec!(1205), dec!(1225)),
                quote("Contado con liquidación", "contadoconliqui", dec!(1180), dec!(1190.5)),
            ],
            real_blue: Some(quote(REAL_BLUE, "oficial", dec!(250), dec!(250))),
            euro: None,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_table_lists_every_quote() {
        let output = console::strip_ansi_codes(&snapshot().display_as_table(&PALETTE)).to_string();
        assert!(output.contains("Blue"));
        assert!(output.contains("CCL"));
        assert!(output.contains("Real Blue"));
        assert!(output.contains("$ 1.190,50"));
        assert!(!output.contains("Euro"));
        assert!(output.contains("Last updated"));
    }

    #[test]
    fn test_stale_snapshot_is_flagged() {
        let err = QuoteFetchError::required(
            "dollar",
            FetchError::Status {
                url: "http://mock/v1/dolares".to_string(),
                status: 502,
            },
        );
        let output = console::strip_ansi_codes(&render(&snapshot(), Some(&err), &PALETTE)).to_string();
        assert!(output.contains("Showing last known rates"));
        assert!(!render(&snapshot(), None, &PALETTE).contains("Showing last known rates"));
    }
}
