use super::ui;
use crate::core::history::{HistoricalPoint, HistorySeries, HistoryWindow};
use crate::core::service::RatesService;
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const SPARK_BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;
const TABLE_ROWS: usize = 10;

/// Evenly spaced picks from `points`, always including the last one.
fn sample(points: &[HistoricalPoint], count: usize) -> Vec<&HistoricalPoint> {
    if points.len() <= count {
        return points.iter().collect();
    }
    if count <= 1 {
        return points.last().into_iter().take(count).collect();
    }
    let last = points.len() - 1;
    (0..count)
        .map(|i| &points[i * last / (count - 1)])
        .collect()
}

/// Sell prices as a row of block characters scaled between min and max.
pub fn sparkline(points: &[HistoricalPoint], width: usize) -> String {
    let values: Vec<f64> = sample(points, width)
        .iter()
        .filter_map(|p| p.sell.to_f64())
        .collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= 0.0 {
                return SPARK_BLOCKS[0];
            }
            let level = ((v - min) / span * (SPARK_BLOCKS.len() - 1) as f64).round() as usize;
            SPARK_BLOCKS[level.min(SPARK_BLOCKS.len() - 1)]
        })
        .collect()
}

impl HistorySeries {
    pub fn display_as_table(&self, palette: &ui::Palette) -> String {
        let title = format!("{} ({})", self.house, self.window);
        let mut output = format!("History: {}\n\n", ui::style_text(&title, ui::StyleType::Title));

        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            output.push_str(&ui::style_text("No data for this period", ui::StyleType::Subtle));
            return output;
        };

        output.push_str(&sparkline(&self.points, SPARK_WIDTH));
        output.push_str("\n\n");

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date", palette),
            ui::header_cell("Buy", palette),
            ui::header_cell("Sell", palette),
        ]);
        for point in sample(&self.points, TABLE_ROWS) {
            table.add_row(vec![
                Cell::new(point.date.format("%d/%m/%Y")),
                ui::ars_cell(point.buy),
                ui::ars_cell(point.sell),
            ]);
        }
        output.push_str(&table.to_string());

        let mut summary = ui::new_styled_table();
        summary.set_header(vec![
            ui::header_cell("From", palette),
            ui::header_cell("To", palette),
            ui::header_cell("Min", palette),
            ui::header_cell("Max", palette),
            ui::header_cell("Variation", palette),
        ]);
        let (min, max) = self.sell_range().unwrap_or((Decimal::ZERO, Decimal::ZERO));
        summary.add_row(vec![
            ui::ars_cell(first.sell),
            ui::ars_cell(last.sell),
            ui::ars_cell(min),
            ui::ars_cell(max),
            ui::change_cell(self.variation()),
        ]);
        output.push_str("\n\n");
        output.push_str(&summary.to_string());
        output
    }
}

pub async fn run(
    service: &RatesService,
    palette: &ui::Palette,
    house: &str,
    window: HistoryWindow,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {house} history..."));
    let series = service.history(house, window, false).await;
    pb.finish_and_clear();

    println!("{}", series?.display_as_table(palette));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Theme;
    use chrono::NaiveDate;

    fn points(sells: &[i64]) -> Vec<HistoricalPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        sells
            .iter()
            .enumerate()
            .map(|(i, sell)| HistoricalPoint {
                date: start + chrono::Duration::days(i as i64),
                house: "blue".to_string(),
                buy: Decimal::from(sell - 20),
                sell: Decimal::from(*sell),
            })
            .collect()
    }

    #[test]
    fn test_sample_keeps_ends() {
        let series = points(&(0..100).collect::<Vec<_>>());
        let picked = sample(&series, 10);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked[0], &series[0]);
        assert_eq!(picked[9], &series[99]);
        assert_eq!(sample(&series[..3], 10).len(), 3);
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&points(&[100, 150, 200]), 60), "▁▅█");
        assert_eq!(sparkline(&points(&[100, 100]), 60), "▁▁");
        assert_eq!(sparkline(&[], 60), "");
        assert_eq!(sparkline(&points(&[100, 150, 200]), 1), "▁");
        assert_eq!(sparkline(&points(&[100, 150, 200]), 0), "");
    }

    #[test]
    fn test_series_summary() {
        let series = HistorySeries {
            house: "blue".to_string(),
            window: HistoryWindow::ThirtyDays,
            points: points(&[1000, 1100, 1050]),
        };
        let output = console::strip_ansi_codes(
            &series.display_as_table(&ui::Palette::for_theme(Theme::Dark)),
        )
        .to_string();
        assert!(output.contains("blue (30d)"));
        assert!(output.contains("+5.00%"));
        assert!(output.contains("$ 1.100,00"));
        assert!(output.contains("03/01/2025"));

        let empty = HistorySeries {
            points: vec![],
            ..series
        };
        assert!(
            empty
                .display_as_table(&ui::Palette::for_theme(Theme::Dark))
                .contains("No data for this period")
        );
    }
}
