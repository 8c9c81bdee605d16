use super::ui;
use crate::core::quote::CurrencyQuote;
use crate::core::service::RatesService;
use anyhow::Result;
use comfy_table::Cell;

pub fn render(quote: &CurrencyQuote, palette: &ui::Palette) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency", palette),
        ui::header_cell("Code", palette),
        ui::header_cell("Buy", palette),
        ui::header_cell("Sell", palette),
        ui::header_cell("Updated", palette),
    ]);
    table.add_row(vec![
        Cell::new(quote.label()),
        Cell::new(&quote.currency_code),
        ui::ars_cell(quote.buy),
        ui::ars_cell(quote.sell),
        ui::format_optional_cell(quote.updated_at, palette, super::rates::format_timestamp),
    ]);
    table.to_string()
}

pub async fn run(service: &RatesService, palette: &ui::Palette, code: &str) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {code} quote..."));
    let quote = service.quote(code, false).await;
    pb.finish_and_clear();
    let quote = quote?;

    println!("{}", render(&quote, palette));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quote::test_support::quote;
    use crate::core::settings::Theme;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_single_quote() {
        let mut clp = quote("Peso Chileno", "oficial", dec!(1.02), dec!(1.15));
        clp.currency_code = "CLP".to_string();

        let output =
            console::strip_ansi_codes(&render(&clp, &ui::Palette::for_theme(Theme::Light))).to_string();
        assert!(output.contains("Peso Chileno"));
        assert!(output.contains("CLP"));
        assert!(output.contains("$ 1,15"));
        assert!(output.contains("N/A"));
    }
}
