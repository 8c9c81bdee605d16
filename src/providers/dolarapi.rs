use crate::core::error::FetchError;
use crate::core::quote::{CurrencyQuote, QuoteProvider};
use crate::providers::http::{build_client, get_json};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Quotes from dolarapi.com.
pub struct DolarApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl DolarApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(DolarApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct DolarApiQuote {
    nombre: String,
    casa: String,
    compra: Decimal,
    venta: Decimal,
    moneda: String,
    #[serde(rename = "fechaActualizacion", default)]
    fecha_actualizacion: Option<DateTime<Utc>>,
}

impl From<DolarApiQuote> for CurrencyQuote {
    fn from(q: DolarApiQuote) -> Self {
        CurrencyQuote {
            name: q.nombre,
            house: q.casa,
            buy: q.compra,
            sell: q.venta,
            currency_code: q.moneda,
            updated_at: q.fecha_actualizacion,
        }
    }
}

#[async_trait]
impl QuoteProvider for DolarApiProvider {
    #[instrument(name = "DolarApiDollars", skip(self))]
    async fn fetch_dollars(&self) -> Result<Vec<CurrencyQuote>, FetchError> {
        let url = format!("{}/v1/dolares", self.base_url);
        let quotes: Vec<DolarApiQuote> = get_json(&self.client, &url).await?;
        debug!(count = quotes.len(), "Fetched dollar quotes");
        Ok(quotes.into_iter().map(CurrencyQuote::from).collect())
    }

    #[instrument(name = "DolarApiQuote", skip(self))]
    async fn fetch_quote(&self, code: &str) -> Result<CurrencyQuote, FetchError> {
        let url = format!("{}/v1/cotizaciones/{}", self.base_url, code.to_lowercase());
        let quote: DolarApiQuote = get_json(&self.client, &url).await?;
        Ok(quote.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOLARES: &str = r#"[
        {
            "moneda": "USD",
            "casa": "oficial",
            "nombre": "Oficial",
            "compra": 1045.5,
            "venta": 1085.5,
            "fechaActualizacion": "2025-03-14T15:00:00.000Z"
        },
        {
            "moneda": "USD",
            "casa": "blue",
            "nombre": "Blue",
            "compra": 1205,
            "venta": 1225,
            "fechaActualizacion": "2025-03-14T15:03:00.000Z"
        }
    ]"#;

    async fn create_mock_server(request_path: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_dollars() {
        let mock_server = create_mock_server("/v1/dolares", 200, DOLARES).await;
        let provider = DolarApiProvider::new(&mock_server.uri()).unwrap();

        let quotes = provider.fetch_dollars().await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].name, "Oficial");
        assert_eq!(quotes[0].buy, dec!(1045.5));
        assert_eq!(quotes[1].house, "blue");
        assert_eq!(quotes[1].sell, dec!(1225));
        assert_eq!(
            quotes[1].updated_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 15, 3, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_quote() {
        let body = r#"{
            "moneda": "BRL",
            "casa": "oficial",
            "nombre": "Real Brasileño",
            "compra": 180.2,
            "venta": 195.8
        }"#;
        let mock_server = create_mock_server("/v1/cotizaciones/brl", 200, body).await;
        let provider = DolarApiProvider::new(&mock_server.uri()).unwrap();

        let quote = provider.fetch_quote("BRL").await.unwrap();
        assert_eq!(quote.currency_code, "BRL");
        assert_eq!(quote.buy, dec!(180.2));
        assert!(quote.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = create_mock_server("/v1/dolares", 500, "").await;
        let provider = DolarApiProvider::new(&mock_server.uri()).unwrap();

        let err = provider.fetch_dollars().await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Status {
                url: format!("{}/v1/dolares", mock_server.uri()),
                status: 500,
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        // "venta" missing
        let body = r#"{"moneda": "EUR", "casa": "oficial", "nombre": "Euro", "compra": 1}"#;
        let mock_server = create_mock_server("/v1/cotizaciones/eur", 200, body).await;
        let provider = DolarApiProvider::new(&mock_server.uri()).unwrap();

        let err = provider.fetch_quote("eur").await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
        assert!(err.to_string().contains("venta"));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let provider = DolarApiProvider::new("http://127.0.0.1:9").unwrap();
        let err = provider.fetch_dollars().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
