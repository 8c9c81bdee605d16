use crate::core::error::FetchError;
use crate::core::history::{HistoricalPoint, HistoryProvider};
use crate::providers::http::{build_client, get_json};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Daily dollar history from api.argentinadatos.com.
pub struct ArgentinaDatosProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ArgentinaDatosProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(ArgentinaDatosProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct HistoryEntry {
    fecha: NaiveDate,
    casa: String,
    compra: Decimal,
    venta: Decimal,
}

#[async_trait]
impl HistoryProvider for ArgentinaDatosProvider {
    #[instrument(name = "ArgentinaDatosHistory", skip(self))]
    async fn fetch_history(&self, house: &str) -> Result<Vec<HistoricalPoint>, FetchError> {
        let url = format!("{}/v1/cotizaciones/dolares/{}", self.base_url, house);
        let entries: Vec<HistoryEntry> = get_json(&self.client, &url).await?;

        let mut points: Vec<HistoricalPoint> = entries
            .into_iter()
            .map(|e| HistoricalPoint {
                date: e.fecha,
                house: e.casa,
                buy: e.compra,
                sell: e.venta,
            })
            .collect();
        points.sort_by_key(|p| p.date);

        debug!(
            count = points.len(),
            first = ?points.first().map(|p| p.date),
            last = ?points.last().map(|p| p.date),
            "Fetched history"
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_history_is_chronological() {
        let body = r#"[
            {"casa": "blue", "compra": 1180, "venta": 1200, "fecha": "2025-03-13"},
            {"casa": "blue", "compra": 1150, "venta": 1170, "fecha": "2025-03-11"},
            {"casa": "blue", "compra": 1165.5, "venta": 1185.5, "fecha": "2025-03-12"}
        ]"#;
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cotizaciones/dolares/blue"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let provider = ArgentinaDatosProvider::new(&mock_server.uri()).unwrap();
        let points = provider.fetch_history("blue").await.unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(points[1].sell, dec!(1185.5));
        assert_eq!(points[2].buy, dec!(1180));
    }

    #[tokio::test]
    async fn test_not_found_house() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cotizaciones/dolares/cripto"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let provider = ArgentinaDatosProvider::new(&mock_server.uri()).unwrap();
        let err = provider.fetch_history("cripto").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_bad_date_is_malformed() {
        let body = r#"[{"casa": "blue", "compra": 1, "venta": 2, "fecha": "13/03/2025"}]"#;
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cotizaciones/dolares/blue"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let provider = ArgentinaDatosProvider::new(&mock_server.uri()).unwrap();
        let err = provider.fetch_history("blue").await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }
}
