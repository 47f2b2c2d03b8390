use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PRICE_API: &str = "https://min-api.cryptocompare.com/data/price";

#[derive(Debug, Error)]
pub enum PriceClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price lookup for {symbol} failed: {message}")]
    Unexpected { symbol: String, message: String },
}

/// Response of `GET /data/price?fsym=ETH&tsyms=USD`.
///
/// On failure the API still answers 200 with
/// `{"Response":"Error","Message":"..."}`, so every field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceResponse {
    #[serde(default, rename = "USD")]
    pub usd: Option<Decimal>,
    #[serde(default, rename = "Message")]
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PriceClient {
    http: Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the spot USD price of `symbol`.
    pub async fn get_usd_price(&self, symbol: &str) -> Result<Decimal, PriceClientError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("fsym", symbol), ("tsyms", "USD")])
            .send()
            .await?
            .error_for_status()?;

        let body: PriceResponse = resp.json().await?;
        usd_from_response(symbol, body)
    }
}

fn usd_from_response(symbol: &str, body: PriceResponse) -> Result<Decimal, PriceClientError> {
    match body.usd {
        Some(price) if price >= Decimal::ZERO => Ok(price),
        Some(price) => Err(PriceClientError::Unexpected {
            symbol: symbol.to_string(),
            message: format!("negative price {price}"),
        }),
        None => Err(PriceClientError::Unexpected {
            symbol: symbol.to_string(),
            message: body.message.unwrap_or_else(|| "missing USD field".into()),
        }),
    }
}
