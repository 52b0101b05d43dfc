//! Exchange-rate collaborator client (open.er-api.com). One request per
//! base currency; the response maps target codes to rates.

use async_trait::async_trait;
use calendar_core::{CalendarError, FxRateProvider};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://open.er-api.com/v6/latest";

#[derive(Debug, Deserialize)]
struct FxResponse {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[derive(Clone)]
pub struct FxClient {
    client: Client,
    base_url: String,
}

impl Default for FxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FxClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[async_trait]
impl FxRateProvider for FxClient {
    async fn rate(&self, base: &str, target: &str) -> Result<f64, CalendarError> {
        let base = base.trim().to_uppercase();
        let target = target.trim().to_uppercase();
        if base == target {
            return Ok(1.0);
        }

        let url = format!("{}/{}", self.base_url, base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CalendarError::FxLookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::FxLookup(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: FxResponse = response
            .json()
            .await
            .map_err(|e| CalendarError::FxLookup(e.to_string()))?;

        if body.result != "success" {
            return Err(CalendarError::FxLookup(format!(
                "provider result '{}'",
                body.result
            )));
        }

        body.rates.get(&target).copied().ok_or_else(|| {
            CalendarError::FxLookup(format!("no rate for {}->{}", base, target))
        })
    }
}
