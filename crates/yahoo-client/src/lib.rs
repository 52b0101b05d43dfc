//! Yahoo Finance client for the five per-ticker query surfaces: general
//! profile, forward calendar, historical earnings, historical dividends and
//! corporate actions. Response shapes are unreliable, so payloads are
//! navigated as `serde_json::Value` and classified at this boundary.

use async_trait::async_trait;
use calendar_core::{
    CalendarError, CompanyProfile, ForwardCalendar, MarketDataProvider, RawAction, RawDividend,
};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
/// Yahoo rejects requests without a browser-looking user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// First result object of a quoteSummary response for `modules`.
    async fn quote_summary(&self, ticker: &str, modules: &str) -> Result<Value, CalendarError> {
        let url = format!("{}/{}", QUOTE_SUMMARY_URL, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("modules", modules)])
            .send()
            .await
            .map_err(|e| CalendarError::MarketData(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::MarketData(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CalendarError::MarketData(e.to_string()))?;

        first_result(&body, "quoteSummary")
    }

    /// First result object of a chart response with the given event types.
    async fn chart(&self, ticker: &str, events: &str) -> Result<Value, CalendarError> {
        let url = format!("{}/{}", CHART_URL, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("range", "10y"), ("interval", "1mo"), ("events", events)])
            .send()
            .await
            .map_err(|e| CalendarError::MarketData(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CalendarError::MarketData(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CalendarError::MarketData(e.to_string()))?;

        first_result(&body, "chart")
    }
}

/// Pull `body.{key}.result[0]`, surfacing the provider's own error message
/// when present.
fn first_result(body: &Value, key: &str) -> Result<Value, CalendarError> {
    let envelope = body
        .get(key)
        .ok_or_else(|| CalendarError::MarketData(format!("missing '{}' envelope", key)))?;

    if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
        let msg = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("provider error");
        return Err(CalendarError::MarketData(msg.to_string()));
    }

    envelope
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .cloned()
        .ok_or_else(|| CalendarError::MarketData(format!("empty '{}' result", key)))
}

/// Yahoo wraps most numbers as `{"raw": n, "fmt": "..."}`; accept both that
/// and a plain number.
fn raw_f64(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    value
        .as_f64()
        .or_else(|| value.get("raw").and_then(Value::as_f64))
}

/// Like `raw_f64` but keeps the value raw for the date normalizer.
fn raw_value(value: Option<&Value>) -> Value {
    match value {
        Some(v) => v.get("raw").cloned().unwrap_or_else(|| v.clone()),
        None => Value::Null,
    }
}

fn parse_profile(result: &Value) -> CompanyProfile {
    let price = result.get("price");
    let stats = result.get("defaultKeyStatistics");
    CompanyProfile {
        short_name: price
            .and_then(|p| p.get("shortName"))
            .and_then(Value::as_str)
            .map(str::to_string),
        long_name: price
            .and_then(|p| p.get("longName"))
            .and_then(Value::as_str)
            .map(str::to_string),
        last_dividend_value: raw_f64(stats.and_then(|s| s.get("lastDividendValue"))),
    }
}

/// Classify the raw calendarEvents payload into its tagged shape. The
/// provider has been observed returning null, an empty object, a field
/// mapping (sometimes with the earnings fields nested one level down), a
/// row-oriented table, and bare scalars such as a float NaN placeholder.
fn classify_calendar(raw: Value) -> ForwardCalendar {
    match raw {
        Value::Null => ForwardCalendar::Absent,
        Value::Object(map) => {
            if map.is_empty() {
                return ForwardCalendar::Absent;
            }

            // Flatten the nested "earnings" block so that earningsDate sits
            // next to exDividendDate / dividendDate.
            let mut flat: BTreeMap<String, Value> = BTreeMap::new();
            for (k, v) in map {
                if k == "earnings" {
                    if let Value::Object(inner) = v {
                        for (ik, iv) in inner {
                            flat.insert(ik, iv);
                        }
                        continue;
                    }
                }
                flat.insert(k, v);
            }

            if !flat.is_empty() && flat.values().all(Value::is_array) {
                let rows = flat
                    .into_iter()
                    .map(|(k, v)| match v {
                        Value::Array(cells) => (k, cells),
                        _ => (k, Vec::new()),
                    })
                    .collect();
                ForwardCalendar::Table(rows)
            } else {
                ForwardCalendar::Mapping(flat)
            }
        }
        other => {
            let shape = match other {
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Bool(_) => "bool",
                Value::Array(_) => "array",
                _ => "unknown",
            };
            ForwardCalendar::Malformed(shape.to_string())
        }
    }
}

fn parse_earnings_history(result: &Value) -> Vec<Value> {
    result
        .get("earningsHistory")
        .and_then(|h| h.get("history"))
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| raw_value(row.get("quarter")))
                .collect()
        })
        .unwrap_or_default()
}

/// The chart endpoint keys dividend events by epoch seconds, with the date
/// repeated inside the record. Prefer the record's own date, fall back to
/// the key.
fn parse_dividend_events(result: &Value) -> Vec<RawDividend> {
    let Some(dividends) = result
        .get("events")
        .and_then(|e| e.get("dividends"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    dividends
        .iter()
        .map(|(key, record)| {
            let date = match record.get("date") {
                Some(d) if !d.is_null() => d.clone(),
                _ => key
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(key.clone())),
            };
            RawDividend {
                date,
                amount: raw_f64(record.get("amount")),
            }
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, CalendarError> {
        let result = self
            .quote_summary(ticker, "price,defaultKeyStatistics")
            .await?;
        Ok(parse_profile(&result))
    }

    async fn forward_calendar(&self, ticker: &str) -> Result<ForwardCalendar, CalendarError> {
        let result = self.quote_summary(ticker, "calendarEvents").await?;
        let raw = result.get("calendarEvents").cloned().unwrap_or(Value::Null);
        Ok(classify_calendar(raw))
    }

    async fn earnings_history(&self, ticker: &str) -> Result<Vec<Value>, CalendarError> {
        let result = self.quote_summary(ticker, "earningsHistory").await?;
        Ok(parse_earnings_history(&result))
    }

    async fn dividend_history(&self, ticker: &str) -> Result<Vec<RawDividend>, CalendarError> {
        let result = self.chart(ticker, "div").await?;
        Ok(parse_dividend_events(&result))
    }

    async fn corporate_actions(&self, ticker: &str) -> Result<Vec<RawAction>, CalendarError> {
        let result = self.chart(ticker, "div|split").await?;
        Ok(parse_dividend_events(&result)
            .into_iter()
            .map(|d| RawAction {
                date: d.date,
                dividend: d.amount,
            })
            .collect())
    }
}
