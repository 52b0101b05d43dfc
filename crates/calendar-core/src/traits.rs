use crate::error::CalendarError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// General metadata for one ticker.
#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    /// Most recent per-share dividend amount, used as a stand-in when the
    /// forward calendar announces a pay date without an amount.
    pub last_dividend_value: Option<f64>,
}

/// The forward-looking calendar arrives in several shapes from the provider:
/// missing, a plain field mapping, a row-oriented table, or (observed in the
/// wild) a useless scalar. The client classifies the raw payload exactly
/// once; downstream code only ever sees this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardCalendar {
    Absent,
    Mapping(BTreeMap<String, Value>),
    Table(BTreeMap<String, Vec<Value>>),
    /// Description of the unusable shape, for the log line.
    Malformed(String),
}

impl ForwardCalendar {
    /// Look up a field regardless of shape: direct value for mappings, first
    /// cell of the row for tables, nothing for the other variants.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            ForwardCalendar::Mapping(map) => map.get(key),
            ForwardCalendar::Table(rows) => rows.get(key).and_then(|row| row.first()),
            ForwardCalendar::Absent | ForwardCalendar::Malformed(_) => None,
        }
    }
}

/// One record of the historical dividend series. The date is left raw; the
/// normalizer decides whether it is usable.
#[derive(Debug, Clone)]
pub struct RawDividend {
    pub date: Value,
    pub amount: Option<f64>,
}

/// One record of the corporate-actions series. Rows with a positive
/// `dividend` mark ex-dividend dates.
#[derive(Debug, Clone)]
pub struct RawAction {
    pub date: Value,
    pub dividend: Option<f64>,
}

/// Per-ticker market-data collaborator. Each method is one independent
/// query surface; any of them may fail without affecting the others.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn company_profile(&self, ticker: &str) -> Result<CompanyProfile, CalendarError>;
    async fn forward_calendar(&self, ticker: &str) -> Result<ForwardCalendar, CalendarError>;
    /// Historical earnings dates, raw.
    async fn earnings_history(&self, ticker: &str) -> Result<Vec<Value>, CalendarError>;
    /// Historical dividend payments, raw.
    async fn dividend_history(&self, ticker: &str) -> Result<Vec<RawDividend>, CalendarError>;
    /// Historical corporate actions, raw.
    async fn corporate_actions(&self, ticker: &str) -> Result<Vec<RawAction>, CalendarError>;
}

/// FX-rate collaborator: rate to convert one unit of `base` into `target`.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    async fn rate(&self, base: &str, target: &str) -> Result<f64, CalendarError>;
}
