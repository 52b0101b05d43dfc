use chrono::{Months, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;

/// All run parameters in one immutable struct, injected into the builder and
/// calculator. Defaults carry the production tables; tests override fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Currency every amount is converted into.
    pub home_currency: String,
    /// Investor's home-country dividend tax rate.
    pub domestic_tax_rate: f64,
    /// Withholding applied by countries missing from the table.
    pub default_foreign_withholding: f64,
    /// Withholding rate at source, by country code.
    pub foreign_withholding: HashMap<String, f64>,
    /// Quote currency by exchange code. Unknown markets fall back to USD.
    pub market_currency: HashMap<String, String>,
    /// Price scale by exchange code. LON quotes in pence, so dividend
    /// amounts need a 0.01 correction into pounds. Other minor-unit markets
    /// are a known gap and deliberately not listed.
    pub market_price_scale: HashMap<String, f64>,
    /// Output window half-width: events further than this from today are
    /// filtered out of the calendars.
    pub window_months: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            home_currency: "EUR".to_string(),
            domestic_tax_rate: 0.19,
            default_foreign_withholding: 0.15,
            foreign_withholding: HashMap::from([
                ("ES".to_string(), 0.19),
                ("US".to_string(), 0.30),
                ("GB".to_string(), 0.00),
                ("FR".to_string(), 0.128),
                ("BR".to_string(), 0.15),
                ("SE".to_string(), 0.30),
            ]),
            market_currency: HashMap::from([
                ("BME".to_string(), "EUR".to_string()),
                ("EPA".to_string(), "EUR".to_string()),
                ("LON".to_string(), "GBP".to_string()),
                ("STO".to_string(), "SEK".to_string()),
                ("NASDAQ".to_string(), "USD".to_string()),
                ("NYSE".to_string(), "USD".to_string()),
            ]),
            market_price_scale: HashMap::from([("LON".to_string(), 0.01)]),
            window_months: 3,
        }
    }
}

impl CalendarConfig {
    pub fn withholding_for(&self, country: &str) -> f64 {
        self.foreign_withholding
            .get(country)
            .copied()
            .unwrap_or(self.default_foreign_withholding)
    }

    pub fn currency_for(&self, market: &str) -> &str {
        self.market_currency
            .get(market)
            .map(String::as_str)
            .unwrap_or("USD")
    }

    pub fn scale_for(&self, market: &str) -> f64 {
        self.market_price_scale.get(market).copied().unwrap_or(1.0)
    }

    /// Inclusive output window centered on `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let months = Months::new(self.window_months);
        let start = today.checked_sub_months(months).unwrap_or(today);
        let end = today.checked_add_months(months).unwrap_or(today);
        (start, end)
    }
}
