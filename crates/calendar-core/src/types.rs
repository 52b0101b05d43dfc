use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the holdings file. Read once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    /// ISO-ish country code, uppercased, may be empty.
    pub country: String,
    /// Exchange code (BME, LON, NASDAQ, ...), uppercased, may be empty.
    pub market: String,
    pub shares: i64,
    pub name: Option<String>,
}

/// Event buckets, one output calendar per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    ExDividend,
    DividendPayment,
    Earnings,
}

impl EventCategory {
    /// Stable identifier used in UIDs and output filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            EventCategory::ExDividend => "ex-dividend",
            EventCategory::DividendPayment => "dividend",
            EventCategory::Earnings => "earnings",
        }
    }

    /// CATEGORIES tag consumed by the calendar client for visual grouping.
    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::ExDividend => "orange",
            EventCategory::DividendPayment => "green",
            EventCategory::Earnings => "blue",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Everything we learned about one ticker from the market-data provider.
/// Built fresh per run, never persisted.
#[derive(Debug, Clone, Default)]
pub struct TickerInfo {
    pub short_name: Option<String>,
    /// (pay date, per-share amount) pairs, historical and forward.
    pub dividends: Vec<(NaiveDate, f64)>,
    pub ex_dividend_dates: Vec<NaiveDate>,
    pub earnings_dates: Vec<NaiveDate>,
}

/// Dividend amounts compare in integer micro-units so that float noise from
/// upstream sources cannot defeat deduplication.
fn micro_units(amount: f64) -> i64 {
    (amount * 1e6).round() as i64
}

impl TickerInfo {
    /// Sort all date collections ascending and drop duplicates. Historical
    /// and forward-looking sources overlap near the present date, so the
    /// same upcoming event usually arrives twice before this runs.
    pub fn finalize(&mut self) {
        self.ex_dividend_dates.sort_unstable();
        self.ex_dividend_dates.dedup();
        self.earnings_dates.sort_unstable();
        self.earnings_dates.dedup();
        self.dividends
            .sort_by_key(|(date, amount)| (*date, micro_units(*amount)));
        self.dividends
            .dedup_by_key(|(date, amount)| (*date, micro_units(*amount)));
    }
}

/// Gross-to-net dividend breakdown. All fields rounded to 6 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub gross: f64,
    pub foreign_withholding: f64,
    /// Home-country top-up after crediting the foreign withholding.
    /// Floors at zero: no refund is modeled.
    pub domestic_tax: f64,
    pub net: f64,
}

/// A single all-day calendar entry, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub category: EventCategory,
    pub date: NaiveDate,
    pub summary: String,
    pub description: String,
    pub ticker: String,
}

impl CalendarEvent {
    /// Deterministic UID from (ticker, category, date). Regenerating the
    /// calendar from the same inputs must reproduce the same UID so that
    /// consumers update events in place instead of duplicating them.
    pub fn uid(&self) -> String {
        format!(
            "{}-{}-{}@dividend-calendar",
            self.ticker,
            self.category.slug(),
            self.date.format("%Y-%m-%d")
        )
    }
}
