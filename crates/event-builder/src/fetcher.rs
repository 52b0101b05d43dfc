//! Per-ticker fetch: query the four data sources, normalize, merge and
//! deduplicate. Every source degrades independently; a provider outage on
//! one surface never blocks the others.

use calendar_core::dates::normalize_date;
use calendar_core::{ForwardCalendar, MarketDataProvider, TickerInfo};
use serde_json::Value;

/// Mapping-shaped payloads use the provider's field names; table-shaped
/// payloads use row labels. Probe both.
const EARNINGS_KEYS: &[&str] = &["earningsDate", "Earnings Date"];
const EX_DIVIDEND_KEYS: &[&str] = &["exDividendDate", "Ex-Dividend Date"];
const PAY_DATE_KEYS: &[&str] = &["dividendDate", "Dividend Date"];

static NULL: Value = Value::Null;

/// Some forward-calendar fields hold a list of candidate dates; take the
/// first entry, like a scalar.
fn first_scalar(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    }
}

fn calendar_date(cal: &ForwardCalendar, keys: &[&str]) -> Option<chrono::NaiveDate> {
    keys.iter()
        .find_map(|key| cal.field(key))
        .and_then(|v| normalize_date(first_scalar(v)))
}

/// Collect everything the provider knows about `ticker` into one merged,
/// deduplicated `TickerInfo`. Infallible: failed sources contribute nothing.
pub async fn fetch_ticker_info(provider: &dyn MarketDataProvider, ticker: &str) -> TickerInfo {
    let mut info = TickerInfo::default();
    let mut last_dividend = 0.0;

    // 1. General profile: display name and last known dividend amount.
    match provider.company_profile(ticker).await {
        Ok(profile) => {
            info.short_name = profile.short_name.or(profile.long_name);
            last_dividend = profile.last_dividend_value.unwrap_or(0.0);
        }
        Err(e) => tracing::warn!(ticker, source = "profile", error = %e, "source unavailable"),
    }

    // 2. Forward-looking calendar: confirmed upcoming dates.
    match provider.forward_calendar(ticker).await {
        Ok(cal) => {
            if let ForwardCalendar::Malformed(shape) = &cal {
                tracing::warn!(ticker, %shape, "forward calendar has unusable shape");
            }
            if let Some(d) = calendar_date(&cal, EARNINGS_KEYS) {
                info.earnings_dates.push(d);
            }
            if let Some(d) = calendar_date(&cal, EX_DIVIDEND_KEYS) {
                info.ex_dividend_dates.push(d);
            }
            // The forward source announces a pay date without an amount;
            // reuse the profile's last dividend, but only when positive, so
            // no zero-amount placeholder events are emitted.
            if let Some(d) = calendar_date(&cal, PAY_DATE_KEYS) {
                if last_dividend > 0.0 {
                    info.dividends.push((d, last_dividend));
                }
            }
        }
        Err(e) => tracing::warn!(ticker, source = "calendar", error = %e, "source unavailable"),
    }

    // 3. Historical earnings dates.
    match provider.earnings_history(ticker).await {
        Ok(dates) => info
            .earnings_dates
            .extend(dates.iter().filter_map(normalize_date)),
        Err(e) => tracing::warn!(ticker, source = "earnings", error = %e, "source unavailable"),
    }

    // 4a. Historical dividend payments.
    match provider.dividend_history(ticker).await {
        Ok(records) => {
            for record in records {
                if let (Some(date), Some(amount)) = (normalize_date(&record.date), record.amount) {
                    info.dividends.push((date, amount));
                }
            }
        }
        Err(e) => tracing::warn!(ticker, source = "dividends", error = %e, "source unavailable"),
    }

    // 4b. Corporate actions: dividend rows mark ex-dividend dates.
    match provider.corporate_actions(ticker).await {
        Ok(actions) => {
            for action in actions {
                if action.dividend.is_some_and(|a| a > 0.0) {
                    if let Some(date) = normalize_date(&action.date) {
                        info.ex_dividend_dates.push(date);
                    }
                }
            }
        }
        Err(e) => tracing::warn!(ticker, source = "actions", error = %e, "source unavailable"),
    }

    // Historical and forward sources overlap near today; collapse the
    // double-reported events.
    info.finalize();
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calendar_core::{CalendarError, CompanyProfile, RawAction, RawDividend};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Canned provider; `fail_all` simulates a total outage.
    #[derive(Default)]
    struct FakeProvider {
        profile: CompanyProfile,
        calendar: Option<ForwardCalendar>,
        earnings: Vec<Value>,
        dividends: Vec<(String, f64)>,
        actions: Vec<(String, Option<f64>)>,
        fail_all: bool,
    }

    impl FakeProvider {
        fn err<T>(&self) -> Result<T, CalendarError> {
            Err(CalendarError::MarketData("outage".to_string()))
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn company_profile(&self, _t: &str) -> Result<CompanyProfile, CalendarError> {
            if self.fail_all {
                return self.err();
            }
            Ok(self.profile.clone())
        }

        async fn forward_calendar(&self, _t: &str) -> Result<ForwardCalendar, CalendarError> {
            if self.fail_all {
                return self.err();
            }
            Ok(self.calendar.clone().unwrap_or(ForwardCalendar::Absent))
        }

        async fn earnings_history(&self, _t: &str) -> Result<Vec<Value>, CalendarError> {
            if self.fail_all {
                return self.err();
            }
            Ok(self.earnings.clone())
        }

        async fn dividend_history(&self, _t: &str) -> Result<Vec<RawDividend>, CalendarError> {
            if self.fail_all {
                return self.err();
            }
            Ok(self
                .dividends
                .iter()
                .map(|(date, amount)| RawDividend {
                    date: json!(date),
                    amount: Some(*amount),
                })
                .collect())
        }

        async fn corporate_actions(&self, _t: &str) -> Result<Vec<RawAction>, CalendarError> {
            if self.fail_all {
                return self.err();
            }
            Ok(self
                .actions
                .iter()
                .map(|(date, dividend)| RawAction {
                    date: json!(date),
                    dividend: *dividend,
                })
                .collect())
        }
    }

    fn mapping(fields: &[(&str, Value)]) -> ForwardCalendar {
        ForwardCalendar::Mapping(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[tokio::test]
    async fn overlapping_sources_report_each_date_once() {
        // Forward calendar and corporate actions both carry the same
        // upcoming ex-dividend date.
        let provider = FakeProvider {
            calendar: Some(mapping(&[("exDividendDate", json!("2024-06-10"))])),
            actions: vec![
                ("2024-06-10".to_string(), Some(0.25)),
                ("2024-03-10".to_string(), Some(0.25)),
                ("2024-01-05".to_string(), None),
            ],
            ..Default::default()
        };
        let info = fetch_ticker_info(&provider, "AAA").await;
        assert_eq!(info.ex_dividend_dates, vec![d(2024, 3, 10), d(2024, 6, 10)]);
    }

    #[tokio::test]
    async fn forward_pay_date_reuses_last_dividend_only_when_positive() {
        let calendar = Some(mapping(&[("dividendDate", json!("2024-07-01"))]));

        let with_amount = FakeProvider {
            profile: CompanyProfile {
                last_dividend_value: Some(0.30),
                ..Default::default()
            },
            calendar: calendar.clone(),
            ..Default::default()
        };
        let info = fetch_ticker_info(&with_amount, "AAA").await;
        assert_eq!(info.dividends, vec![(d(2024, 7, 1), 0.30)]);

        let without_amount = FakeProvider {
            calendar,
            ..Default::default()
        };
        let info = fetch_ticker_info(&without_amount, "AAA").await;
        assert!(info.dividends.is_empty());
    }

    #[tokio::test]
    async fn forward_and_historical_dividends_merge_and_dedup() {
        let provider = FakeProvider {
            profile: CompanyProfile {
                short_name: Some("Acme Corp".to_string()),
                last_dividend_value: Some(0.25),
                ..Default::default()
            },
            calendar: Some(mapping(&[("dividendDate", json!("2024-06-01"))])),
            dividends: vec![
                ("2024-06-01".to_string(), 0.25),
                ("2024-03-01".to_string(), 0.24),
            ],
            ..Default::default()
        };
        let info = fetch_ticker_info(&provider, "AAA").await;
        assert_eq!(info.short_name.as_deref(), Some("Acme Corp"));
        assert_eq!(
            info.dividends,
            vec![(d(2024, 3, 1), 0.24), (d(2024, 6, 1), 0.25)]
        );
    }

    #[tokio::test]
    async fn table_shaped_calendar_is_read_through_row_labels() {
        let provider = FakeProvider {
            calendar: Some(ForwardCalendar::Table(BTreeMap::from([
                (
                    "Earnings Date".to_string(),
                    vec![json!("2024-08-01"), json!("2024-08-05")],
                ),
                ("Ex-Dividend Date".to_string(), vec![json!("2024-08-09")]),
            ]))),
            ..Default::default()
        };
        let info = fetch_ticker_info(&provider, "AAA").await;
        assert_eq!(info.earnings_dates, vec![d(2024, 8, 1)]);
        assert_eq!(info.ex_dividend_dates, vec![d(2024, 8, 9)]);
    }

    #[tokio::test]
    async fn malformed_calendar_and_bad_dates_degrade_quietly() {
        let provider = FakeProvider {
            calendar: Some(ForwardCalendar::Malformed("number".to_string())),
            earnings: vec![json!("not a date"), json!("2024-05-02"), Value::Null],
            ..Default::default()
        };
        let info = fetch_ticker_info(&provider, "AAA").await;
        assert_eq!(info.earnings_dates, vec![d(2024, 5, 2)]);
        assert!(info.ex_dividend_dates.is_empty());
    }

    #[tokio::test]
    async fn total_outage_yields_an_empty_info() {
        let provider = FakeProvider {
            fail_all: true,
            ..Default::default()
        };
        let info = fetch_ticker_info(&provider, "AAA").await;
        assert!(info.short_name.is_none());
        assert!(info.dividends.is_empty());
        assert!(info.ex_dividend_dates.is_empty());
        assert!(info.earnings_dates.is_empty());
    }
}
