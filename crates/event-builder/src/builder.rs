//! Turns holdings into calendar events: market lookups, FX conversion, tax
//! breakdown, one event per date. Strictly sequential; one bad holding is
//! logged and skipped.

use calendar_core::{
    compute_net, CalendarConfig, CalendarEvent, EventCategory, FxRateProvider, Holding,
    MarketDataProvider,
};

use crate::fetcher::fetch_ticker_info;

pub struct EventBuilder<M, F> {
    config: CalendarConfig,
    market_data: M,
    fx: F,
}

impl<M: MarketDataProvider, F: FxRateProvider> EventBuilder<M, F> {
    pub fn new(config: CalendarConfig, market_data: M, fx: F) -> Self {
        Self {
            config,
            market_data,
            fx,
        }
    }

    /// Rate to convert `base` into the home currency. Equal codes skip the
    /// collaborator entirely; any lookup failure falls back to 1.0 so a
    /// missing rate never aborts event generation for other holdings.
    async fn resolve_fx(&self, base: &str) -> f64 {
        let target = &self.config.home_currency;
        if base.eq_ignore_ascii_case(target) {
            return 1.0;
        }
        match self.fx.rate(base, target).await {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!(base, %target, error = %e, "FX lookup failed, using 1.0");
                1.0
            }
        }
    }

    /// Build the flat event list for all holdings, one holding at a time.
    pub async fn build_events(&self, holdings: &[Holding]) -> Vec<CalendarEvent> {
        let mut events = Vec::new();
        for holding in holdings {
            if holding.shares == 0 {
                continue;
            }
            tracing::info!(
                ticker = %holding.ticker,
                name = holding.name.as_deref().unwrap_or(&holding.ticker),
                "processing holding"
            );
            self.build_for_holding(holding, &mut events).await;
        }
        events
    }

    async fn build_for_holding(&self, holding: &Holding, events: &mut Vec<CalendarEvent>) {
        let info = fetch_ticker_info(&self.market_data, &holding.ticker).await;
        let company = info
            .short_name
            .clone()
            .or_else(|| holding.name.clone())
            .unwrap_or_else(|| holding.ticker.clone());

        let currency = self.config.currency_for(&holding.market).to_string();
        let scale = self.config.scale_for(&holding.market);
        let fx = self.resolve_fx(&currency).await;
        let foreign_rate = self.config.withholding_for(&holding.country);
        let home = &self.config.home_currency;

        for ex_date in &info.ex_dividend_dates {
            events.push(CalendarEvent {
                category: EventCategory::ExDividend,
                date: *ex_date,
                summary: format!("Ex-Div - {}", company),
                description: format!(
                    "{} ({})\nEx-dividend date: {}",
                    company, holding.ticker, ex_date
                ),
                ticker: holding.ticker.clone(),
            });
        }

        for (pay_date, amount) in &info.dividends {
            if *amount <= 0.0 {
                continue;
            }
            let gross = amount * scale * holding.shares as f64 * fx;
            let calc = compute_net(gross, foreign_rate, self.config.domestic_tax_rate);
            events.push(CalendarEvent {
                category: EventCategory::DividendPayment,
                date: *pay_date,
                summary: format!("Div ({:.2} {}) - {}", calc.net, home, company),
                description: format!(
                    "{} ({})\n\
                     Pay date: {}\n\
                     Shares: {}\n\
                     Div/share: {:.4} {}\n\
                     --- {} breakdown (FX: {:.4}) ---\n\
                     Net: {:.2} {}\n\
                     Gross: {:.2} {}\n\
                     Foreign withholding ({:.1}%): -{:.2} {}\n\
                     Domestic top-up: -{:.2} {}",
                    company,
                    holding.ticker,
                    pay_date,
                    holding.shares,
                    amount * scale,
                    currency,
                    home,
                    fx,
                    calc.net,
                    home,
                    calc.gross,
                    home,
                    foreign_rate * 100.0,
                    calc.foreign_withholding,
                    home,
                    calc.domestic_tax,
                    home,
                ),
                ticker: holding.ticker.clone(),
            });
        }

        for earn_date in &info.earnings_dates {
            events.push(CalendarEvent {
                category: EventCategory::Earnings,
                date: *earn_date,
                summary: format!("Earnings - {}", company),
                description: format!(
                    "{} ({})\nEarnings date: {}",
                    company, holding.ticker, earn_date
                ),
                ticker: holding.ticker.clone(),
            });
        }
    }
}
