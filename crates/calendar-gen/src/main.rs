//! calendar-gen: build dividend / ex-dividend / earnings ICS calendars from
//! a holdings CSV.
//!
//! Usage:
//!   cargo run -p calendar-gen -- --holdings holdings.csv
//!   cargo run -p calendar-gen -- --holdings holdings.csv --out ./calendars --months 3
//!
//! One file per category is written to the output directory: dividends.ics,
//! ex-dividends.ics, earnings.ics. Files are fully regenerated each run.

use calendar_core::{CalendarConfig, EventCategory};
use chrono::Local;
use event_builder::{read_holdings, EventBuilder};
use fx_client::FxClient;
use std::path::Path;
use yahoo_client::YahooClient;

const OUTPUT_FILES: &[(EventCategory, &str)] = &[
    (EventCategory::DividendPayment, "dividends.ics"),
    (EventCategory::ExDividend, "ex-dividends.ics"),
    (EventCategory::Earnings, "earnings.ics"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_gen=info,event_builder=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage:");
        eprintln!("  calendar-gen [--holdings PATH] [--out DIR] [--months N]");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --holdings PATH    Holdings CSV (default: holdings.csv)");
        eprintln!("  --out DIR          Output directory (default: .)");
        eprintln!("  --months N         Window half-width in months (default: 3)");
        return Ok(());
    }

    let holdings_path = args
        .iter()
        .position(|a| a == "--holdings")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("holdings.csv");

    let out_dir = args
        .iter()
        .position(|a| a == "--out")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or(".");

    let mut config = CalendarConfig::default();
    if let Some(months) = args
        .iter()
        .position(|a| a == "--months")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
    {
        config.window_months = months;
    }

    // The holdings file is the only fatal input: nothing has run yet.
    let holdings = read_holdings(holdings_path)?;
    tracing::info!(
        path = holdings_path,
        count = holdings.len(),
        "loaded holdings"
    );

    let builder = EventBuilder::new(config.clone(), YahooClient::new(), FxClient::new());
    let events = builder.build_events(&holdings).await;
    tracing::info!(count = events.len(), "built calendar events");

    let today = Local::now().date_naive();
    let (window_start, window_end) = config.window(today);
    tracing::info!(%window_start, %window_end, "filtering events to window");

    for (category, filename) in OUTPUT_FILES {
        let category_events: Vec<_> = events
            .iter()
            .filter(|ev| ev.category == *category)
            .cloned()
            .collect();
        let path = Path::new(out_dir).join(filename);
        ics_writer::write_calendar(&category_events, &path, window_start, window_end)?;
    }

    tracing::info!("done; import the three .ics files into their calendars");
    Ok(())
}
