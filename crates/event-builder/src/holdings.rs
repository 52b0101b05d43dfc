//! Holdings CSV input. Required columns: `ticker`, `cantidad` (share count);
//! optional: `country`, `name`, `market`. This is the only input whose
//! failure aborts the run.

use calendar_core::{CalendarError, Holding};

/// Read and parse the holdings file at `path`.
pub fn read_holdings(path: &str) -> Result<Vec<Holding>, CalendarError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| CalendarError::Holdings(format!("{}: {}", path, e)))?;
    parse_holdings(&data)
}

/// Parse holdings CSV data. Rows with an empty ticker or a zero /
/// unparseable share count are skipped, not errors.
pub fn parse_holdings(csv_data: &str) -> Result<Vec<Holding>, CalendarError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CalendarError::Holdings(e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let ticker_col = column("ticker")
        .ok_or_else(|| CalendarError::Holdings("missing 'ticker' column".to_string()))?;
    let shares_col = column("cantidad")
        .ok_or_else(|| CalendarError::Holdings("missing 'cantidad' column".to_string()))?;
    let country_col = column("country");
    let name_col = column("name");
    let market_col = column("market");

    let mut holdings = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable holdings row");
                continue;
            }
        };

        let ticker = record.get(ticker_col).unwrap_or("").trim().to_string();
        if ticker.is_empty() {
            continue;
        }

        let shares: i64 = record
            .get(shares_col)
            .unwrap_or("0")
            .trim()
            .parse()
            .unwrap_or(0);
        if shares == 0 {
            tracing::debug!(%ticker, "zero share count, skipping holding");
            continue;
        }

        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        holdings.push(Holding {
            ticker,
            country: field(country_col).unwrap_or("").to_uppercase(),
            market: field(market_col).unwrap_or("").to_uppercase(),
            shares,
            name: field(name_col).map(str::to_string),
        });
    }

    Ok(holdings)
}
