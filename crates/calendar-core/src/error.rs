use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Holdings file error: {0}")]
    Holdings(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("FX lookup error: {0}")]
    FxLookup(String),

    #[error("Calendar write error: {0}")]
    Write(String),
}
