pub mod builder;
pub mod fetcher;
pub mod holdings;

pub use builder::EventBuilder;
pub use fetcher::fetch_ticker_info;
pub use holdings::{parse_holdings, read_holdings};
