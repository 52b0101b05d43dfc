pub mod config;
pub mod dates;
pub mod error;
pub mod tax;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
