pub mod enums;
pub mod error;
pub mod structs;
pub mod ticker;

// Re-export the core types to provide a clean public API.
pub use enums::{AlignmentMode, AnnualizationMode, PriceField};
pub use error::CoreError;
pub use structs::{PriceBar, PriceSeries, ReturnPoint, ReturnSeries};
pub use ticker::{default_universe, find_ticker, Ticker};
