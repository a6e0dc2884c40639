//! Fee determination for a gasless meta-transaction relay server.
//!
//! Given a signed [`RelayRequest`], the gas estimated for it and the relay's
//! [`FeeConfig`], the [`FeeCalculator`] computes the surcharge the requester
//! pays, in gas units of the native currency. The [`ExpirationValidator`]
//! rejects requests whose deadline is too close to relay safely.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

/// lib macros
pub(crate) mod macros;

/// Relay request and fee types
pub mod types;
pub use types::*;

/// Serde helpers
pub(crate) mod ser;

/// Exact arithmetic and decimal precision shifting
pub mod precision;
pub use precision::shift;

/// Call data classification
pub mod calldata;
pub use calldata::CallKind;

/// Gas, token and USD conversions
pub mod conversion;
pub use conversion::ConversionError;

/// Fee configuration
pub mod config;
pub use config::{ConfigError, FeeConfig};

/// Token metadata and exchange rate sources
pub mod oracle;
pub use oracle::{ConstantRates, LookupError, RateOracle, StaticTokens, TokenInfoProvider};

/// CoinGecko exchange rates
pub mod coingecko;
pub use coingecko::CoinGecko;

/// Fee calculation
pub mod fees;
pub use fees::{FeeCalculator, FeeError};

/// Request expiration
pub mod expiration;
pub use expiration::{
    validate_expiration_time, Clock, ExpirationValidator, ExpiredError, SystemClock,
};

/// Re-export reqwest for convenience
pub use reqwest;

/// Re-export rust_decimal for convenience
pub use rust_decimal;

/// Re-export num for convenience
pub use num;
