use std::{collections::HashSet, path::Path};

use ethers_core::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A fee setting is negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending setting
        field: &'static str,
        /// Configured value
        value: Decimal,
    },
    /// serde_json
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// io
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Relay fee settings.
///
/// Every field is optional in serialized form. Missing percentages and fees
/// are zero, and sponsorship stays enabled unless `disableSponsoredTx` is
/// explicitly `true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeeConfig {
    /// When false, every request is sponsored and charged nothing
    pub disable_sponsored_tx: bool,
    /// Destinations that are always sponsored
    pub sponsored_destinations: HashSet<Address>,
    /// Fraction of the estimated gas charged for generic calls (`0.1` = 10%)
    pub gas_fee_percentage: Decimal,
    /// Fraction of the transferred token amount charged for transfers
    pub transfer_fee_percentage: Decimal,
    /// Flat fee in USD, added on top of the variable fee
    pub fixed_usd_fee: Decimal,
}

impl FeeConfig {
    /// Parse a config from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Check that no fee setting is negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("gasFeePercentage", self.gas_fee_percentage),
            ("transferFeePercentage", self.transfer_fee_percentage),
            ("fixedUsdFee", self.fixed_usd_fee),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// True if a request to `destination` is relayed for free
    pub fn is_sponsored(&self, destination: &Address) -> bool {
        !self.disable_sponsored_tx || self.sponsored_destinations.contains(destination)
    }

    /// Set `disable_sponsored_tx`
    #[must_use]
    pub fn disable_sponsored_tx(mut self, val: bool) -> Self {
        self.disable_sponsored_tx = val;
        self
    }

    /// Add a sponsored destination
    #[must_use]
    pub fn sponsor_destination(mut self, destination: Address) -> Self {
        self.sponsored_destinations.insert(destination);
        self
    }

    /// Set `gas_fee_percentage`
    #[must_use]
    pub fn gas_fee_percentage(mut self, val: Decimal) -> Self {
        self.gas_fee_percentage = val;
        self
    }

    /// Set `transfer_fee_percentage`
    #[must_use]
    pub fn transfer_fee_percentage(mut self, val: Decimal) -> Self {
        self.transfer_fee_percentage = val;
        self
    }

    /// Set `fixed_usd_fee`
    #[must_use]
    pub fn fixed_usd_fee(mut self, val: Decimal) -> Self {
        self.fixed_usd_fee = val;
        self
    }
}
