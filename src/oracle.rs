use std::collections::HashMap;

use async_trait::async_trait;
use ethers_core::types::Address;
use rust_decimal::Decimal;

/// Failure to fetch token metadata or an exchange rate
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// reqwest
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// serde_json
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// url
    #[error("{0}")]
    Url(#[from] url::ParseError),
    /// The provider does not know this token
    #[error("Unknown token: {0:?}")]
    UnknownToken(Address),
    /// The source returned no rate for this token
    #[error("No {currency} rate available for token {token:?}")]
    MissingRate {
        /// Token
        token: Address,
        /// Quote currency
        currency: String,
    },
    /// The source returned a zero, negative or unparseable rate
    #[error("Invalid {currency} rate for token {token:?}: {rate}")]
    InvalidRate {
        /// Token
        token: Address,
        /// Quote currency
        currency: String,
        /// Rate as returned by the source
        rate: String,
    },
}

/// Source of ERC20 token metadata
#[async_trait]
pub trait TokenInfoProvider: std::fmt::Debug + Send + Sync {
    /// Number of decimals of the token at `token`
    async fn decimals(&self, token: Address) -> Result<u8, LookupError>;
}

/// Source of exchange rates for fee tokens
#[async_trait]
pub trait RateOracle: std::fmt::Debug + Send + Sync {
    /// Price of one whole `token` in whole units of the chain native currency
    async fn native_price(&self, token: Address) -> Result<Decimal, LookupError>;

    /// Price of one whole `token` in USD
    async fn usd_price(&self, token: Address) -> Result<Decimal, LookupError>;
}

#[async_trait]
impl<T> TokenInfoProvider for &T
where
    T: TokenInfoProvider + ?Sized,
{
    async fn decimals(&self, token: Address) -> Result<u8, LookupError> {
        (**self).decimals(token).await
    }
}

#[async_trait]
impl<T> RateOracle for &T
where
    T: RateOracle + ?Sized,
{
    async fn native_price(&self, token: Address) -> Result<Decimal, LookupError> {
        (**self).native_price(token).await
    }

    async fn usd_price(&self, token: Address) -> Result<Decimal, LookupError> {
        (**self).usd_price(token).await
    }
}

/// Token metadata held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    decimals: HashMap<Address, u8>,
    fallback: Option<u8>,
}

impl StaticTokens {
    /// Register a token
    #[must_use]
    pub fn with_token(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    /// Use `decimals` for any token that was not registered
    #[must_use]
    pub fn with_fallback(mut self, decimals: u8) -> Self {
        self.fallback = Some(decimals);
        self
    }
}

#[async_trait]
impl TokenInfoProvider for StaticTokens {
    async fn decimals(&self, token: Address) -> Result<u8, LookupError> {
        self.decimals
            .get(&token)
            .copied()
            .or(self.fallback)
            .ok_or(LookupError::UnknownToken(token))
    }
}

/// An oracle that quotes the same rates for every token
#[derive(Debug, Clone, Copy)]
pub struct ConstantRates {
    native: Decimal,
    usd: Decimal,
}

impl ConstantRates {
    /// Creates [Self] from the price of one token in native currency and in
    /// USD
    pub fn new(native: Decimal, usd: Decimal) -> Self {
        Self { native, usd }
    }
}

#[async_trait]
impl RateOracle for ConstantRates {
    async fn native_price(&self, _: Address) -> Result<Decimal, LookupError> {
        Ok(self.native)
    }

    async fn usd_price(&self, _: Address) -> Result<Decimal, LookupError> {
        Ok(self.usd)
    }
}
