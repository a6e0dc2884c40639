use std::{collections::HashMap, str::FromStr};

use async_trait::async_trait;
use ethers_core::types::Address;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing::{instrument, trace};
use url::Url;

use crate::{
    json_get,
    oracle::{LookupError, RateOracle},
};

static DEFAULT_URL: Lazy<Url> = Lazy::new(|| {
    "https://api.coingecko.com/api/v3/"
        .parse()
        .expect("!coingecko url")
});

const USD: &str = "usd";

/// `simple/price` response: coin id -> quote currency -> price
type SimplePrice = HashMap<String, HashMap<String, serde_json::Number>>;

/// A [`RateOracle`] backed by the CoinGecko `simple/price` API.
///
/// Tokens are mapped to CoinGecko coin ids (e.g. `rif-token`). The native
/// currency is quoted through its CoinGecko vs-currency code (e.g. `btc` for
/// RBTC, `eth` for ether).
#[derive(Debug, Clone)]
pub struct CoinGecko {
    url: Url,
    client: reqwest::Client,
    coin_ids: HashMap<Address, String>,
    native_currency: String,
}

impl CoinGecko {
    /// Instantiate an oracle against the public API, quoting the native
    /// currency as `native_currency`
    pub fn new(native_currency: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_URL.clone(),
            client: Default::default(),
            coin_ids: Default::default(),
            native_currency: native_currency.into().to_lowercase(),
        }
    }

    /// Use a different API base URL
    ///
    /// # Errors
    ///
    /// If the url param cannot be parsed as a URL
    pub fn with_url<S>(mut self, url: S) -> Result<Self, url::ParseError>
    where
        S: AsRef<str>,
    {
        self.url = url.as_ref().parse()?;
        Ok(self)
    }

    /// Use a specific reqwest Client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Map a token address to its CoinGecko coin id
    #[must_use]
    pub fn with_coin(mut self, token: Address, coin_id: impl Into<String>) -> Self {
        self.coin_ids.insert(token, coin_id.into());
        self
    }

    fn coin_id(&self, token: Address) -> Result<&str, LookupError> {
        self.coin_ids
            .get(&token)
            .map(String::as_str)
            .ok_or(LookupError::UnknownToken(token))
    }

    fn simple_price_url(&self, coin_id: &str, currency: &str) -> Result<Url, LookupError> {
        let mut url = self.url.join("simple/price")?;
        url.query_pairs_mut()
            .append_pair("ids", coin_id)
            .append_pair("vs_currencies", currency);
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn price(&self, token: Address, currency: &str) -> Result<Decimal, LookupError> {
        let coin_id = self.coin_id(token)?;
        let url = self.simple_price_url(coin_id, currency)?;

        let prices = json_get!(self.client, url, SimplePrice)?;
        trace!(?prices, "CoinGecko prices");

        extract_price(&prices, token, coin_id, currency)
    }
}

fn extract_price(
    prices: &SimplePrice,
    token: Address,
    coin_id: &str,
    currency: &str,
) -> Result<Decimal, LookupError> {
    let raw = prices
        .get(coin_id)
        .and_then(|quotes| quotes.get(currency))
        .ok_or_else(|| LookupError::MissingRate {
            token,
            currency: currency.to_owned(),
        })?
        .to_string();

    let invalid = || LookupError::InvalidRate {
        token,
        currency: currency.to_owned(),
        rate: raw.clone(),
    };

    // small prices are rendered in exponent notation, e.g. `2.5e-5`
    let rate = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| invalid())?;

    if rate.is_sign_negative() || rate.is_zero() {
        return Err(invalid());
    }
    Ok(rate)
}

#[async_trait]
impl RateOracle for CoinGecko {
    async fn native_price(&self, token: Address) -> Result<Decimal, LookupError> {
        self.price(token, &self.native_currency).await
    }

    async fn usd_price(&self, token: Address) -> Result<Decimal, LookupError> {
        self.price(token, USD).await
    }
}
