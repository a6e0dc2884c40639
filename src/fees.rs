use std::future::Future;

use ethers_core::types::U256;
use num::{BigRational, Zero};
use tracing::{debug, instrument, trace};

use crate::{
    calldata::CallKind,
    config::FeeConfig,
    conversion::{
        convert_fixed_usd_fee, convert_gas_fee, convert_transfer_fee, gas_to_token,
        ConversionError,
    },
    oracle::{LookupError, RateOracle, TokenInfoProvider},
    precision::{ceil_to_u256, u256_to_ratio},
    types::{Fee, RelayRequest},
};

/// Fee calculation error
#[derive(Debug, thiserror::Error)]
pub enum FeeError {
    /// Token metadata or exchange rate lookup failed
    #[error("{0}")]
    Lookup(#[from] LookupError),
    /// Conversion failed
    #[error("{0}")]
    Conversion(#[from] ConversionError),
}

async fn fetch_if<T, F>(needed: bool, fut: F) -> Result<Option<T>, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    if needed {
        fut.await.map(Some)
    } else {
        Ok(None)
    }
}

/// Computes the fee a relay charges on top of the estimated gas of a request.
///
/// The calculator holds no mutable state. It may be shared between tasks
/// when its collaborators are `Send + Sync`.
#[derive(Debug, Clone)]
pub struct FeeCalculator<T, O> {
    tokens: T,
    oracle: O,
}

impl<T, O> FeeCalculator<T, O>
where
    T: TokenInfoProvider,
    O: RateOracle,
{
    /// Instantiate a calculator over token metadata and rate sources
    pub fn new(tokens: T, oracle: O) -> Self {
        Self { tokens, oracle }
    }

    /// Calculate the fee, in gas units, for relaying `request`.
    ///
    /// Sponsored requests are free and skip every lookup. Otherwise the
    /// variable fee is chosen by the shape of the call data: a percentage of
    /// the transferred value for ERC20 `transfer`/`transferFrom`, or a
    /// percentage of `estimated_gas_before_fees` for any other call. A
    /// configured fixed USD fee is always added on top.
    ///
    /// # Errors
    ///
    /// - if a token decimals or exchange rate lookup fails
    /// - if the request gas price is zero while a token conversion is needed
    #[instrument(skip_all, fields(to = ?request.to(), token = ?request.token_contract()))]
    pub async fn calculate_fee(
        &self,
        request: &RelayRequest,
        estimated_gas_before_fees: U256,
        config: &FeeConfig,
    ) -> Result<Fee, FeeError> {
        if config.is_sponsored(&request.request.to) {
            debug!("Sponsored request, no fee charged");
            return Ok(Fee::zero());
        }

        let kind = request.call_kind();
        trace!(?kind, "Classified call data");

        let token = request.token_contract();
        let gas_price = request.gas_price();

        let charges_transfer = kind.transfer_amount().map_or(false, |amount| {
            !amount.is_zero() && !config.transfer_fee_percentage.is_zero()
        });
        let charges_fixed = !config.fixed_usd_fee.is_zero();
        let needs_token_rates = charges_transfer || charges_fixed;

        let (decimals, native_price, usd_price) = futures_util::try_join!(
            fetch_if(needs_token_rates, self.tokens.decimals(token)),
            fetch_if(needs_token_rates, self.oracle.native_price(token)),
            fetch_if(charges_fixed, self.oracle.usd_price(token)),
        )?;

        let variable = match (kind, decimals, native_price) {
            (
                CallKind::Transfer { amount } | CallKind::TransferFrom { amount },
                Some(decimals),
                Some(price),
            ) if charges_transfer => {
                convert_transfer_fee(
                    amount,
                    config.transfer_fee_percentage,
                    decimals,
                    price,
                    gas_price,
                )?
            }
            // zero amount or no transfer percentage configured
            (CallKind::Transfer { .. } | CallKind::TransferFrom { .. }, ..) => BigRational::zero(),
            (CallKind::Other, ..) => {
                convert_gas_fee(estimated_gas_before_fees, config.gas_fee_percentage)
            }
        };

        let fixed = match (decimals, native_price, usd_price) {
            (Some(decimals), Some(native_price), Some(usd_price)) => convert_fixed_usd_fee(
                config.fixed_usd_fee,
                decimals,
                usd_price,
                native_price,
                gas_price,
            )?,
            _ => BigRational::zero(),
        };

        let (variable, fixed) = (Fee::from(variable), Fee::from(fixed));
        debug!(%variable, %fixed, "Calculated relay fee");
        Ok(variable + fixed)
    }

    /// Gas the requester is charged for: the estimate plus the relay fee,
    /// rounded up to whole gas units
    pub async fn required_gas(
        &self,
        request: &RelayRequest,
        estimated_gas_before_fees: U256,
        config: &FeeConfig,
    ) -> Result<U256, FeeError> {
        let fee = self
            .calculate_fee(request, estimated_gas_before_fees, config)
            .await?;
        Ok(estimated_gas_before_fees.saturating_add(fee.gas()))
    }

    /// Price `gas` at the request gas price, in base units of the request
    /// fee token, rounded up
    ///
    /// # Errors
    ///
    /// - if a token decimals or exchange rate lookup fails
    /// - if the request gas price is zero
    #[instrument(skip_all, fields(token = ?request.token_contract()))]
    pub async fn quote_in_token(
        &self,
        request: &RelayRequest,
        gas: U256,
    ) -> Result<U256, FeeError> {
        let token = request.token_contract();
        let (decimals, native_price) = futures_util::try_join!(
            self.tokens.decimals(token),
            self.oracle.native_price(token),
        )?;

        let gas = u256_to_ratio(gas);
        let amount = gas_to_token(&gas, request.gas_price(), decimals, native_price)?;
        trace!(%amount, "Quoted gas in token base units");

        Ok(ceil_to_u256(&amount).ok_or(ConversionError::Overflow("token quote"))?)
    }
}
