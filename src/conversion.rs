//! Exact conversions between gas, native currency, tokens and USD.
//!
//! Amounts are exact rationals, so the conversions never round and never
//! overflow. Rounding happens only when a caller asks for an integer.

use ethers_core::types::U256;
use num::{BigRational, Zero};
use rust_decimal::Decimal;

use crate::precision::{decimal_to_ratio, from_base_units, to_base_units, u256_to_ratio};

/// Decimals of the chain native currency
pub const NATIVE_DECIMALS: u8 = 18;

/// Conversion error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    /// Gas price is zero
    #[error("Gas price must be greater than zero")]
    ZeroGasPrice,
    /// Exchange rate is zero or negative
    #[error("Exchange rate must be positive, got {0}")]
    NonPositiveRate(Decimal),
    /// Integer result does not fit in 256 bits
    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

fn ensure_positive(rate: Decimal) -> Result<BigRational, ConversionError> {
    if rate.is_sign_negative() || rate.is_zero() {
        return Err(ConversionError::NonPositiveRate(rate));
    }
    Ok(decimal_to_ratio(rate))
}

fn ensure_gas_price(gas_price: U256) -> Result<BigRational, ConversionError> {
    if gas_price.is_zero() {
        return Err(ConversionError::ZeroGasPrice);
    }
    Ok(u256_to_ratio(gas_price))
}

fn per_gas(native_amount: BigRational, gas_price: U256) -> Result<BigRational, ConversionError> {
    Ok(native_amount / ensure_gas_price(gas_price)?)
}

/// Convert a fixed USD fee into gas units.
///
/// 1. USD fee to whole tokens: `fixed_usd_fee / usd_per_token`
/// 2. whole tokens to token base units
/// 3. token base units to native base units: `* token_native_price`
/// 4. native base units to gas: `/ gas_price`
///
/// A zero fee short-circuits to zero without touching the rates.
pub fn convert_fixed_usd_fee(
    fixed_usd_fee: Decimal,
    token_decimals: u8,
    usd_per_token: Decimal,
    token_native_price: Decimal,
    gas_price: U256,
) -> Result<BigRational, ConversionError> {
    if fixed_usd_fee.is_zero() {
        return Ok(BigRational::zero());
    }

    let token_amount = decimal_to_ratio(fixed_usd_fee) / ensure_positive(usd_per_token)?;
    let token_amount_raw = to_base_units(&token_amount, token_decimals);
    let native_amount = token_amount_raw * ensure_positive(token_native_price)?;

    per_gas(native_amount, gas_price)
}

/// Fee in gas units for transferring `amount` token base units, charging
/// `transfer_fee_percentage` of the transferred value
pub fn convert_transfer_fee(
    amount: U256,
    transfer_fee_percentage: Decimal,
    token_decimals: u8,
    token_native_price: Decimal,
    gas_price: U256,
) -> Result<BigRational, ConversionError> {
    if amount.is_zero() || transfer_fee_percentage.is_zero() {
        return Ok(BigRational::zero());
    }

    let token_fee = u256_to_ratio(amount) * decimal_to_ratio(transfer_fee_percentage);
    let token_fee_fraction = from_base_units(&token_fee, token_decimals);
    let native_fraction = token_fee_fraction * ensure_positive(token_native_price)?;
    // token precision, not native precision, is re-applied here
    let native_amount = to_base_units(&native_fraction, token_decimals);

    per_gas(native_amount, gas_price)
}

/// Fee in gas units for a generic call: a fraction of the estimated gas
pub fn convert_gas_fee(estimated_gas: U256, gas_fee_percentage: Decimal) -> BigRational {
    if gas_fee_percentage.is_zero() {
        return BigRational::zero();
    }
    u256_to_ratio(estimated_gas) * decimal_to_ratio(gas_fee_percentage)
}

/// Cost of `gas` at `gas_price`, in native base units
///
/// # Errors
///
/// If `gas_price` is zero
pub fn gas_to_native(gas: &BigRational, gas_price: U256) -> Result<BigRational, ConversionError> {
    Ok(gas * ensure_gas_price(gas_price)?)
}

/// Cost of `gas` at `gas_price`, in base units of a token worth
/// `token_native_price` native units per whole token
pub fn gas_to_token(
    gas: &BigRational,
    gas_price: U256,
    token_decimals: u8,
    token_native_price: Decimal,
) -> Result<BigRational, ConversionError> {
    let native = from_base_units(&gas_to_native(gas, gas_price)?, NATIVE_DECIMALS);
    let tokens = native / ensure_positive(token_native_price)?;
    Ok(to_base_units(&tokens, token_decimals))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::precision::{ceil_to_u256, ratio_to_decimal};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ratio(s: &str) -> BigRational {
        decimal_to_ratio(dec(s))
    }

    const GAS_PRICE: u64 = 10000;

    #[test]
    fn fixed_fee_in_gas() {
        // 2 USD at 0.5 USD per token is 4 tokens, worth 2 native
        let fee = convert_fixed_usd_fee(dec("2"), 18, dec("0.5"), dec("0.5"), GAS_PRICE.into())
            .unwrap();
        assert_eq!(fee, ratio("200000000000000"));
    }

    #[test]
    fn zero_fixed_fee_skips_rates() {
        // rates that would otherwise fail
        let zero = Decimal::ZERO;
        let fee = convert_fixed_usd_fee(zero, 18, zero, zero, U256::zero()).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn fixed_fee_rejects_bad_inputs() {
        assert_eq!(
            convert_fixed_usd_fee(dec("2"), 18, Decimal::ZERO, dec("0.5"), GAS_PRICE.into()),
            Err(ConversionError::NonPositiveRate(Decimal::ZERO))
        );
        assert_eq!(
            convert_fixed_usd_fee(dec("2"), 18, dec("0.5"), dec("0.5"), U256::zero()),
            Err(ConversionError::ZeroGasPrice)
        );
    }

    #[test]
    fn fixed_fee_keeps_repeating_fractions() {
        // 1 USD at 3 USD per token is a third of a token
        let fee = convert_fixed_usd_fee(dec("1"), 0, dec("3"), dec("1"), U256::one()).unwrap();
        assert_eq!(fee, BigRational::new(1.into(), 3.into()));
        assert_eq!(ceil_to_u256(&fee), Some(U256::one()));
    }

    #[test]
    fn transfer_fee_in_gas() {
        // 1% of 1 token is 0.01 tokens, worth 0.005 native
        let fee =
            convert_transfer_fee(U256::exp10(18), dec("0.01"), 18, dec("0.5"), GAS_PRICE.into())
                .unwrap();
        assert_eq!(fee, ratio("500000000000"));
    }

    #[test]
    fn transfer_fee_with_six_decimals() {
        // 2.5% of 100 tokens is 2.5 tokens, worth 5 native at 2 native per token
        let fee = convert_transfer_fee(
            U256::from(100_000_000u64),
            dec("0.025"),
            6,
            dec("2"),
            U256::from(1000u64),
        )
        .unwrap();
        assert_eq!(fee, ratio("5000"));
    }

    #[test]
    fn transfer_fee_for_huge_amounts() {
        // 1e11 whole tokens: 1e27 base units fee, worth 5e26 native base units
        let fee =
            convert_transfer_fee(U256::exp10(29), dec("0.01"), 18, dec("0.5"), GAS_PRICE.into())
                .unwrap();
        assert_eq!(ratio_to_decimal(&fee), Some(dec("50000000000000000000000")));

        let fee = convert_transfer_fee(U256::MAX, dec("0.01"), 18, dec("0.5"), GAS_PRICE.into())
            .unwrap();
        assert_eq!(
            fee,
            u256_to_ratio(U256::MAX) / BigRational::from_integer(2_000_000.into())
        );
    }

    #[test]
    fn zero_transfers_are_free() {
        let gas_price = U256::from(GAS_PRICE);
        assert!(convert_transfer_fee(U256::zero(), dec("0.01"), 18, dec("0.5"), gas_price)
            .unwrap()
            .is_zero());
        assert!(
            convert_transfer_fee(U256::exp10(18), Decimal::ZERO, 18, dec("0.5"), gas_price)
                .unwrap()
                .is_zero()
        );
    }

    #[test]
    fn gas_fee() {
        assert_eq!(
            convert_gas_fee(U256::from(100_000u64), dec("0.1")),
            ratio("10000")
        );
        assert!(convert_gas_fee(U256::from(100_000u64), Decimal::ZERO).is_zero());
    }

    #[test]
    fn gas_fee_on_oversized_estimates() {
        assert_eq!(
            convert_gas_fee(U256::MAX, dec("0.5")),
            u256_to_ratio(U256::MAX) / BigRational::from_integer(2.into())
        );
    }

    #[test]
    fn gas_to_token_units() {
        // 100000 gas at 10 gwei is 0.001 native, 0.002 tokens at 0.5 native per token
        let gas = u256_to_ratio(U256::from(100_000u64));
        let gas_price = U256::from(10_000_000_000u64);

        assert_eq!(gas_to_native(&gas, gas_price).unwrap(), ratio("1000000000000000"));
        assert_eq!(
            gas_to_token(&gas, gas_price, 18, dec("0.5")).unwrap(),
            ratio("2000000000000000")
        );
        assert_eq!(gas_to_token(&gas, gas_price, 6, dec("0.5")).unwrap(), ratio("2000"));
    }

    #[test]
    fn gas_pricing_rejects_zero_gas_price() {
        let gas = u256_to_ratio(U256::from(100_000u64));

        assert_eq!(
            gas_to_native(&gas, U256::zero()),
            Err(ConversionError::ZeroGasPrice)
        );
        assert_eq!(
            gas_to_token(&gas, U256::zero(), 18, dec("0.5")),
            Err(ConversionError::ZeroGasPrice)
        );
    }
}
