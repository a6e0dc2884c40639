use ethers_core::types::U256;
use num::{bigint::Sign, BigInt, BigRational, Integer, Signed};
use rust_decimal::Decimal;

fn pow10(exp: u32) -> BigInt {
    num::pow(BigInt::from(10u8), exp as usize)
}

/// Shift the decimal magnitude of `value` by `precision` places.
///
/// A positive precision multiplies by `10^precision`, moving a human-readable
/// amount (e.g. `1.5` tokens) into base-unit space (`1500000000000000000`
/// for an 18 decimals token). A negative precision divides by
/// `10^|precision|`, moving base units back into fractional amounts. Zero is
/// the identity.
///
/// The arithmetic is exact, so `shift(&shift(&x, p), -p) == x` for any `x`
/// and `p`.
pub fn shift(value: &BigRational, precision: i32) -> BigRational {
    let factor = BigRational::from_integer(pow10(precision.unsigned_abs()));
    if precision < 0 {
        value / factor
    } else {
        value * factor
    }
}

/// Shift a value into the base units of an asset with `decimals` places
pub fn to_base_units(value: &BigRational, decimals: u8) -> BigRational {
    shift(value, i32::from(decimals))
}

/// Shift a base-unit value into whole units of an asset with `decimals`
/// places
pub fn from_base_units(value: &BigRational, decimals: u8) -> BigRational {
    shift(value, -i32::from(decimals))
}

/// The exact value of a [`Decimal`]
pub fn decimal_to_ratio(value: Decimal) -> BigRational {
    BigRational::new(BigInt::from(value.mantissa()), pow10(value.scale()))
}

/// The exact value of an integer amount
pub fn u256_to_ratio(value: U256) -> BigRational {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigRational::from_integer(BigInt::from_bytes_be(Sign::Plus, &buf))
}

/// Round `value` up to an integer. Negative values round to zero.
///
/// Returns `None` if the result exceeds `U256::MAX`.
pub fn ceil_to_u256(value: &BigRational) -> Option<U256> {
    let ceil = value.ceil().to_integer();
    if ceil.is_negative() {
        return Some(U256::zero());
    }
    let (_, bytes) = ceil.to_bytes_be();
    (bytes.len() <= 32).then(|| U256::from_big_endian(&bytes))
}

/// Render `value` as a plain decimal string, if its expansion terminates
pub fn to_decimal_string(value: &BigRational) -> Option<String> {
    let two = BigInt::from(2u8);
    let five = BigInt::from(5u8);

    // a reduced fraction terminates iff its denominator is 2^a * 5^b
    let mut rest = value.denom().clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while rest.is_multiple_of(&two) {
        rest /= &two;
        twos += 1;
    }
    while rest.is_multiple_of(&five) {
        rest /= &five;
        fives += 1;
    }
    if rest != BigInt::from(1u8) {
        return None;
    }

    let places = twos.max(fives) as usize;
    let scaled = value.numer() * pow10(places as u32) / value.denom();
    let mut digits = scaled.abs().to_string();
    if places > 0 {
        if digits.len() <= places {
            digits = format!("{}{}", "0".repeat(places + 1 - digits.len()), digits);
        }
        digits.insert(digits.len() - places, '.');
    }

    let sign = if scaled.is_negative() { "-" } else { "" };
    Some(format!("{sign}{digits}"))
}

/// The value of `value` as a [`Decimal`], if it is exactly representable
pub fn ratio_to_decimal(value: &BigRational) -> Option<Decimal> {
    Decimal::from_str_exact(&to_decimal_string(value)?).ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn ratio(s: &str) -> BigRational {
        decimal_to_ratio(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn it_shifts_up_into_base_units() {
        assert_eq!(shift(&ratio("1.5"), 18), ratio("1500000000000000000"));
        assert_eq!(shift(&ratio("4"), 6), ratio("4000000"));
    }

    #[test]
    fn it_shifts_down_into_fractions() {
        assert_eq!(shift(&ratio("10000000000000000"), -18), ratio("0.01"));
        assert_eq!(shift(&ratio("1"), -20), ratio("0.00000000000000000001"));
    }

    #[test]
    fn zero_precision_is_identity() {
        assert_eq!(shift(&ratio("123.456"), 0), ratio("123.456"));
    }

    #[test]
    fn it_round_trips() {
        for value in ["0", "1", "0.5", "123.456", "0.000001", "987654321"] {
            for precision in [0, 1, 6, 8, 18, 40, 90] {
                let x = ratio(value);
                let up = shift(&x, precision);
                assert_eq!(shift(&up, -precision), x, "{value} @ {precision}");
                let down = shift(&x, -precision);
                assert_eq!(shift(&down, precision), x, "{value} @ -{precision}");
            }
        }
    }

    #[test]
    fn it_shifts_beyond_decimal_range() {
        let max = u256_to_ratio(U256::MAX);
        let tokens = from_base_units(&max, 18);
        assert_eq!(to_base_units(&tokens, 18), max);
        assert_eq!(ceil_to_u256(&max), Some(U256::MAX));
        assert_eq!(ceil_to_u256(&shift(&max, 1)), None);
    }

    #[test]
    fn it_rounds_up_to_integers() {
        assert_eq!(ceil_to_u256(&ratio("0.00005")), Some(U256::one()));
        assert_eq!(ceil_to_u256(&ratio("42.000")), Some(U256::from(42u64)));
        assert_eq!(ceil_to_u256(&ratio("-3")), Some(U256::zero()));
        assert_eq!(ceil_to_u256(&BigRational::new(1.into(), 3.into())), Some(U256::one()));
    }

    #[test]
    fn it_renders_terminating_decimals() {
        assert_eq!(to_decimal_string(&ratio("0.05")).as_deref(), Some("0.05"));
        assert_eq!(to_decimal_string(&ratio("-2.5")).as_deref(), Some("-2.5"));
        assert_eq!(to_decimal_string(&ratio("120")).as_deref(), Some("120"));
        assert_eq!(to_decimal_string(&BigRational::new(1.into(), 3.into())), None);

        assert_eq!(ratio_to_decimal(&ratio("123.456")), Decimal::from_str("123.456").ok());
        assert_eq!(ratio_to_decimal(&u256_to_ratio(U256::MAX)), None);
    }
}
