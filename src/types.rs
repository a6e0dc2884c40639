use ethers_core::types::{Address, Bytes, U256};
use num::{BigRational, Signed, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    calldata::CallKind,
    precision::{ceil_to_u256, decimal_to_ratio, ratio_to_decimal, to_decimal_string},
};

/// An enveloping relay request, as signed by the requester and submitted to
/// the relay server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    /// The forwarded call
    pub request: RelayRequestBody,
    /// Relay execution details
    pub relay_data: RelayData,
}

/// The call being relayed
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequestBody {
    /// Relay hub contract
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub relay_hub: Address,
    /// Requester
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub from: Address,
    /// Call destination
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub to: Address,
    /// Token in which the requester pays the relay
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub token_contract: Address,
    /// Native value forwarded with the call
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub value: U256,
    /// Gas limit of the forwarded call
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub gas: U256,
    /// Forwarder nonce
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub nonce: U256,
    /// Token base units paid to the relay
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub token_amount: U256,
    /// Gas reserved for the token payment
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub token_gas: U256,
    /// Unix timestamp (seconds) after which the request is invalid
    #[serde(with = "crate::ser::decimal_u64_ser")]
    pub valid_until_time: u64,
    /// Call data
    pub data: Bytes,
}

/// Relay-side execution details of a request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayData {
    /// Gas price in the smallest native unit. Must be non-zero for fee
    /// calculation
    #[serde(with = "crate::ser::decimal_u256_ser")]
    pub gas_price: U256,
    /// Receiver of the token payment
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub fees_receiver: Address,
    /// Forwarder contract
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub call_forwarder: Address,
    /// Verifier contract
    #[serde(serialize_with = "crate::ser::serialize_checksum_addr")]
    pub call_verifier: Address,
}

impl RelayRequest {
    /// Call destination
    pub fn to(&self) -> Address {
        self.request.to
    }

    /// Token in which fees are paid
    pub fn token_contract(&self) -> Address {
        self.request.token_contract
    }

    /// Gas price of the relay transaction
    pub fn gas_price(&self) -> U256 {
        self.relay_data.gas_price
    }

    /// Classify the relayed call data
    pub fn call_kind(&self) -> CallKind {
        CallKind::classify(&self.request.data)
    }
}

/// A relay fee in gas units, on top of the base gas estimate.
///
/// The exact value is kept so callers can combine fees without compounding
/// rounding. [`Fee::gas`] rounds up to whole gas units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fee(BigRational);

impl Fee {
    /// No fee
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// The exact fee in (possibly fractional) gas units
    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    /// The exact fee as a [`Decimal`], if it is representable as one
    pub fn to_decimal(&self) -> Option<Decimal> {
        ratio_to_decimal(&self.0)
    }

    /// True if nothing is charged
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The fee in whole gas units, rounded up. Saturates at `U256::MAX`.
    pub fn gas(&self) -> U256 {
        ceil_to_u256(&self.0).unwrap_or(U256::MAX)
    }
}

impl Default for Fee {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<BigRational> for Fee {
    fn from(val: BigRational) -> Self {
        if val.is_negative() {
            Self::zero()
        } else {
            Self(val)
        }
    }
}

impl From<Decimal> for Fee {
    fn from(val: Decimal) -> Self {
        decimal_to_ratio(val).into()
    }
}

impl std::fmt::Display for Fee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match to_decimal_string(&self.0) {
            Some(s) => f.write_str(&s),
            None => write!(f, "{}", self.0),
        }
    }
}

impl std::ops::Add for Fee {
    type Output = Fee;

    fn add(self, rhs: Fee) -> Fee {
        Fee(self.0 + rhs.0)
    }
}
