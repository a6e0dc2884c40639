use ethers_core::types::H160;
use serde::{Deserialize, Serializer};

pub(crate) fn serialize_checksum_addr<S>(val: &H160, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ethers_core::utils::to_checksum(val, None))
}

/// Relay clients send integers either as JSON numbers or as decimal strings
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

pub(crate) mod decimal_u256_ser {
    use ethers_core::types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NumberOrString;

    pub(crate) fn serialize<S>(val: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n.into()),
            NumberOrString::String(s) => U256::from_dec_str(&s).map_err(serde::de::Error::custom),
        }
    }
}

pub(crate) mod decimal_u64_ser {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NumberOrString;

    pub(crate) fn serialize<S>(val: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
