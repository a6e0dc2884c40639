use ethers_core::{types::U256, utils::id};
use once_cell::sync::Lazy;

/// Canonical signature of the ERC20 `transfer` function
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Canonical signature of the ERC20 `transferFrom` function
pub const TRANSFER_FROM_SIGNATURE: &str = "transferFrom(address,address,uint256)";

/// Selector of `transfer(address,uint256)`: `0xa9059cbb`
pub static TRANSFER_SELECTOR: Lazy<[u8; 4]> = Lazy::new(|| id(TRANSFER_SIGNATURE));

/// Selector of `transferFrom(address,address,uint256)`: `0x23b872dd`
pub static TRANSFER_FROM_SELECTOR: Lazy<[u8; 4]> = Lazy::new(|| id(TRANSFER_FROM_SIGNATURE));

const WORD: usize = 32;

/// The pricing-relevant shape of a relayed call
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallKind {
    /// ERC20 `transfer(to, amount)`
    Transfer {
        /// Amount of token base units transferred
        amount: U256,
    },
    /// ERC20 `transferFrom(from, to, amount)`
    TransferFrom {
        /// Amount of token base units transferred
        amount: U256,
    },
    /// Any other call, including plain value transfers with empty data
    Other,
}

impl CallKind {
    /// Classify relayed call data by its function selector.
    ///
    /// Data that carries a transfer selector but is too short to hold the
    /// amount word is treated as [`CallKind::Other`].
    pub fn classify(data: &[u8]) -> Self {
        if data.len() < 4 + WORD {
            return CallKind::Other;
        }

        let (selector, _) = data.split_at(4);
        let amount = U256::from_big_endian(&data[data.len() - WORD..]);

        if selector == TRANSFER_SELECTOR.as_slice() {
            CallKind::Transfer { amount }
        } else if selector == TRANSFER_FROM_SELECTOR.as_slice() {
            CallKind::TransferFrom { amount }
        } else {
            CallKind::Other
        }
    }

    /// The transferred amount, if this is a token transfer
    pub fn transfer_amount(&self) -> Option<U256> {
        match self {
            CallKind::Transfer { amount } | CallKind::TransferFrom { amount } => Some(*amount),
            CallKind::Other => None,
        }
    }

    /// True for `transfer` and `transferFrom` calls
    pub fn is_transfer(&self) -> bool {
        self.transfer_amount().is_some()
    }
}

impl From<&[u8]> for CallKind {
    fn from(data: &[u8]) -> Self {
        Self::classify(data)
    }
}
