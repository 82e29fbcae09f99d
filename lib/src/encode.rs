//! Record encoding and leaf hashing.
//!
//! Wire format `airgrab-merkle-v1`:
//! `leaf = keccak256(keccak256(abi.encode(address account, uint256 amount)))`.
//! Internal nodes are a single Keccak over a sorted pair, so no internal node
//! can be presented as a leaf.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolType};

use crate::error::EncodingError;
use crate::merkle::{keccak, Hash32};
use crate::util::{normalize_address, parse_address, parse_amount};

sol! {
    /// ABI preimage of one airgrab leaf, as checked by the claim contract.
    struct AirgrabLeaf {
        address account;
        uint256 amount;
    }
}

/// One (address, allocation) entry of a snapshot, amount in smallest units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    pub address: Address,
    pub amount: U256,
}

impl Record {
    pub fn new(address: Address, amount: U256) -> Self {
        Self { address, amount }
    }

    /// Parses raw text fields; `decimals` scales the amount to smallest units.
    pub fn parse(address: &str, amount: &str, decimals: u32) -> Result<Self, EncodingError> {
        Ok(Self { address: parse_address(address)?, amount: parse_amount(amount, decimals)? })
    }

    /// 64-byte canonical encoding.
    pub fn encode(&self) -> Vec<u8> {
        AirgrabLeaf::abi_encode(&AirgrabLeaf { account: self.address, amount: self.amount })
    }

    pub fn leaf(&self) -> Hash32 {
        hash_leaf(&self.encode())
    }

    pub fn address_hex(&self) -> String {
        normalize_address(&self.address)
    }
}

pub fn hash_leaf(encoded: &[u8]) -> Hash32 {
    keccak(&keccak(encoded))
}
