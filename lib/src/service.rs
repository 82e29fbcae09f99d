use std::collections::HashMap;
use std::path::Path;

use alloy_primitives::{Address, U256};

use crate::encode::Record;
use crate::error::{AirgrabError, Result};
use crate::io::json::ClaimJson;
use crate::merkle::Hash32;
use crate::tree::AirgrabTree;
use crate::util::{hex0x, normalize_address, parse_address};

/// Everything a claimant needs to call the airgrab contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    pub record: Record,
    pub leaf: Hash32,
    pub root: Hash32,
    pub proof: Vec<Hash32>,
}

impl Claim {
    pub fn to_json(&self) -> ClaimJson {
        ClaimJson {
            address: self.record.address_hex(),
            amount: self.record.amount.to_string(),
            leaf: hex0x(self.leaf),
            root: hex0x(self.root),
            proof: self.proof.iter().map(hex0x).collect(),
        }
    }
}

/// Answers allocation and proof queries for one loaded round.
///
/// Owns its tree and never mutates it; share it behind an `Arc` to serve
/// concurrent readers. Swapping rounds means building a new service.
#[derive(Clone, Debug)]
pub struct AllocationService {
    tree: AirgrabTree,
    by_address: HashMap<Address, usize>,
}

impl AllocationService {
    pub fn new(tree: AirgrabTree) -> Self {
        let by_address = tree.entries().iter().enumerate().map(|(i, e)| (e.record.address, i)).collect();
        Self { tree, by_address }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(AirgrabTree::read_from(path)?))
    }

    pub fn tree(&self) -> &AirgrabTree {
        &self.tree
    }

    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    fn record_for(&self, address: &str) -> Result<&Record> {
        let address = parse_address(address)?;
        self.by_address
            .get(&address)
            .map(|&i| &self.tree.entries()[i].record)
            .ok_or_else(|| AirgrabError::NotFound(format!("{} is not eligible", normalize_address(&address))))
    }

    pub fn allocation_for(&self, address: &str) -> Result<U256> {
        self.record_for(address).map(|r| r.amount)
    }

    pub fn claim_for(&self, address: &str) -> Result<Claim> {
        let record = *self.record_for(address)?;
        let leaf = record.leaf();
        Ok(Claim { record, leaf, root: self.root(), proof: self.tree.proof(&leaf)? })
    }

    /// Proof lookup by exact leaf value, for callers that re-derive the leaf themselves.
    pub fn proof_for_leaf(&self, leaf: &Hash32) -> Result<Vec<Hash32>> {
        self.tree.proof(leaf)
    }

    /// All (address, amount) pairs ordered by address.
    pub fn allocations(&self) -> Vec<(Address, U256)> {
        let mut all: Vec<_> = self.tree.entries().iter().map(|e| (e.record.address, e.record.amount)).collect();
        all.sort_unstable();
        all
    }
}
