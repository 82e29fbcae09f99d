use alloy_primitives::{Address, U256};

use crate::encode::Record;
use crate::error::Result;
use crate::merkle::keccak;
use crate::snapshot::Snapshot;

/// Deterministic address for sample index `i`: the last 20 bytes of `keccak256(i_be)`.
pub fn sample_address(i: u64) -> Address {
    let h = keccak(&i.to_be_bytes());
    Address::from_slice(&h[12..])
}

pub fn build_sample_snapshot() -> Result<Snapshot> {
    build_sample_snapshot_with_records(8)
}

/// `n` records with distinct addresses and amounts of `(i + 1) * 10^18`.
pub fn build_sample_snapshot_with_records(n: usize) -> Result<Snapshot> {
    let one_token = U256::from(1_000_000_000_000_000_000u128);
    let records = (0..n as u64)
        .map(|i| Record::new(sample_address(i), U256::from(i + 1) * one_token))
        .collect();
    Snapshot::from_records(records)
}
