//! Merkle commitments for airgrab allocation snapshots.
//!
//! CSV snapshot → [`Record`]s → double-Keccak leaves → sorted-pair Keccak
//! tree → JSON artifact, plus proof generation and verification that match
//! the on-chain claim check.

pub mod allocation;
pub mod encode;
pub mod error;
pub mod io;
pub mod merkle;
pub mod samples;
pub mod service;
pub mod snapshot;
pub mod tree;
pub mod util;

pub use encode::{hash_leaf, AirgrabLeaf, Record};
pub use error::{AirgrabError, EncodingError, RecordLocation, Result};
pub use merkle::{verify, Hash32, MerkleTree};
pub use service::{AllocationService, Claim};
pub use snapshot::{read_snapshot, read_snapshot_file, DuplicatePolicy, Snapshot, SnapshotOptions};
pub use tree::{AirgrabTree, Entry};

pub use alloy_primitives::{Address, U256};
