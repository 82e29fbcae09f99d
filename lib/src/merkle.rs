use sha3::{Digest, Keccak256};

use crate::error::{AirgrabError, Result};
use crate::util::hex0x;

pub type Hash32 = [u8; 32];

pub fn keccak(bytes: &[u8]) -> Hash32 {
    let mut h = Keccak256::new();
    h.update(bytes);
    h.finalize().into()
}

/// Parent hash: `keccak256(min(a, b) || max(a, b))`.
pub fn fold_sorted_pair(a: Hash32, b: Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&lo);
    buf[32..].copy_from_slice(&hi);
    keccak(&buf)
}

/// Recomputes the path from `leaf` through `proof` and compares it to `root`.
pub fn verify(root: &Hash32, leaf: Hash32, proof: &[Hash32]) -> bool {
    let mut node = leaf;
    for sib in proof {
        node = fold_sorted_pair(node, *sib);
    }
    node == *root
}

/// Next level up: sibling pairs are folded, a trailing odd node is promoted unchanged.
fn next_level(level: &[Hash32]) -> Vec<Hash32> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => fold_sorted_pair(*a, *b),
            [odd] => *odd,
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// Immutable sorted-pair Keccak tree. Layer 0 holds the leaves in ascending
/// byte order; the last layer holds the root alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Builds the tree over the multiset of `leaves`. Input order is irrelevant.
    pub fn build(mut leaves: Vec<Hash32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AirgrabError::EmptySnapshot);
        }
        leaves.sort_unstable();
        Ok(Self::from_sorted_leaves(leaves))
    }

    /// Rebuilds from leaves that must already be in canonical (strictly ascending) order.
    pub fn from_canonical_leaves(leaves: Vec<Hash32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AirgrabError::serialization("tree has no leaves"));
        }
        if let Some(i) = leaves.windows(2).position(|w| w[0] >= w[1]) {
            return Err(AirgrabError::serialization(format!(
                "leaves are not strictly ascending at index {}",
                i + 1
            )));
        }
        Ok(Self::from_sorted_leaves(leaves))
    }

    fn from_sorted_leaves(leaves: Vec<Hash32>) -> Self {
        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next = next_level(&layers[layers.len() - 1]);
            layers.push(next);
        }
        Self { layers }
    }

    pub fn root(&self) -> Hash32 {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Hash32] {
        &self.layers[0]
    }

    pub fn layers(&self) -> &[Vec<Hash32>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers[0].is_empty()
    }

    /// Position of `leaf` in layer 0, if present.
    pub fn position(&self, leaf: &Hash32) -> Option<usize> {
        self.layers[0].binary_search(leaf).ok()
    }

    /// Authentication path for an exact leaf value.
    pub fn proof(&self, leaf: &Hash32) -> Result<Vec<Hash32>> {
        let index = self
            .position(leaf)
            .ok_or_else(|| AirgrabError::NotFound(format!("leaf {} is not in the tree", hex0x(leaf))))?;
        self.proof_at(index)
    }

    /// Authentication path for the leaf at `index`, ordered leaf to root.
    pub fn proof_at(&self, index: usize) -> Result<Vec<Hash32>> {
        if index >= self.len() {
            return Err(AirgrabError::NotFound(format!(
                "leaf index {} is out of bounds for tree with {} leaves",
                index,
                self.len()
            )));
        }
        let mut proof = Vec::with_capacity(self.layers.len() - 1);
        let mut idx = index;
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = idx ^ 1;
            // No sibling means the node was promoted and contributes nothing.
            if sibling < level.len() {
                proof.push(level[sibling]);
            }
            idx /= 2;
        }
        Ok(proof)
    }
}
