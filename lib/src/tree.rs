//! A built airgrab tree: the Merkle tree plus the records it commits to,
//! with the JSON artifact format used to publish and reload it.

use std::path::Path;

use alloy_primitives::U256;
use tracing::{debug, info};

use crate::encode::Record;
use crate::error::{AirgrabError, Result};
use crate::io::json::{EntryJson, RootJson, TreeJson, FORMAT_V1};
use crate::io::{read_file, StagedFile};
use crate::merkle::{verify, Hash32, MerkleTree};
use crate::snapshot::Snapshot;
use crate::util::{hex0x, parse_address, parse_hex};

/// A record together with its position in the tree's leaf layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub record: Record,
    pub leaf_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirgrabTree {
    tree: MerkleTree,
    /// Ordered by leaf index.
    entries: Vec<Entry>,
}

impl AirgrabTree {
    /// Encodes, hashes and commits every record, then checks every proof
    /// against the fresh root before handing the tree out.
    pub fn build(snapshot: &Snapshot) -> Result<Self> {
        let leaves: Vec<Hash32> = snapshot.records().iter().map(Record::leaf).collect();
        let tree = MerkleTree::build(leaves)?;

        let mut entries = snapshot
            .records()
            .iter()
            .map(|record| {
                let leaf_index = tree.position(&record.leaf()).ok_or_else(|| {
                    AirgrabError::NotFound(format!("leaf for {} missing after build", record.address_hex()))
                })?;
                Ok(Entry { record: *record, leaf_index })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.leaf_index);

        let built = Self { tree, entries };
        built.self_test()?;
        info!(records = built.len(), root = %hex0x(built.root()), "built airgrab tree");
        Ok(built)
    }

    /// Verifies every entry's proof against the root.
    pub fn self_test(&self) -> Result<()> {
        let root = self.root();
        for entry in &self.entries {
            let leaf = entry.record.leaf();
            let proof = self.tree.proof_at(entry.leaf_index)?;
            if self.tree.leaves()[entry.leaf_index] != leaf || !verify(&root, leaf, &proof) {
                return Err(AirgrabError::serialization(format!(
                    "proof for {} does not verify against root {}",
                    entry.record.address_hex(),
                    hex0x(root)
                )));
            }
        }
        debug!(entries = self.entries.len(), "self-test passed");
        Ok(())
    }

    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    pub fn merkle(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn proof(&self, leaf: &Hash32) -> Result<Vec<Hash32>> {
        self.tree.proof(leaf)
    }

    pub fn to_json(&self) -> TreeJson {
        TreeJson {
            format: Some(FORMAT_V1.to_string()),
            root: hex0x(self.root()),
            leaves: self.tree.leaves().iter().map(hex0x).collect(),
            layers: self.tree.layers().iter().map(|l| l.iter().map(hex0x).collect()).collect(),
            entries: self
                .entries
                .iter()
                .map(|e| EntryJson {
                    address: e.record.address_hex(),
                    amount: e.record.amount.to_string(),
                    leaf_index: e.leaf_index,
                })
                .collect(),
        }
    }

    pub fn dump(&self, pretty: bool) -> Result<String> {
        let json = self.to_json();
        let s = if pretty { serde_json::to_string_pretty(&json) } else { serde_json::to_string(&json) };
        s.map_err(|e| AirgrabError::serialization(e.to_string()))
    }

    /// Rebuilds the tree from the leaf list and rejects any artifact whose
    /// stored layers, root or entries disagree with the rebuild.
    pub fn from_json(json: &TreeJson) -> Result<Self> {
        if let Some(format) = &json.format {
            if format != FORMAT_V1 {
                return Err(AirgrabError::serialization(format!("unsupported tree format {format:?}")));
            }
        }
        let bad_hash = |what: &str, e: String| AirgrabError::serialization(format!("{what}: {e}"));
        let leaves = json
            .leaves
            .iter()
            .enumerate()
            .map(|(i, h)| parse_hex::<32>(h).map_err(|e| bad_hash(&format!("leaf {i}"), e)))
            .collect::<Result<Vec<_>>>()?;
        let tree = MerkleTree::from_canonical_leaves(leaves)?;

        let root = parse_hex::<32>(&json.root).map_err(|e| bad_hash("root", e))?;
        if root != tree.root() {
            return Err(AirgrabError::serialization(format!(
                "stored root {} does not match rebuilt root {}",
                json.root,
                hex0x(tree.root())
            )));
        }
        if json.layers.len() != tree.layers().len() {
            return Err(AirgrabError::serialization(format!(
                "expected {} layers, found {}",
                tree.layers().len(),
                json.layers.len()
            )));
        }
        for (depth, (stored, rebuilt)) in json.layers.iter().zip(tree.layers()).enumerate() {
            let same = stored.len() == rebuilt.len()
                && stored
                    .iter()
                    .zip(rebuilt)
                    .all(|(s, r)| parse_hex::<32>(s).map(|h| h == *r).unwrap_or(false));
            if !same {
                return Err(AirgrabError::serialization(format!("layer {depth} does not match the leaves")));
            }
        }

        let mut covered = vec![false; tree.len()];
        let mut entries = Vec::with_capacity(json.entries.len());
        for (i, e) in json.entries.iter().enumerate() {
            let bad = |why: String| AirgrabError::serialization(format!("entry {i}: {why}"));
            let address = parse_address(&e.address).map_err(|err| bad(err.to_string()))?;
            let amount = U256::from_str_radix(&e.amount, 10).map_err(|err| bad(format!("amount: {err}")))?;
            let record = Record::new(address, amount);
            match covered.get_mut(e.leaf_index) {
                None => return Err(bad(format!("leaf index {} out of range", e.leaf_index))),
                Some(true) => return Err(bad(format!("leaf index {} used twice", e.leaf_index))),
                Some(slot) => *slot = true,
            }
            if tree.leaves()[e.leaf_index] != record.leaf() {
                return Err(bad(format!("{} does not hash to leaf {}", record.address_hex(), e.leaf_index)));
            }
            entries.push(Entry { record, leaf_index: e.leaf_index });
        }
        if !entries.is_empty() {
            if let Some(missing) = covered.iter().position(|c| !*c) {
                return Err(AirgrabError::serialization(format!(
                    "entries cover {} of {} leaves; leaf {missing} has no entry",
                    entries.len(),
                    tree.len()
                )));
            }
        }
        entries.sort_by_key(|e| e.leaf_index);
        let mut addresses: Vec<_> = entries.iter().map(|e| e.record.address).collect();
        addresses.sort_unstable();
        if let Some(w) = addresses.windows(2).find(|w| w[0] == w[1]) {
            return Err(AirgrabError::serialization(format!("duplicate entry address {}", hex0x(w[0]))));
        }

        Ok(Self { tree, entries })
    }

    pub fn load(text: &str) -> Result<Self> {
        let json: TreeJson =
            serde_json::from_str(text).map_err(|e| AirgrabError::serialization(format!("malformed tree json: {e}")))?;
        Self::from_json(&json)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let tree = Self::load(&read_file(path)?)?;
        info!(path = %path.display(), records = tree.len(), root = %hex0x(tree.root()), "loaded airgrab tree");
        Ok(tree)
    }

    /// Writes the tree artifact and, optionally, the root file next to it.
    /// Both files are staged before either is renamed into place.
    pub fn write_to(&self, tree_path: &Path, root_path: Option<&Path>, pretty: bool) -> Result<()> {
        let tree_file = StagedFile::write(tree_path, self.dump(pretty)?.as_bytes())?;
        let root_file = match root_path {
            Some(root_path) => {
                let root = serde_json::to_string(&RootJson { root: hex0x(self.root()) })
                    .map_err(|e| AirgrabError::serialization(e.to_string()))?;
                Some(StagedFile::write(root_path, root.as_bytes())?)
            }
            None => None,
        };
        tree_file.commit()?;
        if let Some(root_file) = root_file {
            root_file.commit()?;
        }
        Ok(())
    }
}
