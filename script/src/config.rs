use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;

/// Selects one distribution round and where its files live.
#[derive(Args, Debug, Clone)]
pub struct RoundArgs {
    /// Distribution round or network, e.g. `alfajores` or `celo`
    #[arg(long, short = 'n', env = "AIRGRAB_ROUND")]
    pub round: String,

    /// Directory holding snapshots and tree artifacts
    #[arg(long, env = "AIRGRAB_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

/// Convention-based paths for one round: `<data-dir>/airgrab.<round>.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    pub data_dir: PathBuf,
    pub round: String,
}

impl RoundConfig {
    pub fn new(data_dir: impl Into<PathBuf>, round: &str) -> Result<Self> {
        let valid = !round.is_empty()
            && round.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        if !valid {
            bail!("invalid round {round:?}: use lowercase letters, digits, '-' or '_'");
        }
        Ok(Self { data_dir: data_dir.into(), round: round.to_string() })
    }

    pub fn from_args(args: &RoundArgs) -> Result<Self> {
        Self::new(&args.data_dir, &args.round)
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("airgrab.{}.{suffix}", self.round))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.file("csv")
    }

    pub fn tree_path(&self) -> PathBuf {
        self.file("tree.json")
    }

    pub fn root_path(&self) -> PathBuf {
        self.file("root.json")
    }
}

/// Root file that accompanies an explicitly chosen tree path.
pub fn root_path_for(tree_path: &Path) -> PathBuf {
    let name = tree_path.file_name().and_then(|n| n.to_str()).unwrap_or("tree.json");
    let stem = name
        .strip_suffix(".tree.json")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name);
    tree_path.with_file_name(format!("{stem}.root.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_paths_follow_convention() {
        let cfg = RoundConfig::new("data", "celo").unwrap();
        assert_eq!(cfg.snapshot_path(), PathBuf::from("data/airgrab.celo.csv"));
        assert_eq!(cfg.tree_path(), PathBuf::from("data/airgrab.celo.tree.json"));
        assert_eq!(cfg.root_path(), PathBuf::from("data/airgrab.celo.root.json"));
    }

    #[test]
    fn round_names_are_restricted() {
        assert!(RoundConfig::new("data", "alfajores").is_ok());
        assert!(RoundConfig::new("data", "round_2-b").is_ok());
        for bad in ["", "Celo", "../etc", "a b", "x.y"] {
            assert!(RoundConfig::new("data", bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn root_path_next_to_tree() {
        assert_eq!(root_path_for(Path::new("out/airgrab.x.tree.json")), PathBuf::from("out/airgrab.x.root.json"));
        assert_eq!(root_path_for(Path::new("tree.json")), PathBuf::from("tree.root.json"));
        assert_eq!(root_path_for(Path::new("dump")), PathBuf::from("dump.root.json"));
    }
}
