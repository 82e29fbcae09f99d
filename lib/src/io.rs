pub mod json {
    use serde::{Deserialize, Serialize};

    pub const FORMAT_V1: &str = "airgrab-merkle-v1";

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryJson {
        pub address: String,
        pub amount: String,
        pub leaf_index: usize,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TreeJson {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub format: Option<String>,
        pub root: String,
        pub leaves: Vec<String>,
        pub layers: Vec<Vec<String>>,
        #[serde(default)]
        pub entries: Vec<EntryJson>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RootJson {
        pub root: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ClaimJson {
        pub address: String,
        pub amount: String,
        pub leaf: String,
        pub root: String,
        pub proof: Vec<String>,
    }
}

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AirgrabError, Result};

/// Contents written and synced to a temporary sibling of `path`, waiting to
/// be renamed over it. Dropping it without [`StagedFile::commit`] removes the
/// temporary file and leaves `path` untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    pub fn write(path: &Path, contents: &[u8]) -> Result<Self> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |e| AirgrabError::io(path, e);
        let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
        temp.write_all(contents).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        Ok(Self { temp, path: path.to_path_buf() })
    }

    pub fn commit(self) -> Result<()> {
        let Self { temp, path } = self;
        temp.persist(&path).map_err(|e| AirgrabError::io(&path, e.error))?;
        Ok(())
    }
}

/// Writes `contents` to a temporary sibling and renames it over `path`.
/// On failure the temporary file is removed and `path` is left untouched.
pub fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    StagedFile::write(path, contents)?.commit()
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| AirgrabError::io(path, e))
}
