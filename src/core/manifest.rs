use crate::domain::model::ModuleManifest;
use crate::utils::error::{DownstreamError, Result};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "package.json";

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<ModuleManifest> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|source| DownstreamError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&raw).map_err(|source| DownstreamError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Cheap pre-check before [`load_manifest`]: is there a manifest at the top of `dir`?
pub fn looks_like_module_directory<P: AsRef<Path>>(dir: P) -> bool {
    manifest_path(dir.as_ref()).is_file()
}
