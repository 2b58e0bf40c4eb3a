//! On-disk persistence for uploaded binary content, used by the binary
//! answer path only when enabled in configuration.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::{ProtocolError, ProtocolResult};

pub struct ArtifactStore {
    base_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write the bytes under a fresh uuid filename, creating the base
    /// directory on demand
    pub fn save(&self, bytes: &[u8], extension: &str) -> ProtocolResult<PathBuf> {
        fs::create_dir_all(&self.base_path)
            .map_err(|err| ProtocolError::Artifact(format!("unable to create directory: {err}")))?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension.to_lowercase());
        let path = self.base_path.join(filename);
        fs::write(&path, bytes)
            .map_err(|err| ProtocolError::Artifact(format!("unable to save file: {err}")))?;

        Ok(path)
    }
}
