//! Named result objects persisted as JSON under `outputs/`.
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::paths::PathResolver;
use crate::value::Value;

/// Saves and loads `Value` trees at `outputs/output_{entity}_{key}.json`.
///
/// Each save fully replaces the previous document. Concurrent saves to the
/// same `(entity, key)` race; callers serialize them.
#[derive(Debug, Clone)]
pub struct OutputStore {
    paths: PathResolver,
}

impl OutputStore {
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn path_for(&self, entity: &str, key: &str) -> PathBuf {
        self.paths.output_file_path(&[entity, key])
    }

    /// Encode `payload` and write it, replacing any existing document.
    ///
    /// The outputs directory must already exist (see
    /// [`PathResolver::ensure_layout`]); a missing parent is a `WriteFailure`.
    pub fn save(&self, entity: &str, key: &str, payload: &Value) -> Result<PathBuf> {
        let path = self.path_for(entity, key);
        let doc = codec::encode(payload)?;
        let bytes = serde_json::to_vec_pretty(&doc).map_err(|e| Error::write(&path, e.into()))?;
        fs::write(&path, bytes).map_err(|e| Error::write(&path, e))?;
        debug!(entity, key, path = %path.display(), "saved output");
        Ok(path)
    }

    pub fn load(&self, entity: &str, key: &str) -> Result<Value> {
        let path = self.path_for(entity, key);
        let data = fs::read(&path).map_err(|e| Error::from_read(&path, e))?;
        let doc: serde_json::Value = serde_json::from_slice(&data).map_err(|e| {
            Error::CorruptArtifact(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        let value = codec::decode(&doc).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to decode output");
        })?;
        debug!(entity, key, path = %path.display(), "loaded output");
        Ok(value)
    }

    pub fn exists(&self, entity: &str, key: &str) -> bool {
        self.path_for(entity, key).is_file()
    }

    /// Keys of every saved output of `entity`, sorted.
    ///
    /// A missing outputs directory yields an empty list.
    pub fn keys(&self, entity: &str) -> Result<Vec<String>> {
        let dir = self.paths.outputs_dir();
        let rd = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_read(&dir, e)),
        };
        let prefix = format!("output_{entity}_");
        let mut out = Vec::new();
        for entry in rd {
            let p = entry.map_err(|e| Error::from_read(&dir, e))?.path();
            if !p.is_file() || p.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = p
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(&prefix))
                && !key.is_empty()
            {
                out.push(key.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}
