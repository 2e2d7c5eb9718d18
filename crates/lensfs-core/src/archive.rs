//! Zip snapshots of an entity's saved outputs.
//!
//! `save` replaces documents in place; archiving first keeps the earlier
//! results of a model run readable after a rerun overwrites them.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::codec;
use crate::error::{Error, Result};
use crate::store::OutputStore;
use crate::value::Value;

fn entry_name(key: &str) -> String {
    format!("{key}.json")
}

impl OutputStore {
    /// Zip every saved output of `entity` into
    /// `outputs/archive/output_{entity}_{timestamp}.zip`, one `{key}.json` entry per key.
    ///
    /// The stored documents are copied verbatim and left in place.
    pub fn archive(&self, entity: &str) -> Result<PathBuf> {
        let keys = self.keys(entity)?;
        if keys.is_empty() {
            return Err(Error::NotFound {
                path: self.path_for(entity, "*"),
            });
        }
        let dir = self.paths().archive_dir();
        fs::create_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let dest = dir.join(format!("output_{entity}_{ts}.zip"));

        let file = File::create(&dest).map_err(|e| Error::write(&dest, e))?;
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let wr = |e: io::Error| Error::write(&dest, e);
        for key in &keys {
            let src = self.path_for(entity, key);
            let data = fs::read(&src).map_err(|e| Error::from_read(&src, e))?;
            zip.start_file(entry_name(key), options)
                .map_err(|e| wr(io::Error::other(e)))?;
            zip.write_all(&data).map_err(wr)?;
        }
        zip.finish().map_err(|e| wr(io::Error::other(e)))?;
        info!(entity, count = keys.len(), archive = %dest.display(), "archived outputs");
        Ok(dest)
    }

    /// Decode the document stored for `key` in an archive written by [`OutputStore::archive`].
    pub fn load_archived(&self, archive: &Path, key: &str) -> Result<Value> {
        let file = File::open(archive).map_err(|e| Error::from_read(archive, e))?;
        let mut zip = ZipArchive::new(file).map_err(|e| {
            Error::CorruptArtifact(format!("{} is not a zip archive: {e}", archive.display()))
        })?;
        let name = entry_name(key);
        let entry = match zip.by_name(&name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::NotFound {
                    path: archive.join(&name),
                });
            }
            Err(e) => {
                return Err(Error::CorruptArtifact(format!(
                    "{}: {e}",
                    archive.display()
                )));
            }
        };
        let doc: serde_json::Value = serde_json::from_reader(entry).map_err(|e| {
            Error::CorruptArtifact(format!(
                "{name} in {} is not valid JSON: {e}",
                archive.display()
            ))
        })?;
        debug!(key, archive = %archive.display(), "loaded archived output");
        codec::decode(&doc)
    }
}
