//! Directory layout of a pipeline root.
//!
//! ```text
//! root/
//!   lens_list.txt
//!   settings/{name}_config.yml
//!   logs/log_{key..}.txt
//!   outputs/output_{key..}.json
//!   outputs/archive/output_{name}_{timestamp}.zip
//!   data/{name}/image_{name}_{band}.hdf5
//!   data/{name}/psf_{name}_{band}.hdf5
//! ```
//!
//! Accessors are pure path composition. Only [`PathResolver::ensure_layout`]
//! and [`PathResolver::ensure_entity_data_dir`] touch the filesystem.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

pub const SETTINGS_DIR: &str = "settings";
pub const LOGS_DIR: &str = "logs";
pub const OUTPUTS_DIR: &str = "outputs";
pub const DATA_DIR: &str = "data";
pub const ARCHIVE_DIR: &str = "archive";
pub const LENS_LIST_FILE: &str = "lens_list.txt";

const LOG_PREFIX: &str = "log";
const OUTPUT_PREFIX: &str = "output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the standard subdirectories. Safe to call repeatedly.
    pub fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.settings_dir(),
            self.logs_dir(),
            self.outputs_dir(),
            self.data_dir(),
        ] {
            if !dir.is_dir() {
                fs::create_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;
                info!(path = %dir.display(), "created directory");
            }
        }
        debug!(root = %self.root.display(), "layout ready");
        Ok(())
    }

    /// Create `data/{name}` (and any missing parents).
    pub fn ensure_entity_data_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.entity_data_dir(name);
        fs::create_dir_all(&dir).map_err(|e| Error::write(&dir, e))?;
        Ok(dir)
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.root.join(SETTINGS_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join(OUTPUTS_DIR)
    }

    /// Zip snapshots of outputs, inside the outputs directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.outputs_dir().join(ARCHIVE_DIR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn entity_data_dir(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    pub fn lens_list_file_path(&self) -> PathBuf {
        self.root.join(LENS_LIST_FILE)
    }

    pub fn config_file_path(&self, name: &str) -> PathBuf {
        self.settings_dir().join(format!("{name}_config.yml"))
    }

    pub fn image_file_path(&self, name: &str, band: &str) -> PathBuf {
        self.data_artifact_path("image", name, band)
    }

    pub fn psf_file_path(&self, name: &str, band: &str) -> PathBuf {
        self.data_artifact_path("psf", name, band)
    }

    fn data_artifact_path(&self, family: &str, name: &str, band: &str) -> PathBuf {
        self.entity_data_dir(name)
            .join(format!("{family}_{name}_{band}.hdf5"))
    }

    /// `logs/log_{segments joined by _}.txt`
    pub fn log_file_path(&self, segments: &[&str]) -> PathBuf {
        self.logs_dir().join(keyed_file_name(LOG_PREFIX, segments, "txt"))
    }

    /// `outputs/output_{segments joined by _}.json`
    pub fn output_file_path(&self, segments: &[&str]) -> PathBuf {
        self.outputs_dir()
            .join(keyed_file_name(OUTPUT_PREFIX, segments, "json"))
    }

    /// Entity names listed in `lens_list.txt`, one per line, in file order.
    /// Surrounding whitespace is trimmed and blank lines are skipped.
    pub fn lens_list(&self) -> Result<Vec<String>> {
        let path = self.lens_list_file_path();
        let text = fs::read_to_string(&path).map_err(|e| Error::from_read(&path, e))?;
        let names: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!(path = %path.display(), count = names.len(), "read lens list");
        Ok(names)
    }
}

fn keyed_file_name(prefix: &str, segments: &[&str], ext: &str) -> String {
    let mut name = String::from(prefix);
    for seg in segments {
        name.push('_');
        name.push_str(seg);
    }
    name.push('.');
    name.push_str(ext);
    name
}
