//! # Saved Configurations
//!
//! Named snapshots of the pad collection, kept as one list in one JSON file.
//! Every mutation rewrites the whole file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TuneError};
use crate::pads::Pad;

/// Name used when a configuration is saved without one.
pub const UNTITLED: &str = "Untitled Piece";

/// A named snapshot of a pad collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedConfiguration {
    pub id: u64,
    pub name: String,
    pub drums: Vec<Pad>,
}

/// The list of saved configurations and the file backing it.
#[derive(Debug)]
pub struct ConfigurationStore {
    path: PathBuf,
    configs: Vec<SavedConfiguration>,
}

fn display_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() { UNTITLED.to_string() } else { name.to_string() }
}

impl ConfigurationStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let configs = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        log::info!("[STORE] Opened {} with {} saved configuration(s)", path.display(), configs.len());
        Ok(Self { path, configs })
    }

    /// An empty store that will write to `path` on the first mutation.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), configs: Vec::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[SavedConfiguration] {
        &self.configs
    }

    pub fn get(&self, id: u64) -> Option<&SavedConfiguration> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// Appends a new configuration and returns its id.
    pub fn save(&mut self, name: &str, drums: Vec<Pad>) -> Result<u64> {
        let id = self.configs.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        self.configs.push(SavedConfiguration { id, name: display_name(name), drums });
        self.persist()?;
        Ok(id)
    }

    pub fn rename(&mut self, id: u64, name: &str) -> Result<()> {
        self.get_mut(id)?.name = display_name(name);
        self.persist()
    }

    /// Replaces a configuration's pads, keeping its id and name.
    pub fn overwrite(&mut self, id: u64, drums: Vec<Pad>) -> Result<()> {
        self.get_mut(id)?.drums = drums;
        self.persist()
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        let pos = self
            .configs
            .iter()
            .position(|c| c.id == id)
            .ok_or(TuneError::UnknownConfiguration(id))?;
        self.configs.remove(pos);
        self.persist()
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut SavedConfiguration> {
        self.configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(TuneError::UnknownConfiguration(id))
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.configs)?;
        fs::write(&self.path, json)?;
        log::debug!("[STORE] Wrote {} configuration(s) to {}", self.configs.len(), self.path.display());
        Ok(())
    }
}
