//! A flat name→secret store persisted as a JSON object.
//!
//! The store holds the API key between runs.  Every call reads the whole file
//! and every mutation rewrites it; nothing is cached and no handle is kept
//! open.  There is no locking, so two processes writing at once can lose an
//! update.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use utf8path::Path;

use crate::error::{Error, Result};

/// A persistent mapping from credential slot names to secrets.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: Path<'static>,
}

impl CredentialStore {
    /// Open the store at `path`, creating it with an empty mapping if absent.
    pub fn open(path: impl Into<Path<'static>>) -> Result<Self> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            tracing::debug!(path = %store.path.as_str(), "creating credential store");
            store.write_all(&BTreeMap::new())?;
        }
        Ok(store)
    }

    /// The file backing this store.
    pub fn path(&self) -> &Path<'static> {
        &self.path
    }

    /// Look up a secret.  A missing name is `Ok(None)`, never an error.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(name))
    }

    /// Insert or overwrite a secret, preserving every other entry.
    pub fn set(&self, name: &str, secret: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(name.to_string(), secret.to_string());
        self.write_all(&entries)
    }

    /// Read the whole mapping.
    ///
    /// A file deleted since `open` reads as empty.  A file that does not parse
    /// is a hard error: treating it as empty would let the next `set` destroy
    /// whatever secrets it still holds.
    pub fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(Error::io(
                    format!("failed to read credential file {}", self.path.as_str()),
                    err,
                ));
            }
        };
        serde_json::from_slice(&bytes).map_err(|err| {
            Error::serialization(
                format!(
                    "credential file {} is not a JSON object of strings",
                    self.path.as_str()
                ),
                Some(Box::new(err)),
            )
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(|err| {
            Error::io(
                format!("failed to write credential file {}", self.path.as_str()),
                err,
            )
        })
    }
}
