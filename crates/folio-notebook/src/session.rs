//! Persistent session state using RocksDB.
//!
//! Two independent values survive restarts: the active account address and
//! the notebook currently open in the editor.

use crate::error::{Error, Result};
use rocksdb::{Options, DB};
use std::path::Path;

const ADDRESS_KEY: &[u8] = b"session:address";
const NOTEBOOK_KEY: &[u8] = b"session:notebook";

/// Storage backend for session values.
pub struct SessionStore {
    db: DB,
}

impl SessionStore {
    /// Open or create the session store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // --- Account address ---

    /// Persisted account address, if any.
    pub fn address(&self) -> Result<Option<String>> {
        self.get_string(ADDRESS_KEY)
    }

    /// Persist the account address.
    pub fn set_address(&self, address: &str) -> Result<()> {
        self.put_string(ADDRESS_KEY, address)
    }

    /// Forget the account address.
    pub fn clear_address(&self) -> Result<()> {
        self.db.delete(ADDRESS_KEY)?;
        Ok(())
    }

    // --- Open notebook ---

    /// Id of the notebook currently open, if any.
    pub fn current_notebook(&self) -> Result<Option<String>> {
        self.get_string(NOTEBOOK_KEY)
    }

    /// Record the notebook currently open.
    pub fn set_current_notebook(&self, notebook_id: &str) -> Result<()> {
        self.put_string(NOTEBOOK_KEY, notebook_id)
    }

    /// Forget the open notebook.
    pub fn clear_current_notebook(&self) -> Result<()> {
        self.db.delete(NOTEBOOK_KEY)?;
        Ok(())
    }

    fn get_string(&self, key: &[u8]) -> Result<Option<String>> {
        match self.db.get(key)? {
            Some(data) => String::from_utf8(data)
                .map(Some)
                .map_err(|_| Error::Session("stored value is not UTF-8".into())),
            None => Ok(None),
        }
    }

    fn put_string(&self, key: &[u8], value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidInput("empty session value".into()));
        }
        self.db.put(key, value.as_bytes())?;
        Ok(())
    }
}
