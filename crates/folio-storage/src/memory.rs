//! In-memory blob store.
//!
//! Content identifiers are the hex BLAKE3 hash of the body, so uploading the
//! same body twice yields the same CID (as on IPFS). Each operation can be
//! made to fail on demand to exercise error paths.

use crate::error::{Result, StorageError};
use crate::record::UploadRecord;
use crate::BlobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, String>,
    uploads: Vec<UploadRecord>,
}

/// Blob store held entirely in process memory.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// Number of uploads still allowed to succeed (usize::MAX = unlimited)
    uploads_left: AtomicUsize,
    fail_fetches: AtomicBool,
    fail_listing: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            uploads_left: AtomicUsize::new(usize::MAX),
            fail_fetches: AtomicBool::new(false),
            fail_listing: AtomicBool::new(false),
        }
    }

    /// CID for a body.
    pub fn cid_for(body: &str) -> String {
        hex::encode(blake3::hash(body.as_bytes()).as_bytes())
    }

    /// Let the next `n` uploads succeed, then fail every upload after that.
    pub fn fail_uploads_after(&self, n: usize) {
        self.uploads_left.store(n, Ordering::SeqCst);
    }

    /// Make every fetch fail (or succeed again).
    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make the listing call fail (or succeed again).
    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Insert a blob with an arbitrary upload record, bypassing upload
    /// failure injection. The record's CID is replaced by the body hash.
    pub fn insert(&self, mut record: UploadRecord, body: impl Into<String>) -> String {
        let body = body.into();
        let cid = Self::cid_for(&body);
        record.cid = cid.clone();

        let mut inner = self.lock();
        if record.id.is_none() {
            record.id = Some(inner.uploads.len().to_string());
        }
        inner.blobs.insert(cid.clone(), body);
        inner.uploads.push(record);
        cid
    }

    /// Number of upload records held.
    pub fn upload_count(&self) -> usize {
        self.lock().uploads.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-insert; the map is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(&self, file_name: &str, mime_type: &str, body: String) -> Result<String> {
        let allowed = self
            .uploads_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            return Err(StorageError::Upload(format!("upload of {} rejected", file_name)));
        }

        let record = UploadRecord::new(String::new(), file_name).with_mime_type(mime_type);
        Ok(self.insert(record, body))
    }

    async fn fetch(&self, cid: &str) -> Result<String> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StorageError::AllGatewaysFailed {
                cid: cid.to_string(),
                attempted: 1,
            });
        }
        self.lock()
            .blobs
            .get(cid)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(cid.to_string()))
    }

    async fn list_uploads(&self) -> Result<Vec<UploadRecord>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StorageError::Listing("listing unavailable".into()));
        }
        Ok(self.lock().uploads.clone())
    }
}
