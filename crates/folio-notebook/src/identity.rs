//! Active account identity.
//!
//! Wallet connection itself happens elsewhere; this only tracks which
//! address is active, tells subscribers when it actually changes, and
//! mirrors it into the [`SessionStore`] so it survives restarts.

use crate::error::Result;
use crate::session::SessionStore;
use std::sync::Arc;
use tokio::sync::watch;

/// The active account address, with change notification.
pub struct Identity {
    tx: watch::Sender<Option<String>>,
    session: Option<Arc<SessionStore>>,
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity {
    /// Identity with no address and no persistence.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx, session: None }
    }

    /// Identity persisted into `session`, seeded from its stored address.
    pub fn restore(session: Arc<SessionStore>) -> Result<Self> {
        let stored = session.address()?;
        if let Some(ref address) = stored {
            tracing::info!("Restored session for {}", address);
        }
        let (tx, _rx) = watch::channel(stored);
        Ok(Self {
            tx,
            session: Some(session),
        })
    }

    /// Currently active address.
    pub fn active_address(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Receiver notified once per actual address change (`None` on disconnect).
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    /// Switch the active address. Returns whether it changed.
    ///
    /// Blank addresses mean disconnect. Addresses differing only in case
    /// are the same account and do not count as a change.
    pub fn set_active_address(&self, address: Option<String>) -> Result<bool> {
        let address = address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        let changed = self.tx.send_if_modified(|current| {
            let same = match (current.as_deref(), address.as_deref()) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            };
            if !same {
                *current = address.clone();
            }
            !same
        });

        if changed {
            match &address {
                Some(a) => tracing::info!("Active account is now {}", a),
                None => tracing::info!("Account disconnected"),
            }
            if let Some(session) = &self.session {
                match &address {
                    Some(a) => session.set_address(a)?,
                    None => session.clear_address()?,
                }
            }
        }
        Ok(changed)
    }

    /// Clear the active address.
    pub fn disconnect(&self) -> Result<bool> {
        self.set_active_address(None)
    }
}
