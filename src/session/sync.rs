use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::{debug, info};
use parking_lot::Mutex;
use uuid::Uuid;

use super::storage::{CredentialStorage, MemoryCredentialStorage, Result};
use super::Credential;

/// Identifies one attached [`SessionManager`](super::SessionManager), the
/// equivalent of a browser tab sharing the same origin.
pub type ContextId = Uuid;

/// Broadcast to every observer whenever the signed-in state changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChange {
    /// Context that performed the write. `None` when the change was picked up
    /// from storage by [`CredentialHub::reload`].
    pub origin: Option<ContextId>,
    pub signed_in: bool,
}

type Observer = Arc<dyn Fn(&AuthChange) + Send + Sync>;

struct ObserverEntry {
    id: u64,
    context: ContextId,
    observer: Observer,
}

/// Single-writer credential cell shared by every attached context.
///
/// Writes go to storage first, then to the in-memory cell, and observers are
/// called after both locks are released so they may read the hub again.
pub struct CredentialHub {
    storage: Box<dyn CredentialStorage>,
    current: Mutex<Option<Credential>>,
    observers: Mutex<Vec<ObserverEntry>>,
    next_observer: AtomicU64,
}

impl CredentialHub {
    pub fn open(storage: impl CredentialStorage + 'static) -> Result<Arc<Self>> {
        let current = storage.load()?;
        if current.is_some() {
            info!("🔑 Restored stored credential");
        }
        Ok(Arc::new(Self {
            storage: Box::new(storage),
            current: Mutex::new(current),
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        }))
    }

    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            storage: Box::new(MemoryCredentialStorage::new()),
            current: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(1),
        })
    }

    pub(crate) fn credential(&self) -> Option<Credential> {
        self.current.lock().clone()
    }

    pub(crate) fn store(&self, origin: ContextId, credential: Credential) -> Result<()> {
        {
            let mut current = self.current.lock();
            self.storage.save(&credential)?;
            *current = Some(credential);
        }
        info!("🔐 Signed in (context {})", origin);
        self.notify(AuthChange {
            origin: Some(origin),
            signed_in: true,
        });
        Ok(())
    }

    pub(crate) fn clear(&self, origin: ContextId) -> Result<()> {
        let was_signed_in = {
            let mut current = self.current.lock();
            self.storage.clear()?;
            current.take().is_some()
        };
        if was_signed_in {
            info!("🚪 Signed out (context {})", origin);
            self.notify(AuthChange {
                origin: Some(origin),
                signed_in: false,
            });
        }
        Ok(())
    }

    /// Signs out only while `token` is still the current credential.
    /// Returns whether it signed out.
    pub(crate) fn clear_if(&self, origin: ContextId, token: &str) -> Result<bool> {
        {
            let mut current = self.current.lock();
            match current.as_ref() {
                Some(credential) if credential.token() == token => {}
                _ => return Ok(false),
            }
            self.storage.clear()?;
            *current = None;
        }
        info!("🚪 Signed out after rejected credential (context {})", origin);
        self.notify(AuthChange {
            origin: Some(origin),
            signed_in: false,
        });
        Ok(true)
    }

    /// Re-reads storage and broadcasts if another process changed it.
    /// Returns whether anything changed.
    pub fn reload(&self) -> Result<bool> {
        let change = {
            let mut current = self.current.lock();
            let stored = self.storage.load()?;
            if *current == stored {
                None
            } else {
                let signed_in = stored.is_some();
                *current = stored;
                Some(AuthChange {
                    origin: None,
                    signed_in,
                })
            }
        };

        match change {
            Some(change) => {
                debug!("🔄 Credential changed outside this process");
                self.notify(change);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn register(self: &Arc<Self>, context: ContextId, observer: Observer) -> Subscription {
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().push(ObserverEntry {
            id,
            context,
            observer,
        });
        Subscription {
            hub: Arc::downgrade(self),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn context_count(&self) -> usize {
        let observers = self.observers.lock();
        let mut contexts: Vec<ContextId> = observers.iter().map(|entry| entry.context).collect();
        contexts.sort();
        contexts.dedup();
        contexts.len()
    }

    fn unregister(&self, id: u64) {
        self.observers.lock().retain(|entry| entry.id != id);
    }

    fn notify(&self, change: AuthChange) {
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .iter()
            .map(|entry| Arc::clone(&entry.observer))
            .collect();
        debug!("📣 Broadcasting auth change to {} observer(s)", observers.len());
        for observer in observers {
            observer(&change);
        }
    }
}

/// Keeps an observer registered until dropped.
#[must_use = "dropping a Subscription unregisters the observer"]
pub struct Subscription {
    hub: Weak<CredentialHub>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unregister(self.id);
        }
    }
}
