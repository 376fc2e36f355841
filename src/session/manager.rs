use std::sync::Arc;

use uuid::Uuid;

use super::storage::Result;
use super::sync::{AuthChange, ContextId, CredentialHub, Subscription};
use super::Credential;

/// One context's handle on the shared credential.
///
/// Reads always go through the hub, so a clone held anywhere never serves a
/// stale credential. Clones share the same context id.
#[derive(Clone)]
pub struct SessionManager {
    hub: Arc<CredentialHub>,
    context: ContextId,
}

impl SessionManager {
    pub fn attach(hub: &Arc<CredentialHub>) -> Self {
        Self {
            hub: Arc::clone(hub),
            context: Uuid::new_v4(),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }

    pub fn hub(&self) -> &Arc<CredentialHub> {
        &self.hub
    }

    pub fn credential(&self) -> Option<Credential> {
        self.hub.credential()
    }

    pub fn is_authenticated(&self) -> bool {
        self.hub.credential().is_some()
    }

    pub fn set_credential(&self, credential: Credential) -> Result<()> {
        self.hub.store(self.context, credential)
    }

    pub fn clear(&self) -> Result<()> {
        self.hub.clear(self.context)
    }

    /// Signs out if `token` is still the current credential. A newer sign-in
    /// from any context survives.
    pub fn clear_rejected(&self, token: &str) -> Result<bool> {
        self.hub.clear_if(self.context, token)
    }

    /// Registers `observer` for every change made by any context on the hub.
    /// It is called synchronously, on the writer's thread.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&AuthChange) + Send + Sync + 'static,
    {
        self.hub.register(self.context, Arc::new(observer))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("context", &self.context)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
