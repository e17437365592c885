// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared session state: the active identity and its credential material.
//!
//! A single [`SessionHandle`] is shared (via `Arc`) by the API client, which
//! signs requests from it and clears it on 401, and by the services built on
//! top. Identity changes are published on a `watch` channel.

pub mod redirect;
pub mod store;

pub use redirect::{LoginRedirect, TracingRedirect};
pub use store::{FileSessionStore, MemorySessionStore, PersistedSession, SessionStore};

use crate::models::{Credentials, Identity, Role};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    /// Transient, while a login request is in flight
    Authenticating,
    Authenticated,
}

#[derive(Debug)]
struct SessionData {
    state: SessionState,
    credentials: Option<Credentials>,
    identity: Option<Identity>,
}

impl SessionData {
    fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            credentials: None,
            identity: None,
        }
    }
}

/// In-memory session plus its persisted copy.
///
/// Locks are only held for the duration of a field read or write, never
/// across an `.await`.
pub struct SessionHandle {
    data: RwLock<SessionData>,
    store: Arc<dyn SessionStore>,
    changes: watch::Sender<Option<Identity>>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>) -> Arc<Self> {
        let (changes, _) = watch::channel(None);
        Arc::new(Self {
            data: RwLock::new(SessionData::anonymous()),
            store,
            changes,
        })
    }

    /// Session backed by memory only.
    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn state(&self) -> SessionState {
        self.read().state
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.read()
            .identity
            .as_ref()
            .is_some_and(|identity| identity.role == role)
    }

    /// `Authorization` header value for outgoing requests, if signed in.
    pub fn authorization_header(&self) -> Option<String> {
        self.read()
            .credentials
            .as_ref()
            .map(Credentials::authorization_header)
    }

    pub fn has_credentials(&self) -> bool {
        self.read().credentials.is_some()
    }

    /// Receive every identity change from now on.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.changes.subscribe()
    }

    /// Enter `Authenticating` ahead of a login call.
    pub(crate) fn begin_authentication(&self) {
        self.write().state = SessionState::Authenticating;
    }

    /// Install a freshly authenticated identity and persist it.
    pub(crate) fn establish(&self, credentials: Credentials, identity: Identity) {
        {
            let mut data = self.write();
            data.state = SessionState::Authenticated;
            data.credentials = Some(credentials.clone());
            data.identity = Some(identity.clone());
        }

        let persisted = PersistedSession {
            identity: identity.clone(),
            credentials: Some(credentials),
        };
        if let Err(e) = self.store.save(&persisted) {
            tracing::warn!(error = %e, "Failed to persist session, continuing in memory");
        }

        self.changes.send_replace(Some(identity));
    }

    /// Drop identity and credentials, in memory and in the store.
    pub(crate) fn clear(&self) {
        let had_identity = {
            let mut data = self.write();
            let had_identity = data.identity.is_some();
            *data = SessionData::anonymous();
            had_identity
        };

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }

        if had_identity {
            self.changes.send_replace(None);
        }
    }

    /// Load the persisted session without contacting the backend.
    ///
    /// Returns the restored identity, if any.
    pub(crate) fn restore(&self) -> Option<Identity> {
        let persisted = match self.store.load() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable persisted session");
                return None;
            }
        };

        let Some(credentials) = persisted.credentials else {
            tracing::warn!(
                email = %persisted.identity.email,
                "Ignoring persisted session without credentials"
            );
            return None;
        };

        let identity = persisted.identity;
        {
            let mut data = self.write();
            data.state = SessionState::Authenticated;
            data.credentials = Some(credentials);
            data.identity = Some(identity.clone());
        }
        self.changes.send_replace(Some(identity.clone()));
        Some(identity)
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        // Poisoning only follows a panic elsewhere; the data is still consistent.
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }
}
