// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites synchronizer: the active customer's favorite property ids.
//!
//! The local set is authoritative for reads and is only mutated after the
//! backend accepted the change. It is tagged with the customer it was loaded
//! for, so ids never leak from one customer to the next.

use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::Identity;
use crate::services::SessionManager;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{watch, Mutex};

/// Per-property mutex serializing toggles on the same id.
pub type ToggleLocks = Arc<DashMap<i64, Arc<Mutex<()>>>>;

#[derive(Debug, Default)]
struct FavoriteSet {
    /// Customer the ids were loaded for
    owner: Option<i64>,
    ids: HashSet<i64>,
}

/// Local favorite set kept in line with the backend.
pub struct FavoritesSynchronizer {
    api: ApiClient,
    set: RwLock<FavoriteSet>,
    toggle_locks: ToggleLocks,
}

impl FavoritesSynchronizer {
    pub fn new(session: &SessionManager) -> Self {
        Self {
            api: session.api().clone(),
            set: RwLock::new(FavoriteSet::default()),
            toggle_locks: Arc::new(DashMap::new()),
        }
    }

    fn active_customer(&self) -> Option<i64> {
        self.api
            .session()
            .identity()
            .and_then(|identity| identity.active_customer_id())
    }

    /// Replace the local set with the backend's favorites.
    ///
    /// No-op returning 0 unless a customer is signed in. A response that
    /// arrives after the identity changed is discarded.
    pub async fn load(&self) -> Result<usize> {
        let Some(customer_id) = self.active_customer() else {
            self.clear();
            return Ok(0);
        };

        let properties = self.api.favorite_properties(customer_id).await?;
        let ids: HashSet<i64> = properties.iter().map(|p| p.prop_id).collect();

        if self.active_customer() != Some(customer_id) {
            tracing::debug!(customer_id, "Identity changed during load, discarding favorites");
            return Ok(0);
        }

        let count = ids.len();
        *self.write() = FavoriteSet {
            owner: Some(customer_id),
            ids,
        };
        tracing::debug!(customer_id, count, "Favorites loaded");
        Ok(count)
    }

    /// Local membership check; never touches the network.
    pub fn is_favorite(&self, property_id: i64) -> bool {
        let active = self.active_customer();
        let set = self.read();
        active.is_some() && set.owner == active && set.ids.contains(&property_id)
    }

    /// Sorted snapshot of the active customer's favorites.
    pub fn favorites(&self) -> Vec<i64> {
        let active = self.active_customer();
        let set = self.read();
        if active.is_none() || set.owner != active {
            return Vec::new();
        }
        let mut ids: Vec<i64> = set.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Move a property toward `desired` (or flip it when `None`).
    ///
    /// Issues at most one add/remove request and updates the local set only
    /// after it succeeds. Returns the resulting membership. If the set has
    /// not been loaded for this customer yet it is left alone; the next
    /// load picks the change up from the backend.
    pub async fn toggle(&self, property_id: i64, desired: Option<bool>) -> Result<bool> {
        let customer_id = self.active_customer().ok_or_else(|| {
            ClientError::NotAuthorized("log in as a customer to manage favorites".into())
        })?;

        let lock = self
            .toggle_locks
            .entry(property_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.toggle_locked(customer_id, property_id, desired).await
        };

        // Only the map and this call hold the lock: nobody else is waiting.
        self.toggle_locks
            .remove_if(&property_id, |_, entry| Arc::strong_count(entry) == 2);

        result
    }

    async fn toggle_locked(
        &self,
        customer_id: i64,
        property_id: i64,
        desired: Option<bool>,
    ) -> Result<bool> {
        // Another toggle may have finished, or the session moved on, while
        // we waited.
        if self.active_customer() != Some(customer_id) {
            return Err(ClientError::NotAuthorized(
                "session changed while toggling favorite".into(),
            ));
        }

        let current = self.is_favorite(property_id);
        let target = desired.unwrap_or(!current);
        if target == current {
            return Ok(current);
        }

        if target {
            self.api.add_favorite(customer_id, property_id).await?;
        } else {
            self.api.remove_favorite(customer_id, property_id).await?;
        }

        let mut set = self.write();
        if set.owner == Some(customer_id) {
            if target {
                set.ids.insert(property_id);
            } else {
                set.ids.remove(&property_id);
            }
        }
        tracing::debug!(customer_id, property_id, favorite = target, "Favorite toggled");

        Ok(target)
    }

    /// Bring the set in line with the active identity.
    ///
    /// A different customer gets a fresh load; no customer clears the set.
    pub async fn reconcile(&self) -> Result<()> {
        let active = self.active_customer();
        let owner = self.read().owner;

        match active {
            None => {
                if owner.is_some() {
                    self.clear();
                }
                Ok(())
            }
            Some(customer_id) if owner == Some(customer_id) => Ok(()),
            Some(_) => {
                self.clear();
                self.load().await.map(|_| ())
            }
        }
    }

    /// Reconcile on every identity change until the session goes away.
    ///
    /// Load failures are logged and the loop keeps following.
    pub async fn follow(&self, mut changes: watch::Receiver<Option<Identity>>) {
        loop {
            changes.borrow_and_update();
            if let Err(e) = self.reconcile().await {
                tracing::warn!(error = %e, "Failed to reload favorites");
            }
            if changes.changed().await.is_err() {
                break;
            }
        }
    }

    /// Discard the local set.
    pub fn clear(&self) {
        *self.write() = FavoriteSet::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, FavoriteSet> {
        self.set.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FavoriteSet> {
        self.set.write().unwrap_or_else(|e| e.into_inner())
    }
}
