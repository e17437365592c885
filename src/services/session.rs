// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager: login, registration, logout and role gating.
//!
//! This is the single source of truth for "who is logged in". It is
//! constructed once and handed to every consumer; there is no global.

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{Credentials, Deal, Identity, Property, Registration, Role};
use crate::session::{LoginRedirect, SessionHandle, SessionState, SessionStore};
use std::sync::Arc;
use tokio::sync::watch;
use validator::Validate;

/// High-level session service over the shared [`SessionHandle`].
#[derive(Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build the session, API client and manager from configuration.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn SessionStore>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let session = SessionHandle::new(store);
        let api = ApiClient::new(config, session, redirect)?;
        Ok(Self::new(api))
    }

    /// The API client sharing this session.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn session(&self) -> &SessionHandle {
        self.api.session()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Restore the persisted session, once, at startup.
    ///
    /// Credentials are not re-validated; the next request fails naturally if
    /// they have gone stale server-side.
    pub fn restore_session(&self) -> Option<Identity> {
        let restored = self.session().restore();
        if let Some(identity) = &restored {
            tracing::info!(email = %identity.email, role = %identity.role, "Session restored");
        }
        restored
    }

    /// Log in with email and password.
    ///
    /// On failure no credential material survives and the session is
    /// `Anonymous`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let credentials = Credentials::new(email, password);
        self.session().begin_authentication();

        match self.api.login(&credentials).await {
            Ok(identity) => {
                if identity.is_degraded() {
                    tracing::warn!(
                        email = %identity.email,
                        role = %identity.role,
                        "Account has no linked {} record",
                        identity.role.as_str().to_lowercase()
                    );
                }
                tracing::info!(email = %identity.email, role = %identity.role, "Logged in");
                self.session().establish(credentials, identity.clone());
                Ok(identity)
            }
            Err(e) => {
                self.session().clear();
                tracing::info!(email, error = %e, "Login failed");
                Err(classify_login_error(e))
            }
        }
    }

    /// Register a new account, then log in with the same credentials.
    pub async fn register(&self, registration: Registration) -> Result<Identity> {
        registration
            .validate()
            .map_err(|e| ClientError::RegistrationRejected(e.to_string()))?;

        match self.api.register(&registration).await {
            Ok(()) => {}
            Err(e @ ClientError::NetworkUnavailable(_)) => return Err(e),
            Err(ClientError::Rejected { message, .. }) => {
                return Err(ClientError::RegistrationRejected(message))
            }
            Err(e) => return Err(ClientError::RegistrationRejected(e.to_string())),
        }

        tracing::info!(email = %registration.email, role = %registration.role, "Registered");
        self.login(&registration.email, &registration.password)
            .await
    }

    /// Clear credentials and identity, in memory and on disk. Never fails.
    pub fn logout(&self) {
        if let Some(identity) = self.session().identity() {
            tracing::info!(email = %identity.email, "Logged out");
        }
        self.session().clear();
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn has_role(&self, role: Role) -> bool {
        self.session().has_role(role)
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.session().identity()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    /// Identity change feed.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.session().subscribe()
    }

    // ─── Role-gated helpers ──────────────────────────────────────────────────

    /// Place an offer as the signed-in customer.
    pub async fn place_offer(&self, property_id: i64, price: f64) -> Result<Deal> {
        let customer_id = self.require_customer()?;
        self.api.create_deal(property_id, customer_id, price).await
    }

    /// The signed-in customer's deal history.
    pub async fn deal_history(&self) -> Result<Vec<Deal>> {
        let customer_id = self.require_customer()?;
        self.api.customer_deals(customer_id).await
    }

    /// The signed-in broker's listings.
    pub async fn my_listings(&self) -> Result<Vec<Property>> {
        let broker_id = self.require_broker()?;
        self.api.broker_properties(broker_id).await
    }

    pub(crate) fn require_customer(&self) -> Result<i64> {
        self.current_identity()
            .and_then(|identity| identity.active_customer_id())
            .ok_or_else(|| ClientError::NotAuthorized("customer login required".into()))
    }

    pub(crate) fn require_broker(&self) -> Result<i64> {
        self.current_identity()
            .and_then(|identity| identity.active_broker_id())
            .ok_or_else(|| ClientError::NotAuthorized("broker login required".into()))
    }
}

/// Map a failed login call onto the login error taxonomy.
fn classify_login_error(err: ClientError) -> ClientError {
    match err {
        ClientError::NetworkUnavailable(_) | ClientError::ServerError(_) => err,
        ClientError::Unauthenticated
        | ClientError::NotAuthorized(_)
        | ClientError::NotFound(_)
        | ClientError::Rejected { .. } => ClientError::InvalidCredentials,
        other => other,
    }
}
