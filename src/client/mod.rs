// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace REST API client.
//!
//! Handles:
//! - Request signing from the shared session (HTTP Basic)
//! - Refusing to sign anything outside the configured backend base
//! - Global 401 interception (clear session, redirect to login)
//! - Status classification into [`ClientError`]

mod auth;
mod brokers;
mod comments;
mod deals;
mod favorites;
mod properties;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::Credentials;
use crate::session::{LoginRedirect, SessionHandle};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use std::sync::Arc;

/// Marketplace API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    login_path: String,
    session: Arc<SessionHandle>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    /// Create a client bound to `config.api_base` and the given session.
    pub fn new(
        config: &Config,
        session: Arc<SessionHandle>,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::NetworkUnavailable(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base.clone(),
            login_path: config.login_path.clone(),
            session,
            redirect,
        })
    }

    pub fn session(&self) -> &Arc<SessionHandle> {
        &self.session
    }

    /// Backend base without trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Absolute URL for a backend path.
    ///
    /// Only paths under the configured base are accepted, so credentials can
    /// never be attached to a foreign host.
    fn url(&self, path: &str) -> Result<Url> {
        if !path.starts_with('/') || path.starts_with("//") {
            return Err(ClientError::Validation(format!(
                "backend path must be relative to the API base: {}",
                path
            )));
        }

        let url = Url::parse(&format!("{}{}", self.base_url(), path))
            .map_err(|e| ClientError::Validation(format!("bad path {}: {}", path, e)))?;

        if url.origin() != self.base_url.origin() {
            return Err(ClientError::Validation(format!(
                "refusing to send credentials off-origin: {}",
                url
            )));
        }
        Ok(url)
    }

    /// Start a request signed with the session's credentials, if any.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match self.session.authorization_header() {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => builder,
        })
    }

    /// Start a request signed with explicit credentials (login).
    fn request_as(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
    ) -> Result<RequestBuilder> {
        Ok(self
            .http
            .request(method, self.url(path)?)
            .header(AUTHORIZATION, credentials.authorization_header()))
    }

    /// Send a request and check its status.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(error = %e, "Backend request failed");
            ClientError::from_transport(e)
        })?;

        self.check_response(response).await
    }

    /// Send a request and discard the response body.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    /// Send a request and parse the JSON body.
    async fn send_json<T: for<'de> Deserialize<'de>>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ServerError(format!("JSON parse error: {}", e)))
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path)?;
        self.send_json(builder).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), path = %path, "Backend returned error");

        if status.as_u16() == 401 {
            self.handle_unauthorized(&path);
        }

        Err(ClientError::from_status(status, body))
    }

    /// Any 401, from any call, ends the session.
    fn handle_unauthorized(&self, path: &str) {
        tracing::warn!(path, "Backend returned 401, ending session");
        self.session.clear();
        self.redirect.redirect_to_login(&self.login_path);
    }
}

/// Resolve an image URL from a listing to an absolute URL.
///
/// Absolute `http(s)` URLs pass through; backend-relative ones are joined to
/// the base with exactly one slash.
pub fn resolve_image_url(base: &str, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(url.to_string());
    }

    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        Some(format!("{}{}", base, url))
    } else {
        Some(format!("{}/{}", base, url))
    }
}
