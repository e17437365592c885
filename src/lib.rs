// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Realty client: session-aware access to the real-estate marketplace API.
//!
//! This crate provides the session manager (login, registration, logout,
//! request signing, 401 handling), the favorites synchronizer, and typed
//! wrappers for the property, broker, deal and review endpoints.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use client::{resolve_image_url, ApiClient};
pub use config::Config;
pub use error::{ClientError, Result};
pub use services::{FavoritesSynchronizer, SessionManager};
pub use session::{SessionHandle, SessionState};
