// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and favorites logic over the API client.

pub mod favorites;
pub mod session;

pub use favorites::FavoritesSynchronizer;
pub use session::SessionManager;
