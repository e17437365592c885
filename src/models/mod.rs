// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the marketplace API.

pub mod broker;
pub mod comment;
pub mod deal;
pub mod property;
pub mod user;

pub use broker::{Broker, BrokerContact, BrokerRating};
pub use comment::{CommentAuthor, NewComment, PropertyComment};
pub use deal::Deal;
pub use property::{
    BrokerSummary, ImageUpload, OfferType, Property, PropertyConfig, PropertyDraft, PropertySearch,
};
pub use user::{Credentials, Identity, Registration, Role};
