// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Property listing models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Kind of property on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyConfig {
    Flat,
    Shop,
    Plot,
}

/// Whether a property is for sale or rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OfferType {
    Sell,
    Rent,
}

impl PropertyConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyConfig::Flat => "FLAT",
            PropertyConfig::Shop => "SHOP",
            PropertyConfig::Plot => "PLOT",
        }
    }
}

impl OfferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferType::Sell => "SELL",
            OfferType::Rent => "RENT",
        }
    }
}

impl FromStr for PropertyConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FLAT" => Ok(PropertyConfig::Flat),
            "SHOP" => Ok(PropertyConfig::Shop),
            "PLOT" => Ok(PropertyConfig::Plot),
            _ => Err(format!("invalid config '{}', use FLAT, SHOP or PLOT", s)),
        }
    }
}

impl FromStr for OfferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SELL" => Ok(OfferType::Sell),
            "RENT" => Ok(OfferType::Rent),
            _ => Err(format!("invalid offer '{}', use SELL or RENT", s)),
        }
    }
}

impl fmt::Display for PropertyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broker summary embedded in a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSummary {
    pub bro_id: i64,
    pub bro_name: String,
}

/// A property listing as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub prop_id: i64,
    pub configuration: PropertyConfig,
    pub offer_type: OfferType,
    pub offer_cost: f64,
    pub area_sqft: f64,
    pub address: String,
    #[serde(default)]
    pub street: Option<String>,
    pub city: String,
    /// true = available
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub avg_rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerSummary>,
}

/// Create/update body for a listing.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub configuration: PropertyConfig,
    pub offer_type: OfferType,
    #[validate(range(exclusive_min = 0.0, message = "offer cost must be positive"))]
    pub offer_cost: f64,
    #[validate(range(exclusive_min = 0.0, message = "area must be positive"))]
    pub area_sqft: f64,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
}

/// Search criteria; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PropertyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_only: Option<bool>,
}

/// One image file for a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Guess the content type from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let content_type = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };

        Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        }
    }
}
