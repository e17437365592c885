// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deal (accepted offer) model.

use super::Property;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A completed buy/rent deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub deal_id: i64,
    #[serde(default)]
    pub deal_date: Option<NaiveDate>,
    pub deal_cost: f64,
    #[serde(default)]
    pub property: Option<Property>,
}
