//! Broker directory models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Contact details of the account behind a broker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerContact {
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// A broker as listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub bro_id: i64,
    pub bro_name: String,
    #[serde(default)]
    pub user: Option<BrokerContact>,
    #[serde(default)]
    pub avg_rating: f64,
    #[serde(default)]
    pub rating_count: u32,
}

/// A customer's rating of a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerRating {
    #[serde(default)]
    pub id: Option<i64>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
