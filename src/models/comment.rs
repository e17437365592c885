//! Property review comments.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Author of a comment (only the email is exposed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub email: String,
}

/// A review left on a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyComment {
    pub comment_id: i64,
    pub content: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub user: Option<CommentAuthor>,
}

/// Body for posting a new review.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, message = "comment must not be empty"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
}

impl NewComment {
    pub fn new(content: &str, rating: u8) -> Self {
        Self {
            content: content.trim().to_string(),
            rating,
        }
    }
}
