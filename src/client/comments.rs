//! Property review endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::{NewComment, PropertyComment};
use reqwest::Method;
use validator::Validate;

impl ApiClient {
    /// Reviews for a property, newest first.
    pub async fn property_comments(&self, property_id: i64) -> Result<Vec<PropertyComment>> {
        self.get_json(&format!("/api/properties/{}/comments", property_id))
            .await
    }

    /// Post a review. Requires a signed-in session.
    pub async fn add_comment(
        &self,
        property_id: i64,
        comment: &NewComment,
    ) -> Result<PropertyComment> {
        comment.validate()?;

        let builder = self
            .request(
                Method::POST,
                &format!("/api/properties/{}/comments", property_id),
            )?
            .json(comment);
        self.send_json(builder).await
    }
}
