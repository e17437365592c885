//! Customer favorites endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::Property;
use reqwest::Method;

impl ApiClient {
    /// The customer's favorited properties.
    pub async fn favorite_properties(&self, customer_id: i64) -> Result<Vec<Property>> {
        self.get_json(&format!("/api/customers/{}/properties", customer_id))
            .await
    }

    pub async fn add_favorite(&self, customer_id: i64, property_id: i64) -> Result<()> {
        let builder = self.request(
            Method::POST,
            &format!("/api/customers/{}/favorites/{}", customer_id, property_id),
        )?;
        self.send_empty(builder).await
    }

    pub async fn remove_favorite(&self, customer_id: i64, property_id: i64) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &format!("/api/customers/{}/favorites/{}", customer_id, property_id),
        )?;
        self.send_empty(builder).await
    }
}
