//! Deal (offer) endpoints.

use super::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::Deal;
use reqwest::Method;

impl ApiClient {
    /// Place an offer on a property.
    ///
    /// POST /api/deals?propertyId&customerId&price
    pub async fn create_deal(
        &self,
        property_id: i64,
        customer_id: i64,
        price: f64,
    ) -> Result<Deal> {
        if !(price.is_finite() && price > 0.0) {
            return Err(ClientError::Validation("price must be positive".into()));
        }

        let builder = self.request(Method::POST, "/api/deals")?.query(&[
            ("propertyId", property_id.to_string()),
            ("customerId", customer_id.to_string()),
            ("price", price.to_string()),
        ]);
        self.send_json(builder).await
    }

    /// A customer's deal history.
    pub async fn customer_deals(&self, customer_id: i64) -> Result<Vec<Deal>> {
        self.get_json(&format!("/api/customers/{}/deals", customer_id))
            .await
    }
}
