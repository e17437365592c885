//! Broker directory endpoints.

use super::ApiClient;
use crate::error::{ClientError, Result};
use crate::models::{Broker, BrokerRating};
use reqwest::Method;

impl ApiClient {
    pub async fn list_brokers(&self) -> Result<Vec<Broker>> {
        self.get_json("/api/brokers").await
    }

    pub async fn get_broker(&self, broker_id: i64) -> Result<Broker> {
        self.get_json(&format!("/api/brokers/{}", broker_id)).await
    }

    /// Brokers ordered by average rating, best first.
    pub async fn top_rated_brokers(&self) -> Result<Vec<Broker>> {
        self.get_json("/api/brokers/top-rated").await
    }

    pub async fn broker_ratings(&self, broker_id: i64) -> Result<Vec<BrokerRating>> {
        self.get_json(&format!("/api/brokers/{}/ratings", broker_id))
            .await
    }

    /// Rate a broker (1-5). Requires a CUSTOMER session.
    pub async fn rate_broker(
        &self,
        broker_id: i64,
        rating: u8,
        comment: &str,
    ) -> Result<BrokerRating> {
        if !(1..=5).contains(&rating) {
            return Err(ClientError::Validation(
                "rating must be between 1 and 5".into(),
            ));
        }

        let builder = self
            .request(Method::POST, &format!("/api/brokers/{}/ratings", broker_id))?
            .json(&serde_json::json!({ "rating": rating, "comment": comment }));
        self.send_json(builder).await
    }
}
