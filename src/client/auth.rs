//! Login and registration endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::{Credentials, Identity, Registration};
use reqwest::Method;

impl ApiClient {
    /// Exchange credentials for the account profile.
    ///
    /// POST /api/users/login?email&password, signed with the same credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let builder = self
            .request_as(Method::POST, "/api/users/login", credentials)?
            .query(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ]);

        self.send_json(builder).await
    }

    /// Create a BROKER or CUSTOMER account. Sent unauthenticated.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let builder = self
            .http
            .post(self.url(registration.endpoint())?)
            .json(&registration.body());

        self.send_empty(builder).await
    }
}
