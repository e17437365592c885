//! Identity and credential models.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Account role, gating which operations are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Broker,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Broker => "BROKER",
            Role::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in principal, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    /// Case-sensitive, as stored by the backend
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Linked broker record (BROKER accounts)
    #[serde(default)]
    pub broker_id: Option<i64>,
    /// Linked customer record (CUSTOMER accounts)
    #[serde(default)]
    pub customer_id: Option<i64>,
}

impl Identity {
    /// Customer id if this is a CUSTOMER with a linked customer record.
    pub fn active_customer_id(&self) -> Option<i64> {
        match self.role {
            Role::Customer => self.customer_id,
            Role::Broker => None,
        }
    }

    /// Broker id if this is a BROKER with a linked broker record.
    pub fn active_broker_id(&self) -> Option<i64> {
        match self.role {
            Role::Broker => self.broker_id,
            Role::Customer => None,
        }
    }

    /// True when the role's linked record is missing.
    ///
    /// The account is still usable for public browsing; role-gated calls
    /// fail with `NotAuthorized`.
    pub fn is_degraded(&self) -> bool {
        match self.role {
            Role::Broker => self.broker_id.is_none(),
            Role::Customer => self.customer_id.is_none(),
        }
    }
}

/// Email/password pair used to sign each backend request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Value for the `Authorization` header (HTTP Basic).
    pub fn authorization_header(&self) -> String {
        let token = BASE64.encode(format!("{}:{}", self.email, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form for either role.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    pub role: Role,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 4, message = "password must be at least 4 characters"))]
    pub password: String,
    pub city: Option<String>,
    pub mobile: Option<String>,
}

impl Registration {
    /// Endpoint path for this role's registration.
    pub fn endpoint(&self) -> &'static str {
        match self.role {
            Role::Broker => "/api/auth/register/broker",
            Role::Customer => "/api/auth/register/customer",
        }
    }

    /// Request body; the display-name field differs per role.
    pub fn body(&self) -> serde_json::Value {
        let name_field = match self.role {
            Role::Broker => "brokerName",
            Role::Customer => "customerName",
        };

        serde_json::json!({
            name_field: self.name.trim(),
            "email": self.email,
            "password": self.password,
            "city": self.city,
            "mobile": self.mobile,
        })
    }
}
