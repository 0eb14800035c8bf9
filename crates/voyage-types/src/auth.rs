use serde::{Deserialize, Serialize};

/// Opaque bearer credential. Validity is decided by the backend only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Customer,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Customer
    }
}

/// Snapshot of the signed-in user as returned by `/user/profile`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: SessionToken,
    pub user: AuthUser,
}

/// Error payload shape used by the REST backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ErrorBody {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            error: Some(text.into()),
            ..Self::default()
        }
    }

    /// First non-empty of `message`, `error`, `msg`.
    pub fn best_message(&self) -> Option<&str> {
        [&self.message, &self.error, &self.msg]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_message_prefers_message_then_error() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"bad token","message":"  "}"#).unwrap();
        assert_eq!(body.best_message(), Some("bad token"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"msg":"later","message":"Booking not found"}"#).unwrap();
        assert_eq!(body.best_message(), Some("Booking not found"));
    }

    #[test]
    fn user_role_defaults_to_customer() {
        let user: AuthUser =
            serde_json::from_str(r#"{"id":"u1","name":"Ada","email":"ada@example.com"}"#)
                .unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert!(!user.is_admin());
    }
}
