use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Body for register and login; fields are optional so that missing ones
/// answer 400 with a message instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of a user; the password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub rol: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            rol: u.rol,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_tolerate_missing_fields() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.com"));
        assert!(req.password.is_none());

        let req: CredentialsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_none());
    }

    #[test]
    fn login_response_serializes_token_and_user() {
        let resp = LoginResponse {
            message: "ok".into(),
            user: PublicUser {
                id: 3,
                email: "a@b.com".into(),
                rol: "admin".into(),
            },
            token: "ey.token".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("ey.token"));
        assert!(json.contains("\"rol\":\"admin\""));
    }
}
