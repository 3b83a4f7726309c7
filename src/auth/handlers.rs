use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, PublicUser, RegisterResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required_credentials(payload: CredentialsRequest) -> Result<(String, String), ApiError> {
    let email = payload
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    let password = payload.password.filter(|p| !p.is_empty());
    match (email, password) {
        (Some(e), Some(p)) => Ok((e, p)),
        _ => Err(ApiError::Validation(
            "Email and password are required".into(),
        )),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (email, password) = required_credentials(payload)?;

    if !is_valid_email(&email) {
        warn!(%email, "register with invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let hash = hash_password(&password)?;
    // the unique constraint answers the duplicate case, no pre-check
    let user = User::create(&state.db, &email, &hash).await?;

    info!(user_id = user.id, %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Administrator account created, you can log in now".into(),
            user: PublicUser::from(user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = required_credentials(payload)?;

    // unknown email and wrong password answer identically
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(%email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, &user.rol)?;

    info!(user_id = user.id, %user.email, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user: PublicUser::from(user),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("admin@bodega.pe"));
        assert!(is_valid_email("a.b+c@dominio.com.pe"));
        assert!(!is_valid_email("sin-arroba"));
        assert!(!is_valid_email("dos@@arrobas.com"));
        assert!(!is_valid_email("espacio @dominio.com"));
    }

    #[test]
    fn missing_fields_are_rejected() {
        let err = required_credentials(CredentialsRequest {
            email: Some("a@b.com".into()),
            password: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = required_credentials(CredentialsRequest {
            email: None,
            password: Some("pw".into()),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn email_is_normalized() {
        let (email, _) = required_credentials(CredentialsRequest {
            email: Some("  Admin@Bodega.PE ".into()),
            password: Some("pw1".into()),
        })
        .unwrap();
        assert_eq!(email, "admin@bodega.pe");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let err = required_credentials(CredentialsRequest {
            email: Some("".into()),
            password: Some("pw".into()),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
