//! Account registration and sign-in.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::instrument;

use casawood_core::{Email, Phone};

use crate::error::{AppError, FieldError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::{AuthService, AuthSession, MIN_PASSWORD_LENGTH};
use crate::services::google::GoogleAuthError;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Fields of a valid registration.
struct Registration {
    name: String,
    email: Email,
    phone: Option<Phone>,
}

impl RegisterRequest {
    fn validate(&self) -> std::result::Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(FieldError::new(
                "name",
                format!("Name cannot exceed {MAX_NAME_LENGTH} characters"),
            ));
        }

        let email = Email::parse(&self.email)
            .map_err(|_| errors.push(FieldError::new("email", "Please provide a valid email")))
            .ok();

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        let phone = match self.phone.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Phone::parse(raw)
                .map_err(|_| {
                    errors.push(FieldError::new(
                        "phone",
                        "Please provide a valid 10-digit phone number",
                    ));
                })
                .ok(),
            _ => None,
        };

        match email {
            Some(email) if errors.is_empty() => Ok(Registration {
                name: name.to_string(),
                email,
                phone,
            }),
            _ => Err(errors),
        }
    }
}

/// Create an account.
///
/// POST /api/auth/register
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthSession>> {
    let Json(body) = body?;
    let registration = body.validate().map_err(AppError::Validation)?;

    let session = AuthService::new(state.pool(), &state.config().jwt)
        .register_with_password(
            &registration.name,
            &registration.email,
            &body.password,
            registration.phone.as_ref(),
        )
        .await?;

    tracing::info!(user_id = %session.user.id, "User registered");
    Ok(ApiResponse::created(session).with_message("Registration successful"))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Password sign-in.
///
/// POST /api/auth/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthSession>> {
    let Json(body) = body?;
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }

    let session = AuthService::new(state.pool(), &state.config().jwt)
        .login_with_password(&body.email, &body.password)
        .await?;

    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

#[derive(Debug, Deserialize)]
pub struct GoogleRequest {
    #[serde(default)]
    pub credential: String,
}

/// Sign in with a Google Identity Services credential.
///
/// POST /api/auth/google
#[instrument(skip(state, body))]
pub async fn google(
    State(state): State<AppState>,
    body: std::result::Result<Json<GoogleRequest>, JsonRejection>,
) -> Result<ApiResponse<AuthSession>> {
    let Json(body) = body?;
    if !state.google().is_configured() {
        return Err(GoogleAuthError::NotConfigured.into());
    }
    if body.credential.trim().is_empty() {
        return Err(AppError::BadRequest("Google credential is required".to_string()));
    }

    let profile = state.google().verify(body.credential.trim()).await?;
    let session = AuthService::new(state.pool(), &state.config().jwt)
        .sign_in_with_google(&profile)
        .await?;

    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

/// The signed-in user.
///
/// GET /api/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> ApiResponse<User> {
    ApiResponse::ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str, phone: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: phone.map(String::from),
        }
    }

    #[test]
    fn test_valid_registration_normalises_fields() {
        let registration = request("  Meera Iyer ", "Meera@Example.IN", "s3cure-pass", Some("098450 12345"))
            .validate()
            .unwrap();
        assert_eq!(registration.name, "Meera Iyer");
        assert_eq!(registration.email.as_str(), "meera@example.in");
        assert_eq!(registration.phone.unwrap().as_str(), "9845012345");
    }

    #[test]
    fn test_blank_phone_is_ignored() {
        let registration = request("Meera", "meera@example.in", "s3cure-pass", Some("  "))
            .validate()
            .unwrap();
        assert!(registration.phone.is_none());
    }

    #[test]
    fn test_bad_phone_is_reported() {
        let errors = request("Meera", "meera@example.in", "s3cure-pass", Some("12345"))
            .validate()
            .err()
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "phone");
    }

    #[test]
    fn test_long_name_is_rejected() {
        let errors = request(&"x".repeat(51), "meera@example.in", "s3cure-pass", None)
            .validate()
            .err()
            .unwrap();
        assert_eq!(errors.first().unwrap().field, "name");
    }
}
