//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server errors are captured to
//! Sentry before the JSON error envelope is sent:
//!
//! ```json
//! { "success": false, "message": "...", "errors": [{ "field": "...", "message": "..." }] }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::google::GoogleAuthError;
use crate::services::payment::PaymentError;

static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Include the underlying error text in 500 responses.
///
/// Called once at startup in development mode.
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

/// One failed field in a validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Google sign-in failed.
    #[error("Google sign-in error: {0}")]
    Google(#[from] GoogleAuthError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Order placement was refused.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// One or more request fields are invalid.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl AppError {
    /// Single-field validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenEncoding => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Google(err) => match err {
                GoogleAuthError::NotConfigured => StatusCode::BAD_REQUEST,
                GoogleAuthError::InvalidCredential(_) | GoogleAuthError::EmailNotVerified => {
                    StatusCode::UNAUTHORIZED
                }
                GoogleAuthError::Http(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Payment(err) => match err {
                PaymentError::InvalidSignature | PaymentError::OrderMismatch => {
                    StatusCode::BAD_REQUEST
                }
                PaymentError::AmountOutOfRange => StatusCode::INTERNAL_SERVER_ERROR,
                PaymentError::Http(_) | PaymentError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart
                | CheckoutError::OutOfStock(_)
                | CheckoutError::AmountMismatch { .. } => StatusCode::BAD_REQUEST,
                CheckoutError::AddressNotFound | CheckoutError::Repository(RepositoryError::NotFound) => {
                    StatusCode::NOT_FOUND
                }
                CheckoutError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                CheckoutError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server errors never leak internals unless
    /// [`expose_internal_details`] was enabled.
    fn public_message(&self, status: StatusCode) -> String {
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return if EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed) {
                format!("Internal server error: {self}")
            } else {
                "Internal server error".to_string()
            };
        }

        match self {
            Self::Database(RepositoryError::NotFound)
            | Self::Checkout(CheckoutError::Repository(RepositoryError::NotFound)) => {
                "Resource not found".to_string()
            }
            Self::Database(RepositoryError::Conflict(msg))
            | Self::Checkout(CheckoutError::Repository(RepositoryError::Conflict(msg)))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::InvalidToken | AuthError::UserNotFound => {
                    "Not authorized, token failed".to_string()
                }
                AuthError::TokenExpired => "Session expired, please log in again".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Google(GoogleAuthError::NotConfigured) => {
                "Google sign-in is not configured".to_string()
            }
            Self::Google(GoogleAuthError::EmailNotVerified) => {
                "Google account email is not verified".to_string()
            }
            Self::Google(_) => "Invalid Google credential".to_string(),
            Self::Payment(PaymentError::InvalidSignature) => "Invalid payment signature".to_string(),
            Self::Payment(PaymentError::OrderMismatch) => {
                "Payment does not match this checkout".to_string()
            }
            Self::Payment(_) => "Payment gateway error".to_string(),
            Self::Checkout(CheckoutError::EmptyCart) => "Cart is empty".to_string(),
            Self::Checkout(CheckoutError::AddressNotFound) => "Address not found".to_string(),
            Self::Checkout(err @ CheckoutError::OutOfStock(_)) => err.to_string(),
            Self::Checkout(CheckoutError::AmountMismatch { .. }) => {
                "Paid amount does not match the order total".to_string()
            }
            Self::Validation(_) => "Validation failed".to_string(),
            Self::RateLimited => "Too many requests, please try again later".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server and upstream errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let message = self.public_message(status);
        let errors = match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(get_status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Payment(PaymentError::InvalidSignature)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::AddressNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_validation_envelope_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("email", "Please provide a valid email"),
            FieldError::new("password", "Password must be at least 6 characters"),
        ]);
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
        assert_eq!(json["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_not_found_envelope_has_no_errors_key() {
        let (status, json) = body_json(AppError::NotFound("Order not found".into())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Order not found");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_message() {
        let (_, json) = body_json(AppError::Internal("connection reset by peer".into())).await;
        let message = json["message"].as_str().unwrap();
        assert!(message.starts_with("Internal server error"));
    }

    #[tokio::test]
    async fn test_empty_cart_message() {
        let (status, json) = body_json(AppError::Checkout(CheckoutError::EmptyCart)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Cart is empty");
    }

    #[tokio::test]
    async fn test_payment_mismatches_are_400() {
        let err = AppError::Checkout(CheckoutError::AmountMismatch {
            paid: 100_000,
            due: Some(9_050_000),
        });
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Paid amount does not match the order total");

        let (status, json) = body_json(AppError::Payment(PaymentError::OrderMismatch)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Payment does not match this checkout");
    }

    #[tokio::test]
    async fn test_invalid_signature_message() {
        let (status, json) = body_json(AppError::Payment(PaymentError::InvalidSignature)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid payment signature");
    }
}
