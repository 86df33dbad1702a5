//! Profile routes for the signed-in user.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::instrument;

use casawood_core::Phone;

use crate::db::users::UserRepository;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/users/profile
pub async fn profile(RequireAuth(user): RequireAuth) -> ApiResponse<User> {
    ApiResponse::ok(user)
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Validated profile changes; `None` keeps the stored value.
struct ProfileChanges {
    name: Option<String>,
    phone: Option<Phone>,
    avatar: Option<String>,
}

impl ProfileUpdate {
    fn validate(self) -> std::result::Result<ProfileChanges, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.map(|n| n.trim().to_string());
        match name.as_deref() {
            Some("") => errors.push(FieldError::new("name", "Name cannot be empty")),
            Some(n) if n.chars().count() > 50 => {
                errors.push(FieldError::new("name", "Name cannot exceed 50 characters"));
            }
            _ => {}
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

        let avatar = self
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        if errors.is_empty() {
            Ok(ProfileChanges { name, phone, avatar })
        } else {
            Err(errors)
        }
    }
}

/// PUT /api/users/profile
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<ApiResponse<User>> {
    let Json(body) = body?;
    let changes = body.validate().map_err(AppError::Validation)?;

    let user = UserRepository::new(state.pool())
        .update_profile(
            user.id,
            changes.name.as_deref(),
            changes.phone.as_ref(),
            changes.avatar.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(user).with_message("Profile updated"))
}
