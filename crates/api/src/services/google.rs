//! Google sign-in: ID token verification through Google's token-info endpoint.

use serde::Deserialize;
use thiserror::Error;

use casawood_core::Email;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Errors that can occur during Google sign-in.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// `GOOGLE_CLIENT_ID` is not set.
    #[error("Google sign-in is not configured")]
    NotConfigured,

    /// Google rejected the token, or it was issued for someone else.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Google account email is not verified")]
    EmailNotVerified,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    /// Stable Google account id (`sub`).
    pub subject: String,
    pub email: Email,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Token-info response. Google encodes booleans as strings here.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: String,
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens for one OAuth client.
#[derive(Clone)]
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: Option<String>,
}

impl GoogleVerifier {
    #[must_use]
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.client_id.is_some()
    }

    /// Verify a credential returned by Google Identity Services.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::NotConfigured` without a client id, and
    /// `InvalidCredential`/`EmailNotVerified` when Google does not vouch for
    /// the token.
    pub async fn verify(&self, credential: &str) -> Result<GoogleProfile, GoogleAuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(GoogleAuthError::NotConfigured)?;

        let response = self
            .client
            .post(TOKENINFO_URL)
            .form(&[("id_token", credential)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::InvalidCredential(format!(
                "token-info returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response.json().await?;
        profile_from_token_info(info, client_id)
    }
}

fn profile_from_token_info(
    info: TokenInfo,
    client_id: &str,
) -> Result<GoogleProfile, GoogleAuthError> {
    if info.aud != client_id {
        return Err(GoogleAuthError::InvalidCredential(
            "audience mismatch".to_string(),
        ));
    }
    if !GOOGLE_ISSUERS.contains(&info.iss.as_str()) {
        return Err(GoogleAuthError::InvalidCredential(format!(
            "unexpected issuer {}",
            info.iss
        )));
    }

    let verified = match &info.email_verified {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        _ => false,
    };
    if !verified {
        return Err(GoogleAuthError::EmailNotVerified);
    }

    let email = info
        .email
        .as_deref()
        .ok_or_else(|| GoogleAuthError::InvalidCredential("no email claim".to_string()))
        .and_then(|e| {
            Email::parse(e).map_err(|e| GoogleAuthError::InvalidCredential(e.to_string()))
        })?;

    Ok(GoogleProfile {
        subject: info.sub,
        email,
        name: info.name.filter(|n| !n.trim().is_empty()),
        picture: info.picture,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "1234-casawood.apps.googleusercontent.com";

    fn info(json: serde_json::Value) -> TokenInfo {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_valid_token_info() {
        let profile = profile_from_token_info(
            info(serde_json::json!({
                "aud": CLIENT_ID,
                "iss": "https://accounts.google.com",
                "sub": "110169484474386276334",
                "email": "Asha.Rao@gmail.com",
                "email_verified": "true",
                "name": "Asha Rao",
            })),
            CLIENT_ID,
        )
        .unwrap();

        assert_eq!(profile.subject, "110169484474386276334");
        assert_eq!(profile.email.as_str(), "asha.rao@gmail.com");
        assert_eq!(profile.name.as_deref(), Some("Asha Rao"));
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let result = profile_from_token_info(
            info(serde_json::json!({
                "aud": "someone-else.apps.googleusercontent.com",
                "iss": "accounts.google.com",
                "sub": "1",
                "email": "a@b.com",
                "email_verified": true,
            })),
            CLIENT_ID,
        );
        assert!(matches!(result, Err(GoogleAuthError::InvalidCredential(_))));
    }

    #[test]
    fn test_unverified_email_rejected() {
        let result = profile_from_token_info(
            info(serde_json::json!({
                "aud": CLIENT_ID,
                "iss": "accounts.google.com",
                "sub": "1",
                "email": "a@b.com",
                "email_verified": "false",
            })),
            CLIENT_ID,
        );
        assert!(matches!(result, Err(GoogleAuthError::EmailNotVerified)));
    }

    #[tokio::test]
    async fn test_unconfigured_verifier() {
        let verifier = GoogleVerifier::new(None);
        assert!(!verifier.is_configured());
        assert!(matches!(
            verifier.verify("anything").await,
            Err(GoogleAuthError::NotConfigured)
        ));
    }
}
