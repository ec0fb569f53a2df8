//! Endpoint handler modules plus the small validation helpers they share.

pub mod admin;
pub mod patient;
pub mod payment;
pub mod practitioner;

use std::sync::OnceLock;

use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::avatars::AvatarStore;

/// Response for every login/registration endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Uploaded image: filename plus base64 payload (bare or `data:` URL).
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarUpload {
    pub name: String,
    pub data: String,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex")
    })
}

/// Registration credential policy shared by patient sign-up and admin
/// practitioner onboarding.
pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !email_regex().is_match(email) {
        return Err(ApiError::BadRequest("Please enter a valid email".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::BadRequest("Please enter a strong password".into()));
    }
    Ok(())
}

/// Decode an uploaded avatar and hand it to the blob store.
pub(crate) fn store_avatar(
    store: &AvatarStore,
    upload: &AvatarUpload,
) -> Result<String, ApiError> {
    let payload = upload
        .data
        .rsplit_once("base64,")
        .map(|(_, data)| data)
        .unwrap_or(&upload.data);
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::BadRequest("Invalid image encoding".into()))?;
    Ok(store.store(&bytes, &upload.name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_policy() {
        assert!(validate_credentials("ana@example.com", "longenough").is_ok());
        assert!(validate_credentials("not-an-email", "longenough").is_err());
        assert!(validate_credentials("a@b", "longenough").is_err());
    }

    #[test]
    fn password_policy() {
        assert!(validate_credentials("ana@example.com", "short").is_err());
        assert!(validate_credentials("ana@example.com", "12345678").is_ok());
    }

    #[test]
    fn avatar_accepts_bare_and_data_url_base64() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::open(dir.path()).unwrap();

        let bare = AvatarUpload {
            name: "a.png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(b"img"),
        };
        assert!(store_avatar(&store, &bare).is_ok());

        let data_url = AvatarUpload {
            name: "b.png".into(),
            data: format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(b"img")
            ),
        };
        assert!(store_avatar(&store, &data_url).is_ok());

        let garbage = AvatarUpload {
            name: "c.png".into(),
            data: "!!not base64!!".into(),
        };
        assert!(store_avatar(&store, &garbage).is_err());
    }
}
