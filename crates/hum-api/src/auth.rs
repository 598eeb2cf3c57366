//! HTTP Basic-auth extractor resolving the calling member.
//!
//! Credentials are `email:password`; the password is verified against the
//! argon2 PHC string stored with the user. Handlers receive the resolved
//! [`User`] and pass its id explicitly into the store.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use hum_core::{store::CommunityStore, user::User};
use rand_core::OsRng;

use crate::error::ApiError;

/// Present in a handler's arguments means the request was authenticated.
pub struct AuthUser(pub User);

/// Produce the argon2 PHC string for a new password.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Verify Basic credentials against the store.
pub async fn authenticate<S>(headers: &HeaderMap, store: &S) -> Result<User, ApiError>
where
  S: CommunityStore,
{
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let user = store
    .find_user_by_email(email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&user.password_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(user)
}

impl<S> FromRequestParts<Arc<S>> for AuthUser
where
  S: CommunityStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    store: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = authenticate(&parts.headers, store.as_ref()).await?;
    Ok(AuthUser(user))
  }
}
