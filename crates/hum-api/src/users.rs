//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`RegisterBody`]; returns 201 + user. No auth. |
//! | `GET`  | `/users/me` | The authenticated caller |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use hum_core::{
  store::CommunityStore,
  user::{NewUser, User},
};
use serde::Deserialize;

use crate::{
  auth::{AuthUser, hash_password},
  error::ApiError,
  extract::JsonBody,
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:        String,
  pub display_name: String,
  pub password:     String,
}

/// `POST /users`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommunityStore,
{
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  let user = store
    .add_user(NewUser {
      email:         body.email,
      display_name:  body.display_name,
      password_hash: hash_password(&body.password)?,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/me`
pub async fn me(AuthUser(user): AuthUser) -> Json<User> { Json(user) }
