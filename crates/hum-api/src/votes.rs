//! Handlers for `/{collection}/:id/vote`.
//!
//! `POST` applies the caller's vote and answers with the counters as
//! persisted. A client that lost a `POST` response should `GET` the vote
//! before sending another, since repeating a direction toggles it off.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use hum_core::{
  item::{ItemKind, ItemRef},
  store::CommunityStore,
  vote::{VoteDirection, VoteOutcome},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  auth::AuthUser,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteBody {
  pub direction: VoteDirection,
}

/// The caller's current vote; `direction` is `null` when there is none.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentVote {
  pub direction: Option<VoteDirection>,
}

/// `GET /{collection}/:id/vote`
pub async fn get<S>(
  State(store): State<Arc<S>>,
  AuthUser(user): AuthUser,
  Extension(kind): Extension<ItemKind>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<CurrentVote>, ApiError>
where
  S: CommunityStore + 'static,
{
  let direction = store
    .get_vote(user.user_id, ItemRef { kind, item_id: id })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(CurrentVote { direction }))
}

/// `POST /{collection}/:id/vote`, body: `{"direction":"up"|"down"}`
pub async fn cast<S>(
  State(store): State<Arc<S>>,
  AuthUser(user): AuthUser,
  Extension(kind): Extension<ItemKind>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<VoteBody>,
) -> Result<Json<VoteOutcome>, ApiError>
where
  S: CommunityStore + 'static,
{
  let outcome = store
    .cast_vote(user.user_id, ItemRef { kind, item_id: id }, body.direction)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}
