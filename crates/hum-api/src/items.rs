//! Handlers for the item collections, mounted once per [`ItemKind`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/posts`, `/articles` | `?sort=newest\|oldest\|most_votes\|controversial`, `category`, `limit`, `offset` |
//! | `POST` | `/posts`, `/articles` | Body: [`CreateBody`]; returns 201 + item |
//! | `GET`  | `/posts/:id`, `/articles/:id` | 404 if not found |

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use hum_core::{
  item::{ContentItem, ItemDetails, ItemKind, ItemRef, NewItem, SortKey},
  store::{CommunityStore, ItemQuery},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  auth::AuthUser,
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  #[serde(default)]
  pub sort:     SortKey,
  pub category: Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /{collection}[?sort=...][&category=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Extension(kind): Extension<ItemKind>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<ContentItem>>, ApiError>
where
  S: CommunityStore,
{
  let query = ItemQuery {
    kind,
    sort: params.sort,
    category: params.category,
    limit: params.limit,
    offset: params.offset,
  };
  let items = store.list_items(&query).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /posts` and `POST /articles`.
///
/// `authors` is required for articles; `authors` and `source_url` are ignored
/// for posts, whose author is always the caller.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:      String,
  pub content:    String,
  pub category:   String,
  pub image_url:  Option<String>,
  pub authors:    Option<String>,
  pub source_url: Option<String>,
}

impl CreateBody {
  fn into_new_item(self, kind: ItemKind, caller: Uuid) -> Result<NewItem, ApiError> {
    let details = match kind {
      ItemKind::Post => ItemDetails::Post { author_id: Some(caller) },
      ItemKind::Article => ItemDetails::Article {
        authors:    self
          .authors
          .filter(|a| !a.trim().is_empty())
          .ok_or_else(|| ApiError::BadRequest("articles need `authors`".into()))?,
        source_url: self.source_url,
      },
    };
    Ok(NewItem {
      title: self.title,
      content: self.content,
      category: self.category,
      image_url: self.image_url,
      details,
    })
  }
}

/// `POST /{collection}`, returns 201 + the stored [`ContentItem`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  AuthUser(user): AuthUser,
  Extension(kind): Extension<ItemKind>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommunityStore + 'static,
{
  let input = body.into_new_item(kind, user.user_id)?;
  let item = store.create_item(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{collection}/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Extension(kind): Extension<ItemKind>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<ContentItem>, ApiError>
where
  S: CommunityStore,
{
  let item_ref = ItemRef { kind, item_id: id };
  let item = store
    .get_item(item_ref)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{item_ref} not found")))?;
  Ok(Json(item))
}
