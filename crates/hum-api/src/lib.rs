//! JSON REST API for Hum.
//!
//! Exposes an axum [`Router`] backed by any [`hum_core::store::CommunityStore`].
//! Posts and articles are served by the same handlers; each collection is
//! mounted with its [`ItemKind`] as a request extension. TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hum_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod items;
pub mod users;
pub mod votes;

use std::sync::Arc;

use axum::{
  Extension, Router,
  routing::{get, post},
};
use hum_core::{item::ItemKind, store::CommunityStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CommunityStore + 'static,
{
  let mut router = Router::new()
    .route("/users", post(users::register::<S>))
    .route("/users/me", get(users::me));

  for kind in ItemKind::ALL {
    router = router.nest(&format!("/{}", kind.collection()), collection_router::<S>(kind));
  }

  router.with_state(store)
}

/// Routes for one item collection.
fn collection_router<S>(kind: ItemKind) -> Router<Arc<S>>
where
  S: CommunityStore + 'static,
{
  Router::new()
    .route("/", get(items::list::<S>).post(items::create::<S>))
    .route("/{id}", get(items::get_one::<S>))
    .route("/{id}/vote", get(votes::get::<S>).post(votes::cast::<S>))
    .layer(Extension(kind))
}
