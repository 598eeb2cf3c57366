//! The `CommunityStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `hum-store-sqlite`).
//! Higher layers (`hum-api`, `hum-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::Classify,
  item::{ContentItem, ItemKind, ItemRef, NewItem, SortKey},
  user::{NewUser, User},
  vote::{VoteDirection, VoteOutcome},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`CommunityStore::list_items`].
#[derive(Debug, Clone)]
pub struct ItemQuery {
  pub kind:     ItemKind,
  pub sort:     SortKey,
  /// Exact category match, e.g. `"Tips"` or `"Treatment"`.
  pub category: Option<String>,
  /// Defaults to 100.
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

impl ItemQuery {
  pub fn new(kind: ItemKind) -> Self {
    Self { kind, sort: SortKey::default(), category: None, limit: None, offset: None }
  }

  pub fn sorted(mut self, sort: SortKey) -> Self {
    self.sort = sort;
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Hum community store backend.
///
/// The vote ledger is the only writer of item counters: `cast_vote` applies
/// the vote row change and the counter change as one atomic unit and returns
/// the counters as persisted.
///
/// Callers always pass the acting user explicitly; a backend never consults
/// any ambient session.
pub trait CommunityStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a new user. Fails if the email is already taken.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup used by authentication.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Persist a new item with zeroed counters.
  fn create_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<ContentItem, Self::Error>> + Send + '_;

  /// Retrieve an item. Returns `None` if no item of that kind has the id.
  fn get_item(
    &self,
    item: ItemRef,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  fn list_items<'a>(
    &'a self,
    query: &'a ItemQuery,
  ) -> impl Future<Output = Result<Vec<ContentItem>, Self::Error>> + Send + 'a;

  fn count_items(
    &self,
    kind: ItemKind,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Apply `direction` for `user_id` on `item` following
  /// [`VoteTransition`](crate::vote::VoteTransition) and return the
  /// resulting state.
  ///
  /// Casting the same direction twice toggles the vote off. A caller that
  /// lost the response of an earlier call should reconcile with
  /// [`get_vote`](Self::get_vote) rather than retry blindly.
  fn cast_vote(
    &self,
    user_id: Uuid,
    item: ItemRef,
    direction: VoteDirection,
  ) -> impl Future<Output = Result<VoteOutcome, Self::Error>> + Send + '_;

  /// The user's current direction on `item`, if any. No side effects.
  fn get_vote(
    &self,
    user_id: Uuid,
    item: ItemRef,
  ) -> impl Future<Output = Result<Option<VoteDirection>, Self::Error>> + Send + '_;
}
