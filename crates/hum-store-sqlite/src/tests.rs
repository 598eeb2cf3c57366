//! Integration tests for `SqliteStore` against an in-memory database.

use hum_core::{
  FailureClass,
  Classify as _,
  item::{ContentItem, ItemKind, ItemRef, NewItem, SortKey},
  store::{CommunityStore, ItemQuery},
  user::{NewUser, User},
  vote::VoteDirection::{Down, Up},
};
use uuid::Uuid;

use crate::{Error, SqliteStore, StoreOptions};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser {
    email:         format!("{name}@example.com"),
    display_name:  name.into(),
    password_hash: "$argon2id$v=19$test".into(),
  })
  .await
  .unwrap()
}

async fn users(s: &SqliteStore, n: usize) -> Vec<User> {
  let mut out = Vec::with_capacity(n);
  for i in 0..n {
    out.push(user(s, &format!("member{i}")).await);
  }
  out
}

async fn post(s: &SqliteStore, title: &str) -> ContentItem {
  s.create_item(NewItem::post(None, title, "Anyone else tried this?", "Tips"))
    .await
    .unwrap()
}

async fn article(s: &SqliteStore, title: &str) -> ContentItem {
  s.create_item(NewItem::article(
    title,
    "A systematic review of sound therapy.",
    "Treatment",
    "Sereda M, Xia J",
    Some("https://doi.org/10.1177/0003489419836226".into()),
  ))
  .await
  .unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_user() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let by_id = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "alice@example.com");
  assert_eq!(by_id.password_hash, "$argon2id$v=19$test");

  let by_email = s.find_user_by_email("ALICE@example.com").await.unwrap();
  assert_eq!(by_email.map(|u| u.user_id), Some(alice.user_id));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  user(&s, "bob").await;

  let err = s
    .add_user(NewUser {
      email:         "Bob@Example.com".into(),
      display_name:  "Other Bob".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
  assert_eq!(err.class(), FailureClass::Conflict);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
  let s = store().await;
  let err = s
    .add_user(NewUser {
      email:         "not-an-email".into(),
      display_name:  "Nobody".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.class(), FailureClass::Invalid);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_item_starts_at_zero() {
  let s = store().await;
  let author = user(&s, "carol").await;

  let item = s
    .create_item(NewItem::post(
      Some(author.user_id),
      "White noise at night",
      "It helps me sleep.",
      "Tips",
    ))
    .await
    .unwrap();
  assert_eq!((item.upvote_count, item.downvote_count), (0, 0));

  let fetched = s.get_item(item.item_ref()).await.unwrap().unwrap();
  assert_eq!(fetched.item_id, item.item_id);
  assert_eq!(fetched.details, item.details);
  assert_eq!(fetched.created_at, item.created_at);
}

#[tokio::test]
async fn post_with_unknown_author_fails() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s
    .create_item(NewItem::post(Some(ghost), "Hi", "Hello", "Questions"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
  assert_eq!(s.count_items(ItemKind::Post).await.unwrap(), 0);
}

#[tokio::test]
async fn items_are_scoped_by_kind() {
  let s = store().await;
  let p = post(&s, "A post").await;
  let a = article(&s, "An article").await;

  assert!(s.get_item(ItemRef::article(p.item_id)).await.unwrap().is_none());
  assert!(s.get_item(ItemRef::post(a.item_id)).await.unwrap().is_none());
  assert_eq!(s.count_items(ItemKind::Post).await.unwrap(), 1);
  assert_eq!(s.count_items(ItemKind::Article).await.unwrap(), 1);

  let posts = s.list_items(&ItemQuery::new(ItemKind::Post)).await.unwrap();
  assert_eq!(posts.len(), 1);
  assert_eq!(posts[0].item_id, p.item_id);
}

// ─── Voting scenarios ────────────────────────────────────────────────────────

#[tokio::test]
async fn first_vote_then_toggle_off() {
  let s = store().await;
  let u1 = user(&s, "u1").await;
  let item = post(&s, "Scenario A").await.item_ref();

  let a = s.cast_vote(u1.user_id, item, Up).await.unwrap();
  assert_eq!(a.direction, Some(Up));
  assert!(a.voted);
  assert_eq!((a.upvote_count, a.downvote_count), (1, 0));

  let b = s.cast_vote(u1.user_id, item, Up).await.unwrap();
  assert_eq!(b.direction, None);
  assert!(!b.voted);
  assert_eq!((b.upvote_count, b.downvote_count), (0, 0));
  assert_eq!(s.get_vote(u1.user_id, item).await.unwrap(), None);
}

#[tokio::test]
async fn switching_direction_moves_both_counters() {
  let s = store().await;
  let u1 = user(&s, "u1").await;
  let item = article(&s, "Scenario C").await.item_ref();

  s.cast_vote(u1.user_id, item, Up).await.unwrap();
  let c = s.cast_vote(u1.user_id, item, Down).await.unwrap();
  assert_eq!(c.direction, Some(Down));
  assert_eq!((c.upvote_count, c.downvote_count), (0, 1));
  assert_eq!(s.get_vote(u1.user_id, item).await.unwrap(), Some(Down));

  let stored = s.get_item(item).await.unwrap().unwrap();
  assert_eq!((stored.upvote_count, stored.downvote_count), (0, 1));
}

#[tokio::test]
async fn repeated_votes_alternate_between_set_and_cleared() {
  let s = store().await;
  let u = user(&s, "repeat").await;
  let item = post(&s, "Parity").await.item_ref();

  for n in 1..=5 {
    let outcome = s.cast_vote(u.user_id, item, Down).await.unwrap();
    let expected = if n % 2 == 1 { Some(Down) } else { None };
    assert_eq!(outcome.direction, expected, "after {n} calls");
    assert_eq!(s.get_vote(u.user_id, item).await.unwrap(), expected);
    assert_eq!(outcome.downvote_count, u32::from(n % 2 == 1));
    assert_eq!(outcome.upvote_count, 0);
  }
}

#[tokio::test]
async fn get_vote_is_a_pure_read() {
  let s = store().await;
  let u = user(&s, "reader").await;
  let item = post(&s, "Read twice").await.item_ref();
  s.cast_vote(u.user_id, item, Up).await.unwrap();

  let first = s.get_vote(u.user_id, item).await.unwrap();
  let second = s.get_vote(u.user_id, item).await.unwrap();
  assert_eq!(first, second);
  let stored = s.get_item(item).await.unwrap().unwrap();
  assert_eq!(stored.upvote_count, 1);
}

#[tokio::test]
async fn votes_from_different_users_accumulate() {
  let s = store().await;
  let members = users(&s, 3).await;
  let item = post(&s, "Popular").await.item_ref();

  s.cast_vote(members[0].user_id, item, Up).await.unwrap();
  s.cast_vote(members[1].user_id, item, Up).await.unwrap();
  let last = s.cast_vote(members[2].user_id, item, Down).await.unwrap();
  assert_eq!((last.upvote_count, last.downvote_count), (2, 1));

  // One member withdrawing only affects their own contribution.
  let undo = s.cast_vote(members[0].user_id, item, Up).await.unwrap();
  assert_eq!((undo.upvote_count, undo.downvote_count), (1, 1));
  assert_eq!(s.get_vote(members[1].user_id, item).await.unwrap(), Some(Up));
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_on_missing_item_is_not_found() {
  let s = store().await;
  let u = user(&s, "lost").await;
  let missing = ItemRef::post(Uuid::new_v4());

  let err = s.cast_vote(u.user_id, missing, Up).await.unwrap_err();
  assert!(matches!(err, Error::ItemNotFound(r) if r == missing));
  assert_eq!(err.class(), FailureClass::NotFound);
}

#[tokio::test]
async fn vote_under_wrong_kind_is_not_found() {
  let s = store().await;
  let u = user(&s, "confused").await;
  let p = post(&s, "Only a post").await;

  let err = s
    .cast_vote(u.user_id, ItemRef::article(p.item_id), Up)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ItemNotFound(_)));

  let stored = s.get_item(p.item_ref()).await.unwrap().unwrap();
  assert_eq!(stored.upvote_count, 0);
}

#[tokio::test]
async fn vote_by_unknown_user_leaves_no_trace() {
  let s = store().await;
  let item = post(&s, "Untouched").await.item_ref();
  let ghost = Uuid::new_v4();

  let err = s.cast_vote(ghost, item, Up).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
  assert_eq!(s.get_vote(ghost, item).await.unwrap(), None);
  let stored = s.get_item(item).await.unwrap().unwrap();
  assert_eq!((stored.upvote_count, stored.downvote_count), (0, 0));
}

// ─── Listing ─────────────────────────────────────────────────────────────────

async fn ids(s: &SqliteStore, kind: ItemKind, sort: SortKey) -> Vec<Uuid> {
  s.list_items(&ItemQuery::new(kind).sorted(sort))
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.item_id)
    .collect()
}

#[tokio::test]
async fn newest_and_oldest_follow_creation_order() {
  let s = store().await;
  let first = post(&s, "first").await.item_id;
  let second = post(&s, "second").await.item_id;
  let third = post(&s, "third").await.item_id;

  assert_eq!(ids(&s, ItemKind::Post, SortKey::Newest).await, vec![third, second, first]);
  assert_eq!(ids(&s, ItemKind::Post, SortKey::Oldest).await, vec![first, second, third]);
}

#[tokio::test]
async fn most_votes_and_controversial_rank_by_upvotes_first() {
  let s = store().await;
  let members = users(&s, 10).await;
  let balanced = article(&s, "5 up / 5 down").await.item_ref();
  let liked = article(&s, "3 up / 0 down").await.item_ref();

  for (i, m) in members.iter().enumerate() {
    let direction = if i < 5 { Up } else { Down };
    s.cast_vote(m.user_id, balanced, direction).await.unwrap();
  }
  for m in &members[..3] {
    s.cast_vote(m.user_id, liked, Up).await.unwrap();
  }

  let b = s.get_item(balanced).await.unwrap().unwrap();
  assert_eq!((b.upvote_count, b.downvote_count), (5, 5));

  let expected = vec![balanced.item_id, liked.item_id];
  assert_eq!(ids(&s, ItemKind::Article, SortKey::MostVotes).await, expected);
  assert_eq!(ids(&s, ItemKind::Article, SortKey::Controversial).await, expected);
}

#[tokio::test]
async fn controversial_breaks_upvote_ties_by_downvotes() {
  let s = store().await;
  let members = users(&s, 3).await;
  let calm = post(&s, "1 up").await.item_ref();
  let heated = post(&s, "1 up, 2 down").await.item_ref();

  s.cast_vote(members[0].user_id, calm, Up).await.unwrap();
  s.cast_vote(members[0].user_id, heated, Up).await.unwrap();
  s.cast_vote(members[1].user_id, heated, Down).await.unwrap();
  s.cast_vote(members[2].user_id, heated, Down).await.unwrap();

  assert_eq!(
    ids(&s, ItemKind::Post, SortKey::Controversial).await,
    vec![heated.item_id, calm.item_id]
  );
}

#[tokio::test]
async fn list_filters_by_category_and_pages() {
  let s = store().await;
  for title in ["a", "b", "c"] {
    post(&s, title).await;
  }
  s.create_item(NewItem::post(None, "q", "Is coffee a trigger?", "Questions"))
    .await
    .unwrap();

  let mut query = ItemQuery::new(ItemKind::Post);
  query.category = Some("Questions".into());
  let questions = s.list_items(&query).await.unwrap();
  assert_eq!(questions.len(), 1);
  assert_eq!(questions[0].title, "q");

  let mut page = ItemQuery::new(ItemKind::Post).sorted(SortKey::Oldest);
  page.limit = Some(2);
  page.offset = Some(1);
  let titles: Vec<_> = s
    .list_items(&page)
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.title)
    .collect();
  assert_eq!(titles, vec!["b", "c"]);
}

#[tokio::test]
async fn oversized_limit_and_offset_are_clamped() {
  let s = store().await;
  for title in ["a", "b"] {
    post(&s, title).await;
  }

  let mut all = ItemQuery::new(ItemKind::Post);
  all.limit = Some(usize::MAX);
  assert_eq!(s.list_items(&all).await.unwrap().len(), 2);

  let mut past_end = ItemQuery::new(ItemKind::Post);
  past_end.offset = Some(usize::MAX);
  assert!(s.list_items(&past_end).await.unwrap().is_empty());
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_votes_on_one_item_are_not_lost() {
  let s = store().await;
  let members = users(&s, 8).await;
  let item = post(&s, "Busy thread").await.item_ref();

  let mut set = tokio::task::JoinSet::new();
  for m in members {
    let s = s.clone();
    set.spawn(async move { s.cast_vote(m.user_id, item, Up).await });
  }
  while let Some(res) = set.join_next().await {
    res.unwrap().unwrap();
  }

  let stored = s.get_item(item).await.unwrap().unwrap();
  assert_eq!(stored.upvote_count, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_connections_serialize_on_the_same_file() {
  let path = std::env::temp_dir().join(format!("hum-test-{}.db", Uuid::new_v4()));
  let a = SqliteStore::open(&path).await.unwrap();
  let b = SqliteStore::open(&path).await.unwrap();

  let u1 = user(&a, "left").await;
  let u2 = user(&a, "right").await;
  let item = post(&a, "Shared").await.item_ref();

  let (r1, r2) = tokio::join!(
    a.cast_vote(u1.user_id, item, Up),
    b.cast_vote(u2.user_id, item, Up),
  );
  r1.unwrap();
  r2.unwrap();

  let stored = b.get_item(item).await.unwrap().unwrap();
  assert_eq!(stored.upvote_count, 2);

  drop((a, b));
  remove_db(&path);
}

fn remove_db(path: &std::path::Path) {
  for suffix in ["", "-wal", "-shm"] {
    let mut p = path.to_path_buf().into_os_string();
    p.push(suffix);
    std::fs::remove_file(p).ok();
  }
}

#[tokio::test]
async fn vote_gives_up_with_conflict_while_another_writer_holds_the_lock() {
  let path = std::env::temp_dir().join(format!("hum-test-{}.db", Uuid::new_v4()));
  let s = SqliteStore::open_with(&path, StoreOptions {
    busy_timeout: std::time::Duration::ZERO,
    vote_retries: 2,
  })
  .await
  .unwrap();

  let u = user(&s, "patient").await;
  let item = post(&s, "Locked out").await.item_ref();

  let other = rusqlite::Connection::open(&path).unwrap();
  other.execute_batch("BEGIN IMMEDIATE").unwrap();

  let err = s.cast_vote(u.user_id, item, Up).await.unwrap_err();
  assert!(matches!(err, Error::Conflict { attempts: 3 }), "{err:?}");
  assert_eq!(err.class(), FailureClass::Conflict);

  other.execute_batch("ROLLBACK").unwrap();

  let stored = s.get_item(item).await.unwrap().unwrap();
  assert_eq!((stored.upvote_count, stored.downvote_count), (0, 0));
  assert_eq!(s.get_vote(u.user_id, item).await.unwrap(), None);

  let outcome = s.cast_vote(u.user_id, item, Up).await.unwrap();
  assert_eq!(outcome.direction, Some(Up));
  assert_eq!((outcome.upvote_count, outcome.downvote_count), (1, 0));

  drop((s, other));
  remove_db(&path);
}
