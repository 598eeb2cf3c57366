//! [`SqliteStore`]: the SQLite implementation of [`CommunityStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tokio_retry::{
  RetryIf,
  strategy::{ExponentialBackoff, jitter},
};
use uuid::Uuid;

use hum_core::{
  item::{ContentItem, ItemDetails, ItemKind, ItemRef, NewItem, SortKey},
  store::{CommunityStore, ItemQuery},
  user::{NewUser, User},
  vote::{Tally, VoteDirection, VoteOutcome, VoteTransition},
};

use crate::{
  encode::{
    ITEM_COLUMNS, RawItem, RawUser, USER_COLUMNS, decode_direction, encode_direction,
    encode_dt, encode_kind, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Longest pause between two vote attempts.
const RETRY_MAX_DELAY: Duration = Duration::from_millis(500);

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection tuning.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  /// How long SQLite waits on a lock held by another connection before
  /// reporting `SQLITE_BUSY`.
  pub busy_timeout: Duration,
  /// Extra attempts for a vote transaction that found the database busy.
  pub vote_retries: u32,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self { busy_timeout: Duration::from_secs(5), vote_retries: 3 }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Hum community store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  options: StoreOptions,
}

/// What the vote transaction found and did.
enum VoteTx {
  Applied { transition: VoteTransition, tally: Tally },
  MissingItem,
  MissingUser,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  pub async fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, options };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, options: StoreOptions::default() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let busy_timeout = self.options.busy_timeout;
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// One attempt at the vote transaction.
  ///
  /// `BEGIN IMMEDIATE` takes the write lock before the existing vote is read,
  /// so no other writer can interleave between the read and the two writes.
  async fn apply_vote(
    &self,
    user_id: Uuid,
    item: ItemRef,
    direction: VoteDirection,
  ) -> Result<VoteTx> {
    let user_id_str = encode_uuid(user_id);
    let item_id_str = encode_uuid(item.item_id);
    let kind_str    = encode_kind(item.kind);

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<Tally> = tx
          .query_row(
            "SELECT upvote_count, downvote_count FROM items
             WHERE item_id = ?1 AND kind = ?2",
            rusqlite::params![item_id_str, kind_str],
            |row| Ok(Tally::new(row.get(0)?, row.get(1)?)),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(VoteTx::MissingItem);
        };

        let user_exists = tx
          .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            rusqlite::params![user_id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !user_exists {
          return Ok(VoteTx::MissingUser);
        }

        let existing: Option<String> = tx
          .query_row(
            "SELECT direction FROM votes WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id_str, item_id_str],
            |row| row.get(0),
          )
          .optional()?;
        let existing = existing
          .as_deref()
          .map(str::parse::<VoteDirection>)
          .transpose()
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        let transition = VoteTransition::plan(existing, direction);
        let voted_at   = encode_dt(Utc::now());

        match transition {
          VoteTransition::Create(d) => tx.execute(
            "INSERT INTO votes (user_id, item_id, direction, voted_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id_str, item_id_str, encode_direction(d), voted_at],
          )?,
          VoteTransition::Remove(_) => tx.execute(
            "DELETE FROM votes WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id_str, item_id_str],
          )?,
          VoteTransition::Switch { to, .. } => tx.execute(
            "UPDATE votes SET direction = ?3, voted_at = ?4
             WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id_str, item_id_str, encode_direction(to), voted_at],
          )?,
        };

        let next = current.apply(transition);
        tx.execute(
          "UPDATE items SET upvote_count = ?1, downvote_count = ?2 WHERE item_id = ?3",
          rusqlite::params![next.up, next.down, item_id_str],
        )?;

        // Report what is stored, not what was computed.
        let tally = tx.query_row(
          "SELECT upvote_count, downvote_count FROM items WHERE item_id = ?1",
          rusqlite::params![item_id_str],
          |row| Ok(Tally::new(row.get(0)?, row.get(1)?)),
        )?;

        tx.commit()?;
        Ok(VoteTx::Applied { transition, tally })
      })
      .await?;

    Ok(result)
  }
}

fn order_clause(sort: SortKey) -> &'static str {
  match sort {
    SortKey::Newest => "created_at DESC, item_id ASC",
    SortKey::Oldest => "created_at ASC, item_id ASC",
    SortKey::MostVotes => "upvote_count DESC, created_at DESC, item_id ASC",
    SortKey::Controversial => {
      "upvote_count DESC, downvote_count DESC, created_at DESC, item_id ASC"
    }
  }
}

// ─── CommunityStore impl ─────────────────────────────────────────────────────

impl CommunityStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;

    let user = User {
      user_id:       Uuid::new_v4(),
      created_at:    Utc::now(),
      email:         input.email.trim().to_owned(),
      display_name:  input.display_name.trim().to_owned(),
      password_hash: input.password_hash,
    };

    let id_str       = encode_uuid(user.user_id);
    let at_str       = encode_dt(user.created_at);
    let email        = user.email.clone();
    let display_name = user.display_name.clone();
    let hash         = user.password_hash.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO users (user_id, created_at, email, display_name, password_hash)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, at_str, email, display_name, hash],
        );
        match res {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken(user.email));
    }

    tracing::info!(user_id = %user.user_id, "registered user");
    Ok(user)
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id_str],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn create_item(&self, input: NewItem) -> Result<ContentItem> {
    input.validate()?;

    let item = ContentItem {
      item_id:        Uuid::new_v4(),
      created_at:     Utc::now(),
      title:          input.title,
      content:        input.content,
      category:       input.category,
      image_url:      input.image_url,
      details:        input.details,
      upvote_count:   0,
      downvote_count: 0,
    };

    let author_str = match &item.details {
      ItemDetails::Post { author_id: Some(author) } => Some(encode_uuid(*author)),
      _ => None,
    };

    let id_str       = encode_uuid(item.item_id);
    let kind_str     = encode_kind(item.kind());
    let at_str       = encode_dt(item.created_at);
    let title        = item.title.clone();
    let content      = item.content.clone();
    let category     = item.category.clone();
    let image_url    = item.image_url.clone();
    let details_json = item.details.to_json()?.to_string();

    let author_known = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(author) = &author_str {
          let exists = tx
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![author],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !exists {
            return Ok(false);
          }
        }
        tx.execute(
          "INSERT INTO items (
             item_id, kind, created_at, title, content, category,
             image_url, details_json, upvote_count, downvote_count
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 0)",
          rusqlite::params![
            id_str, kind_str, at_str, title, content, category, image_url, details_json,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !author_known
      && let ItemDetails::Post { author_id: Some(author) } = item.details
    {
      return Err(Error::UserNotFound(author));
    }

    tracing::debug!(item = %item.item_ref(), "created item");
    Ok(item)
  }

  async fn get_item(&self, item: ItemRef) -> Result<Option<ContentItem>> {
    let id_str   = encode_uuid(item.item_id);
    let kind_str = encode_kind(item.kind);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1 AND kind = ?2"),
            rusqlite::params![id_str, kind_str],
            RawItem::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items(&self, query: &ItemQuery) -> Result<Vec<ContentItem>> {
    let kind_str   = encode_kind(query.kind);
    let category   = query.category.clone();
    let limit_val  = i64::try_from(query.limit.unwrap_or(100)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);
    let sql = format!(
      "SELECT {ITEM_COLUMNS}
       FROM items
       WHERE kind = ?1 AND (?2 IS NULL OR category = ?2)
       ORDER BY {}
       LIMIT ?3 OFFSET ?4",
      order_clause(query.sort)
    );

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind_str, category.as_deref(), limit_val, offset_val],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn count_items(&self, kind: ItemKind) -> Result<u64> {
    let kind_str = encode_kind(kind);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM items WHERE kind = ?1",
          rusqlite::params![kind_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(
    &self,
    user_id:   Uuid,
    item:      ItemRef,
    direction: VoteDirection,
  ) -> Result<VoteOutcome> {
    let attempts = self.options.vote_retries + 1;
    // 20ms, 40ms, 80ms, ... before jitter.
    let backoff = ExponentialBackoff::from_millis(2)
      .factor(10)
      .max_delay(RETRY_MAX_DELAY)
      .map(jitter)
      .take(self.options.vote_retries as usize);

    let tx = RetryIf::spawn(
      backoff,
      move || self.apply_vote(user_id, item, direction),
      |e: &Error| {
        let busy = e.is_busy();
        if busy {
          tracing::warn!(%item, %user_id, "database busy during vote");
        }
        busy
      },
    )
    .await
    .map_err(|e| if e.is_busy() { Error::Conflict { attempts } } else { e })?;

    match tx {
      VoteTx::MissingItem => Err(Error::ItemNotFound(item)),
      VoteTx::MissingUser => Err(Error::UserNotFound(user_id)),
      VoteTx::Applied { transition, tally } => {
        tracing::debug!(
          %item,
          %user_id,
          ?transition,
          up = tally.up,
          down = tally.down,
          "vote applied"
        );
        Ok(VoteOutcome::new(item, transition.resulting_direction(), tally))
      }
    }
  }

  async fn get_vote(&self, user_id: Uuid, item: ItemRef) -> Result<Option<VoteDirection>> {
    let user_id_str = encode_uuid(user_id);
    let item_id_str = encode_uuid(item.item_id);
    let kind_str    = encode_kind(item.kind);

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT v.direction
             FROM votes v
             JOIN items i ON i.item_id = v.item_id
             WHERE v.user_id = ?1 AND v.item_id = ?2 AND i.kind = ?3",
            rusqlite::params![user_id_str, item_id_str, kind_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.as_deref().map(decode_direction).transpose()
  }
}
