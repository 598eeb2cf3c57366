//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so that lexical
//! order matches chronological order. Kind-specific item details are stored
//! as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use hum_core::{
  item::{ContentItem, ItemDetails, ItemKind},
  user::User,
  vote::VoteDirection,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_kind(k: ItemKind) -> &'static str { k.as_str() }

pub fn decode_kind(s: &str) -> Result<ItemKind> { Ok(s.parse()?) }

pub fn encode_direction(d: VoteDirection) -> &'static str { d.as_str() }

pub fn decode_direction(s: &str) -> Result<VoteDirection> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawItem::from_row`].
pub const ITEM_COLUMNS: &str = "item_id, kind, created_at, title, content, category, \
   image_url, details_json, upvote_count, downvote_count";

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub item_id:        String,
  pub kind:           String,
  pub created_at:     String,
  pub title:          String,
  pub content:        String,
  pub category:       String,
  pub image_url:      Option<String>,
  pub details_json:   String,
  pub upvote_count:   u32,
  pub downvote_count: u32,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawItem {
      item_id:        row.get(0)?,
      kind:           row.get(1)?,
      created_at:     row.get(2)?,
      title:          row.get(3)?,
      content:        row.get(4)?,
      category:       row.get(5)?,
      image_url:      row.get(6)?,
      details_json:   row.get(7)?,
      upvote_count:   row.get(8)?,
      downvote_count: row.get(9)?,
    })
  }

  pub fn into_item(self) -> Result<ContentItem> {
    let kind = decode_kind(&self.kind)?;
    let details_json: serde_json::Value = serde_json::from_str(&self.details_json)?;

    Ok(ContentItem {
      item_id:        decode_uuid(&self.item_id)?,
      created_at:     decode_dt(&self.created_at)?,
      title:          self.title,
      content:        self.content,
      category:       self.category,
      image_url:      self.image_url,
      details:        ItemDetails::from_parts(kind, details_json)?,
      upvote_count:   self.upvote_count,
      downvote_count: self.downvote_count,
    })
  }
}

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "user_id, created_at, email, display_name, password_hash";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub created_at:    String,
  pub email:         String,
  pub display_name:  String,
  pub password_hash: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      user_id:       row.get(0)?,
      created_at:    row.get(1)?,
      email:         row.get(2)?,
      display_name:  row.get(3)?,
      password_hash: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      created_at:    decode_dt(&self.created_at)?,
      email:         self.email,
      display_name:  self.display_name,
      password_hash: self.password_hash,
    })
  }
}
