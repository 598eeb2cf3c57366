//! Content items: the votable entities shown in the community and
//! scientific-article feeds.
//!
//! Both feeds share one representation. The [`ItemKind`] discriminant decides
//! which feed an item belongs to and scopes every vote and listing operation,
//! so a single ledger implementation serves both.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which feed an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
  /// A member-authored community post.
  Post,
  /// A curated scientific article.
  Article,
}

impl ItemKind {
  pub const ALL: [ItemKind; 2] = [ItemKind::Post, ItemKind::Article];

  /// The discriminant stored in the `kind` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Post => "post",
      Self::Article => "article",
    }
  }

  /// The plural path segment the API mounts this kind under.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Post => "posts",
      Self::Article => "articles",
    }
  }
}

impl fmt::Display for ItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ItemKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "post" => Ok(Self::Post),
      "article" => Ok(Self::Article),
      other => Err(Error::UnknownItemKind(other.to_owned())),
    }
  }
}

/// Addresses one item within one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
  pub kind:    ItemKind,
  pub item_id: Uuid,
}

impl ItemRef {
  pub fn post(item_id: Uuid) -> Self { Self { kind: ItemKind::Post, item_id } }

  pub fn article(item_id: Uuid) -> Self {
    Self { kind: ItemKind::Article, item_id }
  }
}

impl fmt::Display for ItemRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.kind, self.item_id)
  }
}

// ─── Kind-specific details ───────────────────────────────────────────────────

/// Fields that only one kind of item carries. The serde tag doubles as the
/// item's [`ItemKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemDetails {
  Post {
    /// The member who wrote the post. `None` for posts published by the
    /// service itself.
    author_id: Option<Uuid>,
  },
  Article {
    /// Free-text author list as printed on the paper.
    authors:    String,
    /// DOI or publisher URL.
    source_url: Option<String>,
  },
}

impl ItemDetails {
  pub fn kind(&self) -> ItemKind {
    match self {
      Self::Post { .. } => ItemKind::Post,
      Self::Article { .. } => ItemKind::Article,
    }
  }

  /// Serialise without the `kind` tag for the `details_json` column; the
  /// kind has a column of its own.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let mut full = serde_json::to_value(self)?;
    if let Some(map) = full.as_object_mut() {
      map.remove("kind");
    }
    Ok(full)
  }

  /// Rebuild from the `kind` column and the `details_json` payload.
  pub fn from_parts(kind: ItemKind, data: serde_json::Value) -> Result<Self> {
    let mut map = match data {
      serde_json::Value::Object(map) => map,
      serde_json::Value::Null => serde_json::Map::new(),
      other => {
        return Err(Error::Invalid(format!(
          "item details must be a JSON object, got {other}"
        )));
      }
    };
    map.insert("kind".into(), serde_json::Value::from(kind.as_str()));
    Ok(serde_json::from_value(serde_json::Value::Object(map))?)
  }
}

// ─── ContentItem ─────────────────────────────────────────────────────────────

/// A post or article together with its denormalised vote counters.
///
/// The counters are owned by the vote ledger: they start at zero and change
/// only through [`crate::store::CommunityStore::cast_vote`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
  pub item_id:        Uuid,
  pub created_at:     DateTime<Utc>,
  pub title:          String,
  pub content:        String,
  pub category:       String,
  pub image_url:      Option<String>,
  pub details:        ItemDetails,
  pub upvote_count:   u32,
  pub downvote_count: u32,
}

impl ContentItem {
  pub fn kind(&self) -> ItemKind { self.details.kind() }

  pub fn item_ref(&self) -> ItemRef {
    ItemRef { kind: self.kind(), item_id: self.item_id }
  }
}

/// Input to [`crate::store::CommunityStore::create_item`]. The id, timestamp
/// and counters are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
  pub title:     String,
  pub content:   String,
  pub category:  String,
  pub image_url: Option<String>,
  pub details:   ItemDetails,
}

impl NewItem {
  /// A community post written by `author_id`.
  pub fn post(
    author_id: Option<Uuid>,
    title: impl Into<String>,
    content: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      title:     title.into(),
      content:   content.into(),
      category:  category.into(),
      image_url: None,
      details:   ItemDetails::Post { author_id },
    }
  }

  /// A scientific article.
  pub fn article(
    title: impl Into<String>,
    content: impl Into<String>,
    category: impl Into<String>,
    authors: impl Into<String>,
    source_url: Option<String>,
  ) -> Self {
    Self {
      title:     title.into(),
      content:   content.into(),
      category:  category.into(),
      image_url: None,
      details:   ItemDetails::Article { authors: authors.into(), source_url },
    }
  }

  pub fn kind(&self) -> ItemKind { self.details.kind() }

  /// Reject input that must never reach storage.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::Invalid("title must not be empty".into()));
    }
    if self.content.trim().is_empty() {
      return Err(Error::Invalid("content must not be empty".into()));
    }
    Ok(())
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// Feed ordering.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  /// `created_at` descending.
  #[default]
  Newest,
  /// `created_at` ascending.
  Oldest,
  /// `upvote_count` descending.
  MostVotes,
  /// `upvote_count` descending, then `downvote_count` descending.
  ///
  /// This favours high-engagement items over evenly split ones; it is not a
  /// true controversy score.
  Controversial,
}

impl SortKey {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Newest => "newest",
      Self::Oldest => "oldest",
      Self::MostVotes => "most_votes",
      Self::Controversial => "controversial",
    }
  }
}

impl FromStr for SortKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "newest" => Ok(Self::Newest),
      "oldest" => Ok(Self::Oldest),
      "most_votes" => Ok(Self::MostVotes),
      "controversial" => Ok(Self::Controversial),
      other => Err(Error::UnknownSortKey(other.to_owned())),
    }
  }
}
