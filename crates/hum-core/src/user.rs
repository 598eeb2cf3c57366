//! Users: the members who author posts and cast votes.
//!
//! Authentication itself lives in `hum-api`; the core only knows a user's
//! identity and the opaque password hash persisted alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A registered member. The password hash is deliberately not serialised so
/// a `User` can be returned from the API as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub created_at:    DateTime<Utc>,
  pub email:         String,
  pub display_name:  String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  #[serde(skip, default)]
  pub password_hash: String,
}

/// Input to [`crate::store::CommunityStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub display_name:  String,
  pub password_hash: String,
}

impl NewUser {
  /// Reject input that must never reach storage.
  pub fn validate(&self) -> Result<()> {
    let email = self.email.trim();
    if email.is_empty() || !email.contains('@') {
      return Err(Error::Invalid(format!("not an email address: {email:?}")));
    }
    if self.display_name.trim().is_empty() {
      return Err(Error::Invalid("display name must not be empty".into()));
    }
    Ok(())
  }
}
