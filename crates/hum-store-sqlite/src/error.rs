//! Error type for `hum-store-sqlite`.

use hum_core::{Classify, FailureClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hum_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("user not found: {0}")]
  UserNotFound(uuid::Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(hum_core::item::ItemRef),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  /// The database stayed locked by another writer through every attempt.
  #[error("write contention persisted after {attempts} attempts")]
  Conflict { attempts: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// `SQLITE_BUSY` / `SQLITE_LOCKED`: another connection holds the lock.
  pub(crate) fn is_busy(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _)
      )) if matches!(
        e.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
    )
  }
}

impl Classify for Error {
  fn class(&self) -> FailureClass {
    match self {
      Error::Core(e) => e.class(),
      Error::UserNotFound(_) | Error::ItemNotFound(_) => FailureClass::NotFound,
      Error::EmailTaken(_) | Error::Conflict { .. } => FailureClass::Conflict,
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        FailureClass::Unavailable
      }
      e if e.is_busy() => FailureClass::Conflict,
      Error::Database(_) => FailureClass::Unavailable,
      Error::Json(_) | Error::Uuid(_) | Error::DateParse(_) => {
        FailureClass::Internal
      }
    }
  }
}
