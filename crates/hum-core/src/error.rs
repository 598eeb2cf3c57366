//! Error types for `hum-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("unknown item kind: {0:?}")]
  UnknownItemKind(String),

  #[error("unknown vote direction: {0:?}")]
  UnknownDirection(String),

  #[error("unknown sort key: {0:?}")]
  UnknownSortKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a failure, independent of the backend that produced
/// it. Callers use it to choose between reporting, retrying and reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
  /// A referenced user or item does not exist. Do not retry.
  NotFound,
  /// Write contention or a uniqueness clash. Safe for the user to retry.
  Conflict,
  /// The request itself is malformed.
  Invalid,
  /// The store could not be reached or is closed. The outcome of a write is
  /// unknown; reconcile with a read before acting again.
  Unavailable,
  Internal,
}

/// Implemented by every store error type so higher layers can surface typed
/// failures without depending on a concrete backend.
pub trait Classify {
  fn class(&self) -> FailureClass;
}

impl Classify for Error {
  fn class(&self) -> FailureClass {
    match self {
      Self::UserNotFound(_) | Self::ItemNotFound(_) => FailureClass::NotFound,
      Self::Invalid(_)
      | Self::UnknownItemKind(_)
      | Self::UnknownDirection(_)
      | Self::UnknownSortKey(_) => FailureClass::Invalid,
      Self::Serialization(_) => FailureClass::Internal,
    }
  }
}

impl Classify for std::convert::Infallible {
  fn class(&self) -> FailureClass { match *self {} }
}
