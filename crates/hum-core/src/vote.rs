//! The vote state machine.
//!
//! A user holds at most one vote per item. Casting a direction either
//! creates that vote, removes it (same direction again), or flips it
//! (opposite direction). The transition and its effect on the item's
//! counters are computed here, free of any storage concern, so every backend
//! applies exactly the same rules.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  item::{ItemKind, ItemRef},
};

// ─── Direction ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Down,
}

impl VoteDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Up => "up",
      Self::Down => "down",
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Self::Up => Self::Down,
      Self::Down => Self::Up,
    }
  }
}

impl fmt::Display for VoteDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for VoteDirection {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "up" => Ok(Self::Up),
      "down" => Ok(Self::Down),
      other => Err(Error::UnknownDirection(other.to_owned())),
    }
  }
}

// ─── Stored vote ─────────────────────────────────────────────────────────────

/// One user's current opinion on one item. Unique per `(user_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub user_id:   Uuid,
  pub item_id:   Uuid,
  pub direction: VoteDirection,
  /// When the current direction was set.
  pub voted_at:  DateTime<Utc>,
}

// ─── Transition ──────────────────────────────────────────────────────────────

/// What casting a direction does to the stored vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
  /// No prior vote: insert one.
  Create(VoteDirection),
  /// Same direction as the prior vote: delete it (toggle-off).
  Remove(VoteDirection),
  /// Opposite direction: update the row in place.
  Switch { from: VoteDirection, to: VoteDirection },
}

impl VoteTransition {
  /// Decide the transition from the existing vote (if any) and the
  /// requested direction.
  pub fn plan(existing: Option<VoteDirection>, requested: VoteDirection) -> Self {
    match existing {
      None => Self::Create(requested),
      Some(prior) if prior == requested => Self::Remove(requested),
      Some(prior) => Self::Switch { from: prior, to: requested },
    }
  }

  /// The user's direction once the transition is applied.
  pub fn resulting_direction(self) -> Option<VoteDirection> {
    match self {
      Self::Create(d) => Some(d),
      Self::Remove(_) => None,
      Self::Switch { to, .. } => Some(to),
    }
  }
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// An item's denormalised up/down counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
  pub up:   u32,
  pub down: u32,
}

impl Tally {
  pub fn new(up: u32, down: u32) -> Self { Self { up, down } }

  fn slot(&mut self, direction: VoteDirection) -> &mut u32 {
    match direction {
      VoteDirection::Up => &mut self.up,
      VoteDirection::Down => &mut self.down,
    }
  }

  /// Apply a transition. Decrements saturate at zero, so counters that have
  /// drifted below the true vote count never go negative.
  pub fn apply(mut self, transition: VoteTransition) -> Self {
    match transition {
      VoteTransition::Create(d) => {
        *self.slot(d) += 1;
      }
      VoteTransition::Remove(d) => {
        let slot = self.slot(d);
        *slot = slot.saturating_sub(1);
      }
      VoteTransition::Switch { from, to } => {
        *self.slot(to) += 1;
        let slot = self.slot(from);
        *slot = slot.saturating_sub(1);
      }
    }
    self
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// The authoritative state after a vote attempt.
///
/// Counters are the values read back from storage after the write, never a
/// locally computed guess; clients reconcile any optimistic display with
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
  pub item_id:        Uuid,
  pub kind:           ItemKind,
  /// `None` once the vote was toggled off.
  pub direction:      Option<VoteDirection>,
  pub voted:          bool,
  pub upvote_count:   u32,
  pub downvote_count: u32,
}

impl VoteOutcome {
  pub fn new(item: ItemRef, direction: Option<VoteDirection>, tally: Tally) -> Self {
    Self {
      item_id: item.item_id,
      kind: item.kind,
      direction,
      voted: direction.is_some(),
      upvote_count: tally.up,
      downvote_count: tally.down,
    }
  }

  pub fn tally(&self) -> Tally { Tally::new(self.upvote_count, self.downvote_count) }
}
