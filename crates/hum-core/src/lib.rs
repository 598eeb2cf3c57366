//! Core types and trait definitions for the Hum community store.
//!
//! Users, posts and articles, the vote state machine, and the
//! [`store::CommunityStore`] trait that backends implement. No HTTP or
//! database code lives here.

// Backends implement the store trait with `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod item;
pub mod store;
pub mod user;
pub mod vote;

pub use error::{Classify, Error, FailureClass, Result};
