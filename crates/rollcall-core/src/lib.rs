//! Domain model of the rollcall guest directory: guests, check-in records,
//! the attendance state machine, roster normalization, search queries and
//! the [`store::Directory`] contract that storage backends implement.
//!
//! Nothing here touches a database or a file.

pub mod attendance;
pub mod error;
pub mod guest;
pub mod normalize;
pub mod query;
pub mod roster;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
