//! Store Module
//!
//! In-memory collection of users with CRUD access.
//!
//! ## Responsibilities
//! - Assign unique ids on create
//! - Preserve insertion order for listing
//! - Linearizable access for concurrent callers
//!
//! ## Data Structure Choice
//! A `Vec<User>` wrapped in a single RwLock:
//! - Insertion order comes for free
//! - Lookups are a linear scan (fine at the sizes this store targets)
//! - The id counter lives under the same lock as the collection

mod user_store;

use serde::{Deserialize, Serialize};

pub use user_store::UserStore;

/// Identifier assigned by the store, starting at 1
pub type UserId = u64;

/// A user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id, immutable after creation
    pub id: UserId,

    pub name: String,

    pub email: String,
}
