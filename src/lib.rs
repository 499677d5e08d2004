//! # userstore
//!
//! A thread-safe, in-memory user store with:
//! - Create / read / update / delete with store-assigned ids
//! - Readers-share, writers-exclusive locking over the whole collection
//! - Request validation and not-found mapping in a router
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Acceptor + Worker Pool)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Router                                 │
//! │          (Validation, NotFound / InvalidInput)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐
//!               │   UserStore   │
//!               │ (RwLock<Vec>) │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod router;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use router::Router;
pub use store::{User, UserId, UserStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of userstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
