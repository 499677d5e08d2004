//! Router Module
//!
//! Maps inbound requests onto the user store.
//!
//! ## Responsibilities
//! - Presence validation of name/email before anything reaches the store
//! - Translate "absent" store results into `StoreError::NotFound`
//! - Dispatch decoded wire commands

use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::protocol::{Command, Reply};
use crate::store::{User, UserId, UserStore};

/// Longest accepted name or email, in bytes
pub const MAX_FIELD_LEN: usize = 1024;

/// Request router over a shared store handle
///
/// Cheap to share: clone the `Arc<Router>` or build several routers over the
/// same `Arc<UserStore>`.
pub struct Router {
    store: Arc<UserStore>,
}

impl Router {
    /// Create a router serving the given store
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::List => Ok(Reply::Users(self.list_users())),
            Command::Get { id } => self.get_user(id).map(Reply::User),
            Command::Create { name, email } => self.create_user(name, email).map(Reply::Created),
            Command::Update { id, name, email } => {
                self.update_user(id, name, email).map(Reply::Updated)
            }
            Command::Delete { id } => {
                self.delete_user(id)?;
                Ok(Reply::Deleted { id })
            }
            Command::Ping => Ok(Reply::Pong),
        }
    }

    /// All users in insertion order
    pub fn list_users(&self) -> Vec<User> {
        self.store.list()
    }

    /// Get a single user
    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.store.get(id).ok_or(StoreError::NotFound(id))
    }

    /// Validate and create a user
    pub fn create_user(&self, name: String, email: String) -> Result<User> {
        validate_fields(&name, &email)?;

        let user = self.store.create(name, email);
        tracing::debug!(id = user.id, "created user");
        Ok(user)
    }

    /// Validate and replace name/email of an existing user
    ///
    /// Returns the record as written by this call.
    pub fn update_user(&self, id: UserId, name: String, email: String) -> Result<User> {
        validate_fields(&name, &email)?;

        if !self.store.update(id, name.as_str(), email.as_str()) {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(id, "updated user");
        Ok(User { id, name, email })
    }

    /// Delete a user
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        if !self.store.delete(id) {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(id, "deleted user");
        Ok(())
    }

    /// The store this router serves
    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }
}

fn validate_fields(name: &str, email: &str) -> Result<()> {
    for (field, value) in [("name", name), ("email", email)] {
        if value.trim().is_empty() {
            return Err(StoreError::InvalidInput(format!("{} is required", field)));
        }
        if value.len() > MAX_FIELD_LEN {
            return Err(StoreError::InvalidInput(format!(
                "{} exceeds {} bytes",
                field, MAX_FIELD_LEN
            )));
        }
    }
    Ok(())
}
