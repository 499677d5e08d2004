//! UserStore implementation
//!
//! Vec-backed store with a parking_lot RwLock for concurrency.

use parking_lot::RwLock;

use super::{User, UserId};

/// Thread-safe in-memory user store
///
/// ## Concurrency:
/// - `list`/`get` take the read lock and may run concurrently
/// - `create`/`update`/`delete` take the write lock and exclude everything else
/// - All methods use `&self`; share the store through an `Arc`
pub struct UserStore {
    inner: RwLock<Roster>,
}

/// State guarded by the lock
struct Roster {
    /// Users in insertion order
    users: Vec<User>,

    /// Next id to hand out. Never decreases, so deleted ids are not reused.
    next_id: UserId,
}

impl Roster {
    fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|user| user.id == id)
    }
}

impl UserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Roster {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Snapshot of all users, in insertion order
    pub fn list(&self) -> Vec<User> {
        self.inner.read().users.clone()
    }

    /// Get a user by id (read lock)
    pub fn get(&self, id: UserId) -> Option<User> {
        let roster = self.inner.read();
        roster.users.iter().find(|user| user.id == id).cloned()
    }

    /// Create a user (write lock)
    ///
    /// Returns the stored user including its assigned id
    pub fn create(&self, name: impl Into<String>, email: impl Into<String>) -> User {
        let mut roster = self.inner.write();

        let user = User {
            id: roster.next_id,
            name: name.into(),
            email: email.into(),
        };
        roster.next_id += 1;
        roster.users.push(user.clone());

        user
    }

    /// Replace name and email of the first user matching `id` (write lock)
    ///
    /// Returns false if no such user exists
    pub fn update(&self, id: UserId, name: impl Into<String>, email: impl Into<String>) -> bool {
        let mut roster = self.inner.write();

        match roster.position(id) {
            Some(index) => {
                let user = &mut roster.users[index];
                user.name = name.into();
                user.email = email.into();
                true
            }
            None => false,
        }
    }

    /// Remove the first user matching `id` (write lock)
    ///
    /// Remaining users keep their relative order.
    /// Returns false (and changes nothing) if no such user exists
    pub fn delete(&self, id: UserId) -> bool {
        let mut roster = self.inner.write();

        match roster.position(id) {
            Some(index) => {
                roster.users.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of users currently stored
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Check if the store holds no users
    pub fn is_empty(&self) -> bool {
        self.inner.read().users.is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
