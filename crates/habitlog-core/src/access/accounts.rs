//! Account operations: signup, login check, deletion.
//!
//! Session handling belongs to the presentation layer; these functions only
//! establish or verify identity and hand back a [`User`].

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{AuthError, CoreError, Result};
use crate::storage::Database;
use crate::user::{hash_password, verify_password, User};

pub struct Accounts<'db> {
    db: &'db Database,
}

impl<'db> Accounts<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// `MissingCredentials` for a blank username or empty password,
    /// `PasswordMismatch` when `confirm` differs, `UsernameTaken` for a
    /// duplicate name.
    pub fn signup(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        let hash = hash_password(password)?;

        self.db.transaction(|db| {
            if db.find_user_by_name(username)?.is_some() {
                return Err(AuthError::UsernameTaken.into());
            }
            let user = db.insert_user(username, &hash, now)?;
            info!(user_id = user.id, username, "user signed up");
            Ok(user)
        })
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown user or a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        let Some(user) = self.db.find_user_by_name(username)? else {
            warn!(username, "login failed");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_password(password, &user.password_hash)? {
            warn!(username, "login failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user)
    }

    /// Delete a user with all of their items and log entries.
    pub fn delete_user(&self, user_id: i64) -> Result<()> {
        self.db.transaction(|db| {
            if db.delete_user(user_id)? == 0 {
                return Err(CoreError::user_not_found(user_id));
            }
            info!(user_id, "user deleted");
            Ok(())
        })
    }
}
