//! Access layer: per-user operations over items and their log ledger.
//!
//! Callers authenticate first and pass the resulting user id. Every lookup
//! is scoped to that user, and an item owned by somebody else is reported as
//! [`CoreError::NotFound`], the same as an id that never existed.
//!
//! Reads apply decay and persist it in the same transaction. The `peek_*`
//! variants compute the same view without writing anything.

mod accounts;

pub use accounts::Accounts;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{CoreError, Result};
use crate::item::{Item, ItemParams, ItemSnapshot, ItemUpdate, NewItem};
use crate::ledger::LogEntry;
use crate::storage::{Config, Database};

/// An item together with its most recent log entries.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    pub item: ItemSnapshot,
    pub logs: Vec<LogEntry>,
}

/// Result of logging progress on an item.
#[derive(Debug, Clone, Serialize)]
pub struct LogOutcome {
    pub item: ItemSnapshot,
    pub entry: LogEntry,
}

/// Item operations bound to one persistence context.
pub struct Tracker<'db> {
    db: &'db Database,
    defaults: ItemParams,
}

impl<'db> Tracker<'db> {
    /// Tracker using the built-in item defaults.
    pub fn new(db: &'db Database) -> Self {
        Self {
            db,
            defaults: ItemParams::default(),
        }
    }

    /// Tracker using the item defaults from `config`.
    pub fn with_config(db: &'db Database, config: &Config) -> Self {
        Self {
            db,
            defaults: config.defaults,
        }
    }

    /// Load an item owned by `user_id` or fail with not-found.
    fn load(db: &Database, user_id: i64, item_id: i64) -> Result<Item> {
        db.get_item(user_id, item_id)?
            .ok_or_else(|| CoreError::item_not_found(item_id))
    }

    /// Write an item back; a vanished row is reported as not-found.
    fn store(db: &Database, item: &Item) -> Result<()> {
        if db.update_item(item)? == 0 {
            return Err(CoreError::item_not_found(item.id));
        }
        Ok(())
    }

    /// Decay an item and persist the result if decay fired.
    fn refresh(db: &Database, item: &mut Item, now: DateTime<Utc>) -> Result<ItemSnapshot> {
        let before = item.updated_at;
        let snapshot = item.snapshot(now);
        if item.updated_at != before {
            Self::store(db, item)?;
        }
        Ok(snapshot)
    }

    /// Create an item for `user_id`. Unset parameters take the defaults.
    ///
    /// # Errors
    /// Validation errors for an empty name or bad parameters, not-found if
    /// the user does not exist.
    pub fn create_item(
        &self,
        user_id: i64,
        new_item: &NewItem,
        now: DateTime<Utc>,
    ) -> Result<ItemSnapshot> {
        let params = new_item.resolve(&self.defaults)?;
        self.db.transaction(|db| {
            if db.get_user(user_id)?.is_none() {
                return Err(CoreError::user_not_found(user_id));
            }
            let mut item = Item::new(
                user_id,
                new_item.name.trim(),
                new_item.description.clone(),
                params,
                now,
            );
            item.id = db.insert_item(&item)?;
            info!(user_id, item_id = item.id, name = %item.name, "item created");
            Ok(item.snapshot(now))
        })
    }

    /// Current view of one item, with decay applied and persisted.
    pub fn get_item(&self, user_id: i64, item_id: i64, now: DateTime<Utc>) -> Result<ItemSnapshot> {
        self.db.transaction(|db| {
            let mut item = Self::load(db, user_id, item_id)?;
            Self::refresh(db, &mut item, now)
        })
    }

    /// Item view plus its `limit` most recent log entries.
    pub fn item_detail(
        &self,
        user_id: i64,
        item_id: i64,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<ItemDetail> {
        self.db.transaction(|db| {
            let mut item = Self::load(db, user_id, item_id)?;
            let snapshot = Self::refresh(db, &mut item, now)?;
            let logs = db.recent_logs(item.id, limit)?;
            Ok(ItemDetail {
                item: snapshot,
                logs,
            })
        })
    }

    /// All of a user's items, newest first, with decay applied and persisted.
    pub fn list_items(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<ItemSnapshot>> {
        self.db.transaction(|db| {
            db.list_items(user_id)?
                .into_iter()
                .map(|mut item| Self::refresh(db, &mut item, now))
                .collect()
        })
    }

    /// Edit an item.
    ///
    /// Decay under the old parameters is settled first so the new
    /// frequency or rate only applies from `now` on.
    ///
    /// # Errors
    /// Validation errors leave the stored item untouched.
    pub fn update_item(
        &self,
        user_id: i64,
        item_id: i64,
        update: &ItemUpdate,
        now: DateTime<Utc>,
    ) -> Result<ItemSnapshot> {
        self.db.transaction(|db| {
            let mut item = Self::load(db, user_id, item_id)?;
            item.apply_decay(now);
            item.apply_update(update)?;
            Self::store(db, &item)?;
            Ok(item.snapshot(now))
        })
    }

    /// Delete an item and its log entries.
    pub fn delete_item(&self, user_id: i64, item_id: i64) -> Result<()> {
        self.db.transaction(|db| {
            if db.delete_item(user_id, item_id)? == 0 {
                return Err(CoreError::item_not_found(item_id));
            }
            info!(user_id, item_id, "item deleted");
            Ok(())
        })
    }

    /// Record progress on an item.
    ///
    /// `amount` defaults to the item's `alpha`. Decay, the new value, the
    /// streak bump and the ledger entry commit together or not at all.
    pub fn log(
        &self,
        user_id: i64,
        item_id: i64,
        amount: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<LogOutcome> {
        self.db.transaction(|db| {
            let mut item = Self::load(db, user_id, item_id)?;
            let pending = item.log(amount, now)?;
            Self::store(db, &item)?;
            let entry = db.append_log(pending)?;
            Ok(LogOutcome {
                item: item.snapshot(now),
                entry,
            })
        })
    }

    /// Most recent log entries for an item, newest first.
    pub fn recent_logs(&self, user_id: i64, item_id: i64, limit: usize) -> Result<Vec<LogEntry>> {
        let item = Self::load(self.db, user_id, item_id)?;
        Ok(self.db.recent_logs(item.id, limit)?)
    }

    /// Like [`Tracker::get_item`] but never writes.
    pub fn peek_item(&self, user_id: i64, item_id: i64, now: DateTime<Utc>) -> Result<ItemSnapshot> {
        let item = Self::load(self.db, user_id, item_id)?;
        Ok(item.peek(now))
    }

    /// Like [`Tracker::list_items`] but never writes.
    pub fn peek_items(&self, user_id: i64, now: DateTime<Utc>) -> Result<Vec<ItemSnapshot>> {
        Ok(self
            .db
            .list_items(user_id)?
            .iter()
            .map(|item| item.peek(now))
            .collect())
    }
}
