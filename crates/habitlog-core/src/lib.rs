//! # habitlog Core Library
//!
//! Core logic for habitlog, a goal and habit tracker whose progress values
//! decay when a habit is neglected. The CLI binary is a thin layer over this
//! library; any other front end is expected to be one too.
//!
//! ## Architecture
//!
//! - **Items**: a goal/habit with a progress value that accumulates on every
//!   log and decays geometrically for each missed period. Decay is lazy and
//!   computed from wall-clock time on access.
//! - **Ledger**: append-only log entries per item.
//! - **Storage**: SQLite persistence and TOML configuration.
//! - **Access layer**: per-user operations that keep each user's data isolated.
//!
//! ## Key Components
//!
//! - [`Item`]: decay and accumulation state machine
//! - [`Database`]: persistence context, passed explicitly
//! - [`Tracker`]: item operations scoped to an authenticated user
//! - [`Accounts`]: signup and credential checks
//! - [`Config`]: application configuration

pub mod access;
pub mod error;
pub mod item;
pub mod ledger;
pub mod storage;
pub mod user;

pub use access::{Accounts, ItemDetail, LogOutcome, Tracker};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use item::{Item, ItemParams, ItemSnapshot, ItemUpdate, NewItem};
pub use ledger::{LogEntry, NewLogEntry, RECENT_LOG_LIMIT};
pub use storage::{Config, Database};
pub use user::User;
