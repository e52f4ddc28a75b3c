//! Item commands for CLI.

use std::path::Path;

use chrono::Utc;
use clap::{Args, Subcommand};
use habitlog_core::{Config, ItemUpdate, NewItem, Tracker};

use super::{open_database, print_json, Credentials};

/// Numeric item parameters shared by `create` and `edit`.
#[derive(Args)]
pub struct ParamArgs {
    /// Expected days between actions
    #[arg(long)]
    frequency: Option<f64>,
    /// Increment per log when no amount is given
    #[arg(long)]
    alpha: Option<f64>,
    /// Fraction lost per missed period (0 <= rate < 1)
    #[arg(long)]
    decay_rate: Option<f64>,
    /// Value representing 100%
    #[arg(long)]
    target: Option<f64>,
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Create a new item
    Create {
        #[command(flatten)]
        credentials: Credentials,
        /// Item name
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// List items, newest first
    List {
        #[command(flatten)]
        credentials: Credentials,
        /// Compute decay without saving it
        #[arg(long)]
        peek: bool,
    },
    /// Show one item with its recent logs
    Show {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
        /// Number of log entries (defaults to `display.recent_logs`)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one item without saving decay
    Peek {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
    },
    /// Edit an item
    Edit {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Delete an item and its logs
    Delete {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
    },
    /// Log progress on an item
    Log {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
        /// Amount to add (defaults to the item's alpha)
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
    },
    /// Show recent log entries
    Logs {
        #[command(flatten)]
        credentials: Credentials,
        id: i64,
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: ItemAction, db_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = open_database(&config, db_path)?;
    let tracker = Tracker::with_config(&db, &config);
    let recent = config.display.recent_logs;
    let now = Utc::now();

    match action {
        ItemAction::Create {
            credentials,
            name,
            description,
            params,
        } => {
            let user = credentials.authenticate(&db)?;
            let new_item = NewItem {
                name,
                description,
                frequency: params.frequency,
                alpha: params.alpha,
                decay_rate: params.decay_rate,
                target: params.target,
            };
            let item = tracker.create_item(user.id, &new_item, now)?;
            print_json(&item)?;
        }
        ItemAction::List { credentials, peek } => {
            let user = credentials.authenticate(&db)?;
            let items = if peek {
                tracker.peek_items(user.id, now)?
            } else {
                tracker.list_items(user.id, now)?
            };
            print_json(&items)?;
        }
        ItemAction::Show {
            credentials,
            id,
            limit,
        } => {
            let user = credentials.authenticate(&db)?;
            let detail = tracker.item_detail(user.id, id, limit.unwrap_or(recent), now)?;
            print_json(&detail)?;
        }
        ItemAction::Peek { credentials, id } => {
            let user = credentials.authenticate(&db)?;
            print_json(&tracker.peek_item(user.id, id, now)?)?;
        }
        ItemAction::Edit {
            credentials,
            id,
            name,
            description,
            params,
        } => {
            let user = credentials.authenticate(&db)?;
            let update = ItemUpdate {
                name,
                description,
                frequency: params.frequency,
                alpha: params.alpha,
                decay_rate: params.decay_rate,
                target: params.target,
            };
            if update.is_empty() {
                return Err("nothing to change".into());
            }
            print_json(&tracker.update_item(user.id, id, &update, now)?)?;
        }
        ItemAction::Delete { credentials, id } => {
            let user = credentials.authenticate(&db)?;
            tracker.delete_item(user.id, id)?;
            println!("Item deleted: {id}");
        }
        ItemAction::Log {
            credentials,
            id,
            amount,
        } => {
            let user = credentials.authenticate(&db)?;
            let outcome = tracker.log(user.id, id, amount, now)?;
            print_json(&outcome.item)?;
        }
        ItemAction::Logs {
            credentials,
            id,
            limit,
        } => {
            let user = credentials.authenticate(&db)?;
            print_json(&tracker.recent_logs(user.id, id, limit.unwrap_or(recent))?)?;
        }
    }
    Ok(())
}
