//! Account commands for CLI.

use std::path::Path;

use chrono::Utc;
use clap::Subcommand;
use habitlog_core::{Accounts, Config};

use super::{open_database, print_json, Credentials};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account
    Signup {
        /// Username
        username: String,
        /// Password
        #[arg(long, short = 'p')]
        password: String,
        /// Password again
        #[arg(long)]
        confirm: String,
    },
    /// Check credentials and print the account
    Whoami {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Delete an account with all of its items and logs
    Delete {
        #[command(flatten)]
        credentials: Credentials,
    },
}

pub fn run(action: UserAction, db_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = open_database(&config, db_path)?;
    let accounts = Accounts::new(&db);

    match action {
        UserAction::Signup {
            username,
            password,
            confirm,
        } => {
            let user = accounts.signup(&username, &password, &confirm, Utc::now())?;
            print_json(&user)?;
        }
        UserAction::Whoami { credentials } => {
            let user = credentials.authenticate(&db)?;
            print_json(&user)?;
        }
        UserAction::Delete { credentials } => {
            let user = credentials.authenticate(&db)?;
            accounts.delete_user(user.id)?;
            println!("User deleted: {}", user.username);
        }
    }
    Ok(())
}
