pub mod config;
pub mod item;
pub mod user;

use std::path::Path;

use clap::Args;
use habitlog_core::{Accounts, Config, Database, User};

/// Credentials identifying the acting user.
#[derive(Args)]
pub struct Credentials {
    /// Username
    #[arg(long = "user", short = 'u')]
    pub username: String,
    /// Password
    #[arg(long, short = 'p')]
    pub password: String,
}

impl Credentials {
    pub fn authenticate(&self, db: &Database) -> Result<User, habitlog_core::CoreError> {
        Accounts::new(db).authenticate(&self.username, &self.password)
    }
}

/// Open the database named on the command line, or the configured one.
pub fn open_database(
    config: &Config,
    override_path: Option<&Path>,
) -> Result<Database, Box<dyn std::error::Error>> {
    let db = match override_path {
        Some(path) => Database::open_at(path)?,
        None => Database::open_at(&config.database_path()?)?,
    };
    Ok(db)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
