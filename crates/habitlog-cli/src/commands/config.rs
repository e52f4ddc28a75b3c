//! Configuration commands for CLI.

use clap::Subcommand;
use habitlog_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dot-separated key, e.g. `defaults.decay_rate`
        key: String,
    },
    /// Set a config value
    Set {
        key: String,
        value: String,
    },
    /// Show the whole configuration as TOML
    Show,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown config key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
