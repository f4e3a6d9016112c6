use clap::Subcommand;
use gymtrack_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, e.g. the step threshold or the refresh period
    Get {
        /// Dot-path key: steps.threshold_g, steps.debounce_ms,
        /// steps.kcal_per_step, goal.kcal_per_kg, polling.refresh_secs,
        /// polling.rollover_check_secs, storage.document_path, profile.height_cm
        key: String,
    },
    /// Change one setting and write config.toml
    Set {
        /// Dot-path key (see `config get`)
        key: String,
        /// New value; numbers for tuning keys, text for storage.document_path
        value: String,
    },
    /// Print config.toml as currently loaded
    List,
    /// Restore the default step, goal and polling settings
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::info!(%key, %value, "config updated");
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
