pub mod config;
pub mod gym;
pub mod membership;
pub mod progress;
pub mod status;
pub mod steps;
pub mod watch;
pub mod workout;

use gymtrack_core::{Config, DocumentStore, MetricsEngine};
use std::path::PathBuf;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Config, engine and document store shared by the document commands.
pub struct Context {
    pub config: Config,
    pub engine: MetricsEngine,
    pub store: DocumentStore,
}

impl Context {
    pub fn open(file: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load_or_default();
        let path = match file {
            Some(path) => path,
            None => config.document_path()?,
        };
        tracing::debug!(path = %path.display(), "opening user document");
        Ok(Self {
            engine: MetricsEngine::from_config(&config),
            store: DocumentStore::new(path),
            config,
        })
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
