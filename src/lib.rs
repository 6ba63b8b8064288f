//! Spell-Harvest: a paginated rules-reference scraper
//!
//! This crate fetches paginated listing pages and detail pages, extracts
//! structured records from the HTML through pluggable CSS-selector strategies,
//! and hands the results to a notifier or to a second pipeline stage.

pub mod config;
pub mod loader;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod strategy;
pub mod worker;

use thiserror::Error;

/// Main error type for Spell-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Position {position} is outside the explicit index list (length {len})")]
    IndexOutOfRange { position: u32, len: usize },

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Worker '{name}' cannot start from state {state}")]
    InvalidStart {
        name: String,
        state: worker::WorkerState,
    },

    #[error("Pipeline stage failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while building an extraction strategy from selector data
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Invalid CSS selector for {field}: '{selector}'")]
    InvalidSelector { field: String, selector: String },
}

/// Per-page failure to turn loaded markup into a document
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    #[error("markup produced no document content")]
    Empty,
}

/// Result type alias for Spell-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use loader::{HttpLoader, LoaderSettings, PageLoader};
pub use model::{LinkList, SpellRecord};
pub use notify::{CollectingNotifier, LogNotifier, Notifier};
pub use pipeline::{TwoStagePipeline, TwoStageReport};
pub use strategy::{LinkListStrategy, ParsingStrategy, SpellStrategy};
pub use worker::{ParserWorker, RetryPolicy, RunReport, WorkerHandle, WorkerState};
