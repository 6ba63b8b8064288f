//! Configuration module for Spell-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use spell_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Listing pages {}..={}", config.listing.start_point, config.listing.end_point);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DetailConfig, HttpConfig, ListingConfig, PipelineConfig, RetryConfig, SelectorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
