//! Configuration module for OSGenome
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use osgenome::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("osgenome.toml")).unwrap();
//! println!("Crawler will use {} request slots", config.crawler.concurrency());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, CatalogueConfig, ClassifierConfig, Config, CrawlMode, CrawlerConfig, DataConfig,
    RetryConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
