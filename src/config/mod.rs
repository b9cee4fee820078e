//! Configuration loading for pipdesk.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layer merging in [`merger`]
//!
//! # Example
//!
//! ```
//! use pipdesk::config::load_config;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "log_tail_lines: 20").unwrap();
//!
//! let config = load_config(Some(&path)).unwrap();
//! assert_eq!(config.log_tail_lines, 20);
//! ```
//!
//! # Configuration File Locations
//!
//! 1. User config (`<config_dir>/pipdesk/config.yml`)
//! 2. An explicit `--config <path>`, which overrides the user config

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    load_config, load_config_value, load_from_paths, parse_config, user_config_dir,
    user_config_path, ConfigPaths,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::PipdeskConfig;
