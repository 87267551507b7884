//! Configuration loading and parsing for markrep.
//!
//! This module handles:
//! - TOML config file parsing
//! - Directory cascade discovery
//! - Config merging into effective rule text and output format

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, discover_configs, load_merged_config, merge_configs, user_config_path,
};
pub use parser::{generate_init_template, parse_config_file, parse_config_str};
pub use types::{Config, LoadedConfig, MergedConfig, RuleBlock};
