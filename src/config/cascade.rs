use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleBlock};
use crate::error::{MarkrepError, Result};
use std::path::{Path, PathBuf};

/// File name looked up in each directory of the cascade.
pub const CONFIG_FILE_NAME: &str = ".markrep.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.markrep.toml`
/// 2. If found and `root = true`, skip to user config only
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.markrep.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			let config = parse_config_file(&config_path)?;
			log::debug!("Loaded config {}", config_path.display());

			if config.no_external_lookup {
				configs.push(LoadedConfig {
					config,
					path: config_path,
				});
				return Ok(configs);
			}

			let stop = config.root;
			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if stop {
				break;
			}
		}

		match current_dir.parent() {
			Some(parent) => current_dir = parent.to_path_buf(),
			None => break,
		}
	}

	if let Some(user_config) = load_user_config(&configs)? {
		// The walk may already have reached the home directory.
		if !configs.iter().any(|c| c.path == user_config.path) {
			configs.push(user_config);
		}
	}

	Ok(configs)
}

/// Load the user's ~/.markrep.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var
			&& is_env_truthy(env_var)
		{
			log::debug!("User config lookup disabled by {env_var}");
			return Ok(None);
		}
	}

	let user_config_path = user_config_path()?;

	if user_config_path.exists() {
		let config = parse_config_file(&user_config_path)?;
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Each config contributes its rules file (if any) followed by its inline
/// rules, in cascade order. The format comes from the first config that sets it.
pub fn merge_configs(configs: &[LoadedConfig]) -> Result<MergedConfig> {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		if let Some(rules_path) = loaded.rules_file_path() {
			let text = std::fs::read_to_string(&rules_path).map_err(|source| {
				MarkrepError::ConfigReadError {
					path: rules_path.clone(),
					source,
				}
			})?;
			merged.rule_blocks.push(RuleBlock {
				text,
				source: rules_path,
			});
		}

		if !loaded.config.rules.is_empty() {
			merged.rule_blocks.push(RuleBlock {
				text: loaded.config.rules.join("\n"),
				source: loaded.path.clone(),
			});
		}

		if merged.format.is_none() {
			merged.format = loaded.config.format;
		}

		if loaded.config.no_external_lookup {
			merged.no_external_lookup = true;
		}
	}

	Ok(merged)
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	merge_configs(&configs)
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(MarkrepError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::Config;
	use crate::render::OutputFormat;

	fn loaded(config: Config, path: &str) -> LoadedConfig {
		LoadedConfig {
			config,
			path: PathBuf::from(path),
		}
	}

	#[test]
	fn test_is_env_truthy() {
		// SAFETY: These env var operations are safe in single-threaded test context
		unsafe {
			std::env::remove_var("TEST_MARKREP_ENV_1");
			assert!(!is_env_truthy("TEST_MARKREP_ENV_1"));

			std::env::set_var("TEST_MARKREP_ENV_2", "");
			assert!(!is_env_truthy("TEST_MARKREP_ENV_2"));

			std::env::set_var("TEST_MARKREP_ENV_3", "0");
			assert!(!is_env_truthy("TEST_MARKREP_ENV_3"));

			std::env::set_var("TEST_MARKREP_ENV_4", "FALSE");
			assert!(!is_env_truthy("TEST_MARKREP_ENV_4"));

			std::env::set_var("TEST_MARKREP_ENV_5", "no");
			assert!(!is_env_truthy("TEST_MARKREP_ENV_5"));

			std::env::set_var("TEST_MARKREP_ENV_6", "1");
			assert!(is_env_truthy("TEST_MARKREP_ENV_6"));

			std::env::set_var("TEST_MARKREP_ENV_7", "yes");
			assert!(is_env_truthy("TEST_MARKREP_ENV_7"));

			for i in 1..=7 {
				std::env::remove_var(format!("TEST_MARKREP_ENV_{}", i));
			}
		}
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path().unwrap();
		assert!(path.ends_with(".markrep.toml"));
	}

	#[test]
	fn test_merge_inline_rules_in_cascade_order() {
		let near = Config {
			rules: vec!["a///b".to_string()],
			..Default::default()
		};
		let far = Config {
			rules: vec!["c".to_string(), "d".to_string()],
			format: Some(OutputFormat::Json),
			..Default::default()
		};
		let merged =
			merge_configs(&[loaded(near, "/p/q/.markrep.toml"), loaded(far, "/p/.markrep.toml")])
				.unwrap();

		assert_eq!(merged.rule_text(), "a///b\nc\nd");
		assert_eq!(merged.rule_blocks[0].source, PathBuf::from("/p/q/.markrep.toml"));
		assert_eq!(merged.format, Some(OutputFormat::Json));
	}

	#[test]
	fn test_merge_prefers_most_specific_format() {
		let near = Config {
			format: Some(OutputFormat::Marked),
			..Default::default()
		};
		let far = Config {
			format: Some(OutputFormat::Json),
			..Default::default()
		};
		let merged = merge_configs(&[loaded(near, "/a/.markrep.toml"), loaded(far, "/.markrep.toml")])
			.unwrap();
		assert_eq!(merged.format, Some(OutputFormat::Marked));
	}

	#[test]
	fn test_merge_reads_rules_file_relative_to_config() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("rules.txt"), "x///y\n").unwrap();
		let config = Config {
			rules_file: Some(PathBuf::from("rules.txt")),
			rules: vec!["z".to_string()],
			..Default::default()
		};
		let config_path = dir.path().join(CONFIG_FILE_NAME);
		let merged = merge_configs(&[LoadedConfig {
			config,
			path: config_path,
		}])
		.unwrap();

		assert_eq!(merged.rule_text(), "x///y\n\nz");
		assert_eq!(merged.rule_blocks[0].source, dir.path().join("rules.txt"));
	}

	#[test]
	fn test_merge_missing_rules_file_fails() {
		let config = Config {
			rules_file: Some(PathBuf::from("does-not-exist.txt")),
			..Default::default()
		};
		let result = merge_configs(&[loaded(config, "/nonexistent/.markrep.toml")]);
		assert!(matches!(result, Err(MarkrepError::ConfigReadError { .. })));
	}

	#[test]
	fn test_discover_stops_at_root() {
		let dir = tempfile::tempdir().unwrap();
		let nested = dir.path().join("a/b");
		std::fs::create_dir_all(&nested).unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE_NAME), "rules = [\"outer\"]").unwrap();
		std::fs::write(
			dir.path().join("a").join(CONFIG_FILE_NAME),
			"root = true\nrules = [\"inner\"]",
		)
		.unwrap();

		let configs = discover_configs(&nested).unwrap();
		assert_eq!(configs[0].path, dir.path().join("a").join(CONFIG_FILE_NAME));
		assert!(
			!configs
				.iter()
				.any(|c| c.path == dir.path().join(CONFIG_FILE_NAME))
		);
	}

	#[test]
	fn test_discover_no_external_lookup_is_exclusive() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILE_NAME), "no-external-lookup = true").unwrap();

		let configs = discover_configs(dir.path()).unwrap();
		assert_eq!(configs.len(), 1);
	}
}
