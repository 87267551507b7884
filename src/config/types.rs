use crate::error::MarkrepError;
use crate::render::OutputFormat;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration from a `.markrep.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop directory cascade and jump directly to ~/.markrep.toml.
	#[serde(default)]
	pub root: bool,

	/// If true, use only this config and ignore everything above it.
	#[serde(default)]
	pub no_external_lookup: bool,

	/// Environment variable name that, if truthy, skips ~/.markrep.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// File of rule text, relative to the directory of this config file.
	#[serde(default)]
	pub rules_file: Option<PathBuf>,

	/// Inline rules, one rule-language line per entry.
	#[serde(default)]
	pub rules: Vec<String>,

	/// Default output format.
	#[serde(default)]
	pub format: Option<OutputFormat>,
}

impl Config {
	/// Validate that every inline rule is a single line.
	pub fn validate(&self) -> Result<(), MarkrepError> {
		match self.rules.iter().position(|rule| rule.contains('\n')) {
			Some(index) => Err(MarkrepError::MultiLineRule { index }),
			None => Ok(()),
		}
	}
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

impl LoadedConfig {
	/// The rules file resolved against this config's directory.
	pub fn rules_file_path(&self) -> Option<PathBuf> {
		let rules_file = self.config.rules_file.as_ref()?;
		Some(match self.path.parent() {
			Some(dir) => dir.join(rules_file),
			None => rules_file.clone(),
		})
	}
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Rule text from every config, in cascade order.
	pub rule_blocks: Vec<RuleBlock>,

	/// Output format from the most specific config that sets one.
	pub format: Option<OutputFormat>,

	/// Whether external lookup is disabled (from any config in cascade).
	pub no_external_lookup: bool,
}

impl MergedConfig {
	/// All rule text joined in cascade order.
	pub fn rule_text(&self) -> String {
		self.rule_blocks
			.iter()
			.map(|block| block.text.as_str())
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// A block of rule text with the file it came from.
#[derive(Debug, Clone)]
pub struct RuleBlock {
	/// The rule text.
	pub text: String,

	/// The config or rules file this text came from.
	pub source: PathBuf,
}
