use crate::config::types::Config;
use crate::error::{MarkrepError, Result};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| MarkrepError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let config: Config =
		toml::from_str(content).map_err(|source| MarkrepError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?;

	config.validate()?;

	Ok(config)
}

/// Template written by `markrep --init`.
pub fn generate_init_template() -> &'static str {
	r#"# markrep configuration
#
# Rule language (one rule per line):
#   search /// replace    replace every match of `search`
#   search                highlight every match of `search`
#   [line]search /// x    replace the whole line containing `search`
#   a [or] b              match either alternative (\[or] is literal)
#   [num] / [cjk]         capture a digit run / one CJK ideograph
#   $1, [num]             reuse a capture in the replacement
#   /// [del]             delete the match (and its line ending in line mode)

# Stop looking for configs in parent directories.
root = true

# Default output: plain, marked, annotated, or json.
format = "marked"

# Optional rules file, relative to this config.
# rules-file = "rules.txt"

rules = [
    "/// comment lines start with ///",
    "TODO [or] FIXME",
]
"#
}
