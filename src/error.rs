use std::path::PathBuf;

/// Library-level structured errors for markrep.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum MarkrepError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Inline rule {index} spans multiple lines; use one entry per rule")]
	MultiLineRule { index: usize },

	#[error("Failed to read input: {path}")]
	InputReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid search pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Search term has no non-empty alternatives: {search}")]
	EmptyPattern { search: String },

	#[error("Evaluation failed: {message}")]
	EvaluationFailed { message: String },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using MarkrepError.
pub type Result<T> = std::result::Result<T, MarkrepError>;
