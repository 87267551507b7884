/// Marks a whole line as a comment when it leads the line.
pub const COMMENT_MARKER: &str = "///";

/// Separates the search half from the replace half of a rule.
pub const SEPARATOR: &str = "///";

/// Leading marker that makes the whole matched line the match unit.
pub const LINE_MARKER: &str = "[line]";

/// Replacement value that deletes the match.
pub const DELETE_MARKER: &str = "[del]";

/// One parsed line of rule text.
///
/// Rules are immutable once parsed; a change to the rule text rebuilds the
/// whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
	/// 1-based line number in the rule text (for diagnostics).
	pub line: usize,

	/// Search half as typed, including any leading `[line]` marker.
	pub raw_search: String,

	/// Replace half as typed. Equals `raw_search` when the rule has no separator.
	pub raw_replace: String,

	/// Whether the rule rewrites matches rather than only highlighting them.
	pub is_replacement: bool,

	/// Whether the search half starts with `[line]`.
	pub is_line_mode: bool,

	/// Whether the replace half is exactly `[del]`.
	pub is_delete: bool,
}

impl Rule {
	/// The search term with any leading `[line]` marker stripped.
	pub fn search_term(&self) -> &str {
		if self.is_line_mode {
			&self.raw_search[LINE_MARKER.len()..]
		} else {
			&self.raw_search
		}
	}

	/// The replacement text that takes effect, empty for delete rules.
	pub fn effective_replace(&self) -> &str {
		if self.is_delete { "" } else { &self.raw_replace }
	}
}

/// Parse rule text into an ordered list of rules.
///
/// Order is significant: it is the final tie-break in the scanner and decides
/// which line-mode rule claims a line.
pub fn parse_rules(rule_text: &str) -> Vec<Rule> {
	rule_text
		.lines()
		.enumerate()
		.filter_map(|(index, line)| parse_rule_line(line, index + 1))
		.collect()
}

/// Parse a single line of rule text. Returns `None` for blank lines,
/// comments, and lines whose search half is empty.
pub fn parse_rule_line(line: &str, line_number: usize) -> Option<Rule> {
	let trimmed = line.trim();
	if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
		return None;
	}

	let (raw_search, raw_replace, is_replacement) = match trimmed.find(SEPARATOR) {
		Some(pos) => {
			let search = trimmed[..pos].trim();
			let replace = trimmed[pos + SEPARATOR.len()..].trim();
			(search.to_string(), replace.to_string(), true)
		}
		None => (trimmed.to_string(), trimmed.to_string(), false),
	};

	if raw_search.is_empty() {
		return None;
	}

	let is_line_mode = raw_search.starts_with(LINE_MARKER);
	let is_delete = is_replacement && raw_replace == DELETE_MARKER;

	Some(Rule {
		line: line_number,
		raw_search,
		raw_replace,
		is_replacement,
		is_line_mode,
		is_delete,
	})
}
