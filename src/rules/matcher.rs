use crate::error::{MarkrepError, Result};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Alternation between search segments.
pub const ALTERNATION_MARKER: &str = "[or]";

/// A backslash-escaped alternation marker, kept as literal text.
const ESCAPED_ALTERNATION: &str = "\\[or]";

/// Stand-in for escaped alternation markers while splitting.
const ALTERNATION_PLACEHOLDER: &str = "\u{E000}";

/// A typed, capturing placeholder in a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WildcardKind {
	/// `[num]`: one or more ASCII digits.
	Number,
	/// `[cjk]`: exactly one CJK Unified Ideograph.
	CjkChar,
}

impl WildcardKind {
	pub const ALL: [WildcardKind; 2] = [WildcardKind::Number, WildcardKind::CjkChar];

	/// The marker as written in rule text.
	pub fn marker(self) -> &'static str {
		match self {
			WildcardKind::Number => "[num]",
			WildcardKind::CjkChar => "[cjk]",
		}
	}

	/// The marker as it appears after `regex::escape`.
	fn escaped_marker(self) -> &'static str {
		match self {
			WildcardKind::Number => r"\[num\]",
			WildcardKind::CjkChar => r"\[cjk\]",
		}
	}

	/// Capturing sub-pattern substituted for the marker.
	fn capture_pattern(self) -> &'static str {
		match self {
			WildcardKind::Number => "([0-9]+)",
			WildcardKind::CjkChar => r"([\x{4E00}-\x{9FFF}])",
		}
	}

	/// The wildcard whose marker starts `text`, if any.
	pub fn at_start(text: &str) -> Option<WildcardKind> {
		Self::ALL
			.into_iter()
			.find(|kind| text.starts_with(kind.marker()))
	}
}

/// A match found by a compiled matcher. Offsets are byte offsets into the
/// haystack the matcher ran against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
	pub start: usize,
	pub end: usize,
	groups: Vec<Option<Range<usize>>>,
}

impl MatchCandidate {
	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// The matched text.
	pub fn text<'h>(&self, haystack: &'h str) -> &'h str {
		&haystack[self.start..self.end]
	}

	/// The text of capture group `n` (1-based), if it participated.
	pub fn group<'h>(&self, haystack: &'h str, n: usize) -> Option<&'h str> {
		let range = self.groups.get(n.checked_sub(1)?)?.as_ref()?;
		Some(&haystack[range.clone()])
	}

	/// Shift every offset by `by`, for candidates found in a sub-slice.
	pub fn shifted(mut self, by: usize) -> Self {
		self.start += by;
		self.end += by;
		for range in self.groups.iter_mut().flatten() {
			*range = range.start + by..range.end + by;
		}
		self
	}
}

/// Executable form of a rule's search term.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
	/// Multi-alternative pattern.
	pub pattern: Regex,

	/// Literal alternatives the pattern was built from.
	pub alternatives: Vec<String>,

	/// Wildcard kinds in capture-group order.
	pub wildcard_order: Vec<WildcardKind>,
}

impl CompiledMatcher {
	/// Compile a search term (with any `[line]` marker already stripped).
	pub fn compile(search: &str) -> Result<Self> {
		let alternatives = split_alternatives(search);
		if alternatives.is_empty() {
			return Err(MarkrepError::EmptyPattern {
				search: search.to_string(),
			});
		}

		let mut wildcard_order = Vec::new();
		let branches: Vec<String> = alternatives
			.iter()
			.map(|alt| substitute_wildcards(&regex::escape(alt), &mut wildcard_order))
			.collect();
		let source = branches.join("|");

		let pattern = Regex::new(&source).map_err(|source_err| MarkrepError::InvalidPattern {
			pattern: source.clone(),
			source: source_err,
		})?;
		debug_assert_eq!(pattern.captures_len() - 1, wildcard_order.len());

		Ok(CompiledMatcher {
			pattern,
			alternatives,
			wildcard_order,
		})
	}

	/// Find the leftmost match starting at or after `start`.
	pub fn find_at(&self, haystack: &str, start: usize) -> Option<MatchCandidate> {
		let caps = self.pattern.captures_at(haystack, start)?;
		let whole = caps.get(0)?;
		let groups = caps
			.iter()
			.skip(1)
			.map(|group| group.map(|m| m.range()))
			.collect();
		Some(MatchCandidate {
			start: whole.start(),
			end: whole.end(),
			groups,
		})
	}
}

/// Split a search term on unescaped `[or]` markers, trimming whitespace that
/// surrounds each marker. Empty alternatives are dropped.
fn split_alternatives(search: &str) -> Vec<String> {
	let protected = search.replace(ESCAPED_ALTERNATION, ALTERNATION_PLACEHOLDER);
	let parts: Vec<&str> = protected.split(ALTERNATION_MARKER).collect();
	let last = parts.len() - 1;

	parts
		.iter()
		.enumerate()
		.map(|(i, part)| {
			let mut part = *part;
			if i > 0 {
				part = part.trim_start();
			}
			if i < last {
				part = part.trim_end();
			}
			part.replace(ALTERNATION_PLACEHOLDER, ALTERNATION_MARKER)
		})
		.filter(|part| !part.is_empty())
		.collect()
}

/// Replace escaped wildcard markers with their capture patterns, recording
/// each kind in left-to-right order.
fn substitute_wildcards(escaped: &str, order: &mut Vec<WildcardKind>) -> String {
	let mut out = String::with_capacity(escaped.len());
	let mut rest = escaped;

	loop {
		let next = WildcardKind::ALL
			.into_iter()
			.filter_map(|kind| rest.find(kind.escaped_marker()).map(|pos| (pos, kind)))
			.min_by_key(|(pos, _)| *pos);

		match next {
			Some((pos, kind)) => {
				out.push_str(&rest[..pos]);
				out.push_str(kind.capture_pattern());
				order.push(kind);
				rest = &rest[pos + kind.escaped_marker().len()..];
			}
			None => {
				out.push_str(rest);
				return out;
			}
		}
	}
}
