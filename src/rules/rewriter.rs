use crate::rules::matcher::{MatchCandidate, WildcardKind};
use crate::rules::parser::{LINE_MARKER, Rule};

/// One piece of a compiled replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
	/// Text copied verbatim.
	Literal(String),

	/// Capture group reference (1-based).
	CaptureRef(usize),

	/// The matched line without its trailing terminator (line mode only).
	WholeLineRef,
}

/// Compiled replacement side of a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTemplate {
	tokens: Vec<TemplateToken>,
}

impl ReplacementTemplate {
	/// Compile the replacement half of `rule` against the wildcard kinds its
	/// search half captures.
	///
	/// - A `$` followed by a capture number is a capture reference; any other
	///   `$` is a literal dollar sign.
	/// - The i-th `[num]`/`[cjk]` token refers to capture i when the search
	///   side captured the same kind at that position; otherwise it stays literal.
	/// - In a line-mode rule without wildcards, `[line]` echoes the matched line.
	pub fn compile(rule: &Rule, wildcard_order: &[WildcardKind]) -> Self {
		let mut template = ReplacementTemplate::default();
		if rule.is_delete {
			return template;
		}

		let group_count = wildcard_order.len();
		let expand_line = rule.is_line_mode && rule.is_replacement && wildcard_order.is_empty();
		let mut wildcard_index = 0;
		let mut rest = rule.effective_replace();

		while let Some(ch) = rest.chars().next() {
			if ch == '$' {
				match parse_capture_ref(&rest[1..], group_count) {
					Some((n, digits)) => {
						template.tokens.push(TemplateToken::CaptureRef(n));
						rest = &rest[1 + digits..];
					}
					None => {
						template.push_literal("$");
						rest = &rest[1..];
					}
				}
				continue;
			}

			if group_count > 0
				&& let Some(kind) = WildcardKind::at_start(rest)
			{
				if wildcard_order.get(wildcard_index) == Some(&kind) {
					template.tokens.push(TemplateToken::CaptureRef(wildcard_index + 1));
				} else {
					template.push_literal(kind.marker());
				}
				wildcard_index += 1;
				rest = &rest[kind.marker().len()..];
				continue;
			}

			if expand_line && rest.starts_with(LINE_MARKER) {
				template.tokens.push(TemplateToken::WholeLineRef);
				rest = &rest[LINE_MARKER.len()..];
				continue;
			}

			let len = ch.len_utf8();
			template.push_literal(&rest[..len]);
			rest = &rest[len..];
		}

		template
	}

	pub fn tokens(&self) -> &[TemplateToken] {
		&self.tokens
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Render against a match. `line` is the matched line for line-mode
	/// rules, with or without its terminator.
	pub fn render(&self, haystack: &str, candidate: &MatchCandidate, line: &str) -> String {
		let mut out = String::new();
		for token in &self.tokens {
			match token {
				TemplateToken::Literal(text) => out.push_str(text),
				TemplateToken::CaptureRef(n) => {
					out.push_str(candidate.group(haystack, *n).unwrap_or_default());
				}
				TemplateToken::WholeLineRef => out.push_str(strip_terminator(line)),
			}
		}
		out
	}

	fn push_literal(&mut self, text: &str) {
		if let Some(TemplateToken::Literal(last)) = self.tokens.last_mut() {
			last.push_str(text);
		} else {
			self.tokens.push(TemplateToken::Literal(text.to_string()));
		}
	}
}

/// Parse the digits after a `$`. Returns the group number and how many
/// digits it consumed. Two digits are taken only when they name an existing
/// group; `$0` is not a reference.
fn parse_capture_ref(after: &str, group_count: usize) -> Option<(usize, usize)> {
	let digit = |b: Option<&u8>| b.filter(|b| b.is_ascii_digit()).map(|b| usize::from(b - b'0'));
	let bytes = after.as_bytes();
	let first = digit(bytes.first())?;

	if let Some(second) = digit(bytes.get(1)) {
		let n = first * 10 + second;
		if n >= 1 && n <= group_count {
			return Some((n, 2));
		}
	}

	(first >= 1).then_some((first, 1))
}

/// Strip one trailing `\n` or `\r\n`.
pub fn strip_terminator(line: &str) -> &str {
	line.strip_suffix('\n')
		.map(|l| l.strip_suffix('\r').unwrap_or(l))
		.unwrap_or(line)
}
