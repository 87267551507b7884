use crate::engine::segment::{Segment, SegmentKind};
use crate::rules::compiled::{CompiledRule, CompiledRules};
use crate::rules::matcher::MatchCandidate;
use crate::rules::rewriter::strip_terminator;

/// Segments and counters produced by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
	pub segments: Vec<Segment>,
	pub match_count: usize,
	pub replace_count: usize,
}

impl ScanOutput {
	fn push(&mut self, segment: Segment) {
		match segment.kind {
			SegmentKind::Original => {}
			SegmentKind::Added => self.match_count += 1,
			SegmentKind::Replaced => self.replace_count += 1,
		}
		self.segments.push(segment);
	}

	fn push_original(&mut self, text: &str) {
		if !text.is_empty() {
			self.push(Segment::original(text));
		}
	}
}

/// A whole line claimed by a line-mode rule.
#[derive(Debug)]
struct PriorityRange<'r> {
	line_start: usize,
	line_end: usize,
	rule: &'r CompiledRule,
	candidate: MatchCandidate,
}

impl PriorityRange<'_> {
	fn render(&self, source: &str) -> Segment {
		let line = &source[self.line_start..self.line_end];
		let Some(template) = &self.rule.template else {
			return Segment::new(SegmentKind::Added, line);
		};

		let content = template.render(source, &self.candidate, line);
		if content.is_empty() && self.rule.rule.is_delete {
			return Segment::new(SegmentKind::Replaced, content);
		}
		let terminator = &line[strip_terminator(line).len()..];
		Segment::new(SegmentKind::Replaced, content + terminator)
	}
}

/// Per-matcher memo of the next match at or after the cursor.
#[derive(Debug, Clone)]
enum Memo {
	Stale,
	Exhausted,
	Found(MatchCandidate),
}

/// Scan `source` once against compiled rules.
///
/// Line-mode rules claim whole lines first (first rule in definition order
/// wins a line). Between claimed lines, text-mode rules compete: leftmost
/// start wins, then longest, then earliest rule. A text-mode match never
/// crosses into a claimed line.
pub fn scan(rules: &CompiledRules, source: &str) -> ScanOutput {
	let mut out = ScanOutput::default();
	if source.is_empty() {
		return out;
	}
	if rules.is_empty() {
		out.push_original(source);
		return out;
	}

	let ranges = priority_ranges(rules, source);
	let text_rules: Vec<&CompiledRule> = rules.text_mode().collect();
	let mut memo = vec![Memo::Stale; text_rules.len()];
	let mut pending = ranges.iter().peekable();
	let mut cursor = 0;

	while cursor < source.len() {
		if let Some(range) = pending.next_if(|r| r.line_start == cursor) {
			out.push(range.render(source));
			cursor = range.line_end;
			continue;
		}

		let limit = pending.peek().map_or(source.len(), |r| r.line_start);
		match next_winner(&text_rules, &mut memo, source, cursor, limit) {
			Some((rule, candidate)) => {
				out.push_original(&source[cursor..candidate.start]);
				out.push(render_text_match(rule, source, &candidate));
				cursor = candidate.end;
			}
			None => {
				out.push_original(&source[cursor..limit]);
				cursor = limit;
			}
		}
	}

	log::debug!(
		"Scanned {} bytes: {} priority lines, {} matches, {} replacements",
		source.len(),
		ranges.len(),
		out.match_count,
		out.replace_count
	);
	out
}

/// Pre-pass: at most one range per line, from the first line-mode rule
/// that matches anywhere in it.
fn priority_ranges<'r>(rules: &'r CompiledRules, source: &str) -> Vec<PriorityRange<'r>> {
	let line_rules: Vec<&CompiledRule> = rules.line_mode().collect();
	if line_rules.is_empty() {
		return Vec::new();
	}

	let mut ranges = Vec::new();
	let mut line_start = 0;
	for line in source.split_inclusive('\n') {
		let content = strip_terminator(line);
		let claim = line_rules.iter().find_map(|rule| {
			rule.matcher
				.find_at(content, 0)
				.map(|candidate| (*rule, candidate.shifted(line_start)))
		});
		if let Some((rule, candidate)) = claim {
			ranges.push(PriorityRange {
				line_start,
				line_end: line_start + line.len(),
				rule,
				candidate,
			});
		}
		line_start += line.len();
	}
	ranges
}

/// Pick the winning text-mode candidate in `[cursor, limit)`, refreshing
/// memoized matches that fell behind the cursor.
fn next_winner<'r>(
	text_rules: &[&'r CompiledRule],
	memo: &mut [Memo],
	source: &str,
	cursor: usize,
	limit: usize,
) -> Option<(&'r CompiledRule, MatchCandidate)> {
	let mut best: Option<(usize, usize, usize)> = None;

	for (i, rule) in text_rules.iter().enumerate() {
		let behind = matches!(&memo[i], Memo::Found(c) if c.start < cursor);
		if behind || matches!(memo[i], Memo::Stale) {
			memo[i] = rule
				.matcher
				.find_at(source, cursor)
				.map_or(Memo::Exhausted, Memo::Found);
		}

		let Memo::Found(candidate) = &memo[i] else {
			continue;
		};
		// Patterns cannot match empty; guard anyway so the cursor always advances.
		if candidate.is_empty() || candidate.start >= limit || candidate.end > limit {
			continue;
		}

		let (start, len) = (candidate.start, candidate.len());
		let better = match best {
			None => true,
			Some((_, best_start, best_len)) => {
				start < best_start || (start == best_start && len > best_len)
			}
		};
		if better {
			best = Some((i, start, len));
		}
	}

	let (index, _, _) = best?;
	match &memo[index] {
		Memo::Found(candidate) => Some((text_rules[index], candidate.clone())),
		_ => None,
	}
}

fn render_text_match(rule: &CompiledRule, source: &str, candidate: &MatchCandidate) -> Segment {
	let matched = candidate.text(source);
	match &rule.template {
		Some(template) => Segment::new(
			SegmentKind::Replaced,
			template.render(source, candidate, matched),
		),
		None => Segment::new(SegmentKind::Added, matched),
	}
}
