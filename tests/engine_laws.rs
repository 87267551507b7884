use markrep_cli::engine::{Evaluation, Segment, SegmentKind, evaluate, evaluate_compiled};
use markrep_cli::rules::{RuleCache, compile_rules};

fn eval(source: &str, rules: &str) -> Evaluation {
	evaluate(source, rules).unwrap()
}

fn non_original(eval: &Evaluation) -> Vec<(SegmentKind, &str)> {
	eval.segments
		.iter()
		.filter(|s| s.kind != SegmentKind::Original)
		.map(|s| (s.kind, s.text.as_str()))
		.collect()
}

// ============================================================================
// Empty inputs
// ============================================================================

#[test]
fn test_empty_rules_yield_whole_source() {
	for source in ["x", "two\nlines\n", "  ", "第一章"] {
		let result = eval(source, "");
		assert_eq!(result.segments, vec![Segment::original(source)]);
		assert_eq!((result.match_count, result.replace_count), (0, 0));
	}
}

#[test]
fn test_comment_only_rules_are_empty() {
	let result = eval("abc", "/// nothing here\n\n   ");
	assert_eq!(result.segments, vec![Segment::original("abc")]);
}

#[test]
fn test_empty_source_has_no_segments() {
	let result = eval("", "a///b\n[line]c");
	assert!(result.segments.is_empty());
	assert_eq!((result.match_count, result.replace_count), (0, 0));
}

// ============================================================================
// Tie-break laws
// ============================================================================

#[test]
fn test_leftmost_wins_regardless_of_rule_order() {
	let result = eval("Banana", "na\nBa");
	assert_eq!(result.segments[0], Segment::new(SegmentKind::Added, "Ba"));
	assert_eq!(
		non_original(&result),
		vec![
			(SegmentKind::Added, "Ba"),
			(SegmentKind::Added, "na"),
			(SegmentKind::Added, "na"),
		]
	);
}

#[test]
fn test_longest_wins_at_same_start() {
	let result = eval("AppleJuice", "Apple\nAppleJuice");
	assert_eq!(
		result.segments,
		vec![Segment::new(SegmentKind::Added, "AppleJuice")]
	);
}

#[test]
fn test_first_defined_wins_identical_span() {
	let result = eval("Test", "Test\nTest///Done");
	assert_eq!(result.segments, vec![Segment::new(SegmentKind::Added, "Test")]);
	assert_eq!((result.match_count, result.replace_count), (1, 0));

	let swapped = eval("Test", "Test///Done\nTest");
	assert_eq!(swapped.output_text(), "Done");
}

#[test]
fn test_alternation_is_leftmost_first_within_a_rule() {
	let result = eval("abc", "ab [or] abc///X");
	assert_eq!(result.output_text(), "Xc");
}

// ============================================================================
// Line mode
// ============================================================================

#[test]
fn test_line_mode_precedes_text_mode() {
	let source = "alpha beta\ngamma beta\n";
	let result = eval(source, "beta///B\n[line]gamma");
	assert_eq!(
		result.segments,
		vec![
			Segment::original("alpha "),
			Segment::new(SegmentKind::Replaced, "B"),
			Segment::original("\n"),
			Segment::new(SegmentKind::Added, "gamma beta\n"),
		]
	);
}

#[test]
fn test_delete_removes_lines_and_terminators() {
	let source = "start\nLog: one\nmiddle\nLog: two\nend\n";
	let result = eval(source, "[line]Log///[del]");
	let output = result.output_text();
	assert_eq!(output, "start\nmiddle\nend\n");
	assert_eq!(
		output.lines().count(),
		source.lines().count() - result.replace_count
	);
}

#[test]
fn test_line_echo_template() {
	let result = eval("a\nTODO fix\nb", "[line]TODO///- [ ] [line]");
	assert_eq!(result.output_text(), "a\n- [ ] TODO fix\nb");
}

// ============================================================================
// Wildcards and templates
// ============================================================================

#[test]
fn test_wildcard_round_trip() {
	assert_eq!(eval("ID:123", "ID:[num]///ID#$1").output_text(), "ID#123");
	assert_eq!(eval("2024-01", "[num]-[num]///$2.$1").output_text(), "01.2024");
}

#[test]
fn test_mismatched_wildcard_token_left_literal() {
	let result = eval("v42", "v[num]///[cjk]!");
	assert_eq!(result.output_text(), "[cjk]!");
}

#[test]
fn test_cjk_wildcard_echo() {
	let result = eval("第三章", "第[cjk]章///Chapter [cjk]");
	assert_eq!(result.output_text(), "Chapter 三");
}

#[test]
fn test_escaped_alternation_is_literal() {
	let result = eval("a[or]b a", r"a\[or]b///X");
	assert_eq!(result.output_text(), "X a");
}

#[test]
fn test_metacharacters_match_literally() {
	let result = eval("1+1=2 and 1x1", "1+1///two");
	assert_eq!(result.output_text(), "two=2 and 1x1");
}

// ============================================================================
// Counts, diagnostics, idempotence
// ============================================================================

#[test]
fn test_counts_equal_non_original_segments() {
	let source = "cat dog\nbird cat\nfish\n";
	let result = eval(source, "cat\ndog///DOG\n[line]fish///[del]\n[line]bird");
	let non_original = non_original(&result).len();
	assert_eq!(result.match_count + result.replace_count, non_original);
	assert_eq!((result.match_count, result.replace_count), (2, 2));
}

#[test]
fn test_invalid_rule_is_skipped_with_warning() {
	let result = eval("keep this", "[or] [or]\nkeep///KEEP");
	assert_eq!(result.output_text(), "KEEP this");
	assert_eq!(result.warnings.len(), 1);
	assert_eq!(result.warnings[0].line, 1);
}

#[test]
fn test_compilation_is_idempotent() {
	let rules = "[line]x///y\na [or] b///[num]\n[num]///<$1>";
	let first = compile_rules(rules);
	let second = compile_rules(rules);
	for source in ["", "a b 12", "x\nab 3\n", "nothing"] {
		assert_eq!(
			evaluate_compiled(&first, source).unwrap(),
			evaluate_compiled(&second, source).unwrap()
		);
	}
}

#[test]
fn test_cached_rules_scan_many_sources() {
	let mut cache = RuleCache::new();
	let rules = cache.get("[num]///#");
	assert_eq!(evaluate_compiled(&rules, "a1b22").unwrap().output_text(), "a#b#");
	let rules = cache.get("[num]///#");
	assert_eq!(evaluate_compiled(&rules, "333").unwrap().output_text(), "#");
}
