//! Single-pass matching and rewriting for markrep.
//!
//! This module handles:
//! - Scanning source text once against a compiled rule set
//! - Classifying output into original, matched, and replaced segments
//! - Totalling match and replace counts
//!
//! The engine is pure: it performs no I/O and keeps no state between calls.
//! Compile once with [`crate::rules::compile_rules`] (or a
//! [`crate::rules::RuleCache`]) and call [`evaluate_compiled`] per source text.

pub mod scanner;
pub mod segment;

pub use scanner::{ScanOutput, scan};
pub use segment::{Segment, SegmentKind};

use crate::error::{MarkrepError, Result};
use crate::rules::{CompiledRules, RuleWarning, compile_rules};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

/// Result of evaluating rules against source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
	pub segments: Vec<Segment>,
	pub match_count: usize,
	pub replace_count: usize,

	/// Rules skipped because they failed to compile.
	pub warnings: Vec<RuleWarning>,
}

impl Evaluation {
	/// The rewritten document: every segment's text, concatenated.
	pub fn output_text(&self) -> String {
		self.segments.iter().map(|s| s.text.as_str()).collect()
	}
}

/// Compile `rule_text` and evaluate it against `source_text`.
pub fn evaluate(source_text: &str, rule_text: &str) -> Result<Evaluation> {
	let rules = compile_rules(rule_text);
	evaluate_compiled(&rules, source_text)
}

/// Evaluate already-compiled rules against `source_text`.
///
/// An unexpected failure inside the scanner is reported as
/// [`MarkrepError::EvaluationFailed`]; no partial result is returned.
pub fn evaluate_compiled(rules: &CompiledRules, source_text: &str) -> Result<Evaluation> {
	let output = panic::catch_unwind(AssertUnwindSafe(|| scan(rules, source_text))).map_err(
		|payload| MarkrepError::EvaluationFailed {
			message: panic_message(payload.as_ref()),
		},
	)?;

	Ok(Evaluation {
		segments: output.segments,
		match_count: output.match_count,
		replace_count: output.replace_count,
		warnings: rules.warnings.clone(),
	})
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"scanner panicked".to_string()
	}
}
