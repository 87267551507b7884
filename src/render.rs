//! Presentation of evaluation results.
//!
//! The engine only produces typed text runs; this module turns them into
//! something a terminal or another program can consume.

use crate::engine::{Evaluation, SegmentKind};
use crossterm::style::{Stylize, style};
use serde::Deserialize;
use std::fmt::Write;

/// How to present an evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
	/// The rewritten text only.
	#[default]
	Plain,
	/// Matches wrapped in `[[...]]`, replacements in `{{...}}`.
	Marked,
	/// Matches and replacements highlighted with ANSI colors.
	Annotated,
	/// Segments and counts as JSON.
	Json,
}

/// Render an evaluation in the given format.
pub fn render(eval: &Evaluation, format: OutputFormat) -> String {
	match format {
		OutputFormat::Plain => eval.output_text(),
		OutputFormat::Marked => render_marked(eval),
		OutputFormat::Annotated => render_annotated(eval),
		OutputFormat::Json => render_json(eval),
	}
}

fn render_marked(eval: &Evaluation) -> String {
	let mut out = String::new();
	for segment in &eval.segments {
		match segment.kind {
			SegmentKind::Original => out.push_str(&segment.text),
			SegmentKind::Added => {
				let _ = write!(out, "[[{}]]", segment.text);
			}
			SegmentKind::Replaced => {
				let _ = write!(out, "{{{{{}}}}}", segment.text);
			}
		}
	}
	out
}

fn render_annotated(eval: &Evaluation) -> String {
	let mut out = String::new();
	for segment in &eval.segments {
		let text = segment.text.as_str();
		let _ = match segment.kind {
			SegmentKind::Original => write!(out, "{text}"),
			SegmentKind::Added => write!(out, "{}", style(text).black().on_yellow()),
			SegmentKind::Replaced => write!(out, "{}", style(text).black().on_green()),
		};
	}
	out
}

fn render_json(eval: &Evaluation) -> String {
	// Evaluation holds only strings, integers, and unit enums.
	serde_json::to_string_pretty(eval).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

/// One-line summary of the counters.
pub fn summary(eval: &Evaluation) -> String {
	format!(
		"matches: {}, replacements: {}",
		eval.match_count, eval.replace_count
	)
}
