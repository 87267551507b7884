//! Markrep - many simultaneous searches and replacements in one pass.
//!
//! This library provides the core functionality for markrep, including:
//! - A small rule language (`search /// replace`, `[line]`, `[or]`, `[num]`, `[cjk]`, `[del]`)
//! - Rule compilation into multi-alternative matchers and replacement templates
//! - A single-pass, priority-aware scanner producing classified text segments
//! - Configuration file parsing and cascade discovery
//!
//! # Example
//!
//! ```
//! use markrep_cli::engine::{SegmentKind, evaluate};
//!
//! let eval = evaluate("ID:123 and ID:7", "ID:[num] /// ID#$1").unwrap();
//! assert_eq!(eval.output_text(), "ID#123 and ID#7");
//! assert_eq!(eval.replace_count, 2);
//! assert_eq!(eval.segments[1].kind, SegmentKind::Original);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod rules;

pub use engine::{Evaluation, Segment, SegmentKind, evaluate, evaluate_compiled};
pub use error::{MarkrepError, Result};
pub use rules::{CompiledRules, RuleCache, compile_rules};
