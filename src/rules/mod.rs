//! Rule parsing and compilation for markrep.
//!
//! This module handles:
//! - Parsing rule text into ordered rules
//! - Compiling search terms into multi-alternative matchers with wildcard captures
//! - Compiling replacement terms into templates
//! - Caching compiled rules across scans

pub mod compiled;
pub mod matcher;
pub mod parser;
pub mod rewriter;

pub use compiled::{CompiledRule, CompiledRules, RuleCache, RuleWarning, compile_rules};
pub use matcher::{CompiledMatcher, MatchCandidate, WildcardKind};
pub use parser::{Rule, parse_rules};
pub use rewriter::{ReplacementTemplate, TemplateToken};
