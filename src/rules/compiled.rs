use crate::error::Result;
use crate::rules::matcher::CompiledMatcher;
use crate::rules::parser::{Rule, parse_rules};
use crate::rules::rewriter::ReplacementTemplate;
use serde::Serialize;
use std::sync::Arc;

/// A rule ready for scanning.
#[derive(Debug, Clone)]
pub struct CompiledRule {
	/// The parsed rule.
	pub rule: Rule,

	/// Compiled search side.
	pub matcher: CompiledMatcher,

	/// Compiled replace side; `None` for highlight-only rules.
	pub template: Option<ReplacementTemplate>,
}

impl CompiledRule {
	/// Compile a parsed rule.
	pub fn compile(rule: Rule) -> Result<Self> {
		let matcher = CompiledMatcher::compile(rule.search_term())?;
		let template = rule
			.is_replacement
			.then(|| ReplacementTemplate::compile(&rule, &matcher.wildcard_order));

		Ok(CompiledRule {
			rule,
			matcher,
			template,
		})
	}
}

/// A rule that was skipped because its search side failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleWarning {
	/// 1-based line in the rule text.
	pub line: usize,

	/// The search half as typed.
	pub search: String,

	/// Human-readable reason.
	pub message: String,
}

/// Compiled form of a whole rule text, in rule-definition order.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
	pub rules: Vec<CompiledRule>,
	pub warnings: Vec<RuleWarning>,
}

impl CompiledRules {
	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn line_mode(&self) -> impl Iterator<Item = &CompiledRule> {
		self.rules.iter().filter(|r| r.rule.is_line_mode)
	}

	pub fn text_mode(&self) -> impl Iterator<Item = &CompiledRule> {
		self.rules.iter().filter(|r| !r.rule.is_line_mode)
	}
}

/// Parse and compile rule text. A rule that fails to compile is skipped and
/// reported in `warnings`; other rules are unaffected.
pub fn compile_rules(rule_text: &str) -> CompiledRules {
	let mut compiled = CompiledRules::default();

	for rule in parse_rules(rule_text) {
		let line = rule.line;
		let search = rule.raw_search.clone();
		match CompiledRule::compile(rule) {
			Ok(rule) => compiled.rules.push(rule),
			Err(e) => {
				let message = error_chain(&e);
				log::warn!("Skipping rule on line {line} ({search}): {message}");
				compiled.warnings.push(RuleWarning {
					line,
					search,
					message,
				});
			}
		}
	}

	log::debug!(
		"Compiled {} rules ({} skipped)",
		compiled.rules.len(),
		compiled.warnings.len()
	);
	compiled
}

fn error_chain(e: &dyn std::error::Error) -> String {
	let mut message = e.to_string();
	let mut source = e.source();
	while let Some(inner) = source {
		message.push_str(": ");
		message.push_str(&inner.to_string());
		source = inner.source();
	}
	message
}

/// Caches the compiled form of the most recent rule text.
///
/// Only a change in rule text (or an explicit `invalidate`) triggers
/// recompilation; scanning different source text reuses the cached rules.
#[derive(Debug, Default)]
pub struct RuleCache {
	entry: Option<(String, Arc<CompiledRules>)>,
}

impl RuleCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Compiled rules for `rule_text`, recompiling only if it changed.
	pub fn get(&mut self, rule_text: &str) -> Arc<CompiledRules> {
		match &self.entry {
			Some((text, rules)) if text == rule_text => Arc::clone(rules),
			_ => {
				let rules = Arc::new(compile_rules(rule_text));
				self.entry = Some((rule_text.to_string(), Arc::clone(&rules)));
				rules
			}
		}
	}

	/// Drop the cached rules so the next `get` recompiles.
	pub fn invalidate(&mut self) {
		self.entry = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_compile_rules_preserves_order() {
		let compiled = compile_rules("b\na///x\n[line]c");
		let searches: Vec<_> = compiled
			.rules
			.iter()
			.map(|r| r.rule.raw_search.as_str())
			.collect();
		assert_eq!(searches, vec!["b", "a", "[line]c"]);
		assert_eq!(compiled.line_mode().count(), 1);
		assert_eq!(compiled.text_mode().count(), 2);
	}

	#[test]
	fn test_highlight_rule_has_no_template() {
		let compiled = compile_rules("apple\napple///pear");
		assert!(compiled.rules[0].template.is_none());
		assert!(compiled.rules[1].template.is_some());
	}

	#[test]
	fn test_bad_rule_becomes_warning() {
		let compiled = compile_rules("good\n[or]\nalso good");
		assert_eq!(compiled.rules.len(), 2);
		assert_eq!(compiled.warnings.len(), 1);
		assert_eq!(compiled.warnings[0].line, 2);
		assert_eq!(compiled.warnings[0].search, "[or]");
	}

	#[test]
	fn test_bare_line_marker_is_warning() {
		let compiled = compile_rules("[line]///x");
		assert!(compiled.is_empty());
		assert_eq!(compiled.warnings.len(), 1);
	}

	#[test]
	fn test_cache_reuses_until_rule_text_changes() {
		let mut cache = RuleCache::new();
		let first = cache.get("a///b");
		let again = cache.get("a///b");
		assert!(Arc::ptr_eq(&first, &again));

		let changed = cache.get("a///c");
		assert!(!Arc::ptr_eq(&first, &changed));
	}

	#[test]
	fn test_cache_invalidate_forces_recompile() {
		let mut cache = RuleCache::new();
		let first = cache.get("a");
		cache.invalidate();
		let second = cache.get("a");
		assert!(!Arc::ptr_eq(&first, &second));
	}
}
