//! Grammar definitions and the grammar compiler
//!
//! A [`GrammarDef`] is the declarative description of a language: its
//! name, file extensions, root scope, top-level rules and a repository
//! of named rule lists. [`GrammarDef::compile`] flattens it into a
//! [`SyntaxDefinition`] whose rules and rule sets live in numbered
//! tables, with every include resolved to a rule-set index.

use std::collections::HashMap;

use super::rules::{
    compile_regex, BeginEndRule, CaptureScope, EndPattern, MatchRule, Rule, RuleDef, RuleId,
    RuleSetId,
};
use super::scope::Scope;
use crate::error::{Error, Result};

/// The rule set holding a grammar's top-level rules
pub const ROOT_RULE_SET: RuleSetId = 0;

/// A language grammar as written by a grammar author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarDef {
    /// Language name (e.g., "Rust", "Python")
    pub name: String,
    /// File extensions (e.g., ["rs"], ["py", "pyw"])
    pub extensions: Vec<String>,
    /// Other names the language goes by (e.g., ["c++", "cxx"])
    pub aliases: Vec<String>,
    /// Scope applied to the whole text (e.g., "source.rust")
    pub scope: String,
    /// Top-level rules, in priority order
    pub patterns: Vec<RuleDef>,
    /// Named rule lists that `Include` rules can refer to
    pub repository: Vec<(String, Vec<RuleDef>)>,
}

impl GrammarDef {
    /// Create a new empty grammar
    pub fn new(name: &str, scope: &str) -> Self {
        Self {
            name: name.to_string(),
            extensions: Vec::new(),
            aliases: Vec::new(),
            scope: scope.to_string(),
            patterns: Vec::new(),
            repository: Vec::new(),
        }
    }

    /// Add a file extension
    pub fn add_extension(&mut self, ext: &str) {
        self.extensions.push(ext.to_string());
    }

    /// Add an alternative name
    pub fn add_alias(&mut self, alias: &str) {
        self.aliases.push(alias.to_string());
    }

    /// Add a top-level rule; earlier rules win ties
    pub fn add_rule(&mut self, rule: RuleDef) {
        self.patterns.push(rule);
    }

    /// Add a named rule list to the repository
    pub fn add_repository(&mut self, name: &str, rules: Vec<RuleDef>) {
        self.repository.push((name.to_string(), rules));
    }

    /// Compile into a matchable [`SyntaxDefinition`]
    pub fn compile(&self) -> Result<SyntaxDefinition> {
        if self.name.trim().is_empty() {
            return Err(Error::grammar(&self.name, "grammar has no name"));
        }
        if self.scope.trim().is_empty() {
            return Err(Error::grammar(&self.name, "grammar has no root scope"));
        }
        GrammarCompiler::new(self).run()
    }
}

/// A rule set: the rules of one context, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    /// Rules as declared, includes unexpanded
    pub rules: Vec<RuleId>,
    /// Matchable rules with includes expanded, first occurrence kept
    pub candidates: Vec<RuleId>,
}

/// A compiled grammar
#[derive(Debug, Clone)]
pub struct SyntaxDefinition {
    pub name: String,
    pub extensions: Vec<String>,
    pub aliases: Vec<String>,
    pub scope: Scope,
    rules: Vec<Rule>,
    rule_sets: Vec<RuleSet>,
}

impl SyntaxDefinition {
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn rule_set(&self, id: RuleSetId) -> &RuleSet {
        &self.rule_sets[id]
    }

    /// Matchable rules reachable from a rule set, in priority order
    pub fn candidates(&self, id: RuleSetId) -> &[RuleId] {
        &self.rule_sets[id].candidates
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_set_count(&self) -> usize {
        self.rule_sets.len()
    }

    /// Check whether this grammar declares an extension (case-insensitive)
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Structural equality: same tables, same patterns, same scopes
    pub fn structure_eq(&self, other: &SyntaxDefinition) -> bool {
        self.name == other.name
            && self.extensions == other.extensions
            && self.aliases == other.aliases
            && self.scope == other.scope
            && self.rule_sets == other.rule_sets
            && self.rules.len() == other.rules.len()
            && self.rules.iter().zip(&other.rules).all(|(a, b)| a.structure_eq(b))
    }
}

/// Two-pass compiler: number every rule list, then compile rules
struct GrammarCompiler<'a> {
    def: &'a GrammarDef,
    repository: HashMap<&'a str, RuleSetId>,
    rules: Vec<Rule>,
    rule_sets: Vec<RuleSet>,
}

impl<'a> GrammarCompiler<'a> {
    fn new(def: &'a GrammarDef) -> Self {
        Self {
            def,
            repository: HashMap::new(),
            rules: Vec::new(),
            rule_sets: Vec::new(),
        }
    }

    fn run(mut self) -> Result<SyntaxDefinition> {
        let def = self.def;

        // Reserve ids up front so includes can point forward and backward
        self.rule_sets.push(RuleSet::default());
        for (name, _) in &def.repository {
            let id = self.rule_sets.len();
            if self.repository.insert(name.as_str(), id).is_some() {
                return Err(self.error(format!("duplicate repository entry '{}'", name)));
            }
            self.rule_sets.push(RuleSet::default());
        }

        self.fill_rule_set(ROOT_RULE_SET, &def.patterns)?;
        for (i, (_, rules)) in def.repository.iter().enumerate() {
            self.fill_rule_set(i + 1, rules)?;
        }

        for id in 0..self.rule_sets.len() {
            self.rule_sets[id].candidates = self.expand(id);
        }

        Ok(SyntaxDefinition {
            name: def.name.clone(),
            extensions: def.extensions.clone(),
            aliases: def.aliases.clone(),
            scope: Scope::new(&def.scope),
            rules: self.rules,
            rule_sets: self.rule_sets,
        })
    }

    fn error(&self, reason: String) -> Error {
        Error::grammar(&self.def.name, reason)
    }

    fn fill_rule_set(&mut self, set: RuleSetId, defs: &'a [RuleDef]) -> Result<()> {
        let mut ids = Vec::with_capacity(defs.len());
        for def in defs {
            ids.push(self.compile_rule(def)?);
        }
        self.rule_sets[set].rules = ids;
        Ok(())
    }

    fn new_rule_set(&mut self, defs: &'a [RuleDef]) -> Result<RuleSetId> {
        let id = self.rule_sets.len();
        self.rule_sets.push(RuleSet::default());
        self.fill_rule_set(id, defs)?;
        Ok(id)
    }

    fn compile_rule(&mut self, def: &'a RuleDef) -> Result<RuleId> {
        let rule = match def {
            RuleDef::Match {
                pattern,
                scope,
                captures,
            } => {
                let regex = compile_regex(pattern)
                    .map_err(|e| self.error(format!("bad match pattern '{}': {}", pattern, e)))?;
                let captures = self.capture_scopes(captures, regex.captures_len(), pattern)?;
                Rule::Match(MatchRule {
                    regex,
                    scope: scope.as_deref().map(Scope::new),
                    captures,
                })
            }
            RuleDef::BeginEnd {
                begin,
                end,
                scope,
                content_scope,
                begin_captures,
                end_captures,
                patterns,
                apply_end_last,
            } => {
                let begin_regex = compile_regex(begin)
                    .map_err(|e| self.error(format!("bad begin pattern '{}': {}", begin, e)))?;
                let end_pattern = EndPattern::compile(end)
                    .map_err(|e| self.error(format!("bad end pattern '{}': {}", end, e)))?;
                let begin_captures =
                    self.capture_scopes(begin_captures, begin_regex.captures_len(), begin)?;
                // Back-references make the group count unknowable up front
                let end_groups = match &end_pattern {
                    EndPattern::Static(regex) => regex.captures_len(),
                    EndPattern::Backref { .. } => usize::MAX,
                };
                let end_captures = self.capture_scopes(end_captures, end_groups, end)?;
                let patterns = self.new_rule_set(patterns)?;

                Rule::BeginEnd(BeginEndRule {
                    begin: begin_regex,
                    end: end_pattern,
                    scope: scope.as_deref().map(Scope::new),
                    content_scope: content_scope.as_deref().map(Scope::new),
                    begin_captures,
                    end_captures,
                    patterns,
                    apply_end_last: *apply_end_last,
                })
            }
            RuleDef::Include(target) => Rule::Include(self.resolve_include(target)?),
        };

        self.rules.push(rule);
        Ok(self.rules.len() - 1)
    }

    fn capture_scopes(
        &self,
        captures: &[(usize, String)],
        group_count: usize,
        pattern: &str,
    ) -> Result<Vec<CaptureScope>> {
        captures
            .iter()
            .map(|(group, scope)| {
                if *group >= group_count {
                    return Err(self.error(format!(
                        "capture group {} does not exist in '{}'",
                        group, pattern
                    )));
                }
                Ok(CaptureScope {
                    group: *group,
                    scope: Scope::new(scope),
                })
            })
            .collect()
    }

    fn resolve_include(&self, target: &str) -> Result<RuleSetId> {
        let target = target.trim();
        if target == "$self" || target == "$base" {
            return Ok(ROOT_RULE_SET);
        }
        let name = target.strip_prefix('#').unwrap_or(target);
        self.repository
            .get(name)
            .copied()
            .ok_or_else(|| self.error(format!("include target '{}' not found", target)))
    }

    /// Depth-first include expansion; cycles end at already-visited sets
    fn expand(&self, root: RuleSetId) -> Vec<RuleId> {
        let mut out = Vec::new();
        let mut seen_rules = vec![false; self.rules.len()];
        let mut seen_sets = vec![false; self.rule_sets.len()];
        self.expand_into(root, &mut out, &mut seen_rules, &mut seen_sets);
        out
    }

    fn expand_into(
        &self,
        set: RuleSetId,
        out: &mut Vec<RuleId>,
        seen_rules: &mut [bool],
        seen_sets: &mut [bool],
    ) {
        if std::mem::replace(&mut seen_sets[set], true) {
            return;
        }
        for &id in &self.rule_sets[set].rules {
            match &self.rules[id] {
                Rule::Include(target) => self.expand_into(*target, out, seen_rules, seen_sets),
                _ => {
                    if !std::mem::replace(&mut seen_rules[id], true) {
                        out.push(id);
                    }
                }
            }
        }
    }
}
