//! Pattern rules for syntax highlighting
//!
//! [`RuleDef`] is the declarative form a grammar author writes; the
//! grammar compiler turns it into a [`Rule`] in a flat, numbered rule
//! table. Includes refer to rule sets by index, so a rule set may
//! include itself or an ancestor.

use std::borrow::Cow;

use regex::{Captures, Regex, RegexBuilder};

use super::scope::{Scope, ScopeStack};

/// Index into a grammar's rule table
pub type RuleId = usize;
/// Index into a grammar's rule-set table; 0 is the top level
pub type RuleSetId = usize;

/// A grammar rule as written by a grammar author
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDef {
    /// Single regex; the whole match gets `scope`
    Match {
        pattern: String,
        scope: Option<String>,
        captures: Vec<(usize, String)>,
    },
    /// Opens a nested context on `begin` and closes it on `end`
    BeginEnd {
        begin: String,
        end: String,
        scope: Option<String>,
        content_scope: Option<String>,
        begin_captures: Vec<(usize, String)>,
        end_captures: Vec<(usize, String)>,
        patterns: Vec<RuleDef>,
        apply_end_last: bool,
    },
    /// Reference to `$self` or a repository entry (`#name` or `name`)
    Include(String),
}

impl RuleDef {
    /// A single-regex rule
    pub fn matching(pattern: &str, scope: &str) -> Self {
        RuleDef::Match {
            pattern: pattern.to_string(),
            scope: non_empty(scope),
            captures: Vec::new(),
        }
    }

    /// A begin/end rule with no children yet
    pub fn begin_end(begin: &str, end: &str, scope: &str) -> Self {
        RuleDef::BeginEnd {
            begin: begin.to_string(),
            end: end.to_string(),
            scope: non_empty(scope),
            content_scope: None,
            begin_captures: Vec::new(),
            end_captures: Vec::new(),
            patterns: Vec::new(),
            apply_end_last: false,
        }
    }

    /// Include a repository entry by name
    pub fn include(target: &str) -> Self {
        RuleDef::Include(target.to_string())
    }

    /// Include the grammar's own top level
    pub fn include_self() -> Self {
        RuleDef::Include("$self".to_string())
    }

    /// Scope capture groups of the match; for begin/end rules this sets
    /// both begin and end captures
    pub fn with_captures(mut self, groups: &[(usize, &str)]) -> Self {
        let owned = owned_captures(groups);
        match &mut self {
            RuleDef::Match { captures, .. } => *captures = owned,
            RuleDef::BeginEnd {
                begin_captures,
                end_captures,
                ..
            } => {
                *begin_captures = owned.clone();
                *end_captures = owned;
            }
            RuleDef::Include(_) => {}
        }
        self
    }

    /// Scope capture groups of the begin match (begin/end rules only)
    pub fn with_begin_captures(mut self, groups: &[(usize, &str)]) -> Self {
        if let RuleDef::BeginEnd { begin_captures, .. } = &mut self {
            *begin_captures = owned_captures(groups);
        }
        self
    }

    /// Scope capture groups of the end match (begin/end rules only)
    pub fn with_end_captures(mut self, groups: &[(usize, &str)]) -> Self {
        if let RuleDef::BeginEnd { end_captures, .. } = &mut self {
            *end_captures = owned_captures(groups);
        }
        self
    }

    /// Child rules active inside the context (begin/end rules only)
    pub fn with_patterns(mut self, children: Vec<RuleDef>) -> Self {
        if let RuleDef::BeginEnd { patterns, .. } = &mut self {
            *patterns = children;
        }
        self
    }

    /// Scope applied between the delimiters only (begin/end rules only)
    pub fn with_content_scope(mut self, scope: &str) -> Self {
        if let RuleDef::BeginEnd { content_scope, .. } = &mut self {
            *content_scope = non_empty(scope);
        }
        self
    }

    /// Let child rules win ties against the end pattern (begin/end rules only)
    pub fn apply_end_last(mut self) -> Self {
        if let RuleDef::BeginEnd { apply_end_last, .. } = &mut self {
            *apply_end_last = true;
        }
        self
    }
}

fn non_empty(scope: &str) -> Option<String> {
    let scope = scope.trim();
    (!scope.is_empty()).then(|| scope.to_string())
}

fn owned_captures(groups: &[(usize, &str)]) -> Vec<(usize, String)> {
    groups.iter().map(|(i, s)| (*i, s.to_string())).collect()
}

/// Compile a grammar regex
///
/// Patterns are matched against one line at a time (including its
/// trailing newline), so `^` and `$` are line anchors.
pub fn compile_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).multi_line(true).build()
}

/// Scope assigned to one capture group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureScope {
    pub group: usize,
    pub scope: Scope,
}

/// Byte span of a capture group together with its scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSpan {
    pub start: usize,
    pub end: usize,
    pub scope: Scope,
}

/// Resolve capture scopes against a regex match
///
/// Spans are absolute offsets into the line, ordered by start with
/// enclosing spans before the spans they contain. Nested groups are
/// kept; empty groups and groups that only partly overlap an earlier
/// span are dropped, so any two spans are either disjoint or nested.
pub fn capture_spans(caps: &Captures<'_>, scopes: &[CaptureScope], offset: usize) -> Vec<CaptureSpan> {
    let mut spans: Vec<CaptureSpan> = scopes
        .iter()
        .filter_map(|cs| {
            let m = caps.get(cs.group)?;
            (m.start() < m.end()).then(|| CaptureSpan {
                start: offset + m.start(),
                end: offset + m.end(),
                scope: cs.scope.clone(),
            })
        })
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    // Ends of the kept spans enclosing the current position
    let mut open: Vec<usize> = Vec::new();
    spans.retain(|s| {
        while open.last().is_some_and(|&end| end <= s.start) {
            open.pop();
        }
        let keep = open.last().map_or(true, |&end| s.end <= end);
        if keep {
            open.push(s.end);
        }
        keep
    });
    spans
}

/// Piece of an end pattern that refers back to the begin match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndPart {
    Literal(String),
    Group(usize),
}

/// The end pattern of a begin/end rule
#[derive(Debug, Clone)]
pub enum EndPattern {
    /// Plain regex, compiled once
    Static(Regex),
    /// Regex with `\1`..`\9` references to the begin captures,
    /// compiled each time a context opens
    Backref { source: String, parts: Vec<EndPart> },
}

impl EndPattern {
    /// Compile an end pattern, validating back-references with empty text
    pub fn compile(source: &str) -> Result<Self, regex::Error> {
        let parts = split_backrefs(source);
        if parts.iter().all(|p| matches!(p, EndPart::Literal(_))) {
            return compile_regex(source).map(EndPattern::Static);
        }

        compile_regex(&render_parts(&parts, |_| ""))?;
        Ok(EndPattern::Backref {
            source: source.to_string(),
            parts,
        })
    }

    /// The pattern text as written
    pub fn source(&self) -> &str {
        match self {
            EndPattern::Static(regex) => regex.as_str(),
            EndPattern::Backref { source, .. } => source,
        }
    }

    pub fn has_backrefs(&self) -> bool {
        matches!(self, EndPattern::Backref { .. })
    }

    /// Resolve to a usable regex for a context opened by `begin`
    ///
    /// Captured text is escaped, so the instantiated pattern always
    /// compiles when the validated template did.
    pub fn instantiate(&self, begin: Option<&Captures<'_>>) -> Option<Cow<'_, Regex>> {
        match self {
            EndPattern::Static(regex) => Some(Cow::Borrowed(regex)),
            EndPattern::Backref { parts, .. } => {
                let pattern = render_parts(parts, |group| {
                    begin
                        .and_then(|caps| caps.get(group))
                        .map(|m| m.as_str())
                        .unwrap_or("")
                });
                compile_regex(&pattern).ok().map(Cow::Owned)
            }
        }
    }
}

fn split_backrefs(source: &str) -> Vec<EndPart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some(d @ '1'..='9') => {
                if !literal.is_empty() {
                    parts.push(EndPart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(EndPart::Group(d as usize - '0' as usize));
            }
            Some(other) => {
                literal.push('\\');
                literal.push(other);
            }
            None => literal.push('\\'),
        }
    }
    if !literal.is_empty() {
        parts.push(EndPart::Literal(literal));
    }
    parts
}

fn render_parts<'a>(parts: &[EndPart], group_text: impl Fn(usize) -> &'a str) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            EndPart::Literal(text) => out.push_str(text),
            EndPart::Group(group) => out.push_str(&regex::escape(group_text(*group))),
        }
    }
    out
}

/// A single-regex rule
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub regex: Regex,
    pub scope: Option<Scope>,
    pub captures: Vec<CaptureScope>,
}

/// A rule that opens a nested context
#[derive(Debug, Clone)]
pub struct BeginEndRule {
    pub begin: Regex,
    pub end: EndPattern,
    pub scope: Option<Scope>,
    pub content_scope: Option<Scope>,
    pub begin_captures: Vec<CaptureScope>,
    pub end_captures: Vec<CaptureScope>,
    /// Rules active inside the context
    pub patterns: RuleSetId,
    pub apply_end_last: bool,
}

/// A compiled rule
#[derive(Debug, Clone)]
pub enum Rule {
    Match(MatchRule),
    BeginEnd(BeginEndRule),
    Include(RuleSetId),
}

impl Rule {
    /// The regex that starts this rule, `None` for includes
    pub fn start_regex(&self) -> Option<&Regex> {
        match self {
            Rule::Match(rule) => Some(&rule.regex),
            Rule::BeginEnd(rule) => Some(&rule.begin),
            Rule::Include(_) => None,
        }
    }

    /// Scope stack for a match of this rule under `stack`
    pub fn scoped(&self, stack: &ScopeStack) -> ScopeStack {
        match self {
            Rule::Match(rule) => stack.with(rule.scope.as_ref()),
            Rule::BeginEnd(rule) => stack.with(rule.scope.as_ref()),
            Rule::Include(_) => stack.clone(),
        }
    }

    /// Compare everything except compiled regex internals
    pub fn structure_eq(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::Match(a), Rule::Match(b)) => {
                a.regex.as_str() == b.regex.as_str() && a.scope == b.scope && a.captures == b.captures
            }
            (Rule::BeginEnd(a), Rule::BeginEnd(b)) => {
                a.begin.as_str() == b.begin.as_str()
                    && a.end.source() == b.end.source()
                    && a.scope == b.scope
                    && a.content_scope == b.content_scope
                    && a.begin_captures == b.begin_captures
                    && a.end_captures == b.end_captures
                    && a.patterns == b.patterns
                    && a.apply_end_last == b.apply_end_last
            }
            (Rule::Include(a), Rule::Include(b)) => a == b,
            _ => false,
        }
    }
}
