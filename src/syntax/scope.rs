//! Scopes, scope stacks and theme scope selectors
//!
//! A scope is a dot-separated name such as `string.quoted.double`.
//! The tokenizer tags every span of text with a [`ScopeStack`]; themes
//! pick styles with [`ScopeSelector`]s matched against those stacks.

use std::fmt;
use std::sync::Arc;

/// A dot-hierarchical scope name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(Arc<str>);

impl Scope {
    /// Create a scope from its name
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dot-separated segments
    pub fn segments(&self) -> usize {
        self.0.split('.').count()
    }

    /// Whether `prefix` names this scope or one of its ancestors
    ///
    /// `string.quoted` is a prefix of `string.quoted.double` but not of
    /// `string.quotedx`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let name = self.as_str();
        match name.strip_prefix(prefix) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Nested scopes active at a text position, innermost last
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack holding a single root scope
    pub fn with_root(root: Scope) -> Self {
        Self { scopes: vec![root] }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope
    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Shrink the stack to `len` scopes; a longer `len` is a no-op
    pub fn truncate(&mut self, len: usize) {
        self.scopes.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Scopes, outermost first
    pub fn as_slice(&self) -> &[Scope] {
        &self.scopes
    }

    /// Copy of this stack with one more scope on top
    pub fn with(&self, scope: Option<&Scope>) -> Self {
        let mut stack = self.clone();
        if let Some(scope) = scope {
            stack.push(scope.clone());
        }
        stack
    }
}

impl fmt::Display for ScopeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.scopes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", scope)?;
        }
        Ok(())
    }
}

impl FromIterator<Scope> for ScopeStack {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self {
            scopes: iter.into_iter().collect(),
        }
    }
}

/// How specifically a selector matched a stack
///
/// Compared lexicographically: depth of the stack entry matched by the
/// selector's last element (innermost is deepest), then the number of
/// dot segments of that element, then the selector's path length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore {
    pub depth: usize,
    pub segments: usize,
    pub path_len: usize,
}

/// One element of a descendant path, e.g. `string.quoted`
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorElement {
    prefix: String,
    segments: usize,
}

/// A theme selector: a space-separated descendant path of scope prefixes
///
/// `source.rust string` matches any stack with a `string*` scope nested
/// anywhere inside a `source.rust*` scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeSelector {
    path: Vec<SelectorElement>,
}

impl ScopeSelector {
    /// Parse a single selector; `None` when it has no elements
    pub fn parse(s: &str) -> Option<Self> {
        let path: Vec<SelectorElement> = s
            .split_whitespace()
            .map(|prefix| SelectorElement {
                prefix: prefix.to_string(),
                segments: prefix.split('.').count(),
            })
            .collect();

        if path.is_empty() || path.iter().any(|e| e.prefix.split('.').any(str::is_empty)) {
            return None;
        }
        Some(Self { path })
    }

    /// Parse a comma-separated selector list such as `string, comment`
    pub fn parse_list(s: &str) -> Option<Vec<Self>> {
        s.split(',').map(Self::parse).collect()
    }

    /// Score this selector against a stack, `None` if it does not match
    pub fn score(&self, stack: &ScopeStack) -> Option<MatchScore> {
        let scopes = stack.as_slice();
        let (last, ancestors) = self.path.split_last()?;

        // Innermost entry first, so the first hit is the deepest one
        for depth in (0..scopes.len()).rev() {
            if !scopes[depth].has_prefix(&last.prefix) {
                continue;
            }
            if Self::ancestors_match(ancestors, &scopes[..depth]) {
                return Some(MatchScore {
                    depth: depth + 1,
                    segments: last.segments,
                    path_len: self.path.len(),
                });
            }
        }
        None
    }

    /// Match remaining path elements, innermost first, against outer scopes
    fn ancestors_match(ancestors: &[SelectorElement], outer: &[Scope]) -> bool {
        let mut remaining = outer.len();
        for element in ancestors.iter().rev() {
            match outer[..remaining]
                .iter()
                .rposition(|scope| scope.has_prefix(&element.prefix))
            {
                Some(pos) => remaining = pos,
                None => return false,
            }
        }
        true
    }
}

impl fmt::Display for ScopeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.path.iter().map(|e| e.prefix.as_str()).collect();
        f.write_str(&parts.join(" "))
    }
}
