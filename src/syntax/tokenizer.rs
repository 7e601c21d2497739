//! Stack-based tokenizer
//!
//! Walks the text one line at a time against a compiled grammar. The
//! top of the context stack decides which rules are live: the root
//! context uses the grammar's top-level rules, a begin/end context uses
//! its children plus its own end pattern. At every cursor position the
//! earliest-starting match wins; ties go to the end pattern (unless the
//! rule applies its end last) and then to the earlier-declared rule.
//!
//! The output is a gap-free sequence of [`Token`]s covering the text.

use std::borrow::Cow;

use regex::Regex;

use super::grammar::{SyntaxDefinition, ROOT_RULE_SET};
use super::rules::{capture_spans, BeginEndRule, CaptureScope, CaptureSpan, Rule, RuleId, RuleSetId};
use super::scope::ScopeStack;

/// A span of text and the scopes active over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Byte offset where this token starts (inclusive)
    pub start: usize,
    /// Byte offset where this token ends (exclusive)
    pub end: usize,
    /// Scopes active over the span, innermost last
    pub scopes: ScopeStack,
}

impl Token {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Tokenizes text with one grammar
pub struct Tokenizer<'g> {
    syntax: &'g SyntaxDefinition,
}

/// An open context on the context stack
struct Context<'g> {
    /// The rule that opened it; `None` for the root context
    rule: Option<&'g BeginEndRule>,
    /// Rules live inside this context
    patterns: RuleSetId,
    /// End pattern, instantiated with the begin captures
    end: Option<Cow<'g, Regex>>,
    /// Scope stack length before the context pushed its scopes
    base_len: usize,
}

impl Context<'_> {
    fn apply_end_last(&self) -> bool {
        self.rule.is_some_and(|rule| rule.apply_end_last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    End,
    Rule(RuleId),
}

/// The winning match, in line-relative offsets
#[derive(Debug, Clone, Copy)]
struct Found {
    start: usize,
    end: usize,
    kind: MatchKind,
}

/// Last search result per candidate, valid while the context is unchanged
///
/// A leftmost match found from an earlier cursor is still the leftmost
/// match from any later cursor up to its start, and "no match" stays
/// "no match" for the rest of the line.
#[derive(Default)]
struct SearchCache {
    entries: Vec<Option<Option<(usize, usize)>>>,
}

impl SearchCache {
    fn reset(&mut self) {
        self.entries.clear();
    }

    fn find(&mut self, index: usize, regex: &Regex, line: &str, pos: usize) -> Option<(usize, usize)> {
        if self.entries.len() <= index {
            self.entries.resize(index + 1, None);
        }
        match self.entries[index] {
            Some(None) => None,
            Some(Some((start, end))) if start >= pos => Some((start, end)),
            _ => {
                let found = regex.find_at(line, pos).map(|m| (m.start(), m.end()));
                self.entries[index] = Some(found);
                found
            }
        }
    }
}

/// Collects tokens, dropping empty spans and coalescing equal neighbours
#[derive(Default)]
struct TokenSink {
    tokens: Vec<Token>,
}

impl TokenSink {
    fn push(&mut self, start: usize, end: usize, scopes: &ScopeStack) {
        if start >= end {
            return;
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.end == start && last.scopes == *scopes {
                last.end = end;
                return;
            }
        }
        self.tokens.push(Token {
            start,
            end,
            scopes: scopes.clone(),
        });
    }

    /// Push `[start, end)` with each capture sub-span scoped one level
    /// deeper; a capture inside another capture gets both scopes
    fn push_captured(&mut self, start: usize, end: usize, scopes: &ScopeStack, spans: &[CaptureSpan]) {
        let mut pos = start;
        let mut i = 0;
        while i < spans.len() {
            let span = &spans[i];
            // Spans after this one that start inside it are nested in it
            let nested = spans[i + 1..]
                .iter()
                .take_while(|inner| inner.start < span.end)
                .count();
            if span.start >= pos && span.end <= end {
                self.push(pos, span.start, scopes);
                let inner = scopes.with(Some(&span.scope));
                self.push_captured(span.start, span.end, &inner, &spans[i + 1..i + 1 + nested]);
                pos = span.end;
            }
            i += 1 + nested;
        }
        self.push(pos, end, scopes);
    }
}

/// Mutable state of one tokenize call
struct State<'g> {
    stack: ScopeStack,
    contexts: Vec<Context<'g>>,
    sink: TokenSink,
}

impl<'g> Tokenizer<'g> {
    pub fn new(syntax: &'g SyntaxDefinition) -> Self {
        Self { syntax }
    }

    /// Tokenize a whole text
    ///
    /// Contexts still open at the end of the text are closed implicitly.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut state = State {
            stack: ScopeStack::with_root(self.syntax.scope.clone()),
            contexts: vec![Context {
                rule: None,
                patterns: ROOT_RULE_SET,
                end: None,
                base_len: 1,
            }],
            sink: TokenSink::default(),
        };

        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            self.tokenize_line(&mut state, line, offset);
            offset += line.len();
        }

        if state.contexts.len() > 1 {
            tracing::trace!(
                syntax = %self.syntax.name,
                open = state.contexts.len() - 1,
                "closing unterminated contexts at end of text"
            );
        }
        state.sink.tokens
    }

    fn tokenize_line(&self, state: &mut State<'g>, line: &str, offset: usize) {
        let mut cache = SearchCache::default();
        let mut pos = 0;
        // Position of the last zero-width operation on this line
        let mut zero_width_at: Option<usize> = None;

        while pos < line.len() {
            let Some(found) = self.find_next(state, &mut cache, line, pos) else {
                state.sink.push(offset + pos, offset + line.len(), &state.stack);
                break;
            };

            state.sink.push(offset + pos, offset + found.start, &state.stack);

            if found.start == found.end {
                if zero_width_at == Some(found.start) {
                    // Second zero-width hit here: step over one character
                    let next = next_char_boundary(line, found.start);
                    tracing::trace!(pos = offset + found.start, "forcing progress past zero-width match");
                    state.sink.push(offset + found.start, offset + next, &state.stack);
                    pos = next;
                    continue;
                }
                zero_width_at = Some(found.start);
            }

            if self.apply(state, line, offset, found) {
                cache.reset();
            }
            pos = found.end;
        }
    }

    /// Earliest match in the current context
    fn find_next(&self, state: &State<'g>, cache: &mut SearchCache, line: &str, pos: usize) -> Option<Found> {
        let context = state.contexts.last()?;
        let end_last = context.apply_end_last();

        let mut best = context.end.as_ref().and_then(|end| {
            end.find_at(line, pos).map(|m| Found {
                start: m.start(),
                end: m.end(),
                kind: MatchKind::End,
            })
        });
        if matches!(best, Some(found) if found.start == pos && !end_last) {
            return best;
        }

        for (index, &id) in self.syntax.candidates(context.patterns).iter().enumerate() {
            let Some(regex) = self.syntax.rule(id).start_regex() else {
                continue;
            };
            let Some((start, end)) = cache.find(index, regex, line, pos) else {
                continue;
            };

            let better = match best {
                None => true,
                Some(b) => start < b.start || (start == b.start && b.kind == MatchKind::End && end_last),
            };
            if better {
                best = Some(Found {
                    start,
                    end,
                    kind: MatchKind::Rule(id),
                });
                if start == pos {
                    break;
                }
            }
        }
        best
    }

    /// Emit tokens for a match and update the stacks
    ///
    /// Returns true when the context stack changed.
    fn apply(&self, state: &mut State<'g>, line: &str, offset: usize, found: Found) -> bool {
        let (start, end) = (offset + found.start, offset + found.end);

        match found.kind {
            MatchKind::End => {
                let Some(context) = state.contexts.pop() else {
                    return false;
                };
                let Some(rule) = context.rule else {
                    // The root context has no end pattern; never popped
                    state.contexts.push(context);
                    return false;
                };

                // Delimiters carry the rule scope but not the content scope
                let delimiter_len = context.base_len + usize::from(rule.scope.is_some());
                state.stack.truncate(delimiter_len);
                let spans = context
                    .end
                    .as_deref()
                    .map(|regex| self.captures(regex, &rule.end_captures, line, found.start, offset))
                    .unwrap_or_default();
                state.sink.push_captured(start, end, &state.stack, &spans);
                state.stack.truncate(context.base_len);
                true
            }
            MatchKind::Rule(id) => match self.syntax.rule(id) {
                Rule::Match(rule) => {
                    let scoped = state.stack.with(rule.scope.as_ref());
                    let spans = self.captures(&rule.regex, &rule.captures, line, found.start, offset);
                    state.sink.push_captured(start, end, &scoped, &spans);
                    false
                }
                Rule::BeginEnd(rule) => {
                    let begin_caps = if rule.end.has_backrefs() || !rule.begin_captures.is_empty() {
                        rule.begin.captures_at(line, found.start)
                    } else {
                        None
                    };

                    let scoped = state.stack.with(rule.scope.as_ref());
                    let spans = begin_caps
                        .as_ref()
                        .map(|caps| capture_spans(caps, &rule.begin_captures, offset))
                        .unwrap_or_default();
                    state.sink.push_captured(start, end, &scoped, &spans);

                    let base_len = state.stack.len();
                    if let Some(scope) = &rule.scope {
                        state.stack.push(scope.clone());
                    }
                    if let Some(scope) = &rule.content_scope {
                        state.stack.push(scope.clone());
                    }

                    let end_regex = rule.end.instantiate(begin_caps.as_ref());
                    if end_regex.is_none() {
                        tracing::warn!(
                            syntax = %self.syntax.name,
                            end = rule.end.source(),
                            "end pattern failed to instantiate; context stays open"
                        );
                    }
                    state.contexts.push(Context {
                        rule: Some(rule),
                        patterns: rule.patterns,
                        end: end_regex,
                        base_len,
                    });
                    true
                }
                Rule::Include(_) => false,
            },
        }
    }

    fn captures(&self, regex: &Regex, scopes: &[CaptureScope], line: &str, at: usize, offset: usize) -> Vec<CaptureSpan> {
        if scopes.is_empty() {
            return Vec::new();
        }
        regex
            .captures_at(line, at)
            .map(|caps| capture_spans(&caps, scopes, offset))
            .unwrap_or_default()
    }
}

fn next_char_boundary(line: &str, pos: usize) -> usize {
    let step = line[pos..].chars().next().map_or(1, char::len_utf8);
    (pos + step).min(line.len())
}
