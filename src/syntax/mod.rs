//! Syntax highlighting core
//!
//! This module provides the pieces the engine is built from:
//! - Grammars, compiled into flat rule tables
//! - A stack-based tokenizer producing scoped tokens
//! - Themes and the highlighter that turns scopes into styles
//! - Registries and the result cache

pub mod builtin;
mod cache;
mod grammar;
mod highlighter;
mod registry;
mod rules;
mod scope;
mod style;
mod theme;
mod tokenizer;

pub use cache::{CacheKey, CacheSize, CacheStats, ResultCache};
pub use grammar::{GrammarDef, RuleSet, SyntaxDefinition, ROOT_RULE_SET};
pub use highlighter::Highlighter;
pub use registry::{normalize_name, SyntaxRegistry, ThemeRegistry};
pub use rules::{BeginEndRule, CaptureScope, EndPattern, MatchRule, Rule, RuleDef, RuleId, RuleSetId};
pub use scope::{MatchScore, Scope, ScopeSelector, ScopeStack};
pub use style::{Color, FontStyle, Style, StyleModifier, StyleRange};
pub use theme::{Theme, ThemeDef, ThemeRule, ThemeRuleDef, FALLBACK_THEME};
pub use tokenizer::{Token, Tokenizer};
