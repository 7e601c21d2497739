//! Maps tokens to styles
//!
//! Each token's scope stack is matched against the theme's selectors;
//! the best-scoring rule's modifier is applied over the theme default.
//! Neighbouring tokens that end up with identical styles merge into one
//! [`StyleRange`].

use std::collections::HashMap;

use super::grammar::SyntaxDefinition;
use super::scope::{MatchScore, ScopeStack};
use super::style::{Style, StyleRange};
use super::theme::Theme;
use super::tokenizer::{Token, Tokenizer};
use crate::error::Result;

/// Resolves styles for one theme, memoizing per scope stack
pub struct Highlighter<'t> {
    theme: &'t Theme,
    memo: HashMap<ScopeStack, Style>,
}

impl<'t> Highlighter<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            memo: HashMap::new(),
        }
    }

    pub fn theme(&self) -> &Theme {
        self.theme
    }

    /// Style for a scope stack
    pub fn style_for(&mut self, stack: &ScopeStack) -> Style {
        if let Some(style) = self.memo.get(stack) {
            return *style;
        }
        let style = resolve_style(self.theme, stack);
        self.memo.insert(stack.clone(), style);
        style
    }

    /// Turn tokens into maximal style ranges
    pub fn highlight_tokens(&mut self, tokens: &[Token]) -> Result<Vec<StyleRange>> {
        let mut ranges: Vec<StyleRange> = Vec::new();
        ranges.try_reserve(tokens.len())?;

        for token in tokens {
            if token.is_empty() {
                continue;
            }
            let style = self.style_for(&token.scopes);
            match ranges.last_mut() {
                Some(last) if last.end == token.start && last.style == style => last.end = token.end,
                _ => ranges.push(StyleRange::new(token.start, token.end, style)),
            }
        }
        Ok(ranges)
    }

    /// Tokenize and highlight `text`
    pub fn highlight(&mut self, syntax: &SyntaxDefinition, text: &str) -> Result<Vec<StyleRange>> {
        let tokens = Tokenizer::new(syntax).tokenize(text);
        self.highlight_tokens(&tokens)
    }

    /// A single default-style range over `len` bytes; empty for no text
    pub fn plain(&self, len: usize) -> Result<Vec<StyleRange>> {
        let mut ranges = Vec::new();
        if len > 0 {
            ranges.try_reserve(1)?;
            ranges.push(StyleRange::new(0, len, self.theme.default_style));
        }
        Ok(ranges)
    }
}

/// Pick the theme rule that best matches `stack`
///
/// Higher [`MatchScore`] wins; on equal scores the later rule wins.
fn resolve_style(theme: &Theme, stack: &ScopeStack) -> Style {
    let mut best: Option<(MatchScore, usize)> = None;

    for (index, rule) in theme.rules.iter().enumerate() {
        let Some(score) = rule.selectors.iter().filter_map(|sel| sel.score(stack)).max() else {
            continue;
        };
        if best.map_or(true, |(top, _)| score >= top) {
            best = Some((score, index));
        }
    }

    match best {
        Some((_, index)) => theme.default_style.apply(&theme.rules[index].modifier),
        None => theme.default_style,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::grammar::GrammarDef;
    use crate::syntax::rules::RuleDef;
    use crate::syntax::scope::Scope;
    use crate::syntax::style::{Color, FontStyle};
    use crate::syntax::theme::{ThemeDef, ThemeRuleDef};

    const GREEN: Color = Color::rgb(0, 0xff, 0);
    const RED: Color = Color::rgb(0xff, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 0xff);

    fn theme() -> Theme {
        ThemeDef::new("Test", "#000000", "#ffffff")
            .rule(ThemeRuleDef::new("string").fg("#00ff00"))
            .rule(ThemeRuleDef::new("constant.character").fg("#ff0000").font("bold"))
            .compile()
            .unwrap()
    }

    fn stack(names: &[&str]) -> ScopeStack {
        names.iter().map(|n| Scope::new(n)).collect()
    }

    #[test]
    fn test_default_style_when_nothing_matches() {
        let theme = theme();
        let mut hl = Highlighter::new(&theme);
        assert_eq!(hl.style_for(&stack(&["source.x"])), theme.default_style);
    }

    #[test]
    fn test_innermost_rule_wins() {
        let theme = theme();
        let mut hl = Highlighter::new(&theme);
        let style = hl.style_for(&stack(&["source.x", "string.quoted", "constant.character.escape"]));
        assert_eq!(style.foreground, RED);
        assert_eq!(style.font_style, FontStyle::BOLD);
        assert_eq!(style.background, Color::WHITE);
    }

    #[test]
    fn test_later_rule_wins_equal_scores() {
        let theme = ThemeDef::new("Tie", "#000", "#fff")
            .rule(ThemeRuleDef::new("keyword").fg("#ff0000"))
            .rule(ThemeRuleDef::new("keyword").fg("#0000ff"))
            .compile()
            .unwrap();
        let mut hl = Highlighter::new(&theme);
        assert_eq!(hl.style_for(&stack(&["source.x", "keyword.control"])).foreground, BLUE);
    }

    #[test]
    fn test_more_specific_prefix_beats_later_rule() {
        let theme = ThemeDef::new("Specific", "#000", "#fff")
            .rule(ThemeRuleDef::new("keyword.control").fg("#ff0000"))
            .rule(ThemeRuleDef::new("keyword").fg("#0000ff"))
            .compile()
            .unwrap();
        let mut hl = Highlighter::new(&theme);
        assert_eq!(hl.style_for(&stack(&["source.x", "keyword.control"])).foreground, RED);
    }

    #[test]
    fn test_adjacent_equal_styles_merge() {
        let mut grammar = GrammarDef::new("Q", "source.q");
        grammar.add_rule(RuleDef::begin_end("\"", "\"", "string"));
        grammar.add_rule(RuleDef::matching(r"\d+", "constant.numeric"));
        let syntax = grammar.compile().unwrap();
        let theme = theme();
        let mut hl = Highlighter::new(&theme);

        // The number is unstyled, so it merges with the surrounding default text
        let ranges = hl.highlight(&syntax, "a 12 \"s\"").unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start, ranges[0].end), (0, 5));
        assert_eq!((ranges[1].start, ranges[1].end), (5, 8));
        assert_eq!(ranges[1].style.foreground, GREEN);
    }

    #[test]
    fn test_plain() {
        let theme = theme();
        let hl = Highlighter::new(&theme);
        assert!(hl.plain(0).unwrap().is_empty());
        let ranges = hl.plain(7).unwrap();
        assert_eq!(ranges, vec![StyleRange::new(0, 7, theme.default_style)]);
    }
}
