//! Color themes
//!
//! A [`ThemeDef`] is written with hex colors and font style words; it
//! compiles into a [`Theme`] of parsed selectors and style modifiers.

use super::scope::ScopeSelector;
use super::style::{Color, FontStyle, Style, StyleModifier};
use crate::error::{Error, Result};

/// Name of the theme that is always available
pub const FALLBACK_THEME: &str = "Default";

/// One theme rule as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRuleDef {
    /// Comma-separated selector list, e.g. `"string, constant.character"`
    pub scope: String,
    pub foreground: Option<String>,
    pub background: Option<String>,
    /// Words such as `"bold italic"`
    pub font_style: Option<String>,
}

impl ThemeRuleDef {
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            foreground: None,
            background: None,
            font_style: None,
        }
    }

    pub fn fg(mut self, hex: &str) -> Self {
        self.foreground = Some(hex.to_string());
        self
    }

    pub fn bg(mut self, hex: &str) -> Self {
        self.background = Some(hex.to_string());
        self
    }

    pub fn font(mut self, words: &str) -> Self {
        self.font_style = Some(words.to_string());
        self
    }
}

/// A theme as written by a theme author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeDef {
    pub name: String,
    /// Default foreground
    pub foreground: String,
    /// Default background
    pub background: String,
    /// Rules in declaration order; later rules win equal matches
    pub rules: Vec<ThemeRuleDef>,
}

impl ThemeDef {
    pub fn new(name: &str, foreground: &str, background: &str) -> Self {
        Self {
            name: name.to_string(),
            foreground: foreground.to_string(),
            background: background.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn add_rule(&mut self, rule: ThemeRuleDef) {
        self.rules.push(rule);
    }

    /// Builder form of [`ThemeDef::add_rule`]
    pub fn rule(mut self, rule: ThemeRuleDef) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse colors, font styles and selectors
    pub fn compile(&self) -> Result<Theme> {
        if self.name.trim().is_empty() {
            return Err(Error::theme(&self.name, "theme has no name"));
        }
        let foreground = self.color(&self.foreground)?;
        let background = self.color(&self.background)?;

        let rules = self
            .rules
            .iter()
            .map(|rule| self.compile_rule(rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Theme {
            name: self.name.clone(),
            default_style: Style::new(foreground, background),
            rules,
        })
    }

    fn color(&self, hex: &str) -> Result<Color> {
        Color::from_hex(hex).ok_or_else(|| Error::theme(&self.name, format!("invalid color '{}'", hex)))
    }

    fn compile_rule(&self, rule: &ThemeRuleDef) -> Result<ThemeRule> {
        let selectors = ScopeSelector::parse_list(&rule.scope)
            .ok_or_else(|| Error::theme(&self.name, format!("invalid selector '{}'", rule.scope)))?;

        let font_style = match &rule.font_style {
            Some(words) => Some(
                FontStyle::parse(words)
                    .ok_or_else(|| Error::theme(&self.name, format!("invalid font style '{}'", words)))?,
            ),
            None => None,
        };

        Ok(ThemeRule {
            selectors,
            modifier: StyleModifier {
                foreground: rule.foreground.as_deref().map(|c| self.color(c)).transpose()?,
                background: rule.background.as_deref().map(|c| self.color(c)).transpose()?,
                font_style,
            },
        })
    }
}

/// A compiled theme rule: any selector matching applies the modifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRule {
    pub selectors: Vec<ScopeSelector>,
    pub modifier: StyleModifier,
}

/// A compiled theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Style of text no rule matches
    pub default_style: Style,
    pub rules: Vec<ThemeRule>,
}

impl Theme {
    /// The built-in fallback: black on white, no rules
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_THEME.to_string(),
            default_style: Style::new(Color::BLACK, Color::WHITE),
            rules: Vec::new(),
        }
    }
}
