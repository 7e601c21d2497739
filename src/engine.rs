//! Engine context
//!
//! [`Engine`] owns the syntax and theme registries, the result cache
//! and the configuration. It is `Send + Sync`; share one engine between
//! threads with an `Arc` (or a static, as the C boundary does).

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::EngineConfig;
use crate::error::{Error, LookupKind, Result};
use crate::syntax::builtin;
use crate::syntax::{
    CacheKey, CacheStats, GrammarDef, Highlighter, ResultCache, StyleRange, SyntaxDefinition,
    SyntaxRegistry, Theme, ThemeDef, ThemeRegistry,
};

/// Ranges for one highlighted text
///
/// Borrows the text it describes; the ranges are shared with the cache.
#[derive(Debug, Clone)]
pub struct HighlightResult<'a> {
    text: &'a str,
    ranges: Arc<[StyleRange]>,
    from_cache: bool,
}

impl<'a> HighlightResult<'a> {
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Contiguous ranges covering the text, in order
    pub fn ranges(&self) -> &[StyleRange] {
        &self.ranges
    }

    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the ranges were served from the cache
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Shared handle to the ranges
    pub fn shared_ranges(&self) -> Arc<[StyleRange]> {
        self.ranges.clone()
    }
}

/// The highlighting engine
pub struct Engine {
    config: EngineConfig,
    syntaxes: SyntaxRegistry,
    themes: ThemeRegistry,
    cache: ResultCache,
    builtins: OnceCell<()>,
}

impl Engine {
    /// An engine with no grammars and only the fallback theme
    pub fn new(config: EngineConfig) -> Self {
        let cache = ResultCache::new(config.max_entries, config.max_bytes);
        Self {
            config,
            syntaxes: SyntaxRegistry::new(),
            themes: ThemeRegistry::new(),
            cache,
            builtins: OnceCell::new(),
        }
    }

    /// An engine with the built-in grammars and themes loaded
    pub fn with_builtins(config: EngineConfig) -> Result<Self> {
        let engine = Self::new(config);
        engine.load_builtins()?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register the built-in grammars and themes
    ///
    /// Once this succeeds, later calls do nothing. After a failure the
    /// next call tries again.
    pub fn load_builtins(&self) -> Result<()> {
        self.load_once(builtin::all_grammars, builtin::all_themes)
    }

    fn load_once(
        &self,
        grammars: impl FnOnce() -> Vec<GrammarDef>,
        themes: impl FnOnce() -> Vec<ThemeDef>,
    ) -> Result<()> {
        self.builtins.get_or_try_init(|| {
            for grammar in grammars() {
                self.register_grammar(grammar)?;
            }
            for theme in themes() {
                self.register_theme(theme)?;
            }
            tracing::info!(
                syntaxes = self.syntaxes.len(),
                themes = self.themes.len(),
                "loaded built-in definitions"
            );
            Ok::<(), Error>(())
        })?;
        Ok(())
    }

    /// Compile and register a grammar
    pub fn register_grammar(&self, grammar: GrammarDef) -> Result<()> {
        match grammar.compile() {
            Ok(syntax) => {
                self.syntaxes.register(syntax);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(grammar = %grammar.name, error = %e, "rejected grammar");
                Err(e)
            }
        }
    }

    /// Compile and register a theme
    pub fn register_theme(&self, theme: ThemeDef) -> Result<()> {
        match theme.compile() {
            Ok(theme) => {
                self.themes.register(theme);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(theme = %theme.name, error = %e, "rejected theme");
                Err(e)
            }
        }
    }

    /// Highlight `text` with a syntax (name or extension) and a theme
    ///
    /// Never fails on unknown ids: an unknown syntax renders the whole
    /// text in the theme's default style and an unknown theme falls back
    /// to the configured default. The only error is running out of
    /// memory for the result.
    pub fn highlight<'a>(&self, text: &'a str, syntax_id: &str, theme_id: &str) -> Result<HighlightResult<'a>> {
        let key = CacheKey::new(text, syntax_id, theme_id);
        if let Some(ranges) = self.cache.get(&key) {
            return Ok(HighlightResult {
                text,
                ranges,
                from_cache: true,
            });
        }

        let theme = self.resolve_theme(theme_id);
        let mut highlighter = Highlighter::new(&theme);
        let ranges = match self.resolve_syntax(syntax_id) {
            Some(syntax) => highlighter.highlight(&syntax, text)?,
            None => {
                tracing::debug!(syntax = syntax_id, "unknown syntax; using plain rendering");
                highlighter.plain(text.len())?
            }
        };

        let ranges: Arc<[StyleRange]> = ranges.into();
        self.cache.put(key, ranges.clone());
        Ok(HighlightResult {
            text,
            ranges,
            from_cache: false,
        })
    }

    /// Syntax for a name, alias, extension or file name
    ///
    /// Tried in order: exact name, name ignoring case, alias, extension,
    /// then the extension of `id` read as a file name.
    pub fn resolve_syntax(&self, id: &str) -> Option<Arc<SyntaxDefinition>> {
        self.syntaxes
            .lookup_by_name(id)
            .or_else(|| self.syntaxes.lookup_by_name_ignore_case(id))
            .or_else(|| self.syntaxes.lookup_by_alias(id))
            .or_else(|| self.syntaxes.lookup_by_extension(id))
            .or_else(|| self.syntaxes.lookup_by_file_name(id))
    }

    /// Theme for a name, falling back to the configured default and then
    /// to the registry's default
    pub fn resolve_theme(&self, id: &str) -> Arc<Theme> {
        self.themes
            .lookup_by_name(id)
            .or_else(|| self.themes.lookup_by_name_ignore_case(id))
            .or_else(|| self.themes.lookup_by_name(&self.config.default_theme))
            .unwrap_or_else(|| self.themes.default_theme())
    }

    /// Strict syntax lookup
    pub fn syntax(&self, id: &str) -> Result<Arc<SyntaxDefinition>> {
        self.resolve_syntax(id)
            .ok_or_else(|| Error::not_found(LookupKind::Syntax, id))
    }

    /// Strict theme lookup: exact name or ignoring case
    pub fn theme(&self, id: &str) -> Result<Arc<Theme>> {
        self.themes
            .lookup_by_name(id)
            .or_else(|| self.themes.lookup_by_name_ignore_case(id))
            .ok_or_else(|| Error::not_found(LookupKind::Theme, id))
    }

    /// Name of the syntax registered for a file extension
    pub fn resolve_syntax_by_extension(&self, ext: &str) -> Option<String> {
        self.syntaxes.lookup_by_extension(ext).map(|s| s.name.clone())
    }

    /// Syntax names in registration order
    pub fn syntax_names(&self) -> Vec<String> {
        self.syntaxes.list_names()
    }

    /// Theme names in registration order, the fallback first
    pub fn theme_names(&self) -> Vec<String> {
        self.themes.list_names()
    }

    pub fn syntaxes(&self) -> &SyntaxRegistry {
        &self.syntaxes
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached results
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{RuleDef, ThemeRuleDef, FALLBACK_THEME};

    fn engine() -> Engine {
        Engine::with_builtins(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_load_builtins_is_idempotent() {
        let engine = engine();
        let names = engine.syntax_names();
        engine.load_builtins().unwrap();
        assert_eq!(engine.syntax_names(), names);
        assert!(names.contains(&"Rust".to_string()));
        assert_eq!(engine.theme_names()[0], FALLBACK_THEME);
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let engine = Engine::default();
        let mut broken = GrammarDef::new("Broken", "source.broken");
        broken.add_rule(RuleDef::matching("(unclosed", "invalid"));

        let err = engine.load_once(|| vec![broken], Vec::new).unwrap_err();
        assert!(matches!(err, Error::MalformedGrammar { .. }));
        assert!(engine.syntax_names().is_empty());

        engine.load_builtins().unwrap();
        assert!(engine.syntax_names().contains(&"Rust".to_string()));

        // Loaded now; a second attempt is a no-op, not a failure
        let mut broken = GrammarDef::new("Broken", "source.broken");
        broken.add_rule(RuleDef::matching("(unclosed", "invalid"));
        engine.load_once(|| vec![broken], Vec::new).unwrap();
        assert!(engine.resolve_syntax("Broken").is_none());
    }

    #[test]
    fn test_syntax_resolution_order() {
        let engine = engine();
        assert_eq!(engine.resolve_syntax("Rust").unwrap().name, "Rust");
        assert_eq!(engine.resolve_syntax("rust").unwrap().name, "Rust");
        assert_eq!(engine.resolve_syntax("rs").unwrap().name, "Rust");
        assert_eq!(engine.resolve_syntax(".PY").unwrap().name, "Python");
        assert!(engine.resolve_syntax("cobol").is_none());

        // Aliases and file names
        assert_eq!(engine.resolve_syntax("c++").unwrap().name, "C");
        assert_eq!(engine.resolve_syntax("ObjC").unwrap().name, "C");
        assert_eq!(engine.resolve_syntax("plaintext").unwrap().name, builtin::PLAIN_TEXT);
        assert_eq!(engine.resolve_syntax("typescript").unwrap().name, "JavaScript");
        assert_eq!(engine.resolve_syntax("main.rs").unwrap().name, "Rust");
        assert_eq!(engine.resolve_syntax("docs/README.md").unwrap().name, "Markdown");
        assert!(engine.resolve_syntax("main.cobol").is_none());
        assert!(matches!(
            engine.syntax("cobol"),
            Err(Error::NotFound { kind: LookupKind::Syntax, .. })
        ));
    }

    #[test]
    fn test_theme_resolution_falls_back() {
        let engine = engine();
        assert_eq!(engine.resolve_theme("monokai").name, "Monokai");
        assert_eq!(engine.resolve_theme("nope").name, builtin::DEFAULT_THEME);
        assert!(engine.theme("nope").is_err());

        // Without builtins the configured default is missing too
        let bare = Engine::default();
        assert_eq!(bare.resolve_theme("nope").name, FALLBACK_THEME);
    }

    #[test]
    fn test_highlight_is_cached() {
        let engine = engine();
        let first = engine.highlight("let x = 1;", "Rust", "Monokai").unwrap();
        assert!(!first.from_cache());
        let second = engine.highlight("let x = 1;", "Rust", "Monokai").unwrap();
        assert!(second.from_cache());
        assert_eq!(first.ranges(), second.ranges());
        assert_eq!(engine.cache_stats().hits, 1);
        assert_eq!(engine.cache_size(), 1);

        engine.clear_cache();
        assert_eq!(engine.cache_size(), 0);
        assert!(!engine.highlight("let x = 1;", "Rust", "Monokai").unwrap().from_cache());
    }

    #[test]
    fn test_unknown_syntax_is_plain() {
        let engine = engine();
        let theme = engine.resolve_theme("Monokai");
        let result = engine.highlight("some text", "cobol", "Monokai").unwrap();
        assert_eq!(result.range_count(), 1);
        assert_eq!(result.ranges()[0], StyleRange::new(0, 9, theme.default_style));

        let empty = engine.highlight("", "cobol", "Monokai").unwrap();
        assert_eq!(empty.range_count(), 0);
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_rejected_definitions() {
        let engine = Engine::default();
        let mut grammar = GrammarDef::new("Broken", "source.broken");
        grammar.add_rule(RuleDef::include("#missing"));
        assert!(engine.register_grammar(grammar).is_err());
        assert!(engine.syntax_names().is_empty());

        let theme = ThemeDef::new("Broken", "#000", "#fff").rule(ThemeRuleDef::new("x").fg("nope"));
        assert!(engine.register_theme(theme).is_err());
        assert_eq!(engine.theme_names(), vec![FALLBACK_THEME]);
    }

    #[test]
    fn test_configured_default_theme() {
        let config = EngineConfig {
            default_theme: "Monokai".to_string(),
            ..EngineConfig::default()
        };
        let engine = Engine::with_builtins(config).unwrap();
        assert_eq!(engine.resolve_theme("nope").name, "Monokai");
    }
}
