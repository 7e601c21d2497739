//! Syntax and theme registries
//!
//! Both registries hold immutable snapshots behind an `RwLock<Arc<_>>`.
//! Readers clone the `Arc` and work on that snapshot; writers are
//! serialized, build the next snapshot off to the side and swap it in.
//! A reader therefore sees either the old or the new snapshot, never a
//! half-applied registration.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use super::grammar::SyntaxDefinition;
use super::theme::Theme;
use crate::error::{Error, LookupKind, Result};

/// Lowercase and trim a name for forgiving lookups
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Lowercase an extension and drop a leading dot
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase()
}

/// Copy-on-write cell shared by both registries
struct Snapshots<T> {
    current: RwLock<Arc<T>>,
    writer: Mutex<()>,
}

impl<T: Clone> Snapshots<T> {
    fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
            writer: Mutex::new(()),
        }
    }

    fn load(&self) -> Arc<T> {
        self.current.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Apply `f` to a copy of the current snapshot and publish it
    fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let _guard = self.write_lock();
        let mut next = T::clone(&self.load());
        let out = f(&mut next);
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = Arc::new(next);
        out
    }
}

#[derive(Clone, Default)]
struct SyntaxSnapshot {
    /// Registration order
    syntaxes: Vec<Arc<SyntaxDefinition>>,
    by_name: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl SyntaxSnapshot {
    fn insert(&mut self, syntax: Arc<SyntaxDefinition>) -> bool {
        let replaced = match self.by_name.get(&syntax.name) {
            Some(&index) => {
                self.syntaxes[index] = syntax;
                true
            }
            None => {
                self.syntaxes.push(syntax);
                false
            }
        };
        self.reindex();
        replaced
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        self.by_normalized.clear();
        self.by_extension.clear();
        self.by_alias.clear();
        for (index, syntax) in self.syntaxes.iter().enumerate() {
            self.by_name.insert(syntax.name.clone(), index);
            self.by_normalized.entry(normalize_name(&syntax.name)).or_insert(index);
            for ext in &syntax.extensions {
                self.by_extension.entry(normalize_extension(ext)).or_insert(index);
            }
            for alias in &syntax.aliases {
                self.by_alias.entry(normalize_name(alias)).or_insert(index);
            }
        }
    }
}

/// Registered syntax definitions
pub struct SyntaxRegistry {
    snapshots: Snapshots<SyntaxSnapshot>,
}

impl SyntaxRegistry {
    pub fn new() -> Self {
        Self {
            snapshots: Snapshots::new(SyntaxSnapshot::default()),
        }
    }

    /// Add a definition; an existing definition of the same name is
    /// replaced and keeps its position
    pub fn register(&self, syntax: SyntaxDefinition) {
        let name = syntax.name.clone();
        let replaced = self.snapshots.update(|snap| snap.insert(Arc::new(syntax)));
        if replaced {
            tracing::info!(syntax = %name, "replaced syntax definition");
        } else {
            tracing::debug!(syntax = %name, "registered syntax definition");
        }
    }

    /// Exact, case-sensitive name lookup
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<SyntaxDefinition>> {
        let snap = self.snapshots.load();
        snap.by_name.get(name).map(|&i| snap.syntaxes[i].clone())
    }

    /// Name lookup ignoring ASCII case and surrounding whitespace
    pub fn lookup_by_name_ignore_case(&self, name: &str) -> Option<Arc<SyntaxDefinition>> {
        let snap = self.snapshots.load();
        snap.by_normalized
            .get(&normalize_name(name))
            .map(|&i| snap.syntaxes[i].clone())
    }

    /// Alias lookup ignoring ASCII case, e.g. `"c++"`; first registered wins
    pub fn lookup_by_alias(&self, alias: &str) -> Option<Arc<SyntaxDefinition>> {
        let snap = self.snapshots.load();
        snap.by_alias
            .get(&normalize_name(alias))
            .map(|&i| snap.syntaxes[i].clone())
    }

    /// Extension lookup, e.g. `"rs"` or `".RS"`; first registered wins
    pub fn lookup_by_extension(&self, ext: &str) -> Option<Arc<SyntaxDefinition>> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return None;
        }
        let snap = self.snapshots.load();
        snap.by_extension.get(&ext).map(|&i| snap.syntaxes[i].clone())
    }

    /// Lookup by the extension of a file name, e.g. `"src/main.rs"`
    pub fn lookup_by_file_name(&self, file_name: &str) -> Option<Arc<SyntaxDefinition>> {
        let ext = Path::new(file_name.trim()).extension()?.to_str()?;
        self.lookup_by_extension(ext)
    }

    /// Names in registration order
    pub fn list_names(&self) -> Vec<String> {
        self.snapshots
            .load()
            .syntaxes
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.load().syntaxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.snapshots.update(|snap| *snap = SyntaxSnapshot::default());
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
struct ThemeSnapshot {
    themes: Vec<Arc<Theme>>,
    by_name: HashMap<String, usize>,
    by_normalized: HashMap<String, usize>,
    default: usize,
}

impl ThemeSnapshot {
    fn with_fallback() -> Self {
        let mut snap = Self {
            themes: vec![Arc::new(Theme::fallback())],
            by_name: HashMap::new(),
            by_normalized: HashMap::new(),
            default: 0,
        };
        snap.reindex();
        snap
    }

    fn insert(&mut self, theme: Arc<Theme>) -> bool {
        let replaced = match self.by_name.get(&theme.name) {
            Some(&index) => {
                self.themes[index] = theme;
                true
            }
            None => {
                self.themes.push(theme);
                false
            }
        };
        self.reindex();
        replaced
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        self.by_normalized.clear();
        for (index, theme) in self.themes.iter().enumerate() {
            self.by_name.insert(theme.name.clone(), index);
            self.by_normalized.entry(normalize_name(&theme.name)).or_insert(index);
        }
    }
}

/// Registered themes; never empty
pub struct ThemeRegistry {
    snapshots: Snapshots<ThemeSnapshot>,
}

impl ThemeRegistry {
    /// A registry holding only the fallback theme
    pub fn new() -> Self {
        Self {
            snapshots: Snapshots::new(ThemeSnapshot::with_fallback()),
        }
    }

    /// Add a theme; an existing theme of the same name is replaced
    pub fn register(&self, theme: Theme) {
        let name = theme.name.clone();
        let replaced = self.snapshots.update(|snap| snap.insert(Arc::new(theme)));
        if replaced {
            tracing::info!(theme = %name, "replaced theme");
        } else {
            tracing::debug!(theme = %name, "registered theme");
        }
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<Theme>> {
        let snap = self.snapshots.load();
        snap.by_name.get(name).map(|&i| snap.themes[i].clone())
    }

    pub fn lookup_by_name_ignore_case(&self, name: &str) -> Option<Arc<Theme>> {
        let snap = self.snapshots.load();
        snap.by_normalized
            .get(&normalize_name(name))
            .map(|&i| snap.themes[i].clone())
    }

    pub fn list_names(&self) -> Vec<String> {
        self.snapshots
            .load()
            .themes
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.load().themes.len()
    }

    /// The registry's default theme; the fallback unless changed
    pub fn default_theme(&self) -> Arc<Theme> {
        let snap = self.snapshots.load();
        snap.themes[snap.default].clone()
    }

    /// Make a registered theme the default
    pub fn set_default(&self, name: &str) -> Result<()> {
        self.snapshots.update(|snap| {
            let index = snap
                .by_name
                .get(name)
                .or_else(|| snap.by_normalized.get(&normalize_name(name)))
                .copied()
                .ok_or_else(|| Error::not_found(LookupKind::Theme, name))?;
            snap.default = index;
            Ok(())
        })
    }

    /// Drop every theme except the fallback
    pub fn clear(&self) {
        self.snapshots.update(|snap| *snap = ThemeSnapshot::with_fallback());
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
