//! hilite - a scope-based syntax highlighting engine
//!
//! Grammars tag text with nested scopes, themes map scopes to styles,
//! and the engine returns contiguous style ranges covering the text.
//!
//! ```
//! use hilite::{Engine, EngineConfig};
//!
//! let engine = Engine::with_builtins(EngineConfig::default()).unwrap();
//! let result = engine.highlight("fn main() {}", "rs", "Monokai").unwrap();
//! assert_eq!(result.ranges().last().unwrap().end, 12);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod syntax;

pub use config::EngineConfig;
pub use engine::{Engine, HighlightResult};
pub use error::{Error, LookupKind, Result};
pub use syntax::{Color, FontStyle, Style, StyleRange};
