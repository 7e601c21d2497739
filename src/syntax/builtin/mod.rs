//! Built-in grammars and themes
//!
//! Grammars for common languages and a handful of popular themes, all
//! expressed with the builder API so they compile at load time.

mod c;
mod javascript;
mod json;
mod markdown;
mod plain;
mod python;
mod rust;
mod themes;
mod toml_lang;

use super::grammar::GrammarDef;
use super::theme::ThemeDef;

pub use plain::PLAIN_TEXT;
pub use themes::DEFAULT_THEME;

/// All built-in grammars, in registration order
pub fn all_grammars() -> Vec<GrammarDef> {
    vec![
        plain::plain_grammar(),
        rust::rust_grammar(),
        c::c_grammar(),
        python::python_grammar(),
        javascript::javascript_grammar(),
        json::json_grammar(),
        toml_lang::toml_grammar(),
        markdown::markdown_grammar(),
    ]
}

/// All built-in themes, the engine default first
pub fn all_themes() -> Vec<ThemeDef> {
    themes::all_themes()
}
