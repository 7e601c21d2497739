//! Plain text: a root scope and nothing else

use crate::syntax::grammar::GrammarDef;

/// Name of the plain-text grammar
pub const PLAIN_TEXT: &str = "Plain Text";

pub fn plain_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new(PLAIN_TEXT, "text.plain");
    grammar.add_extension("txt");
    grammar.add_extension("text");
    grammar.add_alias("plaintext");
    grammar.add_alias("plain");
    grammar
}
