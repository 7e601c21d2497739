//! TOML grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the TOML grammar
pub fn toml_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("TOML", "source.toml");
    grammar.add_extension("toml");

    // Comments
    grammar.add_rule(RuleDef::matching(r"#.*$", "comment.line.number-sign.toml"));

    // Table headers
    grammar.add_rule(
        RuleDef::matching(r"^\s*(\[\[?)([^\]\n]+)(\]\]?)", "meta.table.toml").with_captures(&[
            (1, "punctuation.definition.table.toml"),
            (2, "entity.name.table.toml"),
            (3, "punctuation.definition.table.toml"),
        ]),
    );

    // Keys at the start of a line
    grammar.add_rule(
        RuleDef::matching(r"^\s*([A-Za-z0-9_\-.]+)\s*(=)", "meta.entry.toml").with_captures(&[
            (1, "variable.other.key.toml"),
            (2, "punctuation.separator.key-value.toml"),
        ]),
    );

    // Multi-line strings before single-line ones
    grammar.add_rule(
        RuleDef::begin_end(r#"""""#, r#"""""#, "string.quoted.triple.basic.block.toml")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );
    grammar.add_rule(RuleDef::begin_end(
        r"'''",
        r"'''",
        "string.quoted.triple.literal.block.toml",
    ));

    // Basic strings (with escapes) and literal strings (without)
    grammar.add_rule(
        RuleDef::begin_end(r#"""#, r#""|$"#, "string.quoted.single.basic.line.toml")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );
    grammar.add_rule(RuleDef::begin_end(r"'", r"'|$", "string.quoted.single.literal.line.toml"));

    // Booleans
    grammar.add_rule(RuleDef::matching(r"\b(?:true|false)\b", "constant.language.boolean.toml"));

    // Dates and times
    grammar.add_rule(RuleDef::matching(
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)?",
        "constant.other.datetime.toml",
    ));
    grammar.add_rule(RuleDef::matching(r"\d{2}:\d{2}:\d{2}(?:\.\d+)?", "constant.other.time.toml"));

    // Numbers
    grammar.add_rule(RuleDef::matching(
        r"\b(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+)\b",
        "constant.numeric.integer.toml",
    ));
    grammar.add_rule(RuleDef::matching(
        r"[+-]?(?:\d[\d_]*(?:\.\d[\d_]*)?[eE][+-]?\d+|\d[\d_]*\.\d[\d_]*|inf\b|nan\b)",
        "constant.numeric.float.toml",
    ));
    grammar.add_rule(RuleDef::matching(r"[+-]?\d[\d_]*\b", "constant.numeric.integer.toml"));

    grammar.add_repository(
        "escapes",
        vec![RuleDef::matching(
            r#"\\(?:[btnfr"\\]|u[0-9a-fA-F]{4}|U[0-9a-fA-F]{8})"#,
            "constant.character.escape.toml",
        )],
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_support::{scope_at, tokens};

    #[test]
    fn test_toml_table_and_keys() {
        let text = "[package]\nname = \"hilite\"\nedition = 2021\n";
        let (_, toks) = tokens(toml_grammar(), text);
        assert_eq!(scope_at(&toks, 0), "punctuation.definition.table.toml");
        assert_eq!(scope_at(&toks, 1), "entity.name.table.toml");
        assert_eq!(scope_at(&toks, 10), "variable.other.key.toml");
        assert_eq!(scope_at(&toks, 15), "punctuation.separator.key-value.toml");
        assert_eq!(scope_at(&toks, 18), "string.quoted.single.basic.line.toml");
        assert_eq!(scope_at(&toks, 37), "constant.numeric.integer.toml");
    }

    #[test]
    fn test_toml_comment_and_bool() {
        let (_, toks) = tokens(toml_grammar(), "debug = true # note");
        assert_eq!(scope_at(&toks, 8), "constant.language.boolean.toml");
        assert_eq!(scope_at(&toks, 14), "comment.line.number-sign.toml");
    }

    #[test]
    fn test_toml_datetime() {
        let (_, toks) = tokens(toml_grammar(), "at = 1979-05-27T07:32:00Z");
        assert_eq!(scope_at(&toks, 5), "constant.other.datetime.toml");
        assert_eq!(scope_at(&toks, 24), "constant.other.datetime.toml");
    }
}
