//! JSON grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the JSON grammar
pub fn json_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("JSON", "source.json");
    for ext in ["json", "jsonc", "geojson"] {
        grammar.add_extension(ext);
    }

    grammar.add_rule(RuleDef::include("#value"));

    grammar.add_repository(
        "value",
        vec![
            RuleDef::include("#comments"),
            RuleDef::include("#object"),
            RuleDef::include("#array"),
            RuleDef::include("#string"),
            RuleDef::matching(r"\b(?:true|false|null)\b", "constant.language.json"),
            RuleDef::matching(
                r"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?",
                "constant.numeric.json",
            ),
        ],
    );

    // Keys are strings followed by a colon
    grammar.add_repository(
        "object",
        vec![RuleDef::begin_end(r"\{", r"\}", "meta.structure.dictionary.json")
            .with_begin_captures(&[(0, "punctuation.section.dictionary.begin.json")])
            .with_end_captures(&[(0, "punctuation.section.dictionary.end.json")])
            .with_patterns(vec![
                RuleDef::include("#comments"),
                RuleDef::matching(r#"("(?:[^"\\\n]|\\.)*")\s*(:)"#, "").with_captures(&[
                    (1, "support.type.property-name.json"),
                    (2, "punctuation.separator.dictionary.key-value.json"),
                ]),
                RuleDef::matching(",", "punctuation.separator.dictionary.pair.json"),
                RuleDef::include("#value"),
            ])],
    );

    grammar.add_repository(
        "array",
        vec![RuleDef::begin_end(r"\[", r"\]", "meta.structure.array.json")
            .with_begin_captures(&[(0, "punctuation.section.array.begin.json")])
            .with_end_captures(&[(0, "punctuation.section.array.end.json")])
            .with_patterns(vec![
                RuleDef::include("#value"),
                RuleDef::matching(",", "punctuation.separator.array.json"),
            ])],
    );

    grammar.add_repository(
        "string",
        vec![RuleDef::begin_end(r#"""#, r#"""#, "string.quoted.double.json")
            .with_patterns(vec![RuleDef::include("#escapes")])],
    );

    grammar.add_repository(
        "escapes",
        vec![RuleDef::matching(
            r#"\\(?:["\\/bfnrt]|u[0-9a-fA-F]{4})"#,
            "constant.character.escape.json",
        )],
    );

    // JSON with comments
    grammar.add_repository(
        "comments",
        vec![
            RuleDef::begin_end(r"/\*", r"\*/", "comment.block.json"),
            RuleDef::matching(r"//.*$", "comment.line.double-slash.json"),
        ],
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_support::{scope_at, scopes_at, tokens};

    #[test]
    fn test_json_object() {
        let text = r#"{"a": [1, true], "b": "x\n"}"#;
        let (_, toks) = tokens(json_grammar(), text);
        assert_eq!(scope_at(&toks, 0), "punctuation.section.dictionary.begin.json");
        assert_eq!(scope_at(&toks, 2), "support.type.property-name.json");
        assert_eq!(scope_at(&toks, 4), "punctuation.separator.dictionary.key-value.json");
        assert_eq!(scope_at(&toks, 7), "constant.numeric.json");
        assert_eq!(scope_at(&toks, 10), "constant.language.json");
        assert_eq!(scope_at(&toks, 15), "punctuation.separator.dictionary.pair.json");
        assert_eq!(scope_at(&toks, 18), "support.type.property-name.json");
        assert_eq!(
            scopes_at(&toks, 23),
            "source.json meta.structure.dictionary.json string.quoted.double.json"
        );
        assert_eq!(scope_at(&toks, 24), "constant.character.escape.json");
        assert_eq!(scope_at(&toks, 27), "punctuation.section.dictionary.end.json");
    }

    #[test]
    fn test_json_top_level_after_object() {
        let (_, toks) = tokens(json_grammar(), r#"{"k": 1} 2"#);
        assert_eq!(scope_at(&toks, 6), "constant.numeric.json");
        assert_eq!(scopes_at(&toks, 9), "source.json constant.numeric.json");
    }
}
