//! Rust grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the Rust grammar
pub fn rust_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("Rust", "source.rust");
    grammar.add_extension("rs");

    // Comments first: nothing inside them is code
    grammar.add_rule(RuleDef::include("#comments"));

    // Raw strings r#"..."#, closed by the same number of hashes
    grammar.add_rule(
        RuleDef::begin_end(r##"\bb?r(#*)""##, r#""\1"#, "string.quoted.other.raw.rust")
            .with_begin_captures(&[(0, "punctuation.definition.string.begin.rust")])
            .with_end_captures(&[(0, "punctuation.definition.string.end.rust")]),
    );

    // Strings, with escapes
    grammar.add_rule(
        RuleDef::begin_end(r#"b?""#, r#"""#, "string.quoted.double.rust")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );

    // Attributes
    grammar.add_rule(
        RuleDef::begin_end(r"#!?\[", r"\]", "meta.attribute.rust")
            .with_patterns(vec![RuleDef::include("#strings_in_attributes")]),
    );

    // Character literals before lifetimes, which share the quote
    grammar.add_rule(RuleDef::matching(
        r"b?'(?:[^'\\\n]|\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.))'",
        "constant.character.rust",
    ));
    grammar.add_rule(RuleDef::matching(r"'[A-Za-z_]\w*", "storage.modifier.lifetime.rust"));

    // Function definitions
    grammar.add_rule(
        RuleDef::matching(r"\b(fn)\s+([A-Za-z_]\w*)", "meta.function.rust")
            .with_captures(&[(1, "keyword.other.fn.rust"), (2, "entity.name.function.rust")]),
    );

    // Macros (ending with !)
    grammar.add_rule(RuleDef::matching(r"\b[A-Za-z_]\w*!", "support.macro.rust"));

    // Keywords
    grammar.add_rule(RuleDef::matching(
        r"\b(?:break|continue|else|for|if|in|loop|match|return|while|yield|await)\b",
        "keyword.control.rust",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b(?:as|async|const|crate|dyn|enum|extern|fn|impl|let|mod|move|mut|pub|ref|static|struct|super|trait|type|union|unsafe|use|where)\b",
        "keyword.other.rust",
    ));
    grammar.add_rule(RuleDef::matching(r"\b(?:self|Self)\b", "variable.language.self.rust"));
    grammar.add_rule(RuleDef::matching(r"\b(?:true|false)\b", "constant.language.boolean.rust"));

    // Built-in types
    grammar.add_rule(RuleDef::matching(
        r"\b(?:bool|char|str|u8|u16|u32|u64|u128|usize|i8|i16|i32|i64|i128|isize|f32|f64)\b",
        "storage.type.core.rust",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b(?:Some|None|Ok|Err)\b",
        "support.constant.core.rust",
    ));

    // Type names (capitalized identifiers)
    grammar.add_rule(RuleDef::matching(r"\b[A-Z][A-Za-z0-9_]*\b", "entity.name.type.rust"));

    // Numbers
    grammar.add_rule(RuleDef::matching(
        r"\b(?:0x[0-9a-fA-F_]+|0b[01_]+|0o[0-7_]+)(?:[iu](?:8|16|32|64|128|size))?\b",
        "constant.numeric.integer.rust",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?(?:f32|f64)?\b",
        "constant.numeric.float.rust",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b\d[\d_]*(?:[iu](?:8|16|32|64|128|size)|f32|f64)?\b",
        "constant.numeric.integer.rust",
    ));

    // Operators
    grammar.add_rule(RuleDef::matching(r"[+\-*/%&|^!<>=@]+", "keyword.operator.rust"));

    grammar.add_repository(
        "comments",
        vec![
            RuleDef::matching(r"///.*$", "comment.line.documentation.rust"),
            RuleDef::matching(r"//.*$", "comment.line.double-slash.rust"),
            // Block comments nest
            RuleDef::begin_end(r"/\*", r"\*/", "comment.block.rust")
                .with_patterns(vec![RuleDef::include("#block_comment")]),
        ],
    );
    grammar.add_repository(
        "block_comment",
        vec![RuleDef::begin_end(r"/\*", r"\*/", "comment.block.rust")
            .with_patterns(vec![RuleDef::include("#block_comment")])],
    );
    grammar.add_repository(
        "escapes",
        vec![RuleDef::matching(
            r"\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]{1,6}\}|.)",
            "constant.character.escape.rust",
        )],
    );
    grammar.add_repository(
        "strings_in_attributes",
        vec![RuleDef::begin_end(r#"""#, r#"""#, "string.quoted.double.rust")
            .with_patterns(vec![RuleDef::include("#escapes")])],
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_support::{scope_at, scopes_at, tokens};

    #[test]
    fn test_rust_keywords() {
        let (_, toks) = tokens(rust_grammar(), "let mut x = 5;");
        assert_eq!(scope_at(&toks, 0), "keyword.other.rust");
        assert_eq!(scope_at(&toks, 4), "keyword.other.rust");
        assert_eq!(scope_at(&toks, 8), "source.rust");
        assert_eq!(scope_at(&toks, 12), "constant.numeric.integer.rust");
    }

    #[test]
    fn test_rust_string_with_escape() {
        let text = r#"let s = "a\nb";"#;
        let (_, toks) = tokens(rust_grammar(), text);
        assert_eq!(scope_at(&toks, 8), "string.quoted.double.rust");
        assert_eq!(
            scopes_at(&toks, 10),
            "source.rust string.quoted.double.rust constant.character.escape.rust"
        );
        assert_eq!(scope_at(&toks, 14), "source.rust");
    }

    #[test]
    fn test_rust_comment() {
        let (_, toks) = tokens(rust_grammar(), "// let x = \"no\"");
        assert_eq!(toks.len(), 1);
        assert_eq!(scope_at(&toks, 3), "comment.line.double-slash.rust");
    }

    #[test]
    fn test_rust_nested_block_comment() {
        let text = "/* a /* b */ c */ x";
        let (_, toks) = tokens(rust_grammar(), text);
        // "c" is still inside the outer comment
        assert_eq!(scope_at(&toks, 13), "comment.block.rust");
        assert_eq!(scope_at(&toks, 18), "source.rust");
    }

    #[test]
    fn test_rust_raw_string() {
        let text = r###"r#"say "hi""# + 1"###;
        let (_, toks) = tokens(rust_grammar(), text);
        assert_eq!(scope_at(&toks, 8), "string.quoted.other.raw.rust");
        assert_eq!(scope_at(&toks, 11), "punctuation.definition.string.end.rust");
        assert_eq!(scope_at(&toks, 14), "keyword.operator.rust");
    }

    #[test]
    fn test_rust_function_and_macro() {
        let (_, toks) = tokens(rust_grammar(), "fn main() { println!(\"x\"); }");
        assert_eq!(scope_at(&toks, 0), "keyword.other.fn.rust");
        assert_eq!(scope_at(&toks, 3), "entity.name.function.rust");
        assert_eq!(scope_at(&toks, 12), "support.macro.rust");
    }

    #[test]
    fn test_rust_char_and_lifetime() {
        let (_, toks) = tokens(rust_grammar(), "'a' &'b str");
        assert_eq!(scope_at(&toks, 1), "constant.character.rust");
        assert_eq!(scope_at(&toks, 5), "storage.modifier.lifetime.rust");
        assert_eq!(scope_at(&toks, 8), "storage.type.core.rust");
    }
}
