//! C/C++ grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the C grammar (also used for C++)
pub fn c_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("C", "source.c");
    for ext in ["c", "h", "cpp", "hpp", "cc", "cxx"] {
        grammar.add_extension(ext);
    }
    for alias in ["c++", "objc", "objective-c"] {
        grammar.add_alias(alias);
    }

    // Comments
    grammar.add_rule(RuleDef::begin_end(r"/\*", r"\*/", "comment.block.c"));
    grammar.add_rule(RuleDef::matching(r"//.*$", "comment.line.double-slash.c"));

    // Preprocessor directives run to the end of the line
    grammar.add_rule(
        RuleDef::begin_end(r"^\s*(#)\s*(\w+)", r"$", "meta.preprocessor.c")
            .with_begin_captures(&[(1, "punctuation.definition.directive.c"), (2, "keyword.control.directive.c")])
            .with_patterns(vec![
                RuleDef::matching(r"<[^>\n]*>", "string.quoted.other.lt-gt.include.c"),
                RuleDef::include("#strings"),
                RuleDef::begin_end(r"/\*", r"\*/", "comment.block.c"),
                RuleDef::matching(r"//.*$", "comment.line.double-slash.c"),
            ]),
    );

    grammar.add_rule(RuleDef::include("#strings"));

    // Character literals
    grammar.add_rule(RuleDef::matching(r"'(?:[^'\\\n]|\\.)'", "string.quoted.single.c"));

    // Keywords
    grammar.add_rule(RuleDef::matching(
        r"\b(?:break|case|continue|default|do|else|for|goto|if|return|switch|while)\b",
        "keyword.control.c",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b(?:auto|char|const|double|enum|extern|float|inline|int|long|register|restrict|short|signed|sizeof|static|struct|typedef|union|unsigned|void|volatile|_Alignas|_Alignof|_Atomic|_Bool|_Complex|_Generic|_Imaginary|_Noreturn|_Static_assert|_Thread_local)\b",
        "storage.type.c",
    ));

    // C++ keywords
    grammar.add_rule(RuleDef::matching(
        r"\b(?:alignas|alignof|asm|bool|catch|class|concept|consteval|constexpr|constinit|const_cast|co_await|co_return|co_yield|decltype|delete|dynamic_cast|explicit|export|friend|mutable|namespace|new|noexcept|operator|private|protected|public|reinterpret_cast|requires|static_assert|static_cast|template|this|thread_local|throw|try|typeid|typename|using|virtual)\b",
        "keyword.other.cpp",
    ));
    grammar.add_rule(RuleDef::matching(r"\b(?:true|false|nullptr|NULL)\b", "constant.language.c"));

    // Standard types
    grammar.add_rule(RuleDef::matching(
        r"\b(?:size_t|ptrdiff_t|intptr_t|uintptr_t|u?int(?:8|16|32|64)_t|FILE)\b",
        "support.type.c",
    ));

    // Function calls and definitions
    grammar.add_rule(
        RuleDef::matching(r"\b([A-Za-z_]\w*)\s*\(", "meta.function-call.c")
            .with_captures(&[(1, "entity.name.function.c")]),
    );

    // Numbers
    grammar.add_rule(RuleDef::matching(r"\b0[xX][0-9a-fA-F]+[uUlL]*\b", "constant.numeric.hex.c"));
    grammar.add_rule(RuleDef::matching(
        r"(?:\b\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?[fFlL]?\b",
        "constant.numeric.float.c",
    ));
    grammar.add_rule(RuleDef::matching(r"\b\d+[uUlL]*\b", "constant.numeric.integer.c"));

    // Operators
    grammar.add_rule(RuleDef::matching(r"[+\-*/%&|^!<>=~?:]+", "keyword.operator.c"));

    grammar.add_repository(
        "strings",
        vec![RuleDef::begin_end(r#"""#, r#"""#, "string.quoted.double.c").with_patterns(vec![
            RuleDef::matching(r#"\\(?:[abfnrtv\\'"?]|[0-7]{1,3}|x[0-9a-fA-F]+)"#, "constant.character.escape.c"),
            RuleDef::matching(r"%[-+ #0]*\d*(?:\.\d+)?[hlLqjzt]*[diouxXeEfgGcspn%]", "constant.other.placeholder.c"),
        ])],
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_support::{scope_at, scopes_at, tokens};

    #[test]
    fn test_c_include() {
        let (_, toks) = tokens(c_grammar(), "#include <stdio.h>\nint x;");
        assert_eq!(scope_at(&toks, 0), "punctuation.definition.directive.c");
        assert_eq!(scope_at(&toks, 1), "keyword.control.directive.c");
        assert_eq!(scope_at(&toks, 10), "string.quoted.other.lt-gt.include.c");
        // The directive ends with its line
        assert_eq!(scope_at(&toks, 19), "storage.type.c");
    }

    #[test]
    fn test_c_string_escapes_and_placeholders() {
        let text = r#"printf("%d\n", n);"#;
        let (_, toks) = tokens(c_grammar(), text);
        assert_eq!(scope_at(&toks, 0), "entity.name.function.c");
        assert_eq!(scope_at(&toks, 8), "constant.other.placeholder.c");
        assert_eq!(
            scopes_at(&toks, 10),
            "source.c string.quoted.double.c constant.character.escape.c"
        );
    }

    #[test]
    fn test_c_block_comment_spans_lines() {
        let text = "/* one\n   two */ return 0;";
        let (_, toks) = tokens(c_grammar(), text);
        assert_eq!(scope_at(&toks, 10), "comment.block.c");
        assert_eq!(scope_at(&toks, 17), "keyword.control.c");
        assert_eq!(scope_at(&toks, 24), "constant.numeric.integer.c");
    }

    #[test]
    fn test_cpp_keywords() {
        let (_, toks) = tokens(c_grammar(), "class A { public: };");
        assert_eq!(scope_at(&toks, 0), "keyword.other.cpp");
        assert_eq!(scope_at(&toks, 10), "keyword.other.cpp");
    }
}
