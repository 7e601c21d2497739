//! Python grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the Python grammar
pub fn python_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("Python", "source.python");
    grammar.add_extension("py");
    grammar.add_extension("pyw");
    grammar.add_extension("pyi");
    grammar.add_alias("python3");

    // Comments
    grammar.add_rule(RuleDef::matching(r"#.*$", "comment.line.number-sign.python"));

    // Triple-quoted strings (docstrings) before single-quoted ones.
    // A prefix must start a word: in `abr"x"` only the quotes are string.
    grammar.add_rule(
        RuleDef::begin_end(r#"(?:\b(?i:[rbuf]{1,2}))?""""#, r#"""""#, "string.quoted.double.block.python")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );
    grammar.add_rule(
        RuleDef::begin_end(r"(?:\b(?i:[rbuf]{1,2}))?'''", r"'''", "string.quoted.single.block.python")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );

    // Regular strings end at the quote or the end of the line
    grammar.add_rule(
        RuleDef::begin_end(r#"(?:\b(?i:[rbuf]{1,2}))?""#, r#""|$"#, "string.quoted.double.python")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );
    grammar.add_rule(
        RuleDef::begin_end(r"(?:\b(?i:[rbuf]{1,2}))?'", r"'|$", "string.quoted.single.python")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );

    // Decorators
    grammar.add_rule(RuleDef::matching(r"@[\w.]+", "entity.name.function.decorator.python"));

    // Definitions
    grammar.add_rule(
        RuleDef::matching(r"\b(def)\s+([A-Za-z_]\w*)", "meta.function.python")
            .with_captures(&[(1, "storage.type.function.python"), (2, "entity.name.function.python")]),
    );
    grammar.add_rule(
        RuleDef::matching(r"\b(class)\s+([A-Za-z_]\w*)", "meta.class.python")
            .with_captures(&[(1, "storage.type.class.python"), (2, "entity.name.type.class.python")]),
    );

    // Keywords
    grammar.add_rule(RuleDef::matching(
        r"\b(?:and|as|assert|async|await|break|continue|del|elif|else|except|finally|for|from|global|if|import|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b",
        "keyword.control.python",
    ));
    grammar.add_rule(RuleDef::matching(r"\b(?:False|None|True)\b", "constant.language.python"));
    grammar.add_rule(RuleDef::matching(r"\b(?:self|cls)\b", "variable.language.special.python"));

    // Built-in functions
    grammar.add_rule(RuleDef::matching(
        r"\b(?:abs|all|any|ascii|bin|bool|bytearray|bytes|callable|chr|classmethod|compile|complex|delattr|dict|dir|divmod|enumerate|eval|exec|filter|float|format|frozenset|getattr|globals|hasattr|hash|help|hex|id|input|int|isinstance|issubclass|iter|len|list|locals|map|max|memoryview|min|next|object|oct|open|ord|pow|print|property|range|repr|reversed|round|set|setattr|slice|sorted|staticmethod|str|sum|super|tuple|type|vars|zip)\b",
        "support.function.builtin.python",
    ));

    // Numbers
    grammar.add_rule(RuleDef::matching(
        r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+)\b",
        "constant.numeric.integer.python",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b\d[\d_]*\.\d[\d_]*(?:[eE][+-]?\d+)?j?\b",
        "constant.numeric.float.python",
    ));
    grammar.add_rule(RuleDef::matching(r"\b\d[\d_]*j?\b", "constant.numeric.integer.python"));

    // Operators
    grammar.add_rule(RuleDef::matching(r"[+\-*/%&|^!<>=@~]+", "keyword.operator.python"));

    grammar.add_repository(
        "escapes",
        vec![RuleDef::matching(
            r#"\\(?:[\\'"abfnrtv\n]|[0-7]{1,3}|x[0-9a-fA-F]{2}|u[0-9a-fA-F]{4}|N\{[^}]+\})"#,
            "constant.character.escape.python",
        )],
    );

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::builtin::test_support::{scope_at, tokens};

    #[test]
    fn test_python_def() {
        let (_, toks) = tokens(python_grammar(), "def greet(self):\n    return None");
        assert_eq!(scope_at(&toks, 0), "storage.type.function.python");
        assert_eq!(scope_at(&toks, 4), "entity.name.function.python");
        assert_eq!(scope_at(&toks, 10), "variable.language.special.python");
        assert_eq!(scope_at(&toks, 21), "keyword.control.python");
        assert_eq!(scope_at(&toks, 28), "constant.language.python");
    }

    #[test]
    fn test_python_docstring_spans_lines() {
        let text = "\"\"\"Doc\n# not a comment\n\"\"\"\nx = 1  # comment";
        let (_, toks) = tokens(python_grammar(), text);
        assert_eq!(scope_at(&toks, 9), "string.quoted.double.block.python");
        assert_eq!(scope_at(&toks, 31), "constant.numeric.integer.python");
        assert_eq!(scope_at(&toks, 34), "comment.line.number-sign.python");
    }

    #[test]
    fn test_python_unterminated_string_ends_at_line() {
        let (_, toks) = tokens(python_grammar(), "s = 'abc\nprint(s)");
        assert_eq!(scope_at(&toks, 5), "string.quoted.single.python");
        assert_eq!(scope_at(&toks, 9), "support.function.builtin.python");
    }

    #[test]
    fn test_python_prefixed_string() {
        let (_, toks) = tokens(python_grammar(), r#"f"x{y}" rb'\x00'"#);
        assert_eq!(scope_at(&toks, 0), "string.quoted.double.python");
        assert_eq!(scope_at(&toks, 11), "constant.character.escape.python");
    }

    #[test]
    fn test_python_prefix_needs_word_start() {
        let (_, toks) = tokens(python_grammar(), r#"abr"x" + u'y'"#);
        assert_eq!(scope_at(&toks, 2), "source.python");
        assert_eq!(scope_at(&toks, 3), "string.quoted.double.python");
        assert_eq!(scope_at(&toks, 9), "string.quoted.single.python");
        assert_eq!(scope_at(&toks, 12), "string.quoted.single.python");
    }
}
