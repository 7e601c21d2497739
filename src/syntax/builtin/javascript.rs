//! JavaScript grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the JavaScript grammar (also used for TypeScript sources)
pub fn javascript_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("JavaScript", "source.js");
    for ext in ["js", "mjs", "cjs", "jsx", "ts", "tsx"] {
        grammar.add_extension(ext);
    }
    grammar.add_alias("typescript");

    // Comments
    grammar.add_rule(RuleDef::matching(r"//.*$", "comment.line.double-slash.js"));
    grammar.add_rule(RuleDef::begin_end(r"/\*", r"\*/", "comment.block.js"));

    // Strings
    grammar.add_rule(
        RuleDef::begin_end(r#"""#, r#""|$"#, "string.quoted.double.js")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );
    grammar.add_rule(
        RuleDef::begin_end(r"'", r"'|$", "string.quoted.single.js")
            .with_patterns(vec![RuleDef::include("#escapes")]),
    );

    // Template literals span lines and embed expressions
    grammar.add_rule(
        RuleDef::begin_end(r"`", r"`", "string.template.js").with_patterns(vec![
            RuleDef::include("#escapes"),
            RuleDef::begin_end(r"\$\{", r"\}", "meta.template.expression.js")
                .with_begin_captures(&[(0, "punctuation.definition.template-expression.begin.js")])
                .with_end_captures(&[(0, "punctuation.definition.template-expression.end.js")])
                .with_patterns(vec![RuleDef::include("$self")]),
        ]),
    );

    // Function declarations
    grammar.add_rule(
        RuleDef::matching(r"\b(function)\s*(\*?)\s*([A-Za-z_$][\w$]*)", "meta.function.js").with_captures(&[
            (1, "storage.type.function.js"),
            (2, "keyword.generator.asterisk.js"),
            (3, "entity.name.function.js"),
        ]),
    );

    // Keywords
    grammar.add_rule(RuleDef::matching(
        r"\b(?:break|case|catch|continue|debugger|default|do|else|finally|for|if|return|switch|throw|try|while|with|yield|await)\b",
        "keyword.control.js",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b(?:async|class|const|delete|export|extends|function|import|from|in|instanceof|let|new|of|static|typeof|var|void)\b",
        "storage.type.js",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b(?:true|false|null|undefined|NaN|Infinity)\b",
        "constant.language.js",
    ));
    grammar.add_rule(RuleDef::matching(r"\b(?:this|super)\b", "variable.language.js"));

    // Numbers
    grammar.add_rule(RuleDef::matching(
        r"\b(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+)n?\b",
        "constant.numeric.integer.js",
    ));
    grammar.add_rule(RuleDef::matching(
        r"\b\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?n?\b",
        "constant.numeric.decimal.js",
    ));

    // Operators and arrows
    grammar.add_rule(RuleDef::matching(r"=>", "storage.type.function.arrow.js"));
    grammar.add_rule(RuleDef::matching(r"[+\-*/%&|^!<>=~?:]+", "keyword.operator.js"));

    grammar.add_repository(
        "escapes",
        vec![RuleDef::matching(
            r"\\(?:x[0-9a-fA-F]{2}|u\{[0-9a-fA-F]+\}|u[0-9a-fA-F]{4}|.)",
            "constant.character.escape.js",
        )],
    );

    grammar
}
