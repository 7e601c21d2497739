//! Markdown grammar

use crate::syntax::grammar::GrammarDef;
use crate::syntax::rules::RuleDef;

/// Create the Markdown grammar
pub fn markdown_grammar() -> GrammarDef {
    let mut grammar = GrammarDef::new("Markdown", "text.html.markdown");
    grammar.add_extension("md");
    grammar.add_extension("markdown");
    grammar.add_extension("mkd");

    // Fenced code blocks; the closing fence must match the opening one
    grammar.add_rule(
        RuleDef::begin_end(r"^\s*(`{3,}|~{3,})\s*([\w+\-]*).*$", r"^\s*\1\s*$", "markup.raw.block.fenced.markdown")
            .with_begin_captures(&[(1, "punctuation.definition.fenced.markdown"), (2, "constant.other.language.markdown")])
            .with_end_captures(&[(0, "punctuation.definition.fenced.markdown")]),
    );

    // Headers
    grammar.add_rule(
        RuleDef::matching(r"^(#{1,6})\s+(.*)$", "markup.heading.markdown").with_captures(&[
            (1, "punctuation.definition.heading.markdown"),
            (2, "entity.name.section.markdown"),
        ]),
    );

    // Blockquotes
    grammar.add_rule(RuleDef::matching(r"^\s*>.*$", "markup.quote.markdown"));

    // Horizontal rules
    grammar.add_rule(RuleDef::matching(r"^(?:-{3,}|\*{3,}|_{3,})\s*$", "meta.separator.markdown"));

    // List items
    grammar.add_rule(RuleDef::matching(
        r"^\s*(?:[-*+]|\d+\.)\s",
        "punctuation.definition.list_item.markdown",
    ));

    // Inline code
    grammar.add_rule(RuleDef::matching(r"`[^`\n]+`", "markup.raw.inline.markdown"));

    // Images ![alt](url) before links
    grammar.add_rule(
        RuleDef::matching(r"!\[([^\]\n]*)\]\(([^)\n]+)\)", "meta.image.inline.markdown")
            .with_captures(&[(1, "string.other.link.description.markdown"), (2, "markup.underline.link.markdown")]),
    );

    // Links [text](url) and reference links [text][ref]
    grammar.add_rule(
        RuleDef::matching(r"\[([^\]\n]+)\]\(([^)\n]+)\)", "meta.link.inline.markdown")
            .with_captures(&[(1, "string.other.link.title.markdown"), (2, "markup.underline.link.markdown")]),
    );
    grammar.add_rule(
        RuleDef::matching(r"\[([^\]\n]+)\]\[[^\]\n]*\]", "meta.link.reference.markdown")
            .with_captures(&[(1, "string.other.link.title.markdown")]),
    );

    // Bold before italic, which shares the delimiters
    grammar.add_rule(RuleDef::matching(r"\*\*[^*\n]+\*\*|__[^_\n]+__", "markup.bold.markdown"));
    grammar.add_rule(RuleDef::matching(r"\*[^*\n]+\*|\b_[^_\n]+_\b", "markup.italic.markdown"));

    // Strikethrough
    grammar.add_rule(RuleDef::matching(r"~~[^~\n]+~~", "markup.strikethrough.markdown"));

    grammar
}
