//! Built-in color themes

use crate::syntax::theme::{ThemeDef, ThemeRuleDef};

/// Theme used when a caller names none or an unknown one
pub const DEFAULT_THEME: &str = "InspiredGitHub";

pub fn all_themes() -> Vec<ThemeDef> {
    vec![inspired_github(), base16_ocean_dark(), solarized_dark(), monokai()]
}

fn inspired_github() -> ThemeDef {
    ThemeDef::new(DEFAULT_THEME, "#323232", "#ffffff")
        .rule(ThemeRuleDef::new("comment").fg("#969896").font("italic"))
        .rule(ThemeRuleDef::new("string").fg("#183691"))
        .rule(ThemeRuleDef::new("constant.character.escape, constant.other.placeholder").fg("#0086b3"))
        .rule(ThemeRuleDef::new("constant.numeric, constant.language, constant.other").fg("#0086b3"))
        .rule(ThemeRuleDef::new("keyword, storage").fg("#a71d5d"))
        .rule(ThemeRuleDef::new("keyword.operator").fg("#a71d5d").font("normal"))
        .rule(ThemeRuleDef::new("entity.name.function").fg("#795da3").font("bold"))
        .rule(ThemeRuleDef::new("entity.name.type, entity.name.class, entity.name.table").fg("#0086b3"))
        .rule(ThemeRuleDef::new("support, support.type.property-name").fg("#0086b3"))
        .rule(ThemeRuleDef::new("variable.language, variable.other.key").fg("#ed6a43"))
        .rule(ThemeRuleDef::new("meta.attribute, meta.preprocessor").fg("#969896"))
        .rule(ThemeRuleDef::new("markup.heading, entity.name.section").fg("#1d3e81").font("bold"))
        .rule(ThemeRuleDef::new("markup.bold").font("bold"))
        .rule(ThemeRuleDef::new("markup.italic").font("italic"))
        .rule(ThemeRuleDef::new("markup.underline.link").fg("#183691").font("underline"))
        .rule(ThemeRuleDef::new("markup.raw").fg("#333333").bg("#f5f5f5"))
}

fn base16_ocean_dark() -> ThemeDef {
    ThemeDef::new("base16-ocean.dark", "#c0c5ce", "#2b303b")
        .rule(ThemeRuleDef::new("comment").fg("#65737e"))
        .rule(ThemeRuleDef::new("string, markup.raw").fg("#a3be8c"))
        .rule(ThemeRuleDef::new("constant.character.escape").fg("#96b5b4"))
        .rule(ThemeRuleDef::new("constant.numeric, constant.language, constant.character, constant.other").fg("#d08770"))
        .rule(ThemeRuleDef::new("keyword, storage").fg("#b48ead"))
        .rule(ThemeRuleDef::new("keyword.operator").fg("#c0c5ce"))
        .rule(ThemeRuleDef::new("entity.name.function, support.function, support.macro").fg("#8fa1b3"))
        .rule(ThemeRuleDef::new("entity.name.type, entity.name.class, support.type").fg("#ebcb8b"))
        .rule(ThemeRuleDef::new("variable, support.type.property-name").fg("#bf616a"))
        .rule(ThemeRuleDef::new("meta.attribute, meta.preprocessor").fg("#ab7967"))
        .rule(ThemeRuleDef::new("markup.heading, entity.name.section").fg("#8fa1b3").font("bold"))
        .rule(ThemeRuleDef::new("markup.bold").fg("#d08770").font("bold"))
        .rule(ThemeRuleDef::new("markup.italic").fg("#b48ead").font("italic"))
        .rule(ThemeRuleDef::new("markup.underline.link").fg("#96b5b4").font("underline"))
}

fn solarized_dark() -> ThemeDef {
    ThemeDef::new("Solarized (dark)", "#839496", "#002b36")
        .rule(ThemeRuleDef::new("comment").fg("#586e75").font("italic"))
        .rule(ThemeRuleDef::new("string").fg("#2aa198"))
        .rule(ThemeRuleDef::new("constant.character.escape").fg("#dc322f"))
        .rule(ThemeRuleDef::new("constant.numeric, constant.other").fg("#d33682"))
        .rule(ThemeRuleDef::new("constant.language").fg("#b58900"))
        .rule(ThemeRuleDef::new("keyword").fg("#859900"))
        .rule(ThemeRuleDef::new("keyword.operator").fg("#839496"))
        .rule(ThemeRuleDef::new("storage").fg("#93a1a1"))
        .rule(ThemeRuleDef::new("entity.name.function, support.function, support.macro").fg("#268bd2"))
        .rule(ThemeRuleDef::new("entity.name.type, entity.name.class, support.type").fg("#cb4b16"))
        .rule(ThemeRuleDef::new("variable.language, variable.other.key").fg("#268bd2"))
        .rule(ThemeRuleDef::new("meta.preprocessor").fg("#cb4b16"))
        .rule(ThemeRuleDef::new("markup.heading").fg("#268bd2").font("bold"))
        .rule(ThemeRuleDef::new("markup.bold").font("bold"))
        .rule(ThemeRuleDef::new("markup.italic").font("italic"))
        .rule(ThemeRuleDef::new("markup.raw").fg("#2aa198"))
}

fn monokai() -> ThemeDef {
    ThemeDef::new("Monokai", "#f8f8f2", "#272822")
        .rule(ThemeRuleDef::new("comment").fg("#75715e"))
        .rule(ThemeRuleDef::new("string").fg("#e6db74"))
        .rule(ThemeRuleDef::new("constant.numeric, constant.language, constant.character, constant.other").fg("#ae81ff"))
        .rule(ThemeRuleDef::new("keyword, storage").fg("#f92672"))
        .rule(ThemeRuleDef::new("storage.type").fg("#66d9ef").font("italic"))
        .rule(ThemeRuleDef::new("entity.name.function, entity.name.class, entity.name.type").fg("#a6e22e"))
        .rule(ThemeRuleDef::new("support.function, support.macro, support.type, support.constant").fg("#66d9ef"))
        .rule(ThemeRuleDef::new("variable.language").fg("#fd971f").font("italic"))
        .rule(ThemeRuleDef::new("support.type.property-name, variable.other.key").fg("#a6e22e"))
        .rule(ThemeRuleDef::new("markup.heading").fg("#a6e22e").font("bold"))
        .rule(ThemeRuleDef::new("markup.bold").font("bold"))
        .rule(ThemeRuleDef::new("markup.italic").font("italic"))
        .rule(ThemeRuleDef::new("markup.underline.link").fg("#66d9ef").font("underline"))
        .rule(ThemeRuleDef::new("markup.raw").fg("#e6db74"))
}
