use std::sync::LazyLock;

use regex::{Captures, Regex};

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("markdown rule must be a valid regex"),
        replacement,
    }
}

/// 適用順に並べた置換ルール。
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?m)^\s*(```|~~~).*$\n?", ""),
        rule(r"(?m)^\s{0,3}(\*\s*){3,}$|^\s{0,3}(-\s*){3,}$|^\s{0,3}(_\s*){3,}$", ""),
        rule(r"(?m)^\s{0,3}#{1,6}\s+", ""),
        rule(r"(?m)^\s{0,3}>\s?", ""),
        rule(r"(?m)^(\s*)(?:[-*+]|\d+[.)])\s+", "$1"),
        rule(r"!\[([^\]]*)\]\([^)]*\)", "$1"),
        rule(r"\[([^\]]+)\]\([^)]*\)", "$1"),
        rule(r"\*\*([^*]+)\*\*", "$1"),
        rule(r"\b__([^_]+)__\b", "$1"),
        rule(r"\*([^*\s][^*]*)\*", "$1"),
        rule(r"\b_([^_\s][^_]*)_\b", "$1"),
        rule(r"~~([^~]+)~~", "$1"),
    ]
});

/// インラインのHTMLタグ。コードスパンはそのまま残すため先にマッチさせる。
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(`[^`\n]*`)|</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>\n]*)?/?>")
        .expect("html tag pattern must be a valid regex")
});

static CODE_SPAN: LazyLock<Rule> = LazyLock::new(|| rule(r"`([^`]+)`", "$1"));

const ENTITIES: [(&str, &str); 5] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Markdownのnoteを装飾を取り除いたプレーンテキストにする。
///
/// 前後の空白は取り除く。
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = markdown.trim().to_string();
    for rule in RULES.iter() {
        text = rule
            .pattern
            .replace_all(&text, rule.replacement)
            .into_owned();
    }
    text = HTML_TAG
        .replace_all(&text, |caps: &Captures| {
            caps.get(1)
                .map(|code| code.as_str().to_string())
                .unwrap_or_default()
        })
        .into_owned();
    text = CODE_SPAN
        .pattern
        .replace_all(&text, CODE_SPAN.replacement)
        .into_owned();
    for (entity, plain) in ENTITIES {
        text = text.replace(entity, plain);
    }
    text.trim().to_string()
}
