//! Whitespace tokenizer with lemmatization and punctuation stripping

use regex::Regex;
use std::sync::OnceLock;

use crate::NlpContext;

/// ASCII punctuation stripped from both ends of every token.
pub const STRIP_CHARS: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<',
    '=', '>', '?', '@', '[', '\\', ']', '^', '_', '`', '{', '|', '}', '~',
];

/// Matches `[`, one character other than `.,;:`, any run of `]`, then `]`.
///
/// This only ever removes single-character bracket spans such as `[a]` inside
/// a token (`x[a]y` → `xy`); brackets at the token edges are already gone by
/// the time it runs. It is not a general annotation remover.
fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[[^.,;:]\]*\]").expect("annotation pattern is valid"))
}

/// Normalize a single raw token: lemmatize, lowercase, strip edge
/// punctuation, then drop single-character bracket spans.
pub fn normalize_token(ctx: &NlpContext, raw: &str) -> String {
    let lemma = ctx.lemmatizer().lemmatize(raw).to_lowercase();
    let stripped = lemma.trim_matches(STRIP_CHARS);
    annotation_pattern().replace_all(stripped, "").into_owned()
}

/// Split on whitespace and normalize each token; tokens that end up empty
/// are discarded.
pub fn tokenize(ctx: &NlpContext, text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| normalize_token(ctx, raw))
        .filter(|token| !token.is_empty())
        .collect()
}
