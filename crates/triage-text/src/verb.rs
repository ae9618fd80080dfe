//! Leading-verb feature
//!
//! A text is flagged when any of its sentences opens with a base-form or
//! non-3rd-person present verb, or with the retweet marker.

use rayon::prelude::*;

use crate::tokenize::tokenize;
use crate::NlpContext;

/// Normalized form of the retweet marker `RT`.
pub const RETWEET_MARKER: &str = "rt";

/// Whether a single sentence opens with a verb (or the retweet marker).
/// A sentence with no tokens left after normalization never matches.
pub fn sentence_starts_with_verb(ctx: &NlpContext, sentence: &str) -> bool {
    let tokens = tokenize(ctx, sentence);
    if tokens.is_empty() {
        return false;
    }
    let tagged = ctx.tagger().tag(&tokens);
    match tagged.first() {
        Some((word, tag)) => tag.is_base_or_present_verb() || word == RETWEET_MARKER,
        None => false,
    }
}

pub fn starts_with_verb(ctx: &NlpContext, text: &str) -> bool {
    ctx.splitter()
        .split(text)
        .into_iter()
        .any(|sentence| sentence_starts_with_verb(ctx, sentence))
}

/// One flag per input text, in input order.
pub fn texts_to_verb_flags<S>(ctx: &NlpContext, texts: &[S]) -> Vec<bool>
where
    S: AsRef<str> + Sync,
{
    texts
        .par_iter()
        .map(|text| starts_with_verb(ctx, text.as_ref()))
        .collect()
}
