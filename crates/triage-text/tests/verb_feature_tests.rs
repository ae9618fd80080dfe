use proptest::prelude::*;
use triage_text::{
    starts_with_verb, texts_to_verb_flags, IdentityLemmatizer, NlpContext, PosTag, PosTagger,
    PunctuationSplitter, SentenceSplitter,
};

/// Tags every token as a base-form verb.
struct AllVerbs;

impl PosTagger for AllVerbs {
    fn tag(&self, tokens: &[String]) -> Vec<(String, PosTag)> {
        tokens.iter().map(|t| (t.clone(), PosTag::VB)).collect()
    }
}

/// Treats every line as one sentence.
struct LineSplitter;

impl SentenceSplitter for LineSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.lines().filter(|l| !l.trim().is_empty()).collect()
    }
}

#[test]
fn leading_verb_examples() {
    let ctx = NlpContext::default();
    assert!(starts_with_verb(&ctx, "Run to the store."));
    assert!(!starts_with_verb(&ctx, "The store is closed."));
    assert!(starts_with_verb(&ctx, "RT this now"));
    assert!(!starts_with_verb(&ctx, ""));
}

#[test]
fn substituted_tagger_is_used() {
    let ctx = NlpContext::new(
        Box::new(IdentityLemmatizer),
        Box::new(PunctuationSplitter),
        Box::new(AllVerbs),
    );
    assert!(starts_with_verb(&ctx, "The store is closed."));
    // Still nothing to tag in an empty text.
    assert!(!starts_with_verb(&ctx, "  "));
}

#[test]
fn substituted_splitter_is_used() {
    let ctx = NlpContext::new(
        Box::new(IdentityLemmatizer),
        Box::new(LineSplitter),
        Box::new(triage_text::LexiconTagger::default()),
    );
    // Without the line split this is one sentence opening with "the".
    assert!(starts_with_verb(&ctx, "the road is closed\nsend boats"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn flags_match_sequential_evaluation(texts in proptest::collection::vec(".{0,40}", 0..16)) {
        let ctx = NlpContext::default();
        let flags = texts_to_verb_flags(&ctx, &texts);
        prop_assert_eq!(flags.len(), texts.len());
        let sequential: Vec<bool> = texts.iter().map(|t| starts_with_verb(&ctx, t)).collect();
        prop_assert_eq!(flags, sequential);
    }

    #[test]
    fn punctuation_and_whitespace_never_match(text in "[ \\t\\n!?.,;:()\\[\\]-]{0,30}") {
        let ctx = NlpContext::default();
        prop_assert!(!starts_with_verb(&ctx, &text));
    }
}
