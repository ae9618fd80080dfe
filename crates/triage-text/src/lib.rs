//! Text features for Triage
//!
//! Provides the leading-verb feature: for each message, whether any of its
//! sentences opens with a base-form/present verb or with the retweet marker.
//!
//! The language tools (lemmatizer, sentence splitter, part-of-speech tagger)
//! live behind traits and are bundled in an [`NlpContext`] that is built once
//! and shared read-only, so callers can swap any of them out.

pub mod lemma;
pub mod pos;
pub mod sentence;
pub mod tokenize;
pub mod verb;

pub use lemma::{IdentityLemmatizer, Lemmatizer, WordNetNounLemmatizer};
pub use pos::{LexiconTagger, PosTag, PosTagger};
pub use sentence::{PunctuationSplitter, SentenceSplitter};
pub use tokenize::{normalize_token, tokenize, STRIP_CHARS};
pub use verb::{sentence_starts_with_verb, starts_with_verb, texts_to_verb_flags, RETWEET_MARKER};

/// Shared language tools.
pub struct NlpContext {
    lemmatizer: Box<dyn Lemmatizer>,
    splitter: Box<dyn SentenceSplitter>,
    tagger: Box<dyn PosTagger>,
}

impl NlpContext {
    pub fn new(
        lemmatizer: Box<dyn Lemmatizer>,
        splitter: Box<dyn SentenceSplitter>,
        tagger: Box<dyn PosTagger>,
    ) -> Self {
        Self {
            lemmatizer,
            splitter,
            tagger,
        }
    }

    pub fn lemmatizer(&self) -> &dyn Lemmatizer {
        self.lemmatizer.as_ref()
    }

    pub fn splitter(&self) -> &dyn SentenceSplitter {
        self.splitter.as_ref()
    }

    pub fn tagger(&self) -> &dyn PosTagger {
        self.tagger.as_ref()
    }
}

impl Default for NlpContext {
    fn default() -> Self {
        Self::new(
            Box::new(WordNetNounLemmatizer::default()),
            Box::new(PunctuationSplitter),
            Box::new(LexiconTagger::default()),
        )
    }
}

impl std::fmt::Debug for NlpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NlpContext").finish_non_exhaustive()
    }
}
