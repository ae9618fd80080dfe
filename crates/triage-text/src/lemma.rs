//! Noun lemmatization
//!
//! The built-in lemmatizer follows WordNet's noun morphology: an exception
//! table for irregular plurals, then suffix detachment rules. There is no
//! lexicon to confirm a candidate, so words that merely look plural (`this`,
//! `news`, `does`) are listed as invariant instead.

use std::collections::HashMap;

/// Reduce a raw token to its dictionary form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, token: &str) -> String;
}

/// Suffix rules in the order WordNet tries them for nouns.
const NOUN_SUFFIX_RULES: &[(&str, &str)] = &[
    ("ches", "ch"),
    ("shes", "sh"),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ies", "y"),
    ("men", "man"),
    ("s", ""),
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("lice", "louse"),
    ("mice", "mouse"),
    ("teeth", "tooth"),
    ("oxen", "ox"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("data", "datum"),
];

const INVARIANT: &[&str] = &[
    "always", "as", "bus", "does", "gas", "has", "his", "is", "its", "less", "lens", "news",
    "perhaps", "plus", "series", "species", "this", "thus", "us", "was", "whereas", "yes",
    "specimen", "towards", "afterwards", "besides",
    "sometimes", "unless", "across", "chaos", "diabetes", "measles", "crisis", "analysis",
];

#[derive(Debug, Clone)]
pub struct WordNetNounLemmatizer {
    irregular: HashMap<&'static str, &'static str>,
}

impl Default for WordNetNounLemmatizer {
    fn default() -> Self {
        Self {
            irregular: IRREGULAR_PLURALS.iter().copied().collect(),
        }
    }
}

impl Lemmatizer for WordNetNounLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        // Only plain alphabetic words are candidates; anything carrying
        // punctuation is returned as-is, like a lexicon miss.
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return token.to_string();
        }

        let lower = token.to_ascii_lowercase();
        if let Some(lemma) = self.irregular.get(lower.as_str()) {
            return (*lemma).to_string();
        }
        if lower.len() < 4 {
            return token.to_string();
        }
        if INVARIANT.contains(&lower.as_str()) {
            return token.to_string();
        }
        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return token.to_string();
        }
        // Short "-men" words (amen, omen) are not plurals.
        if lower.ends_with("men") && lower.len() <= 5 {
            return token.to_string();
        }

        for (suffix, replacement) in NOUN_SUFFIX_RULES {
            if lower.ends_with(suffix) {
                let stem = &token[..token.len() - suffix.len()];
                if stem.len() < 2 {
                    break;
                }
                return format!("{stem}{replacement}");
            }
        }
        token.to_string()
    }
}

/// Leaves every token unchanged. Handy when substituting the real lemmatizer
/// in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        token.to_string()
    }
}
