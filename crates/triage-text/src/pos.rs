//! Part-of-speech tagging (Penn Treebank tag set)
//!
//! `LexiconTagger` is a small rule tagger: closed-class words and auxiliaries
//! come from fixed tables, known base-form verbs are resolved from the
//! neighbouring tags, and everything else falls back to suffix heuristics.
//! It is tuned for short, informal messages, not for general parsing.

use std::collections::{HashMap, HashSet};
use std::fmt;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    CC,
    CD,
    DT,
    EX,
    IN,
    JJ,
    MD,
    NN,
    NNS,
    PRP,
    PRPS,
    RB,
    RP,
    TO,
    UH,
    VB,
    VBD,
    VBG,
    VBN,
    VBP,
    VBZ,
    WDT,
    WP,
    WRB,
}

impl PosTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PosTag::CC => "CC",
            PosTag::CD => "CD",
            PosTag::DT => "DT",
            PosTag::EX => "EX",
            PosTag::IN => "IN",
            PosTag::JJ => "JJ",
            PosTag::MD => "MD",
            PosTag::NN => "NN",
            PosTag::NNS => "NNS",
            PosTag::PRP => "PRP",
            PosTag::PRPS => "PRP$",
            PosTag::RB => "RB",
            PosTag::RP => "RP",
            PosTag::TO => "TO",
            PosTag::UH => "UH",
            PosTag::VB => "VB",
            PosTag::VBD => "VBD",
            PosTag::VBG => "VBG",
            PosTag::VBN => "VBN",
            PosTag::VBP => "VBP",
            PosTag::VBZ => "VBZ",
            PosTag::WDT => "WDT",
            PosTag::WP => "WP",
            PosTag::WRB => "WRB",
        }
    }

    /// Base form (`VB`) or present tense, not 3rd person singular (`VBP`).
    pub fn is_base_or_present_verb(self) -> bool {
        matches!(self, PosTag::VB | PosTag::VBP)
    }

    pub fn is_verb(self) -> bool {
        matches!(
            self,
            PosTag::VB | PosTag::VBD | PosTag::VBG | PosTag::VBN | PosTag::VBP | PosTag::VBZ | PosTag::MD
        )
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait PosTagger: Send + Sync {
    /// Tag every token; the output has the same length and order as the input.
    fn tag(&self, tokens: &[String]) -> Vec<(String, PosTag)>;
}

const CLOSED_CLASS: &[(&str, PosTag)] = &[
    ("the", PosTag::DT), ("a", PosTag::DT), ("an", PosTag::DT), ("this", PosTag::DT),
    ("that", PosTag::DT), ("these", PosTag::DT), ("those", PosTag::DT), ("every", PosTag::DT),
    ("each", PosTag::DT), ("some", PosTag::DT), ("any", PosTag::DT), ("no", PosTag::DT),
    ("all", PosTag::DT), ("another", PosTag::DT), ("both", PosTag::DT), ("either", PosTag::DT),
    ("i", PosTag::PRP), ("you", PosTag::PRP), ("he", PosTag::PRP), ("she", PosTag::PRP),
    ("it", PosTag::PRP), ("we", PosTag::PRP), ("they", PosTag::PRP), ("me", PosTag::PRP),
    ("him", PosTag::PRP), ("us", PosTag::PRP), ("them", PosTag::PRP),
    ("my", PosTag::PRPS), ("your", PosTag::PRPS), ("his", PosTag::PRPS), ("her", PosTag::PRPS),
    ("its", PosTag::PRPS), ("our", PosTag::PRPS), ("their", PosTag::PRPS),
    ("in", PosTag::IN), ("on", PosTag::IN), ("at", PosTag::IN), ("of", PosTag::IN),
    ("for", PosTag::IN), ("with", PosTag::IN), ("from", PosTag::IN), ("by", PosTag::IN),
    ("about", PosTag::IN), ("into", PosTag::IN), ("over", PosTag::IN), ("after", PosTag::IN),
    ("before", PosTag::IN), ("under", PosTag::IN), ("between", PosTag::IN),
    ("through", PosTag::IN), ("during", PosTag::IN), ("without", PosTag::IN),
    ("near", PosTag::IN), ("since", PosTag::IN), ("until", PosTag::IN), ("because", PosTag::IN),
    ("if", PosTag::IN), ("than", PosTag::IN), ("as", PosTag::IN), ("per", PosTag::IN),
    ("via", PosTag::IN), ("against", PosTag::IN), ("across", PosTag::IN),
    ("toward", PosTag::IN), ("towards", PosTag::IN), ("within", PosTag::IN),
    ("upon", PosTag::IN), ("around", PosTag::IN),
    ("and", PosTag::CC), ("or", PosTag::CC), ("but", PosTag::CC), ("nor", PosTag::CC),
    ("to", PosTag::TO),
    ("can", PosTag::MD), ("could", PosTag::MD), ("will", PosTag::MD), ("would", PosTag::MD),
    ("shall", PosTag::MD), ("should", PosTag::MD), ("may", PosTag::MD), ("might", PosTag::MD),
    ("must", PosTag::MD),
    ("there", PosTag::EX),
    ("how", PosTag::WRB), ("when", PosTag::WRB), ("where", PosTag::WRB), ("why", PosTag::WRB),
    ("who", PosTag::WP), ("what", PosTag::WP), ("whom", PosTag::WP), ("which", PosTag::WDT),
    ("not", PosTag::RB), ("very", PosTag::RB), ("also", PosTag::RB), ("just", PosTag::RB),
    ("now", PosTag::RB), ("here", PosTag::RB), ("too", PosTag::RB), ("only", PosTag::RB),
    ("still", PosTag::RB), ("already", PosTag::RB), ("again", PosTag::RB), ("soon", PosTag::RB),
    ("never", PosTag::RB), ("always", PosTag::RB), ("often", PosTag::RB), ("then", PosTag::RB),
    ("up", PosTag::RP), ("out", PosTag::RP), ("off", PosTag::RP), ("down", PosTag::RP),
    ("hello", PosTag::UH), ("hi", PosTag::UH), ("thanks", PosTag::UH), ("ok", PosTag::UH),
    ("is", PosTag::VBZ), ("are", PosTag::VBP), ("am", PosTag::VBP), ("was", PosTag::VBD),
    ("were", PosTag::VBD), ("be", PosTag::VB), ("been", PosTag::VBN), ("being", PosTag::VBG),
    ("has", PosTag::VBZ), ("have", PosTag::VBP), ("had", PosTag::VBD), ("does", PosTag::VBZ),
    ("do", PosTag::VBP), ("did", PosTag::VBD),
];

/// Verbs whose base form is also a plausible sentence opener in requests.
const BASE_VERBS: &[&str] = &[
    "help", "need", "send", "give", "call", "run", "go", "come", "get", "take", "bring", "make",
    "let", "stop", "start", "find", "keep", "tell", "ask", "stay", "move", "leave", "look",
    "see", "check", "contact", "provide", "please", "share", "donate", "save", "evacuate",
    "follow", "join", "read", "watch", "pray", "support", "visit", "use", "try", "report", "fix",
    "open", "close", "build", "buy", "pay", "eat", "drink", "wait", "listen", "remember", "note",
    "want", "know", "think", "say", "like", "love", "hope", "feel", "lend", "rescue", "retweet",
    "spread", "protect", "avoid", "prepare", "shelter", "contribute", "register", "apply", "sign",
    "write", "text", "email", "dial", "distribute", "deliver", "clean", "boil", "wash", "cover",
    "turn", "put", "show", "hold", "head", "drive", "walk", "live", "work", "feed", "sleep",
    "receive", "lose", "die", "hear", "believe", "offer", "request", "collect", "search",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "less", "able", "ible", "ive", "ish"];

#[derive(Debug, Clone)]
pub struct LexiconTagger {
    closed: HashMap<&'static str, PosTag>,
    base_verbs: HashSet<&'static str>,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self {
            closed: CLOSED_CLASS.iter().copied().collect(),
            base_verbs: BASE_VERBS.iter().copied().collect(),
        }
    }
}

fn is_subject_pronoun(word: &str) -> bool {
    matches!(word, "i" | "you" | "we" | "they")
}

impl LexiconTagger {
    fn suffix_tag(word: &str) -> PosTag {
        if word.chars().any(|c| c.is_ascii_digit())
            && word.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | ':' | '/'))
        {
            return PosTag::CD;
        }
        if word.len() > 4 && word.ends_with("ing") {
            return PosTag::VBG;
        }
        if word.len() > 3 && word.ends_with("ed") {
            return PosTag::VBD;
        }
        if word.len() > 3 && word.ends_with("ly") {
            return PosTag::RB;
        }
        if ADJECTIVE_SUFFIXES
            .iter()
            .any(|s| word.len() > s.len() + 2 && word.ends_with(s))
        {
            return PosTag::JJ;
        }
        if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
            return PosTag::NNS;
        }
        PosTag::NN
    }

    fn lexical_tag(&self, word: &str) -> Option<PosTag> {
        self.closed.get(word).copied()
    }

    /// Resolve a known base verb from its neighbours.
    fn base_verb_tag(prev: Option<(&str, PosTag)>, next: Option<PosTag>) -> PosTag {
        match prev {
            None => match next {
                // "help is coming": the opener is the subject.
                Some(t) if t.is_verb() => PosTag::NN,
                _ => PosTag::VB,
            },
            Some((_, PosTag::TO)) | Some((_, PosTag::MD)) => PosTag::VB,
            Some((word, PosTag::PRP)) if is_subject_pronoun(word) => PosTag::VBP,
            Some((_, PosTag::PRP)) => PosTag::VB,
            Some((_, PosTag::RB)) | Some((_, PosTag::CC)) | Some((_, PosTag::UH)) => PosTag::VB,
            Some((_, PosTag::NNS)) => PosTag::VBP,
            _ => PosTag::NN,
        }
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Vec<(String, PosTag)> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        // First pass: context-free tags; base verbs are left unresolved.
        let first: Vec<Option<PosTag>> = lowered
            .iter()
            .map(|w| {
                if self.base_verbs.contains(w.as_str()) && self.lexical_tag(w).is_none() {
                    None
                } else {
                    Some(self.lexical_tag(w).unwrap_or_else(|| Self::suffix_tag(w)))
                }
            })
            .collect();

        // Second pass, left to right, so each resolution sees its resolved predecessor.
        let mut tags: Vec<PosTag> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let tag = match first[i] {
                Some(tag) => tag,
                None => {
                    let prev = i
                        .checked_sub(1)
                        .map(|p| (lowered[p].as_str(), tags[p]));
                    let next = first.get(i + 1).copied().flatten();
                    Self::base_verb_tag(prev, next)
                }
            };
            tags.push(tag);
        }

        tokens.iter().cloned().zip(tags).collect()
    }
}
