//! Sentence boundary detection

/// Split text into sentences, in order. Implementations must never return
/// empty or whitespace-only sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

const TERMINATORS: &[char] = &['.', '!', '?'];
/// Characters that may trail a terminator and still belong to the sentence.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}'];

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ave", "rd", "no", "vs", "approx",
    "dept", "gov", "gen", "col", "lt", "sgt", "e.g", "i.e", "etc", "a.m", "p.m", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.n",
];

/// Terminal punctuation followed by whitespace (or end of text) closes a
/// sentence, unless the word before a `.` is a known abbreviation or a single
/// letter initial.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSplitter;

impl PunctuationSplitter {
    fn is_abbreviation(word: &str) -> bool {
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.chars().count() == 1 && word.chars().all(char::is_alphabetic) {
            return true;
        }
        let lower = word.to_lowercase();
        ABBREVIATIONS.contains(&lower.as_str())
    }
}

impl SentenceSplitter for PunctuationSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            if !TERMINATORS.contains(&c) {
                i += 1;
                continue;
            }

            // Swallow runs like "?!" or "..." and trailing quotes/brackets.
            let mut j = i + 1;
            while j < chars.len() && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1)) {
                j += 1;
            }
            let at_break = j == chars.len() || chars[j].1.is_whitespace();
            if !at_break {
                i = j;
                continue;
            }

            if c == '.' && j == i + 1 {
                let word = text[start..pos].split_whitespace().last().unwrap_or("");
                if Self::is_abbreviation(word) && j < chars.len() {
                    i = j;
                    continue;
                }
            }

            let end = if j == chars.len() { text.len() } else { chars[j].0 };
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
            i = j;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }
}
