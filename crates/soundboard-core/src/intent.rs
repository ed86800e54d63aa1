//! Intent grammar — phrase intents and keyword-conjunction intents.
//!
//! Two grammar files describe what the skill listens for:
//!
//! ```text
//! vocab/en-us/request.intent   one phrase per line, `{slot}` matches any word
//! vocab/en-us/halt.voc         one keyword (or multi-word keyword) per line
//! ```
//!
//! Matching is literal: utterances are lowercased and split into word tokens.
//! A phrase matches when its tokens appear contiguously in the utterance. A
//! keyword intent matches when every required vocabulary has at least one
//! entry present, in any order.

use regex::Regex;
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}']+").unwrap());
static RE_PHRASE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|[\p{L}\p{N}']+").unwrap());

/// Split an utterance into lowercase word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_WORD
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lines of a grammar file worth reading: trimmed, no blanks, no `#` comments.
fn grammar_lines(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// True if `needle` occurs as a contiguous run inside `haystack`.
fn contains_run<T, U>(haystack: &[T], needle: &[U], eq: impl Fn(&T, &U) -> bool) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.iter().zip(needle).all(|(h, n)| eq(h, n)))
}

// ─── Keyword intents ───────────────────────────────────────────────────────

/// A named set of interchangeable keywords (`<name>.voc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub name: String,
    entries: Vec<Vec<String>>,
}

impl Vocabulary {
    /// Build a vocabulary whose only entry is its own name.
    pub fn literal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: vec![tokenize(name)],
        }
    }

    /// Parse the contents of a `.voc` file.
    pub fn parse(name: &str, contents: &str) -> Self {
        let entries = grammar_lines(contents)
            .map(tokenize)
            .filter(|tokens| !tokens.is_empty())
            .collect();
        Self {
            name: name.to_string(),
            entries,
        }
    }

    /// Add the entries of a `.voc` file to this vocabulary.
    pub fn extend(&mut self, contents: &str) {
        let extra = Self::parse(&self.name, contents).entries;
        for entry in extra {
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry of this vocabulary occurs in the tokens.
    pub fn matches(&self, tokens: &[String]) -> bool {
        self.entries
            .iter()
            .any(|entry| contains_run(tokens, entry.as_slice(), |t, e| t == e))
    }
}

/// An intent that fires when every required vocabulary is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordIntent {
    pub name: String,
    pub required: Vec<Vocabulary>,
}

impl KeywordIntent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: Vec::new(),
        }
    }

    /// Add a required vocabulary.
    pub fn require(mut self, vocab: Vocabulary) -> Self {
        self.required.push(vocab);
        self
    }

    pub fn matches(&self, tokens: &[String]) -> bool {
        !self.required.is_empty() && self.required.iter().all(|vocab| vocab.matches(tokens))
    }
}

// ─── Phrase intents ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum PhraseToken {
    Word(String),
    Slot,
}

/// An intent described by example phrases (`<name>.intent`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseIntent {
    pub name: String,
    phrases: Vec<Vec<PhraseToken>>,
}

impl PhraseIntent {
    /// Parse the contents of an `.intent` file.
    pub fn parse(name: &str, contents: &str) -> Self {
        let phrases = grammar_lines(contents)
            .map(|line| {
                let lower = line.to_lowercase();
                RE_PHRASE_TOKEN
                    .find_iter(&lower)
                    .map(|m| {
                        let token = m.as_str();
                        if token.starts_with('{') {
                            PhraseToken::Slot
                        } else {
                            PhraseToken::Word(token.to_string())
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|phrase| phrase.iter().any(|t| matches!(t, PhraseToken::Word(_))))
            .collect();
        Self {
            name: name.to_string(),
            phrases,
        }
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    /// Length in tokens of the longest phrase found in the utterance.
    pub fn match_len(&self, tokens: &[String]) -> Option<usize> {
        self.phrases
            .iter()
            .filter(|phrase| {
                contains_run(tokens, phrase.as_slice(), |t, p| match p {
                    PhraseToken::Word(w) => t == w,
                    PhraseToken::Slot => true,
                })
            })
            .map(Vec::len)
            .max()
    }

    pub fn matches(&self, tokens: &[String]) -> bool {
        self.match_len(tokens).is_some()
    }
}
