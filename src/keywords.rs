// src/keywords.rs
//! Keyword extraction over free text.
//!
//! Matching is literal substring containment on lowercased text, so `"go"`
//! is found inside `"good"`.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::vocabulary::Vocabulary;

/// Minimum keyword length kept in the output.
const MIN_KEYWORD_CHARS: usize = 2;
/// Context words (title/company) must be longer than this.
const MIN_CONTEXT_WORD_CHARS: usize = 2;

/// Posting title and company, tokenized into extra keywords.
#[derive(Debug, Clone, Copy)]
pub struct PostingContext<'a> {
    pub title: &'a str,
    pub company: &'a str,
}

fn phrase_patterns() -> &'static [Regex] {
    static RE: OnceCell<Vec<Regex>> = OnceCell::new();
    RE.get_or_init(|| {
        [
            r"\d+\+?\s*(?:years?|yrs?)\s*(?:of\s*)?(?:experience|exp)",
            r"(?:bachelor|master|phd|doctorate)\s+(?:degree|in|of)",
            r"(?:certified|certification)\s+in",
            r"(?:proficient|expert|experienced)\s+in",
            r"(?:strong|excellent|deep)\s+(?:knowledge|understanding|experience)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("phrase regex"))
        .collect()
    })
}

/// Split on whitespace, `-` and `_`, dropping empty pieces.
pub fn split_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
}

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    vocab: Arc<Vocabulary>,
}

impl KeywordExtractor {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Extract an ordered, de-duplicated keyword list.
    ///
    /// Order: priority vocabulary hits, general vocabulary hits, phrase
    /// pattern hits, then context words. First occurrence wins.
    pub fn extract(&self, text: &str, context: Option<PostingContext<'_>>) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut push = |kw: String| {
            if kw.chars().count() >= MIN_KEYWORD_CHARS && seen.insert(kw.clone()) {
                out.push(kw);
            }
        };

        for term in self.vocab.priority.iter().chain(self.vocab.terms.iter()) {
            if lower.contains(term.as_str()) {
                push(term.clone());
            }
        }

        for re in phrase_patterns() {
            for m in re.find_iter(&lower) {
                push(m.as_str().trim().to_string());
            }
        }

        if let Some(ctx) = context {
            for field in [ctx.title, ctx.company] {
                let field = field.to_lowercase();
                for w in split_words(&field) {
                    if w.chars().count() > MIN_CONTEXT_WORD_CHARS {
                        push(w.to_string());
                    }
                }
            }
        }

        out
    }

    /// Stable partition: priority keywords first, relative order kept.
    pub fn prioritize(&self, keywords: Vec<String>) -> Vec<String> {
        let (mut head, tail): (Vec<String>, Vec<String>) = keywords
            .into_iter()
            .partition(|k| self.vocab.is_priority_keyword(k));
        head.extend(tail);
        head
    }

    pub fn is_priority_keyword(&self, keyword: &str) -> bool {
        self.vocab.is_priority_keyword(keyword)
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Arc::new(Vocabulary::default_seed()))
    }
}
