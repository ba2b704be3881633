//! Re-locating evaluated text inside the live document.
//!
//! The evaluator returns copies of text, not positions, and the user may have
//! edited the document since the outline was read. Matching runs through a
//! fixed sequence of tiers and the first tier with a hit wins:
//!
//! 1. [`MatchTier::Exact`]: a paragraph's trimmed (or marker-stripped) text equals the target
//! 2. [`MatchTier::Substring`]: the target occurs inside a paragraph
//! 3. [`MatchTier::LongestWord`]: the target's longest significant word occurs in a paragraph
//! 4. [`MatchTier::Prefix`]: the target's first characters occur in a paragraph
//! 5. [`MatchTier::Keyword`]: the first keyword with a hit anywhere in the body
//!
//! Tiers 1–4 scan the paragraph snapshot taken for the pass; tier 5 asks the
//! editor to search the whole body. All lengths are in characters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::LocatorConfig;
use crate::document::{DocumentEditor, TextRange};
use crate::models::ParagraphRecord;
use crate::outline::strip_marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Substring,
    LongestWord,
    Prefix,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub range: TextRange,
    pub tier: MatchTier,
}

#[derive(Debug, Clone)]
pub struct TextLocator {
    config: LocatorConfig,
    stop_words: HashSet<String>,
}

impl Default for TextLocator {
    fn default() -> Self {
        Self::new(LocatorConfig::default())
    }
}

impl TextLocator {
    pub fn new(config: LocatorConfig) -> Self {
        let stop_words = config.stop_words.iter().map(|w| w.to_lowercase()).collect();
        Self { config, stop_words }
    }

    /// Find the best live range for `target`, or `None` when every tier misses.
    pub fn locate<D: DocumentEditor>(
        &self,
        doc: &D,
        paragraphs: &[ParagraphRecord],
        target: &str,
    ) -> Option<Located> {
        let target = truncate_chars(target.trim(), self.config.max_search_length).trim();
        if target.is_empty() {
            return None;
        }

        let located = self
            .exact(paragraphs, target)
            .map(|range| (range, MatchTier::Exact))
            .or_else(|| {
                self.substring(paragraphs, target)
                    .map(|range| (range, MatchTier::Substring))
            })
            .or_else(|| {
                self.longest_word(paragraphs, target)
                    .map(|range| (range, MatchTier::LongestWord))
            })
            .or_else(|| {
                self.prefix(paragraphs, target)
                    .map(|range| (range, MatchTier::Prefix))
            })
            .or_else(|| self.keyword(doc, target).map(|range| (range, MatchTier::Keyword)));

        match located {
            Some((range, tier)) => {
                tracing::debug!(
                    "Located target in paragraph {} via {:?}",
                    range.paragraph,
                    tier
                );
                Some(Located { range, tier })
            }
            None => {
                tracing::warn!(
                    "Could not locate target text: {}",
                    truncate_chars(target, 40)
                );
                None
            }
        }
    }

    fn exact(&self, paragraphs: &[ParagraphRecord], target: &str) -> Option<TextRange> {
        paragraphs
            .iter()
            .find(|p| {
                let trimmed = p.text.trim();
                !trimmed.is_empty() && (trimmed == target || strip_marker(trimmed) == target)
            })
            .map(whole_paragraph)
    }

    fn substring(&self, paragraphs: &[ParagraphRecord], target: &str) -> Option<TextRange> {
        find_containing(paragraphs, target)
    }

    fn longest_word(&self, paragraphs: &[ParagraphRecord], target: &str) -> Option<TextRange> {
        let word = target
            .split_whitespace()
            .filter(|w| w.chars().count() > self.config.min_word_length)
            .reduce(|best, w| {
                if w.chars().count() > best.chars().count() {
                    w
                } else {
                    best
                }
            })?;
        find_containing(paragraphs, word)
    }

    fn prefix(&self, paragraphs: &[ParagraphRecord], target: &str) -> Option<TextRange> {
        if target.chars().count() <= self.config.prefix_length {
            return None;
        }
        find_containing(paragraphs, truncate_chars(target, self.config.prefix_length))
    }

    fn keyword<D: DocumentEditor>(&self, doc: &D, target: &str) -> Option<TextRange> {
        self.keywords(target)
            .iter()
            .find_map(|keyword| doc.search(keyword).into_iter().next())
    }

    /// Tokens of at least `min_keyword_length` characters that are not stop
    /// words, deduplicated, in order of first appearance.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        text.split(is_token_separator)
            .filter(|token| token.chars().count() >= self.config.min_keyword_length)
            .filter(|token| !self.stop_words.contains(&token.to_lowercase()))
            .filter(|token| seen.insert(token.to_string()))
            .map(str::to_string)
            .collect()
    }
}

fn is_token_separator(c: char) -> bool {
    c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(
            c,
            '、' | '。' | '，' | '．' | '！' | '？' | '「' | '」' | '『' | '』' | '（' | '）' | '・' | '：'
        )
}

fn find_containing(paragraphs: &[ParagraphRecord], needle: &str) -> Option<TextRange> {
    if needle.is_empty() {
        return None;
    }
    paragraphs
        .iter()
        .find(|p| p.text.contains(needle))
        .map(whole_paragraph)
}

fn whole_paragraph(paragraph: &ParagraphRecord) -> TextRange {
    TextRange::whole_paragraph(paragraph.ordinal, paragraph.text.len())
}

/// The first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
