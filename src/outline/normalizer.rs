//! Paragraph classification and cleanup.
//!
//! A paragraph is a bullet if any of these hold:
//! - it starts with a bullet glyph (`•`, `・`, `-`, ...)
//! - it starts with a numbered-list token followed by whitespace (`1. `, `2) `)
//! - it has a positive left indent
//! - it has a negative first-line (hanging) indent
//!
//! The first non-empty paragraph that is not a bullet is the document title.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NormalizerConfig;
use crate::models::{BulletCandidate, BulletLevel, ParagraphRecord, TitleParagraph};

const BULLET_GLYPHS: &[char] = &[
    '•', '●', '○', '◦', '◎', '▪', '▫', '■', '□', '◆', '◇', '►', '▶', '➢', '➤', '✓', '✔', '・',
    '※', '-', '*', '+', '–', '—', '→',
];

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s").expect("valid regex"));

/// Leading numbering tokens removed during cleanup: `1. `, `1) `, `(1)`, circled
/// digits. A digit run only counts when whitespace or the end follows, so
/// `3.5%` keeps its digits.
static NUMBERING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+[.)](?:\s|$)|\(\d+\)|[①-⑳])").expect("valid regex"));

/// Output of normalization: the detected title and the ordered bullet candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedOutline {
    pub title: Option<TitleParagraph>,
    pub candidates: Vec<BulletCandidate>,
}

#[derive(Debug, Clone, Default)]
pub struct ParagraphNormalizer {
    config: NormalizerConfig,
}

impl ParagraphNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, paragraphs: &[ParagraphRecord]) -> NormalizedOutline {
        let mut outline = NormalizedOutline::default();

        for paragraph in paragraphs {
            let text = paragraph.text.trim();
            if text.is_empty() {
                continue;
            }

            if !is_bullet(paragraph) {
                if outline.title.is_none() {
                    tracing::debug!("Title detected at paragraph {}: {}", paragraph.ordinal, text);
                    outline.title = Some(TitleParagraph {
                        text: text.to_string(),
                        ordinal: paragraph.ordinal,
                    });
                } else {
                    tracing::debug!("Skipping non-bullet paragraph {}", paragraph.ordinal);
                }
                continue;
            }

            let clean_text = strip_marker(text);
            if clean_text.is_empty() {
                continue;
            }

            outline.candidates.push(BulletCandidate {
                clean_text: clean_text.to_string(),
                level: self.level_of(paragraph),
                source: paragraph.clone(),
            });
        }

        outline
    }

    /// `min(2, floor(left_indent / unit_indent))` for indented paragraphs, else 0.
    pub fn level_of(&self, paragraph: &ParagraphRecord) -> BulletLevel {
        if paragraph.left_indent > 0.0 && self.config.unit_indent > 0.0 {
            let depth = (paragraph.left_indent / self.config.unit_indent).floor() as usize;
            BulletLevel::from_depth(depth.min(2))
        } else {
            BulletLevel::Summary
        }
    }
}

pub fn is_bullet(paragraph: &ParagraphRecord) -> bool {
    let text = paragraph.text.trim_start();
    starts_with_glyph(text)
        || NUMBERED.is_match(text)
        || paragraph.left_indent > 0.0
        || paragraph.first_line_indent < 0.0
}

fn starts_with_glyph(text: &str) -> bool {
    text.chars().next().is_some_and(|c| BULLET_GLYPHS.contains(&c))
}

/// Strip one leading glyph or numbering token and the surrounding whitespace.
pub fn strip_marker(text: &str) -> &str {
    let text = text.trim();
    let rest = if starts_with_glyph(text) {
        let mut chars = text.chars();
        chars.next();
        chars.as_str()
    } else if let Some(m) = NUMBERING_TOKEN.find(text) {
        &text[m.end()..]
    } else {
        text
    };
    rest.trim()
}
