use serde::{Deserialize, Serialize};

/// Content given to parents synthesized for orphan bullets.
pub const PLACEHOLDER_CONTENT: &str = "unclassified";

/// A snapshot of one live paragraph, taken at the start of a pass.
///
/// Indents are in editor points. A positive `left_indent` nests the paragraph;
/// a negative `first_line_indent` is a hanging indent, which list paragraphs use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub text: String,
    pub left_indent: f32,
    pub first_line_indent: f32,
    pub ordinal: usize,
}

impl ParagraphRecord {
    pub fn new(ordinal: usize, text: impl Into<String>, left_indent: f32) -> Self {
        Self {
            text: text.into(),
            left_indent,
            first_line_indent: 0.0,
            ordinal,
        }
    }
}

/// Nesting level of a bullet, derived from indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletLevel {
    Summary,
    Message,
    Body,
}

impl BulletLevel {
    /// Map a depth to a level, saturating at `Body`.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Self::Summary,
            1 => Self::Message,
            _ => Self::Body,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Summary => 0,
            Self::Message => 1,
            Self::Body => 2,
        }
    }
}

/// A paragraph classified as part of the outline, before hierarchy assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletCandidate {
    /// Text with the leading glyph or numbering token stripped.
    pub clean_text: String,
    pub level: BulletLevel,
    pub source: ParagraphRecord,
}

/// The non-bullet paragraph taken as the document title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleParagraph {
    pub text: String,
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(default)]
    pub bodies: Vec<Body>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub content: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Summary {
    pub fn placeholder() -> Self {
        Self {
            content: PLACEHOLDER_CONTENT.to_string(),
            messages: Vec::new(),
        }
    }
}

impl Message {
    pub fn placeholder() -> Self {
        Self {
            content: PLACEHOLDER_CONTENT.to_string(),
            bodies: Vec::new(),
        }
    }
}

/// The outline sent to the evaluator.
///
/// Order of summaries, messages and bodies is reading order and is preserved
/// through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletPointsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summaries: Vec<Summary>,
}

impl BulletPointsRequest {
    pub fn message_count(&self) -> usize {
        self.summaries.iter().map(|s| s.messages.len()).sum()
    }

    pub fn body_count(&self) -> usize {
        self.summaries
            .iter()
            .flat_map(|s| &s.messages)
            .map(|m| m.bodies.len())
            .sum()
    }
}
