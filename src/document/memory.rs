use super::{CommentId, DocumentEditor, EditorError, TextRange};
use crate::models::ParagraphRecord;

#[derive(Debug, Clone, PartialEq)]
struct MemoryParagraph {
    text: String,
    left_indent: f32,
    first_line_indent: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryComment {
    pub id: CommentId,
    pub range: TextRange,
    pub text: String,
}

#[derive(Debug, Clone)]
enum PendingOp {
    Highlight(TextRange, Option<String>),
    ClearHighlights,
    TextColor(TextRange, Option<String>),
    InsertComment(MemoryComment),
    DeleteComment(CommentId),
}

/// An in-memory document with queued mutations.
///
/// Nothing queued through [`DocumentEditor`] is visible until `sync`. Direct
/// edits through [`MemoryDocument::set_paragraph_text`] and friends stand in
/// for the user typing, and apply immediately.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    paragraphs: Vec<MemoryParagraph>,
    comments: Vec<MemoryComment>,
    highlights: Vec<(TextRange, String)>,
    text_colors: Vec<(TextRange, String)>,
    pending: Vec<PendingOp>,
    comment_limit: Option<usize>,
    sync_count: usize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(text, left_indent)` pairs.
    pub fn from_paragraphs<S: Into<String>>(
        paragraphs: impl IntoIterator<Item = (S, f32)>,
    ) -> Self {
        let mut doc = Self::new();
        for (text, left_indent) in paragraphs {
            doc.push_paragraph(text, left_indent);
        }
        doc
    }

    /// Build from plain text, one paragraph per line. Each leading space
    /// becomes `points_per_space` of left indent and is removed from the text.
    pub fn from_indented_text(text: &str, points_per_space: f32) -> Self {
        let mut doc = Self::new();
        for line in text.lines() {
            let spaces = line.chars().take_while(|c| *c == ' ').count();
            doc.push_paragraph(&line[spaces..], spaces as f32 * points_per_space);
        }
        doc
    }

    /// Refuse comments beyond `limit` live comments.
    pub fn with_comment_limit(mut self, limit: usize) -> Self {
        self.comment_limit = Some(limit);
        self
    }

    pub fn push_paragraph(&mut self, text: impl Into<String>, left_indent: f32) -> usize {
        self.paragraphs.push(MemoryParagraph {
            text: text.into(),
            left_indent,
            first_line_indent: 0.0,
        });
        self.paragraphs.len() - 1
    }

    pub fn set_first_line_indent(&mut self, ordinal: usize, indent: f32) {
        if let Some(p) = self.paragraphs.get_mut(ordinal) {
            p.first_line_indent = indent;
        }
    }

    /// Replace a paragraph's text. Formatting and comments anchored to it
    /// are dropped, as an editor drops them when their anchor text goes.
    pub fn set_paragraph_text(&mut self, ordinal: usize, text: impl Into<String>) {
        if let Some(p) = self.paragraphs.get_mut(ordinal) {
            p.text = text.into();
            self.comments.retain(|c| c.range.paragraph != ordinal);
            self.highlights.retain(|(r, _)| r.paragraph != ordinal);
            self.text_colors.retain(|(r, _)| r.paragraph != ordinal);
        }
    }

    pub fn paragraph_text(&self, ordinal: usize) -> Option<&str> {
        self.paragraphs.get(ordinal).map(|p| p.text.as_str())
    }

    pub fn committed_comments(&self) -> &[MemoryComment] {
        &self.comments
    }

    pub fn comments_on(&self, paragraph: usize) -> Vec<&MemoryComment> {
        self.comments
            .iter()
            .filter(|c| c.range.paragraph == paragraph)
            .collect()
    }

    pub fn highlights(&self) -> &[(TextRange, String)] {
        &self.highlights
    }

    pub fn highlight_of(&self, range: &TextRange) -> Option<&str> {
        self.highlights
            .iter()
            .rev()
            .find(|(r, _)| r == range)
            .map(|(_, c)| c.as_str())
    }

    pub fn is_paragraph_highlighted(&self, paragraph: usize) -> bool {
        self.highlights.iter().any(|(r, _)| r.paragraph == paragraph)
    }

    pub fn text_color_of(&self, range: &TextRange) -> Option<&str> {
        self.text_colors
            .iter()
            .rev()
            .find(|(r, _)| r == range)
            .map(|(_, c)| c.as_str())
    }

    pub fn text_colors(&self) -> &[(TextRange, String)] {
        &self.text_colors
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    fn live_comment_count(&self) -> usize {
        let mut count = self.comments.len();
        for op in &self.pending {
            match op {
                PendingOp::InsertComment(_) => count += 1,
                PendingOp::DeleteComment(id) => {
                    if self.comments.iter().any(|c| c.id == *id) {
                        count = count.saturating_sub(1);
                    }
                }
                _ => {}
            }
        }
        count
    }

    fn is_valid_anchor(&self, range: &TextRange) -> bool {
        match self.paragraphs.get(range.paragraph) {
            Some(p) => {
                !range.is_empty()
                    && range.end <= p.text.len()
                    && p.text.is_char_boundary(range.start)
                    && p.text.is_char_boundary(range.end)
            }
            None => false,
        }
    }

    fn apply(&mut self, op: PendingOp) {
        match op {
            PendingOp::Highlight(range, Some(color)) => {
                self.highlights.retain(|(r, _)| *r != range);
                self.highlights.push((range, color));
            }
            PendingOp::Highlight(range, None) => {
                self.highlights.retain(|(r, _)| *r != range);
            }
            PendingOp::ClearHighlights => self.highlights.clear(),
            PendingOp::TextColor(range, Some(color)) => {
                self.text_colors.retain(|(r, _)| *r != range);
                self.text_colors.push((range, color));
            }
            PendingOp::TextColor(range, None) => {
                self.text_colors.retain(|(r, _)| *r != range);
            }
            PendingOp::InsertComment(comment) => self.comments.push(comment),
            PendingOp::DeleteComment(id) => self.comments.retain(|c| c.id != id),
        }
    }
}

impl DocumentEditor for MemoryDocument {
    fn paragraphs(&self) -> Vec<ParagraphRecord> {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(ordinal, p)| ParagraphRecord {
                text: p.text.clone(),
                left_indent: p.left_indent,
                first_line_indent: p.first_line_indent,
                ordinal,
            })
            .collect()
    }

    fn search(&self, needle: &str) -> Vec<TextRange> {
        if needle.is_empty() {
            return Vec::new();
        }
        self.paragraphs
            .iter()
            .enumerate()
            .flat_map(|(ordinal, p)| {
                p.text.match_indices(needle).map(move |(start, m)| TextRange {
                    paragraph: ordinal,
                    start,
                    end: start + m.len(),
                })
            })
            .collect()
    }

    fn comments(&self) -> Vec<CommentId> {
        self.comments.iter().map(|c| c.id).collect()
    }

    fn set_highlight(&mut self, range: &TextRange, color: Option<&str>) {
        self.pending
            .push(PendingOp::Highlight(*range, color.map(str::to_string)));
    }

    fn clear_highlights(&mut self) {
        self.pending.push(PendingOp::ClearHighlights);
    }

    fn set_text_color(&mut self, range: &TextRange, color: Option<&str>) {
        self.pending
            .push(PendingOp::TextColor(*range, color.map(str::to_string)));
    }

    fn insert_comment(&mut self, range: &TextRange, text: &str) -> Result<CommentId, EditorError> {
        if !self.is_valid_anchor(range) {
            return Err(EditorError::InvalidRange(*range));
        }
        if let Some(limit) = self.comment_limit {
            if self.live_comment_count() >= limit {
                return Err(EditorError::CommentLimit(limit));
            }
        }
        let id = CommentId::new();
        self.pending.push(PendingOp::InsertComment(MemoryComment {
            id,
            range: *range,
            text: text.to_string(),
        }));
        Ok(id)
    }

    fn delete_comment(&mut self, id: CommentId) {
        self.pending.push(PendingOp::DeleteComment(id));
    }

    async fn sync(&mut self) -> Result<(), EditorError> {
        let pending = std::mem::take(&mut self.pending);
        for op in pending {
            self.apply(op);
        }
        self.sync_count += 1;
        Ok(())
    }
}
