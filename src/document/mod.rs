//! The document-editor surface the checker consumes.
//!
//! Mutations are queued and only become observable after [`DocumentEditor::sync`],
//! mirroring the batch-and-flush model of editor automation APIs. Reads see
//! the state as of the last sync.

mod memory;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ParagraphRecord;

pub use memory::{MemoryComment, MemoryDocument};

/// A live range: byte offsets into one paragraph's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub paragraph: usize,
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// The whole of a paragraph whose text is `len` bytes long.
    pub fn whole_paragraph(paragraph: usize, len: usize) -> Self {
        Self {
            paragraph,
            start: 0,
            end: len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Range cannot carry a comment: {0:?}")]
    InvalidRange(TextRange),

    #[error("Comment limit of {0} reached")]
    CommentLimit(usize),

    #[error("Sync failed: {0}")]
    Sync(String),
}

pub trait DocumentEditor {
    /// Paragraph snapshot, in document order.
    fn paragraphs(&self) -> Vec<ParagraphRecord>;

    /// Every occurrence of `needle` as a literal substring of the body.
    fn search(&self, needle: &str) -> Vec<TextRange>;

    /// Comments currently attached to the document.
    fn comments(&self) -> Vec<CommentId>;

    fn set_highlight(&mut self, range: &TextRange, color: Option<&str>);

    /// Remove highlighting from the whole body.
    fn clear_highlights(&mut self);

    /// Set or reset (`None`) the text colour of a range.
    fn set_text_color(&mut self, range: &TextRange, color: Option<&str>);

    /// Queue a comment anchored to `range`. Fails if the editor refuses the
    /// anchor or its comment limit would be exceeded.
    fn insert_comment(&mut self, range: &TextRange, text: &str) -> Result<CommentId, EditorError>;

    fn delete_comment(&mut self, id: CommentId);

    /// Flush queued mutations.
    fn sync(&mut self) -> impl Future<Output = Result<(), EditorError>> + Send;
}
