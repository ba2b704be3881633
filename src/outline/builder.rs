//! Summary → Message → Body hierarchy from an ordered candidate list.

use thiserror::Error;

use crate::models::{Body, BulletCandidate, BulletLevel, BulletPointsRequest, Message, Summary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutlineError {
    /// The document has no bullet paragraphs; there is nothing to evaluate.
    #[error("no bullet structure detected")]
    NoStructure,
}

/// Build the hierarchy.
///
/// Orphan messages and bodies get placeholder parents, so every body has a
/// message and every message has a summary. Returns
/// [`OutlineError::NoStructure`] when there are no candidates at all.
pub fn build_outline(
    title: Option<String>,
    candidates: &[BulletCandidate],
) -> Result<BulletPointsRequest, OutlineError> {
    if candidates.is_empty() {
        return Err(OutlineError::NoStructure);
    }

    let mut summaries: Vec<Summary> = Vec::new();

    for candidate in candidates {
        let content = candidate.clean_text.clone();
        match candidate.level {
            BulletLevel::Summary => summaries.push(Summary {
                content,
                messages: Vec::new(),
            }),
            BulletLevel::Message => open_summary(&mut summaries).messages.push(Message {
                content,
                bodies: Vec::new(),
            }),
            BulletLevel::Body => {
                open_message(open_summary(&mut summaries))
                    .bodies
                    .push(Body { content });
            }
        }
    }

    Ok(BulletPointsRequest { title, summaries })
}

/// The summary new messages attach to, synthesizing a placeholder for orphans.
fn open_summary(summaries: &mut Vec<Summary>) -> &mut Summary {
    if summaries.is_empty() {
        tracing::debug!("Orphan bullet, synthesizing placeholder summary");
        summaries.push(Summary::placeholder());
    }
    let last = summaries.len() - 1;
    &mut summaries[last]
}

/// The message new bodies attach to. A summary without messages gets a
/// placeholder, so a body right after a summary never attaches to an
/// earlier summary's message.
fn open_message(summary: &mut Summary) -> &mut Message {
    if summary.messages.is_empty() {
        tracing::debug!("Orphan body, synthesizing placeholder message");
        summary.messages.push(Message::placeholder());
    }
    let last = summary.messages.len() - 1;
    &mut summary.messages[last]
}
