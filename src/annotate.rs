//! Highlights and comments for findings.
//!
//! Every pass starts from a clean document: [`AnnotationManager::clear_all`]
//! removes what the previous pass produced, then
//! [`AnnotationManager::apply`] annotates the chosen findings. Nothing is
//! diffed incrementally.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::AnnotationConfig;
use crate::document::{CommentId, DocumentEditor, EditorError, TextRange};
use crate::locator::{truncate_chars, TextLocator};
use crate::models::{
    CriteriaResult, EvaluationCriteria, EvaluationResult, EvaluationScope, ParagraphRecord,
    TitleParagraph,
};

/// Key of the handle table: a finding's scope and the criteria of its first
/// issue, in response order.
pub type HandleKey = (EvaluationScope, EvaluationCriteria);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationHandle {
    pub range: TextRange,
    pub comment: CommentId,
}

/// Outcome counts of one apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Findings whose range was found and highlighted.
    pub annotated: usize,
    /// Annotated findings that also received a comment.
    pub commented: usize,
    /// Annotated findings whose comment failed and got the text colour fallback.
    pub fallback: usize,
    /// Findings with issues whose text could not be located.
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct AnnotationManager {
    config: AnnotationConfig,
    handles: HashMap<HandleKey, AnnotationHandle>,
    fallback_ranges: Vec<TextRange>,
}

impl AnnotationManager {
    pub fn new(config: AnnotationConfig) -> Self {
        Self {
            config,
            handles: HashMap::new(),
            fallback_ranges: Vec::new(),
        }
    }

    pub fn handles(&self) -> &HashMap<HandleKey, AnnotationHandle> {
        &self.handles
    }

    pub fn handle(
        &self,
        scope: EvaluationScope,
        criteria: &EvaluationCriteria,
    ) -> Option<&AnnotationHandle> {
        self.handles.get(&(scope, criteria.clone()))
    }

    /// Delete every comment in the document, reset highlights and any
    /// fallback colouring from the previous pass, then flush.
    ///
    /// Returns the number of comments deleted.
    pub async fn clear_all<D: DocumentEditor>(
        &mut self,
        doc: &mut D,
    ) -> Result<usize, EditorError> {
        let comments = doc.comments();
        for id in &comments {
            doc.delete_comment(*id);
        }
        doc.clear_highlights();
        for range in self.fallback_ranges.drain(..) {
            doc.set_text_color(&range, None);
        }
        self.handles.clear();

        doc.sync().await?;
        tracing::debug!("Cleared {} comments", comments.len());
        Ok(comments.len())
    }

    /// Highlight and comment every finding that has a failing criterion.
    ///
    /// Search misses and comment failures are logged and do not stop the
    /// pass. Mutations are flushed once at the end.
    pub async fn apply<'a, D, I>(
        &mut self,
        doc: &mut D,
        locator: &TextLocator,
        title: Option<&TitleParagraph>,
        findings: I,
    ) -> Result<ApplyReport, EditorError>
    where
        D: DocumentEditor,
        I: IntoIterator<Item = &'a EvaluationResult>,
    {
        let paragraphs = doc.paragraphs();
        let mut report = ApplyReport::default();

        for finding in findings {
            // Keyed by the first issue as the evaluator reported it; the
            // comment lists failing criteria in scope order.
            let Some(first) = finding.criteria_results.iter().find(|c| c.has_issues) else {
                continue;
            };
            let failing = finding.failing_criteria();

            let range = match title_range(&paragraphs, title, finding) {
                Some(range) => Some(range),
                None => locator
                    .locate(&*doc, &paragraphs, &finding.target_text)
                    .map(|located| located.range),
            };
            let Some(range) = range else {
                tracing::warn!("Skipping {} finding: target text not found", finding.scope);
                report.skipped += 1;
                continue;
            };

            doc.set_highlight(&range, Some(&self.config.highlight_color));
            report.annotated += 1;

            let body = compose_comment(finding.scope, &failing, self.config.max_comment_length);
            match doc.insert_comment(&range, &body) {
                Ok(comment) => {
                    self.handles.insert(
                        (finding.scope, first.criteria.clone()),
                        AnnotationHandle { range, comment },
                    );
                    report.commented += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "Comment failed for {} finding, falling back to text colour: {}",
                        finding.scope,
                        e
                    );
                    doc.set_text_color(&range, Some(&self.config.fallback_text_color));
                    self.fallback_ranges.push(range);
                    report.fallback += 1;
                }
            }
        }

        doc.sync().await?;
        tracing::info!(
            "Annotated {} findings ({} commented, {} fallback, {} not found)",
            report.annotated,
            report.commented,
            report.fallback,
            report.skipped
        );
        Ok(report)
    }

    /// Clear, then apply, as one pass.
    pub async fn reannotate<'a, D, I>(
        &mut self,
        doc: &mut D,
        locator: &TextLocator,
        title: Option<&TitleParagraph>,
        findings: I,
    ) -> Result<ApplyReport, EditorError>
    where
        D: DocumentEditor,
        I: IntoIterator<Item = &'a EvaluationResult>,
    {
        self.clear_all(doc).await?;
        self.apply(doc, locator, title, findings).await
    }
}

/// Whole-document findings whose target is the title go straight to the
/// title paragraph. Prefers a paragraph whose text still equals the title,
/// then the paragraph at the title's original position.
fn title_range(
    paragraphs: &[ParagraphRecord],
    title: Option<&TitleParagraph>,
    finding: &EvaluationResult,
) -> Option<TextRange> {
    let title = title?;
    if finding.scope != EvaluationScope::AllSummaries || finding.target_text.trim() != title.text {
        return None;
    }
    paragraphs
        .iter()
        .find(|p| p.text.trim() == title.text)
        .or_else(|| {
            paragraphs
                .get(title.ordinal)
                .filter(|p| !p.text.trim().is_empty())
        })
        .map(|p| TextRange::whole_paragraph(p.ordinal, p.text.len()))
}

/// One comment body for all failing criteria of a finding, truncated to
/// `max_chars` characters.
pub fn compose_comment(
    scope: EvaluationScope,
    failing: &[&CriteriaResult],
    max_chars: usize,
) -> String {
    let mut body = format!("【{}】", scope.display_name());
    for criteria in failing {
        body.push('\n');
        body.push_str("・");
        body.push_str(criteria.criteria.display_name());
        body.push_str(": ");
        body.push_str(criteria.issues.trim());
    }

    if body.chars().count() > max_chars {
        let mut truncated = truncate_chars(&body, max_chars.saturating_sub(1)).to_string();
        truncated.push('…');
        truncated
    } else {
        body
    }
}
