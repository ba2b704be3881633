//! Review session: the owner of all per-document checking state.
//!
//! A [`ReviewSession`] holds the current findings, the active display
//! filter, the annotation handle table, the last score and the detected
//! title. All operations take `&mut self`, so one session can never run two
//! passes at once.
//!
//! # Passes
//!
//! - [`ReviewSession::check`]: read the document, build the outline, evaluate it,
//!   replace the findings, and annotate the highest-priority scope with issues
//!   (or everything, when nothing has issues).
//! - [`ReviewSession::show_all`] / [`ReviewSession::show_scope`]: re-annotate
//!   from the stored findings without calling the evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::{AnnotationManager, ApplyReport};
use crate::config::CheckerConfig;
use crate::document::{DocumentEditor, EditorError};
use crate::gateway::{ClientError, Evaluator};
use crate::locator::TextLocator;
use crate::models::{EvaluationResult, EvaluationScope, ScoreTier, TitleParagraph};
use crate::outline::{detect_outline, render_outline, OutlineError, ParagraphNormalizer};
use crate::priority::{filter_by_scope, resolve_priority, scope_overview, ScopeOverview};

/// Errors that abort a pass. Search misses and comment failures never do.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Evaluation failed: {0}")]
    Transport(#[from] ClientError),

    #[error("Document update failed: {0}")]
    Editor(#[from] EditorError),
}

/// Which findings are currently shown in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "scope")]
pub enum DisplayFilter {
    All,
    Scope(EvaluationScope),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub score: u8,
    pub tier: ScoreTier,
    /// The evaluator's own status message.
    pub message: String,
    pub finding_count: usize,
    pub display: DisplayFilter,
    pub annotations: ApplyReport,
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn tier_message(&self) -> &'static str {
        self.tier.message()
    }
}

#[derive(Debug, Clone)]
pub enum CheckOutcome {
    /// The document has no bullet structure; the evaluator was not called.
    NothingToCheck,
    Checked(CheckReport),
}

pub struct ReviewSession<E> {
    evaluator: E,
    normalizer: ParagraphNormalizer,
    locator: TextLocator,
    annotations: AnnotationManager,
    findings: Vec<EvaluationResult>,
    title: Option<TitleParagraph>,
    display: Option<DisplayFilter>,
    last_report: Option<CheckReport>,
}

impl<E: Evaluator> ReviewSession<E> {
    pub fn new(evaluator: E, config: CheckerConfig) -> Self {
        Self {
            evaluator,
            normalizer: ParagraphNormalizer::new(config.normalizer),
            locator: TextLocator::new(config.locator),
            annotations: AnnotationManager::new(config.annotation),
            findings: Vec::new(),
            title: None,
            display: None,
            last_report: None,
        }
    }

    pub fn findings(&self) -> &[EvaluationResult] {
        &self.findings
    }

    pub fn title(&self) -> Option<&TitleParagraph> {
        self.title.as_ref()
    }

    /// The filter of the last completed annotation pass.
    pub fn display(&self) -> Option<DisplayFilter> {
        self.display
    }

    pub fn last_report(&self) -> Option<&CheckReport> {
        self.last_report.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationManager {
        &self.annotations
    }

    pub fn scope_overview(&self) -> Vec<ScopeOverview> {
        scope_overview(&self.findings)
    }

    /// Render the outline that a check would submit, or `None` when the
    /// document has no bullet structure.
    pub fn preview<D: DocumentEditor>(&self, doc: &D) -> Option<String> {
        detect_outline(&self.normalizer, &doc.paragraphs())
            .ok()
            .map(|(_, outline)| render_outline(&outline))
    }

    /// Run a full check pass.
    ///
    /// The new findings, title and report replace the stored ones only once
    /// the document has been annotated. On an evaluator or editor failure the
    /// session keeps the previous check.
    pub async fn check<D: DocumentEditor>(
        &mut self,
        doc: &mut D,
    ) -> Result<CheckOutcome, CheckError> {
        let paragraphs = doc.paragraphs();
        let (normalized, outline) = match detect_outline(&self.normalizer, &paragraphs) {
            Ok(detected) => detected,
            Err(OutlineError::NoStructure) => {
                tracing::info!("No bullet structure detected, nothing to check");
                return Ok(CheckOutcome::NothingToCheck);
            }
        };
        tracing::debug!("Detected outline:\n{}", render_outline(&outline));

        let response = match self.evaluator.evaluate(&outline).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Evaluation failed, keeping previous results: {}", e);
                return Err(e.into());
            }
        };

        let score = response.effective_score();
        let findings = response.results;
        let title = normalized.title;
        let filter = match resolve_priority(&findings) {
            Some(scope) => DisplayFilter::Scope(scope),
            None => DisplayFilter::All,
        };
        let annotations = annotate_findings(
            &mut self.annotations,
            &self.locator,
            doc,
            title.as_ref(),
            &findings,
            filter,
        )
        .await?;

        let report = CheckReport {
            score,
            tier: ScoreTier::from_score(score),
            message: response.message,
            finding_count: findings.len(),
            display: filter,
            annotations,
            checked_at: Utc::now(),
        };
        tracing::info!(
            "Check complete: score {} ({:?}), {} findings, showing {:?}",
            report.score,
            report.tier,
            report.finding_count,
            report.display
        );
        self.findings = findings;
        self.title = title;
        self.display = Some(filter);
        self.last_report = Some(report.clone());
        Ok(CheckOutcome::Checked(report))
    }

    /// Annotate every stored finding.
    pub async fn show_all<D: DocumentEditor>(
        &mut self,
        doc: &mut D,
    ) -> Result<ApplyReport, CheckError> {
        self.annotate(doc, DisplayFilter::All).await
    }

    /// Annotate only the stored findings of `scope`.
    pub async fn show_scope<D: DocumentEditor>(
        &mut self,
        doc: &mut D,
        scope: EvaluationScope,
    ) -> Result<ApplyReport, CheckError> {
        self.annotate(doc, DisplayFilter::Scope(scope)).await
    }

    /// Remove all annotations and forget the active filter. Findings are kept.
    pub async fn clear<D: DocumentEditor>(&mut self, doc: &mut D) -> Result<(), CheckError> {
        self.annotations.clear_all(doc).await?;
        self.display = None;
        Ok(())
    }

    async fn annotate<D: DocumentEditor>(
        &mut self,
        doc: &mut D,
        filter: DisplayFilter,
    ) -> Result<ApplyReport, CheckError> {
        let report = annotate_findings(
            &mut self.annotations,
            &self.locator,
            doc,
            self.title.as_ref(),
            &self.findings,
            filter,
        )
        .await?;
        self.display = Some(filter);
        Ok(report)
    }
}

/// Clear the document and annotate the findings selected by `filter`.
async fn annotate_findings<D: DocumentEditor>(
    manager: &mut AnnotationManager,
    locator: &TextLocator,
    doc: &mut D,
    title: Option<&TitleParagraph>,
    findings: &[EvaluationResult],
    filter: DisplayFilter,
) -> Result<ApplyReport, CheckError> {
    let selected = match filter {
        DisplayFilter::All => findings.iter().collect::<Vec<_>>(),
        DisplayFilter::Scope(scope) => filter_by_scope(findings, scope),
    };
    tracing::debug!("Annotating {} findings for {:?}", selected.len(), filter);

    Ok(manager.reannotate(doc, locator, title, selected).await?)
}
