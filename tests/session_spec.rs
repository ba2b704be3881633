//! Review session integration tests.
//!
//! The evaluator is stubbed with queued responses so each test controls
//! exactly what a check sees.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use outline_checker::config::CheckerConfig;
use outline_checker::document::{CommentId, DocumentEditor, EditorError, MemoryDocument, TextRange};
use outline_checker::gateway::{ClientError, Evaluator};
use outline_checker::models::*;
use outline_checker::session::{CheckError, CheckOutcome, DisplayFilter, ReviewSession};
use reqwest::StatusCode;

struct StubEvaluator {
    responses: Mutex<VecDeque<Result<EvaluationResponse, ClientError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<BulletPointsRequest>>,
}

impl StubEvaluator {
    fn new(responses: Vec<Result<EvaluationResponse, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Evaluator for &StubEvaluator {
    async fn evaluate(
        &self,
        outline: &BulletPointsRequest,
    ) -> Result<EvaluationResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(outline.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no stub response queued")
    }
}

const OUTLINE: &str = "\
Quarterly review
• Revenue grew strongly this quarter
  • Enterprise deals closed early
    • Three renewals signed
  • However churn fell
• Costs are flat
  • Hiring paused";

fn document() -> MemoryDocument {
    MemoryDocument::from_indented_text(OUTLINE, 12.0)
}

fn finding(scope: EvaluationScope, target: &str, issues: &[&str]) -> EvaluationResult {
    let criteria = scope.criteria();
    EvaluationResult {
        target_text: target.to_string(),
        scope,
        criteria_results: issues
            .iter()
            .enumerate()
            .map(|(i, issue)| CriteriaResult {
                criteria: criteria[i % criteria.len()].clone(),
                has_issues: true,
                issues: issue.to_string(),
            })
            .collect(),
    }
}

fn clean(scope: EvaluationScope, target: &str) -> EvaluationResult {
    EvaluationResult {
        target_text: target.to_string(),
        scope,
        criteria_results: vec![CriteriaResult {
            criteria: scope.criteria()[0].clone(),
            has_issues: false,
            issues: "問題なし".to_string(),
        }],
    }
}

fn success(
    score: Option<f64>,
    results: Vec<EvaluationResult>,
) -> Result<EvaluationResponse, ClientError> {
    Ok(EvaluationResponse {
        status: "success".to_string(),
        message: "評価が完了しました".to_string(),
        score,
        results,
    })
}

fn server_error() -> Result<EvaluationResponse, ClientError> {
    Err(ClientError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    })
}

fn sample_findings() -> Vec<EvaluationResult> {
    vec![
        finding(
            EvaluationScope::MessageWithBodies,
            "Enterprise deals closed early\nThree renewals signed",
            &["ボディが根拠になっていない"],
        ),
        finding(
            EvaluationScope::SummaryPairs,
            "Revenue grew strongly this quarter\nCosts are flat",
            &["接続が弱い", "論理が飛躍"],
        ),
        clean(EvaluationScope::DocumentWide, "Quarterly review"),
    ]
}

fn checked(outcome: CheckOutcome) -> outline_checker::session::CheckReport {
    match outcome {
        CheckOutcome::Checked(report) => report,
        CheckOutcome::NothingToCheck => panic!("expected a checked outcome"),
    }
}

/// A document whose flush can be made to fail.
struct FlakyDocument {
    inner: MemoryDocument,
    fail_sync: bool,
}

impl DocumentEditor for FlakyDocument {
    fn paragraphs(&self) -> Vec<ParagraphRecord> {
        self.inner.paragraphs()
    }

    fn search(&self, needle: &str) -> Vec<TextRange> {
        self.inner.search(needle)
    }

    fn comments(&self) -> Vec<CommentId> {
        self.inner.comments()
    }

    fn set_highlight(&mut self, range: &TextRange, color: Option<&str>) {
        self.inner.set_highlight(range, color)
    }

    fn clear_highlights(&mut self) {
        self.inner.clear_highlights()
    }

    fn set_text_color(&mut self, range: &TextRange, color: Option<&str>) {
        self.inner.set_text_color(range, color)
    }

    fn insert_comment(&mut self, range: &TextRange, text: &str) -> Result<CommentId, EditorError> {
        self.inner.insert_comment(range, text)
    }

    fn delete_comment(&mut self, id: CommentId) {
        self.inner.delete_comment(id)
    }

    async fn sync(&mut self) -> Result<(), EditorError> {
        if self.fail_sync {
            return Err(EditorError::Sync("editor went away".to_string()));
        }
        self.inner.sync().await
    }
}

mod check {
    use super::*;

    #[tokio::test]
    async fn surfaces_the_highest_priority_scope_with_issues() {
        let stub = StubEvaluator::new(vec![success(Some(72.0), sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        let report = checked(session.check(&mut doc).await.expect("check succeeds"));

        assert_eq!(report.display, DisplayFilter::Scope(EvaluationScope::SummaryPairs));
        assert_eq!(report.score, 72);
        assert_eq!(report.tier, ScoreTier::Good);
        assert_eq!(report.finding_count, 3);
        assert_eq!(report.annotations.annotated, 1);
        assert_eq!(doc.committed_comments().len(), 1);

        // Two failing criteria, one comment.
        let comment = &doc.committed_comments()[0];
        assert_eq!(comment.range.paragraph, 1);
        assert!(comment.text.contains("接続が弱い"));
        assert!(comment.text.contains("論理が飛躍"));
        assert_eq!(
            session.display(),
            Some(DisplayFilter::Scope(EvaluationScope::SummaryPairs))
        );
    }

    #[tokio::test]
    async fn sends_the_detected_outline() {
        let stub = StubEvaluator::new(vec![success(None, vec![])]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        session.check(&mut doc).await.expect("check succeeds");

        let sent = stub.last_request.lock().unwrap().clone().expect("request sent");
        assert_eq!(sent.title.as_deref(), Some("Quarterly review"));
        assert_eq!(sent.summaries.len(), 2);
        assert_eq!(sent.summaries[0].messages.len(), 2);
        assert_eq!(sent.summaries[0].messages[0].bodies[0].content, "Three renewals signed");
        assert_eq!(sent.summaries[1].messages[0].content, "Hiring paused");
    }

    #[tokio::test]
    async fn null_score_is_excellent_100() {
        let stub = StubEvaluator::new(vec![success(
            None,
            vec![clean(EvaluationScope::AllSummaries, "x")],
        )]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        let report = checked(session.check(&mut doc).await.expect("check succeeds"));

        assert_eq!(report.score, 100);
        assert_eq!(report.tier, ScoreTier::Excellent);
        assert_eq!(report.tier_message(), ScoreTier::Excellent.message());
    }

    #[tokio::test]
    async fn no_issues_shows_all_and_annotates_nothing() {
        let stub = StubEvaluator::new(vec![success(
            Some(95.0),
            vec![clean(EvaluationScope::DocumentWide, "Quarterly review")],
        )]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        let report = checked(session.check(&mut doc).await.expect("check succeeds"));

        assert_eq!(report.display, DisplayFilter::All);
        assert_eq!(report.annotations.annotated, 0);
        assert!(doc.committed_comments().is_empty());
        assert!(doc.highlights().is_empty());
    }

    #[tokio::test]
    async fn prose_is_nothing_to_check() {
        let stub = StubEvaluator::new(vec![]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = MemoryDocument::from_paragraphs([("Just a heading", 0.0)]);

        let outcome = session.check(&mut doc).await.expect("not an error");

        assert!(matches!(outcome, CheckOutcome::NothingToCheck));
        assert_eq!(stub.calls(), 0);
        assert!(session.findings().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_keeps_previous_state() {
        let stub = StubEvaluator::new(vec![
            success(Some(60.0), sample_findings()),
            server_error(),
        ]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        session.check(&mut doc).await.expect("first check succeeds");
        let comments_before = doc.committed_comments().to_vec();
        let highlights_before = doc.highlights().to_vec();

        let err = session.check(&mut doc).await.expect_err("second check fails");

        assert!(matches!(err, CheckError::Transport(ClientError::Status { .. })));
        assert_eq!(session.findings().len(), 3);
        assert_eq!(session.last_report().map(|r| r.score), Some(60));
        assert_eq!(
            session.display(),
            Some(DisplayFilter::Scope(EvaluationScope::SummaryPairs))
        );
        assert_eq!(doc.committed_comments(), comments_before.as_slice());
        assert_eq!(doc.highlights(), highlights_before.as_slice());
    }

    #[tokio::test]
    async fn editor_failure_keeps_the_previous_check() {
        let stub = StubEvaluator::new(vec![
            success(Some(60.0), sample_findings()),
            success(
                Some(20.0),
                vec![finding(
                    EvaluationScope::DocumentWide,
                    "Quarterly review",
                    &["修辞が過剰"],
                )],
            ),
        ]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = FlakyDocument {
            inner: document(),
            fail_sync: false,
        };

        session.check(&mut doc).await.expect("first check succeeds");
        doc.fail_sync = true;
        let err = session.check(&mut doc).await.expect_err("second check fails");

        assert!(matches!(err, CheckError::Editor(EditorError::Sync(_))));
        assert_eq!(stub.calls(), 2);
        assert_eq!(session.findings(), sample_findings().as_slice());
        assert_eq!(session.last_report().map(|r| r.score), Some(60));
        assert_eq!(
            session.display(),
            Some(DisplayFilter::Scope(EvaluationScope::SummaryPairs))
        );
        assert_eq!(session.title().map(|t| t.text.as_str()), Some("Quarterly review"));
    }

    #[tokio::test]
    async fn new_results_replace_old_ones_wholesale() {
        let stub = StubEvaluator::new(vec![
            success(None, sample_findings()),
            success(
                None,
                vec![finding(
                    EvaluationScope::MessagesUnderSummary,
                    "Hiring paused",
                    &["番号不要"],
                )],
            ),
        ]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        session.check(&mut doc).await.expect("first check");
        let report = checked(session.check(&mut doc).await.expect("second check"));

        assert_eq!(session.findings().len(), 1);
        assert_eq!(
            report.display,
            DisplayFilter::Scope(EvaluationScope::MessagesUnderSummary)
        );
        assert_eq!(doc.committed_comments().len(), 1);
        assert_eq!(doc.committed_comments()[0].range.paragraph, 6);
    }
}

mod display {
    use super::*;

    #[tokio::test]
    async fn show_all_is_idempotent() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();
        session.check(&mut doc).await.expect("check");

        let first = session.show_all(&mut doc).await.expect("show all");
        let after_first = doc.committed_comments().len();
        let second = session.show_all(&mut doc).await.expect("show all again");

        assert_eq!(first, second);
        assert_eq!(after_first, 2);
        assert_eq!(doc.committed_comments().len(), after_first);
        assert_eq!(session.display(), Some(DisplayFilter::All));
    }

    #[tokio::test]
    async fn show_scope_annotates_only_that_scope() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();
        session.check(&mut doc).await.expect("check");

        let report = session
            .show_scope(&mut doc, EvaluationScope::MessageWithBodies)
            .await
            .expect("show scope");

        assert_eq!(report.annotated, 1);
        let comments = doc.committed_comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].range.paragraph, 2);
        assert!(comments[0].text.starts_with("【メッセージとボディ】"));
        assert!(session
            .annotations()
            .handle(EvaluationScope::MessageWithBodies, &EvaluationCriteria::MessageBodyConsistency)
            .is_some());
    }

    #[tokio::test]
    async fn scope_without_findings_clears_the_document() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();
        session.check(&mut doc).await.expect("check");

        let report = session
            .show_scope(&mut doc, EvaluationScope::AllSummaries)
            .await
            .expect("show scope");

        assert_eq!(report.annotated, 0);
        assert!(doc.committed_comments().is_empty());
        assert!(doc.highlights().is_empty());
    }

    #[tokio::test]
    async fn all_summaries_finding_on_the_title_goes_to_the_title_paragraph() {
        let stub = StubEvaluator::new(vec![success(
            None,
            vec![finding(EvaluationScope::AllSummaries, "Quarterly review", &["SCQAがない"])],
        )]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        session.check(&mut doc).await.expect("check");

        let comments = doc.committed_comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].range, TextRange::whole_paragraph(0, "Quarterly review".len()));
    }

    #[tokio::test]
    async fn unlocatable_findings_are_skipped() {
        let stub = StubEvaluator::new(vec![success(
            None,
            vec![
                finding(EvaluationScope::SummaryWithMessages, "zzz qqq", &["展開が不明瞭"]),
                finding(
                    EvaluationScope::SummaryWithMessages,
                    "Costs are flat\nHiring paused",
                    &["展開が不明瞭"],
                ),
            ],
        )]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        let report = checked(session.check(&mut doc).await.expect("check"));

        assert_eq!(report.annotations.skipped, 1);
        assert_eq!(report.annotations.annotated, 1);
        assert_eq!(doc.committed_comments().len(), 1);
    }

    #[tokio::test]
    async fn comment_failures_fall_back_to_text_colour() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document().with_comment_limit(1);
        session.check(&mut doc).await.expect("check");

        let report = session.show_all(&mut doc).await.expect("show all");

        assert_eq!(report.annotated, 2);
        assert_eq!(report.commented, 1);
        assert_eq!(report.fallback, 1);
        assert_eq!(doc.committed_comments().len(), 1);
        assert_eq!(doc.highlights().len(), 2);
        assert_eq!(doc.text_colors().len(), 1);
        assert_eq!(doc.text_colors()[0].1, "Red");

        // The next pass undoes the fallback colour before re-applying.
        session
            .show_scope(&mut doc, EvaluationScope::DocumentWide)
            .await
            .expect("show scope");
        assert!(doc.text_colors().is_empty());
        assert!(doc.committed_comments().is_empty());
    }

    #[tokio::test]
    async fn edited_paragraphs_are_still_found() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();
        session.check(&mut doc).await.expect("check");

        // The user rewrites the end of the first summary after the check.
        doc.set_paragraph_text(1, "• Revenue grew strongly in Q3");
        let report = session
            .show_scope(&mut doc, EvaluationScope::SummaryPairs)
            .await
            .expect("show scope");

        assert_eq!(report.annotated, 1);
        assert_eq!(doc.committed_comments()[0].range.paragraph, 1);
    }

    #[tokio::test]
    async fn clear_removes_everything_but_keeps_findings() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();
        session.check(&mut doc).await.expect("check");

        session.clear(&mut doc).await.expect("clear");

        assert!(doc.committed_comments().is_empty());
        assert!(doc.highlights().is_empty());
        assert_eq!(session.display(), None);
        assert_eq!(session.findings().len(), 3);
    }

    #[tokio::test]
    async fn overview_and_preview() {
        let stub = StubEvaluator::new(vec![success(None, sample_findings())]);
        let mut session = ReviewSession::new(&stub, CheckerConfig::default());
        let mut doc = document();

        let preview = session.preview(&doc).expect("outline detected");
        assert!(
            preview.starts_with("Quarterly review\n├── ● Revenue grew strongly this quarter\n")
        );

        session.check(&mut doc).await.expect("check");
        let overview = session.scope_overview();
        let with_issues: Vec<_> = overview
            .iter()
            .filter(|o| o.has_issues)
            .map(|o| o.scope)
            .collect();
        assert_eq!(
            with_issues,
            vec![EvaluationScope::SummaryPairs, EvaluationScope::MessageWithBodies]
        );
    }
}
