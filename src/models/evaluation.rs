use std::fmt;

use serde::{Deserialize, Serialize};

/// The granularity at which one evaluation judgment is made.
///
/// Variants are declared in priority order: document-wide first, then
/// progressively narrower scopes, message-with-bodies last. `Ord` follows
/// that order.
///
/// Deserialization accepts any casing or separator style and normalizes it
/// to the canonical snake_case tag, so comparisons after the wire boundary
/// are plain enum equality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum EvaluationScope {
    DocumentWide,
    AllSummaries,
    SummaryPairs,
    SummaryWithMessages,
    MessagesUnderSummary,
    MessageWithBodies,
}

impl EvaluationScope {
    /// All scopes in priority order.
    pub const ALL: [EvaluationScope; 6] = [
        Self::DocumentWide,
        Self::AllSummaries,
        Self::SummaryPairs,
        Self::SummaryWithMessages,
        Self::MessagesUnderSummary,
        Self::MessageWithBodies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentWide => "document_wide",
            Self::AllSummaries => "all_summaries",
            Self::SummaryPairs => "summary_pairs",
            Self::SummaryWithMessages => "summary_with_messages",
            Self::MessagesUnderSummary => "messages_under_summary",
            Self::MessageWithBodies => "message_with_bodies",
        }
    }

    /// Parse a scope tag, tolerating `SCREAMING_CASE`, `CamelCase`,
    /// `kebab-case` and surrounding whitespace.
    pub fn from_str(s: &str) -> Option<Self> {
        match canonical_tag(s).as_str() {
            "document_wide" => Some(Self::DocumentWide),
            "all_summaries" => Some(Self::AllSummaries),
            "summary_pairs" => Some(Self::SummaryPairs),
            "summary_with_messages" => Some(Self::SummaryWithMessages),
            "messages_under_summary" => Some(Self::MessagesUnderSummary),
            "message_with_bodies" => Some(Self::MessageWithBodies),
            _ => None,
        }
    }

    /// Localized label shown to the user.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DocumentWide => "文書全体",
            Self::AllSummaries => "サマリー全体",
            Self::SummaryPairs => "サマリーの前後関係",
            Self::SummaryWithMessages => "サマリーとメッセージ",
            Self::MessagesUnderSummary => "サマリー配下のメッセージ群",
            Self::MessageWithBodies => "メッセージとボディ",
        }
    }

    /// The criteria the evaluator checks within this scope, in display order.
    pub fn criteria(&self) -> &'static [EvaluationCriteria] {
        use EvaluationCriteria::*;
        match self {
            Self::DocumentWide => &[RhetoricalExpression],
            Self::AllSummaries => &[
                PreviousDiscussionReview,
                ScqaPresence,
                DuplicateTransitionConjunctions,
            ],
            Self::SummaryPairs => &[
                ConjunctionValidity,
                InappropriateConjunctions,
                LogicalConsistencyWithPrevious,
            ],
            Self::SummaryWithMessages => &[SequentialDevelopment],
            Self::MessagesUnderSummary => &[
                ConjunctionAppropriateness,
                DuplicateTransitionWords,
                AvoidUnnecessaryNumbering,
            ],
            Self::MessageWithBodies => &[MessageBodyConsistency],
        }
    }
}

impl TryFrom<String> for EvaluationScope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown evaluation scope: {}", value))
    }
}

impl fmt::Display for EvaluationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific rhetorical or logical check performed within a scope.
///
/// Tags the evaluator sends that are not known here are kept verbatim in
/// `Unknown` and displayed by their raw tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EvaluationCriteria {
    RhetoricalExpression,
    PreviousDiscussionReview,
    ScqaPresence,
    DuplicateTransitionConjunctions,
    ConjunctionValidity,
    InappropriateConjunctions,
    LogicalConsistencyWithPrevious,
    SequentialDevelopment,
    ConjunctionAppropriateness,
    DuplicateTransitionWords,
    AvoidUnnecessaryNumbering,
    MessageBodyConsistency,
    Unknown(String),
}

impl EvaluationCriteria {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RhetoricalExpression => "rhetorical_expression",
            Self::PreviousDiscussionReview => "previous_discussion_review",
            Self::ScqaPresence => "scqa_presence",
            Self::DuplicateTransitionConjunctions => "duplicate_transition_conjunctions",
            Self::ConjunctionValidity => "conjunction_validity",
            Self::InappropriateConjunctions => "inappropriate_conjunctions",
            Self::LogicalConsistencyWithPrevious => "logical_consistency_with_previous",
            Self::SequentialDevelopment => "sequential_development",
            Self::ConjunctionAppropriateness => "conjunction_appropriateness",
            Self::DuplicateTransitionWords => "duplicate_transition_words",
            Self::AvoidUnnecessaryNumbering => "avoid_unnecessary_numbering",
            Self::MessageBodyConsistency => "message_body_consistency",
            Self::Unknown(tag) => tag,
        }
    }

    pub fn parse(s: &str) -> Self {
        match canonical_tag(s).as_str() {
            "rhetorical_expression" => Self::RhetoricalExpression,
            "previous_discussion_review" => Self::PreviousDiscussionReview,
            "scqa_presence" => Self::ScqaPresence,
            "duplicate_transition_conjunctions" => Self::DuplicateTransitionConjunctions,
            "conjunction_validity" => Self::ConjunctionValidity,
            "inappropriate_conjunctions" => Self::InappropriateConjunctions,
            "logical_consistency_with_previous" => Self::LogicalConsistencyWithPrevious,
            "sequential_development" => Self::SequentialDevelopment,
            "conjunction_appropriateness" => Self::ConjunctionAppropriateness,
            "duplicate_transition_words" => Self::DuplicateTransitionWords,
            "avoid_unnecessary_numbering" => Self::AvoidUnnecessaryNumbering,
            "message_body_consistency" => Self::MessageBodyConsistency,
            _ => Self::Unknown(s.trim().to_string()),
        }
    }

    /// Localized label shown in comments.
    pub fn display_name(&self) -> &str {
        match self {
            Self::RhetoricalExpression => "修辞表現の確認",
            Self::PreviousDiscussionReview => "前回討議の振り返りの有無",
            Self::ScqaPresence => "SCQAの有無",
            Self::DuplicateTransitionConjunctions => "転換の接続詞の重複利用",
            Self::ConjunctionValidity => "接続詞の妥当性",
            Self::InappropriateConjunctions => "不適切な接続詞の有無",
            Self::LogicalConsistencyWithPrevious => "直前のサマリーとの論理的整合性",
            Self::SequentialDevelopment => "論理展開の評価",
            Self::ConjunctionAppropriateness => "接続詞の適切性",
            Self::DuplicateTransitionWords => "転換の接続詞の二重利用",
            Self::AvoidUnnecessaryNumbering => "無駄なナンバリングの回避",
            Self::MessageBodyConsistency => "メッセージとボディの論理的整合性",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for EvaluationCriteria {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EvaluationCriteria> for String {
    fn from(value: EvaluationCriteria) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EvaluationCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase snake_case form of a tag in any common casing.
fn canonical_tag(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.trim().chars() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// The judgment for one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaResult {
    pub criteria: EvaluationCriteria,
    pub has_issues: bool,
    #[serde(default)]
    pub issues: String,
}

/// A finding: one or more criteria judged for one scope and target text.
///
/// `target_text` is a copy of document content, not a reference into the
/// document. It has to be located again before it can be annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub target_text: String,
    pub scope: EvaluationScope,
    #[serde(default)]
    pub criteria_results: Vec<CriteriaResult>,
}

impl EvaluationResult {
    pub fn has_issues(&self) -> bool {
        self.criteria_results.iter().any(|c| c.has_issues)
    }

    /// Failing criteria, ordered as the scope lists them. Unknown criteria
    /// keep their response order after the known ones.
    pub fn failing_criteria(&self) -> Vec<&CriteriaResult> {
        let order = self.scope.criteria();
        let mut failing: Vec<&CriteriaResult> =
            self.criteria_results.iter().filter(|c| c.has_issues).collect();
        failing.sort_by_key(|c| {
            order
                .iter()
                .position(|known| *known == c.criteria)
                .unwrap_or(order.len())
        });
        failing
    }
}

/// Body returned by the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub results: Vec<EvaluationResult>,
}

impl EvaluationResponse {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Score to display. Missing, null or NaN means 100; anything else is
    /// clamped to `0..=100` and rounded.
    pub fn effective_score(&self) -> u8 {
        match self.score {
            Some(score) if !score.is_nan() => score.clamp(0.0, 100.0).round() as u8,
            _ => 100,
        }
    }
}

/// Message band for a displayed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::NeedsWork,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent: the outline is logically well structured.",
            Self::Good => "Good: a few points could be tightened.",
            Self::Fair => "Fair: several structural issues need attention.",
            Self::NeedsWork => "Needs work: review the highlighted issues before sharing.",
        }
    }
}
