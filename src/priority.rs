//! Choosing which scope of findings to surface.

use serde::{Deserialize, Serialize};

use crate::models::{EvaluationResult, EvaluationScope};

/// Per-scope issue summary, in priority order. Drives the scope picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeOverview {
    pub scope: EvaluationScope,
    pub label: String,
    /// Findings in this scope with at least one failing criterion.
    pub issue_count: usize,
    pub has_issues: bool,
}

/// Whether each scope, in [`EvaluationScope::ALL`] order, has a failing criterion.
pub fn scopes_with_issues(findings: &[EvaluationResult]) -> [bool; 6] {
    let mut flags = [false; 6];
    for finding in findings.iter().filter(|f| f.has_issues()) {
        flags[scope_index(finding.scope)] = true;
    }
    flags
}

/// The highest-priority scope with issues, or `None` when no finding fails.
pub fn resolve_priority(findings: &[EvaluationResult]) -> Option<EvaluationScope> {
    let flags = scopes_with_issues(findings);
    EvaluationScope::ALL
        .into_iter()
        .zip(flags)
        .find(|(_, has_issues)| *has_issues)
        .map(|(scope, _)| scope)
}

/// Findings of exactly `scope`, in response order.
pub fn filter_by_scope(
    findings: &[EvaluationResult],
    scope: EvaluationScope,
) -> Vec<&EvaluationResult> {
    findings.iter().filter(|f| f.scope == scope).collect()
}

pub fn scope_overview(findings: &[EvaluationResult]) -> Vec<ScopeOverview> {
    EvaluationScope::ALL
        .into_iter()
        .map(|scope| {
            let issue_count = findings
                .iter()
                .filter(|f| f.scope == scope && f.has_issues())
                .count();
            ScopeOverview {
                scope,
                label: scope.display_name().to_string(),
                issue_count,
                has_issues: issue_count > 0,
            }
        })
        .collect()
}

fn scope_index(scope: EvaluationScope) -> usize {
    EvaluationScope::ALL
        .iter()
        .position(|s| *s == scope)
        .unwrap_or_default()
}
