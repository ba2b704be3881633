//! Domain models for outline checking.
//!
//! # Core Concepts
//!
//! ## Outline
//!
//! - [`ParagraphRecord`]: Snapshot of one live paragraph (text + indentation).
//! - [`BulletCandidate`]: A paragraph classified as a bullet, with its derived level.
//! - [`Summary`] / [`Message`] / [`Body`]: The three-level hierarchy sent for evaluation,
//!   wrapped in a [`BulletPointsRequest`].
//!
//! ## Evaluation
//!
//! - [`EvaluationScope`]: Granularity of one judgment, in fixed priority order.
//! - [`EvaluationCriteria`]: A check performed within a scope.
//! - [`EvaluationResult`]: A finding. Its `target_text` is a copy of document content,
//!   not a reference into the document.
//! - [`EvaluationResponse`]: The evaluator's reply, with its optional score.

mod evaluation;
mod outline;

pub use evaluation::*;
pub use outline::*;
