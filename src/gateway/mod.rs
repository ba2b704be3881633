//! Evaluation gateway: the seam between the checker and the evaluation service.

mod client;

use std::future::Future;

pub use client::{ClientError, EvaluatorClient};

use crate::models::{BulletPointsRequest, EvaluationResponse};

/// Anything that can score an outline.
pub trait Evaluator {
    fn evaluate(
        &self,
        outline: &BulletPointsRequest,
    ) -> impl Future<Output = Result<EvaluationResponse, ClientError>> + Send;
}
