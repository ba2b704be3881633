//! Outline reconstruction: paragraphs → bullet candidates → hierarchy.

mod builder;
mod normalizer;
mod tree_render;

pub use builder::{build_outline, OutlineError};
pub use normalizer::{is_bullet, strip_marker, NormalizedOutline, ParagraphNormalizer};
pub use tree_render::render_outline;

use crate::models::{BulletPointsRequest, ParagraphRecord};

/// Normalize paragraphs and build the hierarchy in one step.
///
/// Returns the normalized outline alongside the request so callers keep the
/// title paragraph's position.
pub fn detect_outline(
    normalizer: &ParagraphNormalizer,
    paragraphs: &[ParagraphRecord],
) -> Result<(NormalizedOutline, BulletPointsRequest), OutlineError> {
    let normalized = normalizer.normalize(paragraphs);
    let title = normalized.title.as_ref().map(|t| t.text.clone());
    let request = build_outline(title, &normalized.candidates)?;
    Ok((normalized, request))
}
