/// Toxicity scoring for extracted text
///
/// Splits text into sentence-aligned chunks that fit the model's input
/// bound, scores each chunk independently, and aggregates with `max` so a
/// single toxic segment cannot be diluted by benign surroundings.
mod chunker;
mod model;

pub use chunker::{chunk_text, MAX_CHUNK_CHARS};
pub use model::ToxicBert;

use crate::error::ScoreError;
use crate::monitor::ToxicityScorer;

pub struct ToxicBertScorer {
    model: ToxicBert,
}

impl ToxicBertScorer {
    pub fn new() -> Result<Self, ScoreError> {
        Ok(Self {
            model: ToxicBert::new()?,
        })
    }
}

impl ToxicityScorer for ToxicBertScorer {
    /// `None` for empty input (distinct from a score of 0.0); otherwise
    /// the aggregate across chunks.
    fn score(&mut self, text: &str) -> Result<Option<f32>, ScoreError> {
        let model = &self.model;
        score_with(text, |chunk| {
            let score = model.score_chunk(chunk)?;
            tracing::debug!(chars = chunk.len(), score, "chunk scored");
            Ok(score)
        })
    }
}

/// Chunk `text`, score each chunk with `score_chunk`, aggregate via `max`.
fn score_with<F>(text: &str, mut score_chunk: F) -> Result<Option<f32>, ScoreError>
where
    F: FnMut(&str) -> Result<f32, ScoreError>,
{
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut scores = Vec::new();
    for chunk in chunk_text(text, MAX_CHUNK_CHARS) {
        scores.push(score_chunk(chunk)?);
    }

    Ok(aggregate(&scores))
}

/// Maximum across chunk scores; `None` when there is nothing to score.
pub fn aggregate(scores: &[f32]) -> Option<f32> {
    scores.iter().copied().reduce(f32::max)
}
