//! Score aggregation and the qualitative explanation.

use serde::{Deserialize, Serialize};

use crate::core::matcher::Suggestion;

/// Lower bound of the "some bias" bracket.
pub const MODERATE_THRESHOLD: f32 = 0.3;
/// Lower bound of the "significant bias" bracket.
pub const SIGNIFICANT_THRESHOLD: f32 = 0.6;

pub const NEUTRAL_TEXT: &str = "relatively gender-neutral";
pub const MODERATE_TEXT: &str = "some gender bias may be present";
pub const SIGNIFICANT_TEXT: &str = "significant gender bias, should be revised";
/// Appended when at least one suggestion exists.
pub const TERMS_DETECTED_NOTE: &str = "; specific gendered terms were detected";

/// Result of one analysis. Superseded by the next analysis of newer text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasAssessment {
    pub score: f32,
    pub suggestions: Vec<Suggestion>,
    pub explanation: String,
    /// Score reported by the semantic estimator, when one contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    /// True when a collaborator failed and a fallback was used.
    #[serde(default)]
    pub degraded: bool,
}

impl BiasAssessment {
    /// Assessment for text with nothing in it.
    pub fn empty() -> Self {
        Self::new(0.0, vec![], None)
    }

    pub fn new(term_score: f32, suggestions: Vec<Suggestion>, semantic_score: Option<f32>) -> Self {
        let semantic_score = semantic_score.filter(|s| s.is_finite()).map(clamp_unit);
        let score = aggregate_score(term_score, semantic_score);
        Self {
            explanation: explain(score, !suggestions.is_empty()),
            score,
            suggestions,
            semantic_score,
            degraded: false,
        }
    }

    pub fn bias_detected(&self) -> bool {
        !self.suggestions.is_empty() || self.score >= MODERATE_THRESHOLD
    }
}

fn clamp_unit(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Average the term score with the semantic score when present. Result lies in [0,1].
pub fn aggregate_score(term_score: f32, semantic_score: Option<f32>) -> f32 {
    let score = match semantic_score.filter(|s| s.is_finite()) {
        Some(semantic) => (term_score + semantic) / 2.0,
        None => term_score,
    };
    if score.is_finite() { clamp_unit(score) } else { 0.0 }
}

/// Qualitative explanation for a score. Boundary values belong to the upper bracket.
pub fn explain(score: f32, has_suggestions: bool) -> String {
    let base = if score < MODERATE_THRESHOLD {
        NEUTRAL_TEXT
    } else if score < SIGNIFICANT_THRESHOLD {
        MODERATE_TEXT
    } else {
        SIGNIFICANT_TEXT
    };
    if has_suggestions {
        format!("{}{}", base, TERMS_DETECTED_NOTE)
    } else {
        base.to_string()
    }
}
