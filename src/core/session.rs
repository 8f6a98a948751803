//! Caller-owned state at the UI boundary: current text, latest assessment, apply by index.

use crate::core::apply::{ApplyError, apply_suggestion};
use crate::core::engine::Analysis;
use crate::core::score::BiasAssessment;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No analysis for the current text yet")]
    NoAnalysis,
    #[error("No suggestion #{index} (there are {count})")]
    NoSuchSuggestion { index: usize, count: usize },
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Text being edited and the assessment that describes it, if any.
#[derive(Debug, Default)]
pub struct Session {
    text: String,
    assessment: Option<BiasAssessment>,
    accepted_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn assessment(&self) -> Option<&BiasAssessment> {
        self.assessment.as_ref()
    }

    /// Replace the text. Any assessment of the previous text is discarded.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.assessment = None;
        }
    }

    /// Store an analysis if it is newer than the last accepted one and describes the
    /// current text. Returns whether it was stored.
    pub fn accept(&mut self, analysis: Analysis) -> bool {
        if analysis.seq <= self.accepted_seq || analysis.text != self.text {
            log::debug!("Ignoring stale analysis #{}", analysis.seq);
            return false;
        }
        self.accepted_seq = analysis.seq;
        self.assessment = Some(analysis.assessment);
        true
    }

    /// Apply suggestion `index` of the current assessment and return the revised text.
    ///
    /// The assessment is cleared afterwards (positions refer to the old text), so the
    /// caller re-analyzes. A failed apply also clears it and leaves the text unchanged.
    pub fn apply(&mut self, index: usize) -> Result<&str, SessionError> {
        let assessment = self.assessment.take().ok_or(SessionError::NoAnalysis)?;
        let count = assessment.suggestions.len();
        if index >= count {
            self.assessment = Some(assessment);
            return Err(SessionError::NoSuchSuggestion { index, count });
        }
        self.text = apply_suggestion(&self.text, &assessment.suggestions[index])?;
        Ok(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::Suggestion;

    fn analysis(seq: u64, text: &str) -> Analysis {
        let suggestions = if text.contains("fireman") {
            vec![Suggestion {
                original: "fireman".into(),
                replacement: "firefighter".into(),
                position: 2,
            }]
        } else {
            vec![]
        };
        Analysis {
            seq,
            text: text.to_string(),
            assessment: BiasAssessment::new(0.25, suggestions, None),
        }
    }

    #[test]
    fn accept_only_newer_results_for_current_text() {
        let mut session = Session::new();
        session.set_text("Call the fireman now");
        assert!(session.accept(analysis(2, "Call the fireman now")));
        assert!(!session.accept(analysis(1, "Call the fireman now")));
        assert!(!session.accept(analysis(3, "Call the")));
        assert!(session.assessment().is_some());
    }

    #[test]
    fn set_text_discards_assessment() {
        let mut session = Session::new();
        session.set_text("Call the fireman now");
        session.accept(analysis(1, "Call the fireman now"));
        session.set_text("Call the fireman now!");
        assert!(session.assessment().is_none());
    }

    #[test]
    fn apply_rewrites_text_and_requires_reanalysis() {
        let mut session = Session::new();
        session.set_text("Call the fireman now");
        session.accept(analysis(1, "Call the fireman now"));

        assert_eq!(session.apply(0).unwrap(), "Call the firefighter now");
        assert_eq!(session.text(), "Call the firefighter now");
        assert_eq!(session.apply(0), Err(SessionError::NoAnalysis));
    }

    #[test]
    fn apply_unknown_index_keeps_assessment() {
        let mut session = Session::new();
        session.set_text("Call the fireman now");
        session.accept(analysis(1, "Call the fireman now"));

        let err = session.apply(5).unwrap_err();
        assert_eq!(err, SessionError::NoSuchSuggestion { index: 5, count: 1 });
        assert!(session.assessment().is_some());
    }

    #[test]
    fn failed_apply_leaves_text_unchanged() {
        let mut session = Session::new();
        session.set_text("Call the fireman now");
        let mut stale = analysis(1, "Call the fireman now");
        stale.assessment.suggestions[0].position = 10;
        session.accept(stale);

        let err = session.apply(0).unwrap_err();
        assert!(matches!(err, SessionError::Apply(ApplyError::OutOfRange { .. })));
        assert_eq!(session.text(), "Call the fireman now");
    }
}
