//! Success classification of engine output.
//!
//! The engine has no status channel: a stage failed when its text mentions
//! the failure marker. Generate must also show an execution result, since an
//! empty or unrecognised codegen output is not a success either.

use crate::config::ClassificationConfig;
use crate::stage::StageId;

pub const DEFAULT_FAILURE_MARKER: &str = "error";
pub const DEFAULT_EXECUTION_MARKER: &str = "execution result";

/// Textual success heuristic; markers match case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    failure_marker: String,
    execution_marker: String,
}

impl Classifier {
    pub fn new(failure_marker: &str, execution_marker: &str) -> Self {
        Self {
            failure_marker: failure_marker.to_lowercase(),
            execution_marker: execution_marker.to_lowercase(),
        }
    }

    pub fn from_config(config: &ClassificationConfig) -> Self {
        Self::new(&config.failure_marker, &config.execution_marker)
    }

    /// Whether `output_text` produced by `stage` counts as a success
    pub fn succeeded(&self, stage: StageId, output_text: &str) -> bool {
        let text = output_text.to_lowercase();
        if text.contains(&self.failure_marker) {
            return false;
        }
        match stage {
            StageId::Generate => text.contains(&self.execution_marker),
            _ => true,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_MARKER, DEFAULT_EXECUTION_MARKER)
    }
}

/// Classify with the default markers
pub fn stage_succeeded(stage: StageId, output_text: &str) -> bool {
    Classifier::default().succeeded(stage, output_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_error_text_fails_every_stage() {
        for stage in StageId::ALL {
            assert!(!stage_succeeded(stage, "Error: unexpected token"));
        }
    }

    #[test]
    fn test_generate_requires_execution_marker() {
        assert!(!stage_succeeded(StageId::Generate, "Compiled OK"));
        for stage in [
            StageId::Tokenize,
            StageId::Parse,
            StageId::LowerIR,
            StageId::OptimizeIR,
        ] {
            assert!(stage_succeeded(stage, "Compiled OK"));
        }
    }

    #[test]
    fn test_generate_execution_result() {
        assert!(stage_succeeded(StageId::Generate, "Execution result: 42"));
        assert!(!stage_succeeded(
            StageId::Generate,
            "Execution error: no recognizable return."
        ));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        assert!(!stage_succeeded(StageId::Parse, "SEMANTIC ERRORS"));
        assert!(!stage_succeeded(StageId::Tokenize, "TOKEN(IDENTIFIER, \"errorCount\")"));
    }

    #[test]
    fn test_custom_markers() {
        let classifier = Classifier::new("FAIL", "Exit code");
        assert!(!classifier.succeeded(StageId::Parse, "fail: missing ;"));
        assert!(classifier.succeeded(StageId::Generate, "exit code 0"));
        assert!(classifier.succeeded(StageId::Parse, "error is not the marker here"));
    }

    proptest! {
        #[test]
        fn prop_classification_is_pure(text in ".*", idx in 0usize..5) {
            let stage = StageId::ALL[idx];
            prop_assert_eq!(stage_succeeded(stage, &text), stage_succeeded(stage, &text));
        }

        #[test]
        fn prop_generate_success_implies_general_success(text in ".*") {
            if stage_succeeded(StageId::Generate, &text) {
                prop_assert!(stage_succeeded(StageId::Parse, &text));
            }
        }
    }
}
