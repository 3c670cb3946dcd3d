//! Tracing subscriber setup and the per-stage report line.

use crate::stage::StageResult;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Later calls are no-ops.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}

/// `"<label> ✅ in 1.23 ms"`
pub fn stage_report(label: &str, result: &StageResult) -> String {
    format!(
        "{} {} in {:.2} ms",
        label,
        if result.succeeded { "✅" } else { "❌" },
        result.elapsed_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageId;

    #[test]
    fn test_stage_report_format() {
        let ok = StageResult {
            stage: StageId::Tokenize,
            output_text: "TOKEN(KEYWORD, \"int\")".to_string(),
            elapsed_ms: 0.456,
            succeeded: true,
        };
        assert_eq!(stage_report("Lexer", &ok), "Lexer ✅ in 0.46 ms");

        let failed = StageResult {
            succeeded: false,
            elapsed_ms: 12.0,
            ..ok
        };
        assert_eq!(stage_report("Lexer", &failed), "Lexer ❌ in 12.00 ms");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("debug");
        init_logging("info");
    }
}
