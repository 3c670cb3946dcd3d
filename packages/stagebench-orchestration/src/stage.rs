use crate::error::{OrchestratorError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Stage identifier, ordered by position in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Tokenize,
    Parse,
    #[serde(rename = "lower_ir")]
    LowerIR,
    #[serde(rename = "optimize_ir")]
    OptimizeIR,
    Generate,
}

impl StageId {
    pub const ALL: [StageId; 5] = [
        StageId::Tokenize,
        StageId::Parse,
        StageId::LowerIR,
        StageId::OptimizeIR,
        StageId::Generate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Tokenize => "tokenize",
            StageId::Parse => "parse",
            StageId::LowerIR => "lower_ir",
            StageId::OptimizeIR => "optimize_ir",
            StageId::Generate => "generate",
        }
    }

    /// Name of the engine export backing this stage
    pub fn export_name(&self) -> &'static str {
        match self {
            StageId::Tokenize => "run_lexer",
            StageId::Parse => "run_ast",
            StageId::LowerIR => "run_ir",
            StageId::OptimizeIR => "run_optimized_ir",
            StageId::Generate => "run_codegen",
        }
    }
}

impl FromStr for StageId {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokenize" | "lexer" => Ok(StageId::Tokenize),
            "parse" | "ast" => Ok(StageId::Parse),
            "lower_ir" | "ir" => Ok(StageId::LowerIR),
            "optimize_ir" | "optimized_ir" => Ok(StageId::OptimizeIR),
            "generate" | "codegen" => Ok(StageId::Generate),
            _ => Err(OrchestratorError::UnknownStage(s.to_string())),
        }
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request for one terminal stage against a snapshot of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    pub requested: StageId,
    source_text: String,
}

impl StageRequest {
    pub fn new(requested: StageId, source_text: impl Into<String>) -> Self {
        Self {
            requested,
            source_text: source_text.into(),
        }
    }

    /// Build a request from a user-facing stage name
    pub fn parse(stage: &str, source_text: impl Into<String>) -> Result<Self> {
        Ok(Self::new(stage.parse()?, source_text))
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: StageId,
    pub output_text: String,
    pub elapsed_ms: f64,
    pub succeeded: bool,
}
