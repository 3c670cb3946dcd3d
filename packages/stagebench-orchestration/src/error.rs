use crate::config::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Engine not ready: pipeline invoked before engine initialization completed")]
    EngineNotReady,

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Unknown surface: {0}")]
    UnknownSurface(String),

    #[error("A pipeline run is already in progress")]
    RunInProgress,

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Stage graph cycle detected")]
    DagCycleDetected,

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrchestratorError {
    pub fn serialization<E: std::fmt::Display>(e: E) -> Self {
        Self::Serialization(e.to_string())
    }

    pub fn engine_init<E: std::fmt::Display>(e: E) -> Self {
        Self::EngineInit(e.to_string())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            OrchestratorError::EngineNotReady
            | OrchestratorError::UnknownStage(_)
            | OrchestratorError::UnknownSurface(_)
            | OrchestratorError::DagCycleDetected
            | OrchestratorError::MissingDependency(_) => ErrorCategory::Programmer,
            OrchestratorError::RunInProgress => ErrorCategory::Contention,
            _ => ErrorCategory::Environment,
        }
    }
}

/// Error category for callers deciding how to react to a failed user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorCategory {
    /// Wrong call order or bad identifiers - fix the caller, never retry
    Programmer,
    /// Another run holds the pipeline - the action may be re-triggered later
    Contention,
    /// IO, configuration or engine loading problems
    Environment,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Programmer => "programmer",
            ErrorCategory::Contention => "contention",
            ErrorCategory::Environment => "environment",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
