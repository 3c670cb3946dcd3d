/*
 * Stagebench Orchestration - Staged Compiler Pipeline Driver
 *
 * Drives an external compilation engine through its stage exports and
 * routes every stage's text to a named output surface.
 *
 * Architecture:
 * - Stage graph (Lexer -> AST -> IR -> Optimized IR -> Codegen)
 * - Engine readiness gate (resolved once, async loader)
 * - Single in-flight run per orchestrator
 * - Output routing to lexer/ast/ir/codegen surfaces
 * - Session controls (theme, assistant, voice)
 */

// Public modules
pub mod classify;
pub mod config;
pub mod dag;
pub mod engine;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod router;
pub mod session;
pub mod stage;

// Re-exports
pub use classify::{stage_succeeded, Classifier};
pub use config::{AssistantConfig, ConfigError, StagebenchConfig};
pub use dag::{StageGraph, StageInput, StageNode};
pub use engine::{CommandEngine, Engine, EngineGateway, EngineSlot, FnEngine};
pub use error::{ErrorCategory, OrchestratorError, Result};
pub use logging::{init_logging, stage_report};
pub use orchestrator::PipelineOrchestrator;
pub use pipeline::{PipelineRun, RunKind};
pub use router::{route, OutputSurface, SurfaceCommand, SurfaceId, SurfaceSet};
pub use session::{Session, SourceProvider, TextBuffer, Theme};
pub use stage::{StageId, StageRequest, StageResult};
