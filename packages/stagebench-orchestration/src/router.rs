//! Routing of stage output to the named output surfaces.
//!
//! `route` is a pure mapping from a run to commands; `SurfaceSet` holds the
//! session's surface contents and the single active surface.

use crate::error::{OrchestratorError, Result};
use crate::pipeline::PipelineRun;
use crate::stage::StageId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceId {
    Lexer,
    Ast,
    Ir,
    Codegen,
}

impl SurfaceId {
    pub const ALL: [SurfaceId; 4] = [
        SurfaceId::Lexer,
        SurfaceId::Ast,
        SurfaceId::Ir,
        SurfaceId::Codegen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceId::Lexer => "lexer",
            SurfaceId::Ast => "ast",
            SurfaceId::Ir => "ir",
            SurfaceId::Codegen => "codegen",
        }
    }

    /// LowerIR and OptimizeIR share the ir surface
    pub fn for_stage(stage: StageId) -> Self {
        match stage {
            StageId::Tokenize => SurfaceId::Lexer,
            StageId::Parse => SurfaceId::Ast,
            StageId::LowerIR | StageId::OptimizeIR => SurfaceId::Ir,
            StageId::Generate => SurfaceId::Codegen,
        }
    }
}

impl FromStr for SurfaceId {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self> {
        SurfaceId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| OrchestratorError::UnknownSurface(s.to_string()))
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCommand {
    SetContent { surface: SurfaceId, content: String },
    Activate(SurfaceId),
}

/// Commands that display `run`: one `SetContent` per result in run order,
/// then activation of the terminal stage's surface.
///
/// A full run appends the combined compilation time to the codegen output.
pub fn route(run: &PipelineRun) -> Vec<SurfaceCommand> {
    let mut commands: Vec<SurfaceCommand> = run
        .results
        .iter()
        .map(|result| {
            let mut content = result.output_text.clone();
            if run.is_full() && result.stage == StageId::Generate {
                content.push_str(&format!(
                    "\nTotal Compilation Time: {:.2} ms",
                    run.total_elapsed_ms
                ));
            }
            SurfaceCommand::SetContent {
                surface: SurfaceId::for_stage(result.stage),
                content,
            }
        })
        .collect();

    commands.push(SurfaceCommand::Activate(SurfaceId::for_stage(
        run.terminal_stage(),
    )));
    commands
}

/// Read-only view of one surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSurface {
    pub id: SurfaceId,
    pub content: String,
    pub active: bool,
}

/// Contents of every surface plus the one active surface.
///
/// Activation is a single field, so at most one surface can be active.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSet {
    contents: BTreeMap<SurfaceId, String>,
    active: Option<SurfaceId>,
}

impl SurfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, commands: &[SurfaceCommand]) {
        for command in commands {
            match command {
                SurfaceCommand::SetContent { surface, content } => {
                    self.set_content(*surface, content.clone())
                }
                SurfaceCommand::Activate(surface) => self.activate(*surface),
            }
        }
    }

    pub fn set_content(&mut self, surface: SurfaceId, content: String) {
        self.contents.insert(surface, content);
    }

    pub fn activate(&mut self, surface: SurfaceId) {
        self.active = Some(surface);
    }

    /// Activate a surface by its external name
    pub fn activate_named(&mut self, name: &str) -> Result<()> {
        self.activate(name.parse()?);
        Ok(())
    }

    pub fn active(&self) -> Option<SurfaceId> {
        self.active
    }

    pub fn content(&self, surface: SurfaceId) -> &str {
        self.contents.get(&surface).map(String::as_str).unwrap_or("")
    }

    pub fn surface(&self, id: SurfaceId) -> OutputSurface {
        OutputSurface {
            id,
            content: self.content(id).to_string(),
            active: self.active == Some(id),
        }
    }

    pub fn surfaces(&self) -> Vec<OutputSurface> {
        SurfaceId::ALL.into_iter().map(|id| self.surface(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RunKind;
    use crate::stage::StageResult;
    use pretty_assertions::assert_eq;

    fn run_of(kind: RunKind, outputs: &[(StageId, &str)]) -> PipelineRun {
        let mut run = PipelineRun::new(kind);
        for (stage, text) in outputs {
            run.results.push(StageResult {
                stage: *stage,
                output_text: text.to_string(),
                elapsed_ms: 1.0,
                succeeded: true,
            });
        }
        run
    }

    #[test]
    fn test_optimize_overwrites_ir_and_activates_it() {
        let run = run_of(
            RunKind::Terminal {
                requested: StageId::OptimizeIR,
            },
            &[(StageId::LowerIR, "raw ir"), (StageId::OptimizeIR, "opt ir")],
        );

        let mut surfaces = SurfaceSet::new();
        surfaces.activate(SurfaceId::Codegen);
        surfaces.apply(&route(&run));

        assert_eq!(surfaces.content(SurfaceId::Ir), "opt ir");
        assert_eq!(surfaces.active(), Some(SurfaceId::Ir));
        let active: Vec<_> = surfaces
            .surfaces()
            .into_iter()
            .filter(|s| s.active)
            .map(|s| s.id)
            .collect();
        assert_eq!(active, vec![SurfaceId::Ir]);
    }

    #[test]
    fn test_full_run_appends_total_time() {
        let mut run = run_of(
            RunKind::Full {
                user_input: String::new(),
            },
            &[
                (StageId::Tokenize, "tokens"),
                (StageId::Parse, "ast"),
                (StageId::LowerIR, "ir"),
                (StageId::OptimizeIR, "; Optimized IR\nir"),
                (StageId::Generate, "Execution result: 42"),
            ],
        );
        run.total_elapsed_ms = 12.3456;

        let mut surfaces = SurfaceSet::new();
        surfaces.apply(&route(&run));

        assert_eq!(surfaces.content(SurfaceId::Lexer), "tokens");
        assert_eq!(surfaces.content(SurfaceId::Ast), "ast");
        assert_eq!(surfaces.content(SurfaceId::Ir), "; Optimized IR\nir");
        assert_eq!(
            surfaces.content(SurfaceId::Codegen),
            "Execution result: 42\nTotal Compilation Time: 12.35 ms"
        );
        assert_eq!(surfaces.active(), Some(SurfaceId::Codegen));
    }

    #[test]
    fn test_route_leaves_other_surfaces_untouched() {
        let run = run_of(
            RunKind::Terminal {
                requested: StageId::Tokenize,
            },
            &[(StageId::Tokenize, "tokens")],
        );
        let mut surfaces = SurfaceSet::new();
        surfaces.set_content(SurfaceId::Ast, "old ast".to_string());
        surfaces.apply(&route(&run));

        assert_eq!(surfaces.content(SurfaceId::Ast), "old ast");
        assert_eq!(surfaces.active(), Some(SurfaceId::Lexer));
    }

    #[test]
    fn test_unknown_surface() {
        let mut surfaces = SurfaceSet::new();
        assert!(matches!(
            surfaces.activate_named("wasmOutput"),
            Err(OrchestratorError::UnknownSurface(_))
        ));
        assert_eq!(surfaces.active(), None);
        surfaces.activate_named("ast").unwrap();
        assert_eq!(surfaces.active(), Some(SurfaceId::Ast));
    }
}
