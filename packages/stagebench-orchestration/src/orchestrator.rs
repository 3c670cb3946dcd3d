use crate::classify::Classifier;
use crate::dag::{StageGraph, StageInput};
use crate::engine::{EngineGateway, EngineSlot};
use crate::error::{OrchestratorError, Result};
use crate::logging::stage_report;
use crate::pipeline::{PipelineRun, RunKind};
use crate::stage::{StageId, StageRequest, StageResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Staged pipeline orchestrator.
///
/// Resolves the closure of the requested stage, calls the engine for each
/// stage in order, and times and classifies every call. Nothing is cached:
/// each run recomputes its whole closure from the source snapshot.
pub struct PipelineOrchestrator {
    graph: Arc<StageGraph>,
    gateway: EngineGateway,
    classifier: Classifier,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a run ends, including on early return
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl PipelineOrchestrator {
    /// Create an orchestrator over the standard five-stage graph
    pub fn new(slot: EngineSlot) -> Result<Self> {
        Ok(Self::with_graph(StageGraph::standard()?, slot))
    }

    pub fn with_graph(graph: StageGraph, slot: EngineSlot) -> Self {
        debug!("Stage graph:\n{}", graph.execution_plan());
        Self {
            graph: Arc::new(graph),
            gateway: EngineGateway::new(slot),
            classifier: Classifier::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn is_ready(&self) -> bool {
        self.gateway.is_ready()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn run_request(&self, request: &StageRequest) -> Result<PipelineRun> {
        self.run_pipeline(request.requested, request.source_text())
    }

    /// Run the closure of `requested` against `source_text`.
    ///
    /// Stops right after `requested`; a classified failure in an earlier
    /// stage does not abort the run.
    pub fn run_pipeline(&self, requested: StageId, source_text: &str) -> Result<PipelineRun> {
        self.ensure_ready()?;
        let closure = self.graph.closure(requested)?;
        let _guard = self.begin_run()?;

        let mut run = PipelineRun::new(RunKind::Terminal { requested });
        info!(
            "Run {}: {} via [{}]",
            run.id,
            requested,
            closure
                .iter()
                .map(StageId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let start = Instant::now();
        for stage in closure {
            let result = self.execute_stage(stage, source_text, &run.results)?;
            run.results.push(result);
            if stage == requested {
                break;
            }
        }
        run.total_elapsed_ms = elapsed_ms(start);

        Ok(run)
    }

    /// Run all five stages; `user_input` reaches the engine before any stage
    /// runs, so Generate always sees it.
    pub fn run_full_pipeline(&self, source_text: &str, user_input: &str) -> Result<PipelineRun> {
        self.ensure_ready()?;
        let _guard = self.begin_run()?;

        self.gateway.set_user_input(user_input)?;

        let mut run = PipelineRun::new(RunKind::Full {
            user_input: user_input.to_string(),
        });
        info!("Run {}: full pipeline", run.id);

        let start = Instant::now();
        for &stage in self.graph.execution_order() {
            let result = self.execute_stage(stage, source_text, &run.results)?;
            run.results.push(result);
        }
        run.total_elapsed_ms = elapsed_ms(start);

        info!(
            "Run {}: Total Compilation Time: {:.2} ms",
            run.id, run.total_elapsed_ms
        );
        Ok(run)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.gateway.is_ready() {
            Ok(())
        } else {
            Err(OrchestratorError::EngineNotReady)
        }
    }

    fn begin_run(&self) -> Result<RunGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrchestratorError::RunInProgress)?;
        Ok(RunGuard {
            flag: &self.in_flight,
        })
    }

    /// Pick the input of `stage`: the source snapshot or an earlier output
    fn stage_input<'a>(
        &self,
        stage: StageId,
        source_text: &'a str,
        completed: &'a [StageResult],
    ) -> Result<&'a str> {
        match self.graph.input_of(stage)? {
            StageInput::Source => Ok(source_text),
            StageInput::OutputOf(dep) => completed
                .iter()
                .find(|r| r.stage == dep)
                .map(|r| r.output_text.as_str())
                .ok_or_else(|| {
                    OrchestratorError::MissingDependency(format!(
                        "Stage {} needs output of {} which has not run",
                        stage, dep
                    ))
                }),
        }
    }

    fn execute_stage(
        &self,
        stage: StageId,
        source_text: &str,
        completed: &[StageResult],
    ) -> Result<StageResult> {
        let input = self.stage_input(stage, source_text, completed)?;

        let start = Instant::now();
        let output_text = self.gateway.invoke(stage, input)?;
        let elapsed_ms = elapsed_ms(start);

        let result = StageResult {
            stage,
            succeeded: self.classifier.succeeded(stage, &output_text),
            output_text,
            elapsed_ms,
        };
        info!("{}", stage_report(self.graph.label(stage)?, &result));
        Ok(result)
    }
}

/// Milliseconds since `start`; saturates at zero
fn elapsed_ms(start: Instant) -> f64 {
    Instant::now().saturating_duration_since(start).as_secs_f64() * 1000.0
}
