use crate::error::{OrchestratorError, Result};
use crate::stage::StageId;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Where a stage takes its input from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageInput {
    /// The snapshot of the source text taken at request time
    Source,
    /// The output text of another stage in the same run
    OutputOf(StageId),
}

/// Stage node in the graph
#[derive(Debug, Clone)]
pub struct StageNode {
    pub id: StageId,
    pub label: &'static str,
    pub predecessors: Vec<StageId>,
    pub input: StageInput,
}

impl StageNode {
    pub fn new(
        id: StageId,
        label: &'static str,
        predecessors: Vec<StageId>,
        input: StageInput,
    ) -> Self {
        Self {
            id,
            label,
            predecessors,
            input,
        }
    }
}

/// Static stage graph with a precomputed topological order
#[derive(Debug, Clone)]
pub struct StageGraph {
    stages: HashMap<StageId, StageNode>,
    execution_order: Vec<StageId>,
}

impl StageGraph {
    pub fn new(stages: Vec<StageNode>) -> Result<Self> {
        let mut stage_map = HashMap::new();
        for stage in stages {
            stage_map.insert(stage.id, stage);
        }

        for stage in stage_map.values() {
            for dep in &stage.predecessors {
                if !stage_map.contains_key(dep) {
                    return Err(OrchestratorError::MissingDependency(format!(
                        "Stage {} depends on non-existent stage {}",
                        stage.id, dep
                    )));
                }
            }
            // A chained input must come from a stage that is guaranteed to run first
            if let StageInput::OutputOf(dep) = stage.input {
                if !stage.predecessors.contains(&dep) {
                    return Err(OrchestratorError::MissingDependency(format!(
                        "Stage {} consumes output of {} which is not a predecessor",
                        stage.id, dep
                    )));
                }
            }
        }

        let execution_order = Self::topological_sort(&stage_map)?;

        Ok(Self {
            stages: stage_map,
            execution_order,
        })
    }

    /// The five-stage pipeline.
    ///
    /// Tokenize, Parse and LowerIR each start from raw source; only
    /// OptimizeIR and Generate chain off earlier output.
    pub fn standard() -> Result<Self> {
        let stages = vec![
            StageNode::new(StageId::Tokenize, "Lexer", vec![], StageInput::Source),
            StageNode::new(StageId::Parse, "AST", vec![], StageInput::Source),
            StageNode::new(StageId::LowerIR, "IR", vec![], StageInput::Source),
            StageNode::new(
                StageId::OptimizeIR,
                "Optimized IR",
                vec![StageId::LowerIR],
                StageInput::OutputOf(StageId::LowerIR),
            ),
            StageNode::new(
                StageId::Generate,
                "Codegen",
                vec![StageId::LowerIR, StageId::OptimizeIR],
                StageInput::OutputOf(StageId::OptimizeIR),
            ),
        ];

        Self::new(stages)
    }

    /// Kahn's algorithm; ties are broken by stage order so the plan is stable
    fn topological_sort(stages: &HashMap<StageId, StageNode>) -> Result<Vec<StageId>> {
        let mut in_degree: HashMap<StageId, usize> = stages
            .values()
            .map(|stage| (stage.id, stage.predecessors.len()))
            .collect();

        let mut ready: BTreeSet<StageId> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(stages.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for dependent in stages.values() {
                if dependent.predecessors.contains(&next) {
                    if let Some(degree) = in_degree.get_mut(&dependent.id) {
                        *degree -= 1;
                        if *degree == 0 {
                            ready.insert(dependent.id);
                        }
                    }
                }
            }
        }

        if order.len() < stages.len() {
            return Err(OrchestratorError::DagCycleDetected);
        }
        Ok(order)
    }

    pub fn execution_order(&self) -> &[StageId] {
        &self.execution_order
    }

    pub fn get_stage(&self, id: StageId) -> Option<&StageNode> {
        self.stages.get(&id)
    }

    fn node(&self, id: StageId) -> Result<&StageNode> {
        self.stages
            .get(&id)
            .ok_or_else(|| OrchestratorError::UnknownStage(id.to_string()))
    }

    pub fn label(&self, id: StageId) -> Result<&'static str> {
        Ok(self.node(id)?.label)
    }

    pub fn input_of(&self, id: StageId) -> Result<StageInput> {
        Ok(self.node(id)?.input)
    }

    /// Ordered closure of `target`: every transitive predecessor followed by
    /// `target` itself, deduplicated, in execution order.
    pub fn closure(&self, target: StageId) -> Result<Vec<StageId>> {
        self.node(target)?;

        let mut required = HashSet::new();
        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            if required.insert(id) {
                stack.extend(self.node(id)?.predecessors.iter().copied());
            }
        }

        Ok(self
            .execution_order
            .iter()
            .copied()
            .filter(|id| required.contains(id))
            .collect())
    }

    /// Execution plan as string (for logging)
    pub fn execution_plan(&self) -> String {
        self.execution_order
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let node = &self.stages[id];
                let input = match node.input {
                    StageInput::Source => "source".to_string(),
                    StageInput::OutputOf(dep) => format!("output of {}", self.stages[&dep].label),
                };
                format!("Step {}: {} <- {}", i + 1, node.label, input)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
