use super::slot::EngineSlot;
use crate::error::Result;
use crate::stage::StageId;
use tracing::debug;

/// The five engine operations, gated on engine readiness.
///
/// Every operation fails only with `EngineNotReady`; compile errors are
/// ordinary output text.
#[derive(Debug, Clone)]
pub struct EngineGateway {
    slot: EngineSlot,
}

impl EngineGateway {
    pub fn new(slot: EngineSlot) -> Self {
        Self { slot }
    }

    pub fn is_ready(&self) -> bool {
        self.slot.is_ready()
    }

    pub fn invoke(&self, stage: StageId, input: &str) -> Result<String> {
        let engine = self.slot.engine()?;
        debug!("Invoking {} ({} bytes in)", stage.export_name(), input.len());
        Ok(engine.invoke(stage, input))
    }

    /// Raw source -> token listing
    pub fn tokenize(&self, source: &str) -> Result<String> {
        self.invoke(StageId::Tokenize, source)
    }

    /// Raw source -> syntax tree listing
    pub fn parse(&self, source: &str) -> Result<String> {
        self.invoke(StageId::Parse, source)
    }

    /// Raw source -> textual IR
    pub fn lower_ir(&self, source: &str) -> Result<String> {
        self.invoke(StageId::LowerIR, source)
    }

    /// Textual IR -> optimized textual IR
    pub fn optimize_ir(&self, ir: &str) -> Result<String> {
        self.invoke(StageId::OptimizeIR, ir)
    }

    /// Optimized IR -> generated code and its execution result
    pub fn generate(&self, optimized_ir: &str) -> Result<String> {
        self.invoke(StageId::Generate, optimized_ir)
    }

    pub fn set_user_input(&self, text: &str) -> Result<()> {
        self.slot.engine()?.set_user_input(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FnEngine;
    use crate::error::OrchestratorError;

    fn tagging_engine() -> FnEngine {
        FnEngine::new(
            |s| format!("lex[{}]", s),
            |s| format!("ast[{}]", s),
            |s| format!("ir[{}]", s),
            |s| format!("opt[{}]", s),
            |s| format!("gen[{}]", s),
        )
    }

    #[test]
    fn test_named_operations_route_to_stages() {
        let gateway = EngineGateway::new(EngineSlot::ready(tagging_engine()));
        assert_eq!(gateway.tokenize("a").unwrap(), "lex[a]");
        assert_eq!(gateway.parse("a").unwrap(), "ast[a]");
        assert_eq!(gateway.lower_ir("a").unwrap(), "ir[a]");
        assert_eq!(gateway.optimize_ir("a").unwrap(), "opt[a]");
        assert_eq!(gateway.generate("a").unwrap(), "gen[a]");
    }

    #[test]
    fn test_not_ready() {
        let gateway = EngineGateway::new(EngineSlot::pending());
        assert!(matches!(
            gateway.tokenize("int x;"),
            Err(OrchestratorError::EngineNotReady)
        ));
        assert!(matches!(
            gateway.set_user_input("5"),
            Err(OrchestratorError::EngineNotReady)
        ));
    }
}
