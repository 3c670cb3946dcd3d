use super::Engine;
use crate::error::{OrchestratorError, Result};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Readiness gate for the engine.
///
/// Starts pending and is resolved exactly once, usually by awaiting the
/// engine's asynchronous loader. Clones share the same gate.
#[derive(Clone, Default)]
pub struct EngineSlot {
    cell: Arc<OnceCell<Arc<dyn Engine>>>,
}

impl EngineSlot {
    pub fn pending() -> Self {
        Self::default()
    }

    /// A slot that is already resolved with `engine`
    pub fn ready(engine: impl Engine + 'static) -> Self {
        let slot = Self::pending();
        slot.resolve(Arc::new(engine));
        slot
    }

    /// Resolve the slot. Returns false (and keeps the first engine) when the
    /// slot was already resolved.
    pub fn resolve(&self, engine: Arc<dyn Engine>) -> bool {
        match self.cell.set(engine) {
            Ok(()) => {
                info!("Engine ready");
                true
            }
            Err(_) => {
                warn!("Engine already initialized, ignoring second resolution");
                false
            }
        }
    }

    /// Await `loader` and resolve the slot with its engine.
    ///
    /// A failed loader leaves the slot pending.
    pub async fn load<F, Fut, E>(&self, loader: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<E>>,
        E: Engine + 'static,
    {
        let engine = loader().await.map_err(OrchestratorError::engine_init)?;
        self.resolve(Arc::new(engine));
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn engine(&self) -> Result<Arc<dyn Engine>> {
        self.cell
            .get()
            .cloned()
            .ok_or(OrchestratorError::EngineNotReady)
    }
}

impl std::fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSlot")
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageId;

    struct EchoEngine;

    impl Engine for EchoEngine {
        fn invoke(&self, stage: StageId, input: &str) -> String {
            format!("{}:{}", stage, input)
        }

        fn set_user_input(&self, _text: &str) {}
    }

    #[test]
    fn test_pending_slot_is_not_ready() {
        let slot = EngineSlot::pending();
        assert!(!slot.is_ready());
        assert!(matches!(slot.engine(), Err(OrchestratorError::EngineNotReady)));
    }

    #[test]
    fn test_clones_share_readiness() {
        let slot = EngineSlot::pending();
        let shared = slot.clone();
        assert!(slot.resolve(Arc::new(EchoEngine)));
        assert!(shared.is_ready());
        assert_eq!(
            shared.engine().unwrap().invoke(StageId::Parse, "x"),
            "parse:x"
        );
    }

    #[test]
    fn test_second_resolution_ignored() {
        let slot = EngineSlot::ready(EchoEngine);
        assert!(!slot.resolve(Arc::new(EchoEngine)));
    }

    #[tokio::test]
    async fn test_async_load() {
        let slot = EngineSlot::pending();
        slot.load(|| async {
            tokio::task::yield_now().await;
            Ok(EchoEngine)
        })
        .await
        .unwrap();
        assert!(slot.is_ready());
    }

    #[tokio::test]
    async fn test_failed_load_stays_pending() {
        let slot = EngineSlot::pending();
        let result = slot
            .load(|| async { Err::<EchoEngine, _>(anyhow::anyhow!("module fetch failed")) })
            .await;

        assert!(matches!(result, Err(OrchestratorError::EngineInit(msg)) if msg.contains("module fetch failed")));
        assert!(!slot.is_ready());
    }
}
