//! Boundary to the external compilation engine.
//!
//! The engine exposes one string-in/string-out export per stage and reports
//! compile errors inline in the returned text, never through a separate
//! error channel.

pub mod command;
pub mod fn_engine;
pub mod gateway;
pub mod slot;

pub use command::CommandEngine;
pub use fn_engine::FnEngine;
pub use gateway::EngineGateway;
pub use slot::EngineSlot;

use crate::stage::StageId;

/// Environment variable carrying the side-channel user input to `CommandEngine`
pub const ENV_USER_INPUT: &str = "STAGEBENCH_USER_INPUT";

/// An initialized engine instance
pub trait Engine: Send + Sync {
    /// Run the export backing `stage`. Total: failures come back as text.
    fn invoke(&self, stage: StageId, input: &str) -> String;

    /// Deliver the program's user input ahead of a full run
    fn set_user_input(&self, text: &str);
}
