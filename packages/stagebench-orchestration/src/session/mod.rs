//! User-facing session: the editable source, the output surfaces, and the
//! controls that drive the orchestrator from them.

pub mod assistant;
pub mod theme;
pub mod voice;

pub use assistant::{generate_code, AssistantOutcome, AssistantTransport, ChatCompletionRequest};
pub use theme::Theme;
pub use voice::{CaptureSettings, NoVoice, TranscriptSource, VoiceError};

use crate::config::AssistantConfig;
use crate::error::Result;
use crate::orchestrator::PipelineOrchestrator;
use crate::pipeline::PipelineRun;
use crate::router::{route, SurfaceSet};
use crate::stage::StageRequest;
use tracing::info;

pub const SAMPLE_SOURCE: &str = "// Sample C code\nint main() { return 42; }";

/// Where the session reads its source text from
pub trait SourceProvider {
    fn get_value(&self) -> String;
    fn set_value(&mut self, text: &str);
}

/// In-memory source provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(SAMPLE_SOURCE)
    }
}

impl SourceProvider for TextBuffer {
    fn get_value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

pub struct Session<S: SourceProvider> {
    source: S,
    orchestrator: PipelineOrchestrator,
    surfaces: SurfaceSet,
    theme: Theme,
    assistant: AssistantConfig,
}

impl<S: SourceProvider> Session<S> {
    pub fn new(source: S, orchestrator: PipelineOrchestrator) -> Self {
        Self {
            source,
            orchestrator,
            surfaces: SurfaceSet::new(),
            theme: Theme::default(),
            assistant: AssistantConfig::default(),
        }
    }

    pub fn with_assistant_config(mut self, config: AssistantConfig) -> Self {
        self.assistant = config;
        self
    }

    /// Run `stage` on a snapshot of the current source and show the result.
    ///
    /// On error the surfaces are left as they were.
    pub fn trigger(&mut self, stage: &str) -> Result<PipelineRun> {
        let request = StageRequest::parse(stage, self.source.get_value())?;
        let run = self.orchestrator.run_request(&request)?;
        self.surfaces.apply(&route(&run));
        Ok(run)
    }

    pub fn trigger_full(&mut self, user_input: &str) -> Result<PipelineRun> {
        let source_text = self.source.get_value();
        let run = self
            .orchestrator
            .run_full_pipeline(&source_text, user_input)?;
        self.surfaces.apply(&route(&run));
        Ok(run)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggle();
        info!("Theme switched to {:?}", theme);
        theme
    }

    /// Ask the assistant for code and load whatever it yields into the source
    pub async fn generate_from_prompt<T>(&mut self, transport: &T, prompt: &str) -> AssistantOutcome
    where
        T: AssistantTransport + ?Sized,
    {
        let outcome = generate_code(transport, &self.assistant, prompt).await;
        if let Some(text) = outcome.editor_text() {
            self.source.set_value(text);
        }
        outcome
    }

    /// Capture a spoken prompt and hand it to the assistant.
    ///
    /// `Ok(None)` when nothing was recognised; capture errors leave the
    /// session untouched.
    pub async fn generate_from_voice<T, V>(
        &mut self,
        transport: &T,
        voice: &mut V,
    ) -> std::result::Result<Option<AssistantOutcome>, VoiceError>
    where
        T: AssistantTransport + ?Sized,
        V: TranscriptSource + ?Sized,
    {
        let Some(transcript) = voice.capture(&CaptureSettings::default())? else {
            return Ok(None);
        };
        info!("Voice prompt: {}", transcript);
        Ok(Some(self.generate_from_prompt(transport, &transcript).await))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut SurfaceSet {
        &mut self.surfaces
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }
}
