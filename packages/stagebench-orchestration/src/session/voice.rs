use thiserror::Error;

pub const VOICE_UNSUPPORTED: &str = "Voice input not supported.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Voice input not supported.")]
    Unsupported,

    #[error("Error: {0}")]
    Capture(String),
}

/// Recognition settings handed to the capture backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Speech-to-text backend. Returns `None` when nothing was recognised.
pub trait TranscriptSource {
    fn capture(&mut self, settings: &CaptureSettings) -> Result<Option<String>, VoiceError>;
}

/// Backend for hosts without speech recognition
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVoice;

impl TranscriptSource for NoVoice {
    fn capture(&mut self, _settings: &CaptureSettings) -> Result<Option<String>, VoiceError> {
        Err(VoiceError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_voice() {
        let err = NoVoice.capture(&CaptureSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), VOICE_UNSUPPORTED);
    }

    #[test]
    fn test_default_settings() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.lang, "en-US");
        assert!(!settings.interim_results);
        assert_eq!(settings.max_alternatives, 1);
    }
}
