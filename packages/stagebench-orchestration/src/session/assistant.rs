//! Natural-language code generation through a chat-completion service.
//!
//! The service is reached through `AssistantTransport`; this module only
//! shapes the request and reads the reply. Transport failures never escape:
//! they turn into a placeholder comment loaded into the editor.

use crate::config::AssistantConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub const FAILED_PLACEHOLDER: &str = "// Failed to generate.";
pub const EMPTY_PROMPT_MESSAGE: &str = "Please describe the code you want.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub stop: Option<Vec<String>>,
}

impl ChatCompletionRequest {
    pub fn for_prompt(config: &AssistantConfig, prompt: &str) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![
                ChatMessage::new("system", config.system_prompt.clone()),
                ChatMessage::new("user", build_instruction(prompt)),
            ],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            stop: None,
        }
    }
}

/// Wrap the user's description in the code-only instruction
pub fn build_instruction(prompt: &str) -> String {
    format!(
        "Write a valid C function based on the following instruction:\n\"{}\"\nOnly provide code.",
        prompt
    )
}

/// Sends a request to the completion service and returns the JSON reply
#[async_trait]
pub trait AssistantTransport: Send + Sync {
    async fn complete(&self, request: &ChatCompletionRequest) -> anyhow::Result<Value>;
}

/// `choices[0].message.content`, when present and non-empty
pub fn extract_code(response: &Value) -> Option<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantOutcome {
    /// Generated source to load into the editor
    Generated(String),
    /// The service failed or returned nothing usable
    Failed,
    /// Rejected before any request was made
    Rejected(&'static str),
}

impl AssistantOutcome {
    /// Text the editor should be populated with, if any
    pub fn editor_text(&self) -> Option<&str> {
        match self {
            AssistantOutcome::Generated(code) => Some(code.as_str()),
            AssistantOutcome::Failed => Some(FAILED_PLACEHOLDER),
            AssistantOutcome::Rejected(_) => None,
        }
    }
}

pub async fn generate_code<T>(
    transport: &T,
    config: &AssistantConfig,
    prompt: &str,
) -> AssistantOutcome
where
    T: AssistantTransport + ?Sized,
{
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return AssistantOutcome::Rejected(EMPTY_PROMPT_MESSAGE);
    }

    let request = ChatCompletionRequest::for_prompt(config, prompt);
    match transport.complete(&request).await {
        Ok(response) => match extract_code(&response) {
            Some(code) => {
                info!("Assistant generated {} bytes of source", code.len());
                AssistantOutcome::Generated(code)
            }
            None => {
                warn!("Assistant reply had no message content");
                AssistantOutcome::Failed
            }
        },
        Err(e) => {
            warn!("Assistant request failed: {:#}", e);
            AssistantOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    struct CannedTransport {
        reply: Option<Value>,
        seen: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl CannedTransport {
        fn replying(reply: Option<Value>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssistantTransport for CannedTransport {
        async fn complete(&self, request: &ChatCompletionRequest) -> anyhow::Result<Value> {
            self.seen.lock().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatCompletionRequest::for_prompt(&AssistantConfig::default(), "add two ints");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "mistralai/Mixtral-8x7B-Instruct-v0.1");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][1]["content"],
            "Write a valid C function based on the following instruction:\n\"add two ints\"\nOnly provide code."
        );
        assert_eq!(body["max_tokens"], 512);
        assert!(body["stop"].is_null());
    }

    #[test]
    fn test_extract_code() {
        let reply = json!({"choices": [{"message": {"content": "int add(int a, int b) { return a + b; }"}}]});
        assert_eq!(
            extract_code(&reply).as_deref(),
            Some("int add(int a, int b) { return a + b; }")
        );
        assert_eq!(extract_code(&json!({"choices": []})), None);
        assert_eq!(
            extract_code(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_never_sends() {
        let transport = CannedTransport::replying(Some(json!({})));
        let outcome = generate_code(&transport, &AssistantConfig::default(), "   ").await;

        assert_eq!(outcome, AssistantOutcome::Rejected(EMPTY_PROMPT_MESSAGE));
        assert_eq!(outcome.editor_text(), None);
        assert!(transport.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_placeholder() {
        let transport = CannedTransport::replying(None);
        let outcome = generate_code(&transport, &AssistantConfig::default(), "factorial").await;

        assert_eq!(outcome, AssistantOutcome::Failed);
        assert_eq!(outcome.editor_text(), Some(FAILED_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_generated_code() {
        let transport = CannedTransport::replying(Some(
            json!({"choices": [{"message": {"content": "int main() { return 0; }"}}]}),
        ));
        let outcome = generate_code(&transport, &AssistantConfig::default(), " main ").await;

        assert_eq!(
            outcome,
            AssistantOutcome::Generated("int main() { return 0; }".to_string())
        );
        let seen = transport.seen.lock();
        assert!(seen[0].messages[1].content.contains("\"main\""));
    }
}
