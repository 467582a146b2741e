//! Minimal OpenAI-compatible chat completions client.
//!
//! Two call shapes are supported: a plain completion returning the message
//! text, and a forced function call whose JSON arguments are deserialized
//! into a caller-chosen type.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use deckgen_shared::{DeckgenError, OpenAiConfig, Result, resolve_api_key};

/// A function the model is forced to call.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: Value,
}

// --- wire types -------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<[ToolDef<'a>; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ToolDef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a FunctionSpec,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: NamedFunction<'a>,
}

#[derive(Serialize)]
struct NamedFunction<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

// --- client -----------------------------------------------------------------

/// Chat completions client bound to one model and API key.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: String,
    questions_max_tokens: u32,
    outline_max_tokens: u32,
}

impl ChatClient {
    /// Resolve the API key from the environment and build the client.
    ///
    /// Fails with [`DeckgenError::Config`] when the key is missing, before any
    /// network traffic.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = resolve_api_key(config)?;
        Self::new(config, api_key)
    }

    pub fn new(config: &OpenAiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeckgenError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
            questions_max_tokens: config.questions_max_tokens,
            outline_max_tokens: config.outline_max_tokens,
        })
    }

    /// Token budget for the clarifying-questions call.
    pub fn questions_max_tokens(&self) -> u32 {
        self.questions_max_tokens
    }

    /// Token budget for the outline call.
    pub fn outline_max_tokens(&self) -> u32 {
        self.outline_max_tokens
    }

    /// Plain completion; returns the trimmed message text (may be empty).
    #[instrument(skip_all, fields(model = %self.model, max_tokens = max_tokens))]
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens,
            tools: None,
            tool_choice: None,
        };

        let message = self.send(&request).await?;
        Ok(message.content.unwrap_or_default().trim().to_string())
    }

    /// Force a call to `function` and deserialize its arguments.
    #[instrument(skip_all, fields(model = %self.model, function = %function.name))]
    pub async fn call_function<T: DeserializeOwned>(
        &self,
        prompt: &str,
        function: &FunctionSpec,
        max_tokens: u32,
    ) -> Result<T> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens,
            tools: Some([ToolDef {
                kind: "function",
                function,
            }]),
            tool_choice: Some(ToolChoice {
                kind: "function",
                function: NamedFunction {
                    name: &function.name,
                },
            }),
        };

        let message = self.send(&request).await?;
        let call = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .find(|c| c.function.name == function.name)
            .ok_or_else(|| {
                DeckgenError::Model(format!("response has no call to '{}'", function.name))
            })?;

        serde_json::from_str(&call.function.arguments).map_err(|e| {
            DeckgenError::Model(format!("malformed '{}' arguments: {e}", function.name))
        })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<ResponseMessage> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DeckgenError::Model(format!("chat request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DeckgenError::Model(format!("failed to read chat response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(DeckgenError::Model(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| DeckgenError::Model(format!("failed to parse chat response: {e}")))?;

        debug!(choices = parsed.choices.len(), "chat response received");

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| DeckgenError::Model("chat response has no choices".into()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn client_for(server: &MockServer) -> ChatClient {
        let config = OpenAiConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        ChatClient::new(&config, "test-key").unwrap()
    }

    pub(crate) fn content_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        }))
    }

    pub(crate) fn tool_reply(name: &str, arguments: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": name, "arguments": arguments.to_string() }
                    }]
                }
            }]
        }))
    }

    #[derive(Debug, Deserialize)]
    struct Echo {
        word: String,
    }

    fn echo_spec() -> FunctionSpec {
        FunctionSpec {
            name: "echo".into(),
            description: "Echo a word".into(),
            parameters: json!({
                "type": "object",
                "properties": { "word": { "type": "string" } },
                "required": ["word"]
            }),
        }
    }

    #[test]
    fn missing_key_is_config_error() {
        let config = OpenAiConfig {
            api_key_env: "DECKGEN_TEST_LLM_KEY_NEVER_SET".into(),
            ..Default::default()
        };
        let err = ChatClient::from_config(&config).err().unwrap();
        assert!(matches!(err, DeckgenError::Config { .. }));
        assert!(err.to_string().contains("DECKGEN_TEST_LLM_KEY_NEVER_SET"));
    }

    #[tokio::test]
    async fn complete_sends_bearer_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1500,
                "messages": [{ "role": "user", "content": "outline please" }]
            })))
            .respond_with(content_reply("  # Deck\n"))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).complete("outline please", 1500).await.unwrap();
        assert_eq!(text, "# Deck");
    }

    #[tokio::test]
    async fn call_function_forces_tool_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": { "type": "function", "function": { "name": "echo" } },
                "tools": [{ "type": "function", "function": { "name": "echo" } }]
            })))
            .respond_with(tool_reply("echo", json!({ "word": "hi" })))
            .expect(1)
            .mount(&server)
            .await;

        let echo: Echo = client_for(&server)
            .call_function("say hi", &echo_spec(), 300)
            .await
            .unwrap();
        assert_eq!(echo.word, "hi");
    }

    #[tokio::test]
    async fn missing_tool_call_is_model_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(content_reply("I'd rather not"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .call_function::<Echo>("say hi", &echo_spec(), 300)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckgenError::Model(_)));
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("x", 10).await.unwrap_err();
        match err {
            DeckgenError::Model(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Incorrect API key provided"));
            }
            other => panic!("expected Model, got {other:?}"),
        }
    }
}
