//! Chat-completion clients that turn `(schema, source text)` into raw JSON text.
//!
//! Two backends are supported:
//!
//! - **Ollama** `/api/chat` with `format: "json"` and fixed sampling options
//! - **OpenAI** `/v1/chat/completions` with a forced `fill_form` function call
//!
//! Both return the model's raw content string. Parsing that text into a
//! [`Value`](fieldscore_core::Value) is left to the caller, because a reply that is
//! not JSON is a per-pair outcome rather than a transport failure.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com";

/// Errors raised while obtaining a model response.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Connection refused, timeout, TLS failure and the like.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The envelope decoded but did not carry the expected content field.
    #[error("response carried no content")]
    MissingContent,

    #[error("could not decode response envelope: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Decoding parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub seed: u64,
    pub temperature: f64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            seed: 123,
            temperature: 0.01,
        }
    }
}

/// One extraction call: fill `schema` from `text` using `model`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    pub model: &'a str,
    pub schema: &'a JsonValue,
    pub text: &'a str,
}

/// A backend able to answer extraction requests.
pub trait Extractor {
    /// Return the model's raw response text for `request`.
    fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, ExtractError>;
}

fn build_client(timeout: Duration) -> Result<Client, ExtractError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Send a prepared request and decode the JSON envelope.
fn send_json<R: DeserializeOwned>(request: reqwest::blocking::RequestBuilder) -> Result<R, ExtractError> {
    let response = request.send()?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ExtractError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let body = response.text()?;
    Ok(serde_json::from_str(&body)?)
}

fn extraction_instruction(schema: &JsonValue) -> String {
    format!(
        "You are an AI assistant with the main goal of extracting relevant information from a text \
         in order to fill a schema {schema}. For the fields that are not explicitly mentioned in the \
         text, fill them with null. Do not logically infer boolean fields: if the text does not \
         mention the field, fill it with null. For example, for a field 'hasfever', if the text does \
         not clearly mention a fever, return 'hasfever': null. Ensure the output JSON is valid and \
         complete. Return only the filled JSON, without any additional content."
    )
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ollama
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    format: &'static str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    seed: u64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: Option<String>,
}

/// Client for a local Ollama server.
pub struct OllamaExtractor {
    client: Client,
    endpoint: String,
    sampling: Sampling,
}

impl OllamaExtractor {
    pub fn new(endpoint: impl Into<String>, sampling: Sampling, timeout: Duration) -> Result<Self, ExtractError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            sampling,
        })
    }

    fn body<'a>(&self, request: &ExtractionRequest<'a>) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "assistant",
                    content: extraction_instruction(request.schema),
                },
                ChatMessage {
                    role: "user",
                    content: request.text.to_string(),
                },
            ],
            format: "json",
            stream: false,
            options: OllamaOptions {
                seed: self.sampling.seed,
                temperature: self.sampling.temperature,
            },
        }
    }
}

impl Extractor for OllamaExtractor {
    fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, ExtractError> {
        let url = format!("{}/api/chat", self.endpoint);
        let response: OllamaChatResponse = send_json(self.client.post(url).json(&self.body(request)))?;
        response
            .message
            .and_then(|message| message.content)
            .ok_or(ExtractError::MissingContent)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI function calling
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    functions: Vec<FunctionDefinition>,
    function_call: FunctionName,
    seed: u64,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct FunctionDefinition {
    name: &'static str,
    description: &'static str,
    parameters: JsonValue,
}

#[derive(Debug, Serialize)]
struct FunctionName {
    name: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

const FILL_FORM: &str = "fill_form";

/// Client for the OpenAI chat completions API, forcing a `fill_form` call whose
/// parameters are the form schema.
pub struct OpenAiExtractor {
    client: Client,
    endpoint: String,
    api_key: String,
    sampling: Sampling,
}

impl OpenAiExtractor {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        sampling: Sampling,
        timeout: Duration,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sampling,
        })
    }

    fn body<'a>(&self, request: &ExtractionRequest<'a>) -> OpenAiChatRequest<'a> {
        OpenAiChatRequest {
            model: request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an assistant that fills out forms with information from the provided text."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Fill out the form based on the following text: '{}'", request.text),
                },
            ],
            functions: vec![FunctionDefinition {
                name: FILL_FORM,
                description: "Fills out the form fields with information extracted from the text.",
                parameters: serde_json::json!({"type": "object", "properties": request.schema}),
            }],
            function_call: FunctionName { name: FILL_FORM },
            seed: self.sampling.seed,
            temperature: self.sampling.temperature,
        }
    }
}

impl Extractor for OpenAiExtractor {
    fn extract(&self, request: &ExtractionRequest<'_>) -> Result<String, ExtractError> {
        let url = format!("{}/v1/chat/completions", self.endpoint);
        let response: OpenAiChatResponse = send_json(
            self.client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(&self.body(request)),
        )?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.function_call)
            .map(|call| call.arguments)
            .ok_or(ExtractError::MissingContent)
    }
}
