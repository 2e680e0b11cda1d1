use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Client for OpenAI-compatible chat completion APIs
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for bearer authentication
    api_key: String,
    /// Base URL, e.g. https://openrouter.ai/api/v1
    endpoint: String,
    /// Model identifier
    model: String,
    /// Optional HTTP-Referer attribution header
    referer: Option<String>,
    /// Optional X-Title attribution header
    title: Option<String>,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single generated choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            referer: None,
            title: None,
        }
    }

    /// Create a client from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut client = Self::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs,
        );
        client.referer = config.referer.clone();
        client.title = config.title.clone();
        client
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Send a chat request and decode the response body
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let mut builder = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json");

        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(map_status_error(status, error_text));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    /// Extract the text of the first choice
    pub fn extract_text(response: &ChatResponse) -> Result<String, ProviderError> {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::ParseError("Response contained no choices".to_string()))
    }
}

/// Classify a request that never produced a response
fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_connect() || e.is_timeout() {
        ProviderError::ConnectionError(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Classify a non-success HTTP status
fn map_status_error(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            debug!("Rate limited by API: {}", message);
            ProviderError::RateLimitExceeded(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            error!("API rejected credentials ({}): {}", status, message);
            ProviderError::AuthenticationError(message)
        }
        _ => {
            error!("API error ({}): {}", status, message);
            ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let chat = ChatRequest::new(self.model.clone())
            .add_message("system", request.system_prompt)
            .add_message("user", request.user_message)
            .temperature(request.temperature);

        let response = self.chat(&chat).await?;
        Self::extract_text(&response)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let chat = ChatRequest::new(self.model.clone())
            .add_message("user", "Hello")
            .max_tokens(1);

        self.chat(&chat).await.map(|_| ())
    }
}
