/*!
 * Provider implementations for text generation services.
 *
 * This module contains client implementations for the services used to translate:
 * - OpenAI: any OpenAI-compatible chat completions API (OpenRouter by default)
 * - Mock: scripted behaviors for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single chat completion request: one system message and one user message
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions that frame every request
    pub system_prompt: String,
    /// The payload for this request
    pub user_message: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            temperature: 0.1,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Common trait for all generation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the batch translator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw text of the first choice or an error
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod openai;
