/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the JSON list that the batch translator appends to the user
 * message and answers according to a scripted behavior:
 * - `MockProvider::working()` - Translates every line into target-script text
 * - `MockProvider::echo()` - Returns the source lines untouched
 * - `MockProvider::rate_limited()` - Always answers with a rate-limit error
 * - `MockProvider::failing()` - Always fails with a server error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Prefix the working mock puts in front of every translated line
pub const MOCK_TRANSLATION_PREFIX: &str = "ترجمة: ";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Succeeds, but wraps the list in a markdown fence with chatter around it
    Fenced,
    /// Returns the source lines unchanged
    Echo,
    /// Returns text with no JSON list in it
    Garbage,
    /// Returns one line fewer than requested
    WrongCount,
    /// Translates batches up to `max_lines`, drops a line from larger ones
    MaxBatch { max_lines: usize },
    /// Translates every batch except those containing the poisoned line
    Poisoned { needle: &'static str },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Rate limited for the first `times` requests, then working
    RateLimitedFirst { times: usize },
    /// Always rate limited
    RateLimited,
    /// Always rejects the credentials
    AuthFailing,
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&[String]) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that echoes the source lines
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a mock that never returns a JSON list
    pub fn garbage() -> Self {
        Self::new(MockBehavior::Garbage)
    }

    /// Create a mock that always returns too few lines
    pub fn wrong_count() -> Self {
        Self::new(MockBehavior::WrongCount)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that is always rate limited
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a mock that always rejects the credentials
    pub fn auth_failing() -> Self {
        Self::new(MockBehavior::AuthFailing)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Set a custom response generator used by the working behavior
    pub fn with_custom_response(mut self, generator: fn(&[String]) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The lines a batch request asked for, read from the JSON after the first newline
    pub fn extract_lines(user_message: &str) -> Option<Vec<String>> {
        let (_, payload) = user_message.split_once('\n')?;
        serde_json::from_str(payload).ok()
    }

    /// The translation the working mock produces for one line
    pub fn translate_line(line: &str) -> String {
        format!("{}{}", MOCK_TRANSLATION_PREFIX, line)
    }

    /// Generate a properly formatted batch response
    pub fn generate_batch_response(lines: &[String]) -> String {
        let translated: Vec<String> = lines.iter().map(|l| Self::translate_line(l)).collect();
        serde_json::to_string(&translated).unwrap_or_else(|_| "[]".to_string())
    }

    fn list_response(lines: &[String]) -> String {
        serde_json::to_string(lines).unwrap_or_else(|_| "[]".to_string())
    }

    fn working_response(&self, lines: &[String]) -> String {
        match self.custom_response {
            Some(generator) => generator(lines),
            None => Self::generate_batch_response(lines),
        }
    }

    fn truncated_response(lines: &[String]) -> String {
        let mut translated: Vec<String> = lines.iter().map(|l| Self::translate_line(l)).collect();
        translated.pop();
        Self::list_response(&translated)
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let lines = Self::extract_lines(&request.user_message).unwrap_or_default();
        self.requests.lock().push(request);

        match self.behavior {
            MockBehavior::Working => Ok(self.working_response(&lines)),

            MockBehavior::Fenced => Ok(format!(
                "Sure! Here are the lines:\n```json\n{}\n```\nLet me know if you need more.",
                self.working_response(&lines)
            )),

            MockBehavior::Echo => Ok(Self::list_response(&lines)),

            MockBehavior::Garbage => Ok("I cannot help with that request.".to_string()),

            MockBehavior::WrongCount => Ok(Self::truncated_response(&lines)),

            MockBehavior::MaxBatch { max_lines } => {
                if lines.len() > max_lines {
                    Ok(Self::truncated_response(&lines))
                } else {
                    Ok(self.working_response(&lines))
                }
            }

            MockBehavior::Poisoned { needle } => {
                if lines.iter().any(|l| l.contains(needle)) {
                    Ok(Self::list_response(&lines))
                } else {
                    Ok(self.working_response(&lines))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.working_response(&lines))
                }
            }

            MockBehavior::RateLimitedFirst { times } => {
                if count < times {
                    Err(ProviderError::RateLimitExceeded("Simulated 429".to_string()))
                } else {
                    Ok(self.working_response(&lines))
                }
            }

            MockBehavior::RateLimited => {
                Err(ProviderError::RateLimitExceeded("Simulated 429".to_string()))
            }

            MockBehavior::AuthFailing => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::AuthFailing => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection refused".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
