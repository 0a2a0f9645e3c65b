use crate::event_bus::{Event, EventBus, EventEmitter};
use crate::impl_event_emitter;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

/// Trait representing a remote text-generation service.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Name of the provider.
    fn name(&self) -> &str;

    /// Send a prompt to the provider and return the response text.
    async fn send_prompt(&self, prompt: &str) -> Result<String>;

    /// Model name of the provider.
    fn model_name(&self) -> &str {
        "Unknown"
    }
}

/// Owns the provider and bounds every call with a timeout.
pub struct LLMManager {
    provider: Box<dyn LLMProvider>,
    event_bus: Option<Arc<EventBus>>,
    timeout: Duration,
}

impl LLMManager {
    pub fn new(provider: Box<dyn LLMProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            event_bus: None,
            timeout,
        }
    }

    pub fn provider(&self) -> &dyn LLMProvider {
        &*self.provider
    }

    /// Send a prompt, failing if no answer arrives within the timeout.
    pub async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let provider = &self.provider;
        info!("Calling {} ({})", provider.name(), provider.model_name());

        if let Some(bus) = &self.event_bus {
            let _ = bus
                .emit(Event::APICallStarted {
                    provider: provider.name().to_string(),
                    model: provider.model_name().to_string(),
                })
                .await;
        }

        let result = match tokio::time::timeout(self.timeout, provider.send_prompt(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "{} did not answer within {:?}",
                provider.name(),
                self.timeout
            )),
        };

        match &result {
            Ok(response) => {
                // Rough estimate: 1 token ≈ 4 characters
                let tokens = (prompt.len() + response.len()) / 4;
                if let Some(bus) = &self.event_bus {
                    let _ = bus
                        .emit(Event::APICallCompleted {
                            provider: provider.name().to_string(),
                            tokens,
                        })
                        .await;
                }
            }
            Err(e) => {
                error!("{} call failed: {:#}", provider.name(), e);
                if let Some(bus) = &self.event_bus {
                    let _ = bus
                        .emit(Event::APIError {
                            provider: provider.name().to_string(),
                            error: format!("{:#}", e),
                        })
                        .await;
                }
            }
        }

        result
    }
}

// Implement EventEmitter trait for LLMManager
impl_event_emitter!(LLMManager);
