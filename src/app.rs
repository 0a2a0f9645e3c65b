use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::config::{Config, CredentialStatus};
use crate::error::IdeaError;
use crate::event_bus::{Event, EventBus, EventEmitter};
use crate::idea::Outcome;
use crate::impl_event_emitter;
use crate::interpreter::Interpreter;
use crate::llm_manager::LLMManager;
use crate::profile::Field;
use crate::prompt::{Mode, PromptBuilder};
use crate::session::Session;

/// Drives a `Session` against the remote model.
///
/// Every generation failure is caught here and lands in the session's error
/// slot; callers only see `Validation` and `Rejected` errors.
pub struct App {
    session: Session,
    manager: LLMManager,
    prompts: PromptBuilder,
    interpreter: Interpreter,
    credential: CredentialStatus,
    api_key_env: String,
    rng: StdRng,
    event_bus: Option<Arc<EventBus>>,
}

impl App {
    pub fn new(mode: Mode, manager: LLMManager, config: &Config) -> Self {
        Self {
            session: Session::new(mode),
            manager,
            prompts: PromptBuilder::new()
                .with_response_language(config.generation.response_language.clone()),
            interpreter: Interpreter::new(config.generation.strict_deck),
            credential: CredentialStatus::of(config.model.api_key().as_deref()),
            api_key_env: config.model.api_key_env.clone(),
            rng: StdRng::from_os_rng(),
            event_bus: None,
        }
    }

    #[cfg(test)]
    pub fn with_credential(mut self, credential: CredentialStatus) -> Self {
        self.credential = credential;
        self
    }

    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn manager(&self) -> &LLMManager {
        &self.manager
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), IdeaError> {
        self.session.set_field(field, value)
    }

    /// Run one submission to completion.
    pub async fn submit(&mut self) -> Result<(), IdeaError> {
        let prompt = self.session.begin_submission(&self.prompts)?;
        let request_id = Uuid::new_v4().to_string();
        info!("Submitting {} request {}", self.session.mode(), request_id);
        let _ = self
            .emit_event(Event::SubmissionStarted {
                request_id: request_id.clone(),
                mode: self.session.mode().to_string(),
            })
            .await;

        let settled = match self.manager.send_prompt(&prompt).await {
            Ok(raw) => self
                .session
                .complete_submission(&raw, &self.interpreter, &mut self.rng),
            Err(e) => Err(IdeaError::GenerationFailed(format!("{:#}", e))),
        };

        match settled {
            Ok(items) => {
                info!("Request {} produced {} items", request_id, items);
                let _ = self
                    .emit_event(Event::GenerationSucceeded { request_id, items })
                    .await;
            }
            Err(cause) => {
                error!("Request {} failed: {}", request_id, cause);
                let surfaced = self.classify(cause);
                self.session.fail_submission(&surfaced);
                let _ = self
                    .emit_event(Event::GenerationFailed {
                        request_id,
                        error: surfaced.to_string(),
                    })
                    .await;
            }
        }
        Ok(())
    }

    /// A missing or placeholder key explains any failure better than the raw error.
    fn classify(&self, cause: IdeaError) -> IdeaError {
        if cause.is_generation_error() && !self.credential.is_usable() {
            IdeaError::ConfigurationMissing {
                env_var: self.api_key_env.clone(),
            }
        } else {
            cause
        }
    }

    /// Pick a card; `None` when the pick does not count.
    pub async fn reveal(&mut self, index: usize) -> Option<Outcome> {
        let outcome = self.session.reveal(index)?;
        info!("Card {} picked: {:?}", index, outcome);
        let _ = self
            .emit_event(Event::GameResolved {
                picked: index,
                won: outcome == Outcome::Won,
            })
            .await;
        Some(outcome)
    }

    pub async fn reset(&mut self) -> Result<(), IdeaError> {
        self.session.reset()?;
        let _ = self.emit_event(Event::SessionReset).await;
        Ok(())
    }
}

impl_event_emitter!(App);
