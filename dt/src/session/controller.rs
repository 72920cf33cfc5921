//! Turn-taking state machine

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Notice, Panel, SessionError, SessionSettings};
use crate::config::LlmConfig;
use crate::conversation::{ConversationStore, Turn};
use crate::llm::{ClientError, ClientFactory, ModelInfo, StreamChunk, TokenUsage};
use crate::prompts::compose;

/// Where the session is in processing a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a submission or a configuration action
    Idle,
    /// Submission received, user turn being recorded
    AwaitingInput,
    /// Building the request string and client handle
    Composing,
    /// Waiting on the inference runtime
    Invoking,
    /// Recording the assistant turn
    Rendering,
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; nothing recorded
    Ignored,
    /// Assistant turn recorded
    Answered { turn: Turn, usage: TokenUsage },
    /// Turn abandoned; only the user turn was recorded
    Failed(Notice),
}

/// Read-only view for rendering
#[derive(Debug, Clone)]
pub struct SessionSnapshot<'a> {
    pub turns: &'a [Turn],
    pub panels: Vec<Panel>,
    pub temperature: f32,
    pub model: &'a str,
    pub state: SessionState,
}

/// One independent chat session
pub struct Session {
    id: Uuid,
    store: ConversationStore,
    settings: SessionSettings,
    llm: LlmConfig,
    system_prompt: String,
    factory: ClientFactory,
    state: SessionState,
}

impl Session {
    /// Create a session with an empty conversation
    ///
    /// Model, temperature and runtime options start from `llm`; temperature
    /// can then be changed per session. Fails if `llm.temperature` is outside
    /// 0.0..=1.0.
    pub fn new(
        llm: LlmConfig,
        system_prompt: impl Into<String>,
        factory: ClientFactory,
    ) -> Result<Self, SessionError> {
        let settings = SessionSettings::new(llm.model.clone(), llm.temperature)?;
        let id = Uuid::now_v7();
        info!(session = %id, model = %llm.model, "Session::new: created");
        Ok(Self {
            id,
            store: ConversationStore::new(),
            settings,
            llm,
            system_prompt: system_prompt.into(),
            factory,
            state: SessionState::Idle,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Submit user text and wait for the complete answer
    pub async fn submit(&mut self, text: &str) -> TurnOutcome {
        self.run_turn(text, None).await
    }

    /// Submit user text, forwarding partial output to `chunk_tx`
    ///
    /// Only the final text is recorded in the conversation.
    pub async fn submit_streaming(&mut self, text: &str, chunk_tx: mpsc::Sender<StreamChunk>) -> TurnOutcome {
        self.run_turn(text, Some(chunk_tx)).await
    }

    /// Forget the whole conversation
    pub fn clear(&mut self) {
        info!(session = %self.id, turns = self.store.len(), "Session::clear: called");
        self.store.clear();
        self.transition(SessionState::Idle);
    }

    /// Change the temperature used from the next turn on
    pub fn set_temperature(&mut self, value: f32) -> Result<(), SessionError> {
        self.settings.set_temperature(value)
    }

    /// Flip a panel; returns the new visibility
    pub fn toggle_panel(&mut self, panel: Panel) -> bool {
        self.settings.toggle(panel)
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            turns: self.store.all(),
            panels: self.settings.visible_panels().collect(),
            temperature: self.settings.temperature(),
            model: self.settings.model_id(),
            state: self.state,
        }
    }

    /// Settings a client handle is configured with for the next turn
    pub fn client_settings(&self) -> LlmConfig {
        LlmConfig {
            model: self.settings.model_id().to_string(),
            temperature: self.settings.temperature(),
            ..self.llm.clone()
        }
    }

    /// Ask the runtime which models are installed
    pub async fn installed_models(&self) -> Result<Vec<ModelInfo>, ClientError> {
        debug!("Session::installed_models: called");
        let client = (self.factory)(&self.client_settings())?;
        client.list_models().await
    }

    async fn run_turn(&mut self, text: &str, chunk_tx: Option<mpsc::Sender<StreamChunk>>) -> TurnOutcome {
        if text.trim().is_empty() {
            debug!("run_turn: blank submission ignored");
            return TurnOutcome::Ignored;
        }

        self.transition(SessionState::AwaitingInput);
        // Recorded before invoking so it stays visible if generation fails
        self.store.append(Turn::user(text));

        self.transition(SessionState::Composing);
        let prompt = compose(&self.system_prompt, text);
        let client = match (self.factory)(&self.client_settings()) {
            Ok(client) => client,
            Err(e) => return self.abandon(e),
        };

        self.transition(SessionState::Invoking);
        info!(
            session = %self.id,
            model = %client.model(),
            temperature = self.settings.temperature(),
            streaming = chunk_tx.is_some(),
            "run_turn: invoking model"
        );
        let result = match chunk_tx {
            Some(tx) => client.stream(&prompt, tx).await,
            None => client.generate(&prompt).await,
        };

        match result {
            Ok(generation) => {
                self.transition(SessionState::Rendering);
                let turn = Turn::assistant(generation.text);
                self.store.append(turn.clone());
                self.transition(SessionState::Idle);
                info!(
                    session = %self.id,
                    output_tokens = generation.usage.output_tokens,
                    "run_turn: answered"
                );
                TurnOutcome::Answered {
                    turn,
                    usage: generation.usage,
                }
            }
            Err(e) => self.abandon(e),
        }
    }

    fn abandon(&mut self, err: ClientError) -> TurnOutcome {
        warn!(session = %self.id, error = %err, "run_turn: turn abandoned");
        let notice = Notice::from_error(&err, self.settings.model_id());
        self.transition(SessionState::Idle);
        TurnOutcome::Failed(notice)
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session::transition");
        self.state = next;
    }
}
