//! Fan-out / fan-in aggregation over one conversation.
//!
//! Phase 0 answers directly from the default backend. Phase 1 persists the
//! query, records the default backend's answer and broadcasts redirect
//! instructions for every enabled remote backend. Phase 2 folds returning
//! remote answers into the aggregate response. Selection and conversation
//! state survive phase 2; a fresh conversation start is required before the
//! next query.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::backends::BackendId;
use crate::conversation::ConversationStore;
use crate::errors::{ProtocolError, ProtocolResult};
use crate::message::{Format, Message};
use crate::providers::base::Provider;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);
/// One bounded retry per backend call; repeated failure excludes the
/// backend from the aggregate instead of failing the whole request.
const CALL_ATTEMPTS: u32 = 2;

pub struct Orchestrator {
    store: Arc<ConversationStore>,
    provider: Arc<dyn Provider>,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(store: Arc<ConversationStore>, provider: Arc<dyn Provider>) -> Self {
        Self {
            store,
            provider,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Phase 0: only the default backend is enabled, answer inline
    pub async fn direct_answer(&self, query: &str) -> ProtocolResult<Message> {
        let answer = self
            .call_with_retry(|| self.provider.generate_text(query))
            .await?;
        info!(backend = BackendId::DEFAULT.name(), "direct answer produced");
        Ok(Message::text(answer))
    }

    /// Answer an image prompt from the default backend's vision capability
    pub async fn image_answer(&self, prompt: &str, image_base64: &str) -> ProtocolResult<String> {
        let answer = self
            .call_with_retry(|| self.provider.generate_from_image(prompt, image_base64))
            .await?;
        info!(backend = BackendId::DEFAULT.name(), "image answer produced");
        Ok(answer)
    }

    /// Phase 1: persist the query, record the default backend's answer and
    /// build the redirect message for the enabled remotes
    pub async fn fan_out(&self, conversation: &str, query: &str) -> ProtocolResult<Message> {
        let selection = self
            .store
            .with_conversation(conversation, |c| {
                c.query = query.to_string();
                c.selection.clone()
            })
            .ok_or_else(|| {
                ProtocolError::AggregationState(format!("unknown conversation '{conversation}'"))
            })?;

        if selection.is_enabled(BackendId::DEFAULT) {
            // The default answer is recorded for the aggregate, never
            // inlined into the redirect response
            match self
                .call_with_retry(|| self.provider.generate_text(query))
                .await
            {
                Ok(answer) => {
                    self.store.with_conversation(conversation, |c| {
                        c.answers.insert(BackendId::DEFAULT, answer)
                    });
                }
                Err(err) => {
                    warn!(error = %err, "default backend excluded from aggregate");
                }
            }
        }

        let mut submessages = vec![Message::token(conversation)];
        for backend in selection.enabled_remotes() {
            if let Some(url) = backend.redirect_url() {
                submessages.push(Message::uri(url).with_label(backend.name()));
            }
        }

        info!(
            conversation,
            remotes = submessages.len() - 1,
            "fan-out redirect built"
        );
        Ok(Message::redirect(submessages))
    }

    /// Phase 2: record returning remote answers and build the aggregate
    pub async fn fan_in(&self, msg: &Message) -> ProtocolResult<Message> {
        let conversation = match msg.token_content() {
            Some(token) if self.store.contains(token) => token.to_string(),
            Some(token) => {
                return Err(ProtocolError::AggregationState(format!(
                    "unknown conversation '{token}'"
                )))
            }
            None => self.store.current_id().ok_or_else(|| {
                ProtocolError::AggregationState(
                    "redirect final arrived before any fan-out".to_string(),
                )
            })?,
        };

        if let Some(submessages) = &msg.submessages {
            for sub in submessages {
                if sub.format == Format::Token {
                    continue;
                }
                match sub.label.as_deref().and_then(BackendId::from_name) {
                    Some(backend) if backend.is_remote() => {
                        self.store.with_conversation(&conversation, |c| {
                            c.answers.insert(backend, sub.content.clone())
                        });
                    }
                    _ => warn!(label = ?sub.label, "ignoring fan-in submessage with unknown label"),
                }
            }
        }

        let (query, answers) = self
            .store
            .with_conversation(&conversation, |c| (c.query.clone(), c.recorded_answers()))
            .ok_or_else(|| {
                ProtocolError::AggregationState(format!("unknown conversation '{conversation}'"))
            })?;

        let mut submessages = vec![Message::token(&conversation), Message::text(query)];
        for (backend, answer) in answers {
            submessages.push(Message::text(answer).with_label(backend.name()));
        }

        info!(conversation, backends = submessages.len() - 2, "aggregate built");
        Ok(Message::text("Aggregate response").with_submessages(submessages))
    }

    async fn call_with_retry<F, Fut>(&self, op: F) -> ProtocolResult<String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        let mut last_detail = String::new();
        for attempt in 1..=CALL_ATTEMPTS {
            match timeout(self.call_timeout, op()).await {
                Ok(Ok(answer)) => {
                    info!(attempt, chars = answer.len(), "backend call succeeded");
                    return Ok(answer);
                }
                Ok(Err(err)) => {
                    warn!(attempt, error = %err, "backend call failed");
                    last_detail = err.to_string();
                }
                Err(_) => {
                    warn!(attempt, "backend call timed out");
                    last_detail = format!("timed out after {:?}", self.call_timeout);
                }
            }
        }
        Err(ProtocolError::Backend {
            backend: BackendId::DEFAULT.name(),
            detail: last_detail,
        })
    }
}
