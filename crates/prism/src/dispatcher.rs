//! Routes one validated inbound message to a handling strategy.
//!
//! Decision order, first match wins: selection update, legacy image label,
//! redirect fan-in, then a switch on the message format.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, info};

use crate::artifacts::ArtifactStore;
use crate::conversation::ConversationStore;
use crate::errors::{ProtocolError, ProtocolResult};
use crate::message::{Format, Message, SUBFORMAT_ENGLISH};
use crate::orchestrator::Orchestrator;
use crate::providers::base::Provider;
use crate::selection::BackendSelection;

/// Label marking a control message as a backend selection update
pub const SELECTION_LABEL: &str = "LLMs";
/// Legacy demo route, recognized but no longer implemented
const LEGACY_IMAGE_LABEL: &str = "image";

const DEFAULT_IMAGE_PROMPT: &str = "What do you see in this image?";

pub struct Dispatcher {
    store: Arc<ConversationStore>,
    orchestrator: Orchestrator,
    artifacts: Option<ArtifactStore>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        let store = Arc::new(ConversationStore::new());
        let orchestrator = Orchestrator::new(Arc::clone(&store), provider);
        Self {
            store,
            orchestrator,
            artifacts: None,
        }
    }

    /// Persist inbound binary content before answering it
    pub fn with_artifacts(mut self, artifacts: ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: std::time::Duration) -> Self {
        self.orchestrator = self.orchestrator.with_call_timeout(call_timeout);
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub async fn dispatch(&self, msg: Message) -> ProtocolResult<Message> {
        info!(
            format = %msg.format,
            subformat = %msg.subformat,
            label = ?msg.label,
            "inbound protocol message"
        );

        if msg.is_control() && msg.label.as_deref() == Some(SELECTION_LABEL) {
            return self.update_selection(&msg);
        }

        if msg.label.as_deref() == Some(LEGACY_IMAGE_LABEL) {
            return Err(ProtocolError::NotImplemented("legacy image demo path"));
        }

        if msg.format == Format::Redirect {
            return self.orchestrator.fan_in(&msg).await;
        }

        match msg.format {
            Format::Text => self.respond_to_text(msg).await,
            Format::Binary => self.respond_to_image(&msg, None).await,
            Format::Authentication | Format::Structured | Format::Location | Format::Generic => {
                Err(ProtocolError::NotImplemented(msg.format.into()))
            }
            _ => Err(ProtocolError::Payload(format!(
                "unhandled message format '{}'",
                msg.format
            ))),
        }
    }

    /// Replace the conversation's backend selection in its entirety
    fn update_selection(&self, msg: &Message) -> ProtocolResult<Message> {
        let submessages = msg.submessages.as_ref().ok_or_else(|| {
            ProtocolError::Internal("selection update without submessages".to_string())
        })?;

        let names = submessages
            .iter()
            .filter(|sub| sub.format == Format::Text && sub.subformat == SUBFORMAT_ENGLISH)
            .map(|sub| sub.content.as_str());
        let selection = BackendSelection::replace_from_names(names);

        let enabled: Vec<&str> = selection.enabled().map(|b| b.name()).collect();
        info!(?enabled, "backend selection replaced");

        let conversation = self.store.current_or_start();
        self.store
            .with_conversation(&conversation, |c| c.selection = selection)
            .ok_or_else(|| ProtocolError::Internal("current conversation vanished".to_string()))?;

        Ok(Message::text("Backend selection updated").with_control())
    }

    async fn respond_to_text(&self, msg: Message) -> ProtocolResult<Message> {
        if let Some(submessages) = &msg.submessages {
            // A text message may carry exactly one submessage, and it must
            // be the image the outer content is prompting about
            if submessages.len() != 1 || submessages[0].format != Format::Binary {
                return Err(ProtocolError::Payload(
                    "text message may only carry a single binary submessage".to_string(),
                ));
            }
            return self
                .respond_to_image(&submessages[0], Some(msg.content.as_str()))
                .await;
        }

        let conversation = self.store.current_or_start();
        let selection = self
            .store
            .with_conversation(&conversation, |c| c.selection.clone())
            .ok_or_else(|| ProtocolError::Internal("current conversation vanished".to_string()))?;

        if selection.default_only() {
            self.orchestrator.direct_answer(&msg.content).await
        } else {
            self.orchestrator.fan_out(&conversation, &msg.content).await
        }
    }

    async fn respond_to_image(
        &self,
        msg: &Message,
        request_prompt: Option<&str>,
    ) -> ProtocolResult<Message> {
        // For now binary only supports images
        if !msg.has_image_subformat() {
            return Err(ProtocolError::Payload(format!(
                "invalid binary subformat '{}'",
                msg.subformat
            )));
        }

        if let Some(artifacts) = &self.artifacts {
            let bytes = BASE64.decode(&msg.content).map_err(|err| {
                ProtocolError::Payload(format!("unable to decode base64 content: {err}"))
            })?;
            let path = artifacts.save(&bytes, &msg.subformat)?;
            debug!(path = %path.display(), "saved binary artifact");
        }

        let prompt = request_prompt.unwrap_or(DEFAULT_IMAGE_PROMPT);
        let answer = self.orchestrator.image_answer(prompt, &msg.content).await?;
        Ok(Message::text(answer))
    }
}
