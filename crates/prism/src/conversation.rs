//! Keyed, concurrency-safe store of in-flight conversations.
//!
//! Each conversation holds the last submitted query, the per-backend
//! answers recorded so far and its own backend selection. Identifiers are
//! fresh uuids and never reused; conversations are superseded rather than
//! destroyed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::backends::BackendId;
use crate::selection::BackendSelection;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub query: String,
    pub answers: BTreeMap<BackendId, String>,
    pub selection: BackendSelection,
}

impl Conversation {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: String::new(),
            answers: BTreeMap::new(),
            selection: BackendSelection::default(),
        }
    }

    /// Answers for currently enabled backends, canonical order. Enabled
    /// backends without a recorded answer are excluded from the aggregate.
    pub fn recorded_answers(&self) -> Vec<(BackendId, String)> {
        self.selection
            .enabled()
            .filter_map(|backend| {
                self.answers
                    .get(&backend)
                    .map(|answer| (backend, answer.clone()))
            })
            .collect()
    }
}

#[derive(Default)]
struct Inner {
    conversations: HashMap<String, Conversation>,
    current: Option<String>,
}

/// Process-wide conversation registry, one mutex-guarded map entry per
/// conversation identifier
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<Inner>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh conversation: new identifier, cleared query and
    /// answers, selection reset to default-only. The new conversation
    /// becomes the current one.
    pub fn start(&self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        let mut inner = self.lock();
        inner.conversations.insert(id.clone(), conversation);
        inner.current = Some(id.clone());
        id
    }

    /// Identifier of the most recently started conversation
    pub fn current_id(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// Current conversation identifier, starting one if none exists yet
    pub fn current_or_start(&self) -> String {
        if let Some(id) = self.current_id() {
            return id;
        }
        self.start()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().conversations.contains_key(id)
    }

    /// Run a closure against one conversation; None if the id is unknown
    pub fn with_conversation<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Conversation) -> R,
    ) -> Option<R> {
        let mut inner = self.lock();
        inner.conversations.get_mut(id).map(f)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
