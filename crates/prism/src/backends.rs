//! Registry of the generative backends the dispatcher knows about.
//!
//! Adding a backend means adding a variant here; selection, fan-out and
//! aggregation all iterate the registry instead of testing named flags.
//! Declaration order is the canonical order: the local default backend
//! first, then the remote backends.

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum BackendId {
    Ollama,
    ChatGPT,
    ClaudeAI,
    Gemini,
    DeepSeek,
}

impl BackendId {
    /// The local backend selected when a conversation starts
    pub const DEFAULT: BackendId = BackendId::Ollama;

    pub fn all() -> impl Iterator<Item = BackendId> {
        BackendId::iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendId::Ollama => "Ollama",
            BackendId::ChatGPT => "ChatGPT",
            BackendId::ClaudeAI => "ClaudeAI",
            BackendId::Gemini => "Gemini",
            BackendId::DeepSeek => "DeepSeek",
        }
    }

    /// Exact, case-sensitive lookup used by selection updates and fan-in labels
    pub fn from_name(name: &str) -> Option<BackendId> {
        BackendId::iter().find(|backend| backend.name() == name)
    }

    /// Well-known external URL for remote backends, None for the local default
    pub fn redirect_url(&self) -> Option<&'static str> {
        match self {
            BackendId::Ollama => None,
            BackendId::ChatGPT => Some("https://chatgpt.com/"),
            BackendId::ClaudeAI => Some("https://claude.ai/new"),
            BackendId::Gemini => Some("https://gemini.google.com/app"),
            BackendId::DeepSeek => Some("https://chat.deepseek.com/"),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.redirect_url().is_some()
    }
}
