//! Tracks which generative backends participate in the current conversation.

use std::collections::BTreeSet;

use crate::backends::BackendId;

/// The set of enabled backends, ordered canonically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSelection {
    enabled: BTreeSet<BackendId>,
}

impl Default for BackendSelection {
    /// At creation exactly the default backend is enabled
    fn default() -> Self {
        let mut enabled = BTreeSet::new();
        enabled.insert(BackendId::DEFAULT);
        Self { enabled }
    }
}

impl BackendSelection {
    pub fn empty() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    /// Build a selection from submitted backend names, replacing any prior
    /// state in its entirety. Names are trimmed and matched exactly;
    /// unmatched names are ignored, which legally produces an empty
    /// selection.
    pub fn replace_from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut selection = Self::empty();
        for name in names {
            let name = name.trim();
            match BackendId::from_name(name) {
                Some(backend) => selection.enable(backend),
                None => tracing::warn!(name, "ignoring unknown backend name in selection update"),
            }
        }
        selection
    }

    pub fn enable(&mut self, backend: BackendId) {
        self.enabled.insert(backend);
    }

    pub fn is_enabled(&self, backend: BackendId) -> bool {
        self.enabled.contains(&backend)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// True when the local default backend is the only one enabled
    pub fn default_only(&self) -> bool {
        self.enabled.len() == 1 && self.enabled.contains(&BackendId::DEFAULT)
    }

    /// Enabled backends in canonical order
    pub fn enabled(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.enabled.iter().copied()
    }

    /// Enabled remote backends in canonical order
    pub fn enabled_remotes(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.enabled().filter(BackendId::is_remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_exactly_the_default_backend() {
        let selection = BackendSelection::default();
        assert!(selection.default_only());
        assert!(selection.is_enabled(BackendId::Ollama));
        assert!(!selection.is_enabled(BackendId::ChatGPT));
    }

    #[test]
    fn test_replace_matches_trimmed_exact_names() {
        let selection =
            BackendSelection::replace_from_names(["  ChatGPT ", "ClaudeAI", "chatgpt"]);
        let enabled: Vec<BackendId> = selection.enabled().collect();
        assert_eq!(enabled, vec![BackendId::ChatGPT, BackendId::ClaudeAI]);
        assert!(!selection.is_enabled(BackendId::Ollama));
    }

    #[test]
    fn test_no_recognized_names_leaves_all_disabled() {
        let selection = BackendSelection::replace_from_names(["Grok", "Mistral"]);
        assert!(selection.is_empty());
        assert!(!selection.default_only());
    }

    #[test]
    fn test_enabled_remotes_skip_the_default() {
        let selection = BackendSelection::replace_from_names(["Ollama", "DeepSeek", "Gemini"]);
        let remotes: Vec<BackendId> = selection.enabled_remotes().collect();
        assert_eq!(remotes, vec![BackendId::Gemini, BackendId::DeepSeek]);
    }
}
