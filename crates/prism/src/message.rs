//! The protocol's single entity: a recursively composable message.
//!
//! A message is interpreted through its `format`; the legal `subformat`
//! values depend on it (`english` for text/token, an image extension for
//! binary, `uri` for structured, `conversation-id` for token). Structural
//! validation beyond the format enum itself belongs to the handling
//! strategies, not to this model.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};

pub const SUBFORMAT_ENGLISH: &str = "english";
pub const SUBFORMAT_URI: &str = "uri";
pub const SUBFORMAT_CONVERSATION_ID: &str = "conversation-id";

/// Binary messages only support images for now
pub const IMAGE_SUBFORMATS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "bmp"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Text,
    Binary,
    Structured,
    Authentication,
    Location,
    Generic,
    Redirect,
    Token,
}

/// A message to or from the protocol server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub format: Format,
    #[serde(default)]
    pub subformat: String,
    #[serde(default)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submessages: Option<Vec<Message>>,
}

impl Message {
    /// Create a plain text/english message
    pub fn text<S: Into<String>>(content: S) -> Self {
        Message {
            format: Format::Text,
            subformat: SUBFORMAT_ENGLISH.to_string(),
            content: content.into(),
            label: None,
            control: None,
            submessages: None,
        }
    }

    /// Create a token submessage carrying a conversation identifier
    pub fn token<S: Into<String>>(conversation_id: S) -> Self {
        Message {
            format: Format::Token,
            subformat: SUBFORMAT_CONVERSATION_ID.to_string(),
            content: conversation_id.into(),
            label: None,
            control: None,
            submessages: None,
        }
    }

    /// Create a structured/uri submessage pointing at an external target
    pub fn uri<S: Into<String>>(url: S) -> Self {
        Message {
            format: Format::Structured,
            subformat: SUBFORMAT_URI.to_string(),
            content: url.into(),
            label: None,
            control: None,
            submessages: None,
        }
    }

    /// Create the redirect control message broadcast during fan-out
    pub fn redirect(submessages: Vec<Message>) -> Self {
        Message {
            format: Format::Redirect,
            subformat: SUBFORMAT_ENGLISH.to_string(),
            content: "redirect message".to_string(),
            label: None,
            control: Some(true),
            submessages: Some(submessages),
        }
    }

    /// Attribute the message to a backend or control route
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Mark the message as protocol control rather than end-user content
    pub fn with_control(mut self) -> Self {
        self.control = Some(true);
        self
    }

    pub fn with_submessages(mut self, submessages: Vec<Message>) -> Self {
        self.submessages = Some(submessages);
        self
    }

    pub fn is_control(&self) -> bool {
        self.control.unwrap_or(false)
    }

    /// The conversation identifier carried by the first token submessage, if any
    pub fn token_content(&self) -> Option<&str> {
        self.submessages
            .as_deref()?
            .iter()
            .find(|sub| sub.format == Format::Token)
            .map(|sub| sub.content.as_str())
    }

    /// Whether the subformat names a supported image type
    pub fn has_image_subformat(&self) -> bool {
        let subformat = self.subformat.to_lowercase();
        IMAGE_SUBFORMATS.contains(&subformat.as_str())
    }
}
