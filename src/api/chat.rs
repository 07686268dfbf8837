//! Chat session state and wire types
//!
//! The session keeps a per-run transcript and an opaque session identifier
//! that is sent with every request. Network failures never surface as
//! errors to the chat view; a fixed fallback assistant message is appended
//! instead, so the transcript is the only error-visible channel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on displayed suggestions.
pub const MAX_SUGGESTIONS: usize = 3;

/// Assistant message appended when a chat request fails.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. `image` is a bare base64 payload (no data-URL
/// prefix), present only on user messages that carried one.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub image: Option<String>,
}

/// Body of a chat POST.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Response of the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of the server-side history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Per-run conversation state.
pub struct ChatSession {
    session_id: String,
    pub transcript: Vec<ChatMessage>,
    pub suggestions: Vec<String>,
    /// A request is in flight; send and camera controls are disabled.
    pub pending: bool,
}

impl ChatSession {
    /// New session with a fresh random identifier.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            transcript: Vec::new(),
            suggestions: Vec::new(),
            pending: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Build the request for a send, or `None` when there is nothing to
    /// send (empty text and no image - no request is issued).
    ///
    /// Any `data:*;base64,` prefix is stripped from the image payload.
    pub fn prepare_request(&self, text: &str, image: Option<&str>) -> Option<ChatRequest> {
        let message = text.trim();
        let image = image.map(strip_data_url_prefix).filter(|i| !i.is_empty());
        if message.is_empty() && image.is_none() {
            return None;
        }
        Some(ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone(),
            image,
        })
    }

    /// Append the user's side of an exchange.
    pub fn push_user(&mut self, request: &ChatRequest) {
        self.transcript.push(ChatMessage {
            role: Role::User,
            text: request.message.clone(),
            image: request.image.clone(),
        });
    }

    /// Append the assistant's reply; failures and unsuccessful replies both
    /// become the fallback message. A reply may also refresh the
    /// suggestion list.
    pub fn apply_reply(&mut self, reply: Option<ChatReply>) {
        let (text, suggestions) = match reply {
            Some(reply) if reply.success => (
                reply
                    .response
                    .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
                reply.suggestions,
            ),
            Some(reply) => {
                if let Some(error) = reply.error {
                    tracing::warn!(%error, "chat endpoint reported an error");
                }
                (FALLBACK_REPLY.to_string(), None)
            }
            None => (FALLBACK_REPLY.to_string(), None),
        };
        self.transcript.push(ChatMessage {
            role: Role::Assistant,
            text,
            image: None,
        });
        if let Some(suggestions) = suggestions {
            self.set_suggestions(suggestions);
        }
    }

    /// Replace the suggestion list, capped at [`MAX_SUGGESTIONS`].
    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
        self.suggestions.truncate(MAX_SUGGESTIONS);
    }

    /// Drop the local transcript (the server side is cleared separately).
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Replace the transcript with server-side history entries.
    pub fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.transcript = entries
            .into_iter()
            .filter_map(|e| {
                let role = match e.role.as_str() {
                    "user" => Role::User,
                    "assistant" => Role::Assistant,
                    _ => return None,
                };
                Some(ChatMessage {
                    role,
                    text: e.content,
                    image: None,
                })
            })
            .collect();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove a `data:<mime>;base64,` prefix if present.
fn strip_data_url_prefix(image: &str) -> String {
    if image.starts_with("data:")
        && let Some(idx) = image.find("base64,")
    {
        image[idx + "base64,".len()..].to_string()
    } else {
        image.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_and_no_image_is_a_no_op() {
        let session = ChatSession::new();
        assert_eq!(session.prepare_request("", None), None);
        assert_eq!(session.prepare_request("   \n", None), None);
    }

    #[test]
    fn request_carries_session_id_and_trimmed_text() {
        let session = ChatSession::new();
        let req = session.prepare_request("  hello  ", None).unwrap();
        assert_eq!(req.message, "hello");
        assert_eq!(req.session_id, session.session_id());
        assert_eq!(req.image, None);
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let session = ChatSession::new();
        let req = session
            .prepare_request("", Some("data:image/jpeg;base64,AAAA"))
            .unwrap();
        assert_eq!(req.image.as_deref(), Some("AAAA"));

        // Bare payloads pass through untouched.
        let req = session.prepare_request("", Some("BBBB")).unwrap();
        assert_eq!(req.image.as_deref(), Some("BBBB"));
    }

    #[test]
    fn failed_send_appends_fallback_to_transcript() {
        let mut session = ChatSession::new();
        session.apply_reply(None);
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].role, Role::Assistant);
        assert_eq!(session.transcript[0].text, FALLBACK_REPLY);

        session.apply_reply(Some(ChatReply {
            success: false,
            response: None,
            suggestions: None,
            error: Some("boom".to_string()),
        }));
        assert_eq!(session.transcript[1].text, FALLBACK_REPLY);
        assert!(session.suggestions.is_empty());
    }

    #[test]
    fn successful_reply_is_appended_verbatim() {
        let mut session = ChatSession::new();
        session.apply_reply(Some(ChatReply {
            success: true,
            response: Some("There are 42 kangaroo specimens.".to_string()),
            suggestions: None,
            error: None,
        }));
        assert_eq!(session.transcript[0].text, "There are 42 kangaroo specimens.");
    }

    #[test]
    fn reply_suggestions_replace_the_list_capped() {
        let mut session = ChatSession::new();
        session.set_suggestions(vec!["old".into()]);
        session.apply_reply(Some(ChatReply {
            success: true,
            response: Some("ok".to_string()),
            suggestions: Some(vec!["1".into(), "2".into(), "3".into(), "4".into()]),
            error: None,
        }));
        assert_eq!(session.suggestions, vec!["1", "2", "3"]);
    }

    #[test]
    fn suggestions_are_capped_at_three() {
        let mut session = ChatSession::new();
        session.set_suggestions(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
            "e".into(),
        ]);
        assert_eq!(session.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(session.suggestions, vec!["a", "b", "c"]);
    }

    #[test]
    fn history_replaces_transcript_and_skips_other_roles() {
        let mut session = ChatSession::new();
        session.apply_reply(None);
        session.replace_history(vec![
            HistoryEntry {
                role: "user".to_string(),
                content: "hi".to_string(),
            },
            HistoryEntry {
                role: "tool".to_string(),
                content: "ignored".to_string(),
            },
            HistoryEntry {
                role: "assistant".to_string(),
                content: "hello".to_string(),
            },
        ]);
        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[0].role, Role::User);
        assert_eq!(session.transcript[1].text, "hello");
    }

    #[test]
    fn session_ids_are_unique_per_run() {
        assert_ne!(ChatSession::new().session_id(), ChatSession::new().session_id());
    }
}
