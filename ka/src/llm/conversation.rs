//! Conversation - append-only message history for one session

use serde::Serialize;
use tracing::debug;

use super::{Message, Role};

/// Ordered, append-only sequence of messages
///
/// A run borrows the conversation mutably for its whole duration, so only
/// one run can ever grow a given history. Messages are never reordered or
/// edited once pushed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        debug!(role = ?message.role, len = self.messages.len(), "Conversation::push: called");
        self.messages.push(message);
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Find the tool result answering `call_id`
    ///
    /// Locates the latest assistant message that issued the call and returns
    /// the matching tool message from the exchange that follows it.
    pub fn tool_result_for(&self, call_id: &str) -> Option<&Message> {
        debug!(%call_id, "Conversation::tool_result_for: called");
        let issued_at = self.messages.iter().rposition(|m| m.issued_call(call_id))?;

        self.messages[issued_at + 1..]
            .iter()
            .take_while(|m| m.role == Role::Tool)
            .find(|m| m.tool_call_id.as_deref() == Some(call_id))
    }

    /// Index of the first tool result that does not answer a call from the
    /// assistant message directly preceding its exchange
    pub fn first_uncorrelated(&self) -> Option<usize> {
        debug!(len = self.messages.len(), "Conversation::first_uncorrelated: called");
        let mut issuer: Option<&Message> = None;

        for (i, msg) in self.messages.iter().enumerate() {
            match msg.role {
                Role::Tool => {
                    let answered = match (issuer, msg.tool_call_id.as_deref()) {
                        (Some(assistant), Some(id)) => assistant.issued_call(id),
                        _ => false,
                    };
                    if !answered {
                        debug!(index = i, "Conversation::first_uncorrelated: found uncorrelated result");
                        return Some(i);
                    }
                }
                Role::Assistant => issuer = Some(msg),
                Role::User => issuer = None,
            }
        }

        None
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
