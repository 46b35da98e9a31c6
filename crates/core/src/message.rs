//! Outbound messages and the per-turn outcome

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationState;

/// A numbered entry of an interactive list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOption {
    pub number: usize,
    pub title: String,
    pub detail: String,
}

/// A reply to send back through the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    List {
        header: String,
        options: Vec<ListOption>,
        footer: String,
    },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage::Text { body: body.into() }
    }

    /// Plain-text rendering for transports without rich lists
    pub fn render(&self) -> String {
        match self {
            OutboundMessage::Text { body } => body.clone(),
            OutboundMessage::List {
                header,
                options,
                footer,
            } => {
                let mut out = String::new();
                out.push_str(header);
                out.push_str("\n\n");
                for option in options {
                    out.push_str(&format!("{}. {}\n", option.number, option.title));
                    if !option.detail.is_empty() {
                        out.push_str(&option.detail);
                        out.push('\n');
                    }
                    out.push('\n');
                }
                out.push_str(footer);
                out
            },
        }
    }
}

/// Non-fatal conditions surfaced alongside the replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnNotice {
    /// Nothing in the message resolved to a catalog item
    RecoverableExtractionFailure,
    /// Some lines resolved, these labels did not
    UnresolvedItems { labels: Vec<String> },
    /// The provider gave no answer; a city centroid or the default was used
    LocationFallback { label: String },
    SelectionOutOfRange { max: usize },
    NoPendingOrder,
    /// The saved location options expired before a selection arrived
    ScratchExpired,
    StorageUnavailable,
}

/// Result of one inbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub customer_id: String,
    pub previous_state: ConversationState,
    pub state: ConversationState,
    pub messages: Vec<OutboundMessage>,
    pub notices: Vec<TurnNotice>,
}

impl TurnOutcome {
    pub fn has_notice(&self, notice: &TurnNotice) -> bool {
        self.notices.contains(notice)
    }

    /// All replies rendered and joined
    pub fn rendered(&self) -> String {
        self.messages
            .iter()
            .map(OutboundMessage::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_list() {
        let msg = OutboundMessage::List {
            header: "Pick one".into(),
            options: vec![
                ListOption {
                    number: 1,
                    title: "A".into(),
                    detail: "near".into(),
                },
                ListOption {
                    number: 2,
                    title: "B".into(),
                    detail: String::new(),
                },
            ],
            footer: "Reply with a number".into(),
        };
        assert_eq!(msg.render(), "Pick one\n\n1. A\nnear\n\n2. B\n\nReply with a number");
    }

    #[test]
    fn test_notice_json() {
        let json = serde_json::to_string(&TurnNotice::SelectionOutOfRange { max: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"selection_out_of_range","max":5}"#);
    }
}
