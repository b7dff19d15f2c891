use serde::{Deserialize, Serialize};

/// Events produced by the membership and messaging engines and consumed by
/// the notification engine. Delivery is synchronous and in-process — the
/// store is single-writer — but the engines never touch notification lists
/// directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WorkspaceEvent {
    /// A user was added to a conversation, by invite or by the implicit
    /// invites during DM creation.
    MemberAdded {
        inviter: i64,
        target: i64,
        conversation_id: i64,
    },

    /// A message was sent or edited; the notification engine scans its text
    /// for `@handle` tags.
    MessagePosted {
        sender: i64,
        conversation_id: i64,
        text: String,
    },
}
