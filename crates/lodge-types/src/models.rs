use serde::{Deserialize, Serialize};

/// Sentinel written into both name fields (and redacted message text) when an
/// account is removed. Accounts are never hard-deleted.
pub const REMOVED_USER: &str = "Removed user";

/// Workspace-wide permission level. Exactly the first registered user starts
/// as `Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Owner,
    Member,
}

/// One active login. The token is an opaque identifier handed to the client;
/// session ids are the smallest positive integer not already active for the
/// user, so multi-device logins coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: i64,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub u_id: i64,
    pub email: String,
    /// Argon2 PHC string, never plaintext.
    pub password: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub permission: Permission,
    pub sessions: Vec<Session>,
    /// Most-recent-first.
    pub notifications: Vec<Notification>,
}

impl User {
    pub fn is_removed(&self) -> bool {
        self.name_first == REMOVED_USER && self.name_last == REMOVED_USER
    }

    pub fn is_global_owner(&self) -> bool {
        self.permission == Permission::Owner
    }
}

impl Permission {
    /// Wire encoding used by the admin endpoints: 1 = owner, 2 = member.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Owner),
            2 => Some(Self::Member),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Self::Owner => 1,
            Self::Member => 2,
        }
    }
}

/// Discriminates the two conversation flavours sharing one member/message
/// substructure. DMs have no visibility flag; their name is derived from the
/// sorted member handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationKind {
    Channel { is_public: bool },
    DirectMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub name: String,
    pub kind: ConversationKind,
    /// Always a subset of `all_members`.
    pub owner_members: Vec<i64>,
    pub all_members: Vec<i64>,
    /// Append order is chronological.
    pub messages: Vec<Message>,
}

impl Conversation {
    #[inline]
    pub fn is_dm(&self) -> bool {
        matches!(self.kind, ConversationKind::DirectMessage)
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        matches!(self.kind, ConversationKind::Channel { is_public: true })
    }

    pub fn is_member(&self, u_id: i64) -> bool {
        self.all_members.contains(&u_id)
    }

    pub fn is_owner(&self, u_id: i64) -> bool {
        self.owner_members.contains(&u_id)
    }

    /// The creator is the first owner; only they may hard-delete a DM.
    pub fn creator(&self) -> Option<i64> {
        self.owner_members.first().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub u_id: i64,
    pub message: String,
    /// Unix seconds.
    pub time_created: i64,
}

/// Exactly one of `channel_id` / `dm_id` is -1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub channel_id: i64,
    pub dm_id: i64,
    pub notification_message: String,
}
