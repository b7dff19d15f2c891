use std::collections::HashSet;

use lodge_types::models::{Conversation, User};

use crate::WorkspaceData;

impl WorkspaceData {
    // -- Users --

    pub fn user(&self, u_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.u_id == u_id)
    }

    pub fn user_mut(&mut self, u_id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.u_id == u_id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_handle(&self, handle: &str) -> Option<&User> {
        self.users.iter().find(|u| u.handle_str == handle)
    }

    /// Resolves an opaque session token to its owning user. Scans every
    /// user's active sessions; an invalidated token matches nothing.
    pub fn user_by_token(&self, token: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.sessions.iter().any(|s| s.token == token))
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    pub fn handle_taken(&self, handle: &str) -> bool {
        self.users.iter().any(|u| u.handle_str == handle)
    }

    // -- Conversations --

    pub fn conversation(&self, id: i64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn conversation_mut(&mut self, id: i64) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Finds a message anywhere in the workspace, returning indices into
    /// `conversations` and that conversation's `messages`.
    pub fn locate_message(&self, message_id: i64) -> Option<(usize, usize)> {
        self.conversations.iter().enumerate().find_map(|(ci, c)| {
            c.messages
                .iter()
                .position(|m| m.message_id == message_id)
                .map(|mi| (ci, mi))
        })
    }

    // -- Id allocation --
    //
    // Ids are the smallest positive integer not currently in use, so ids
    // freed by removal are reclaimed.

    pub fn next_user_id(&self) -> i64 {
        smallest_free(self.users.iter().map(|u| u.u_id))
    }

    pub fn next_conversation_id(&self) -> i64 {
        smallest_free(self.conversations.iter().map(|c| c.id))
    }

    /// Message ids are unique across every conversation, not per channel.
    pub fn next_message_id(&self) -> i64 {
        smallest_free(
            self.conversations
                .iter()
                .flat_map(|c| c.messages.iter().map(|m| m.message_id)),
        )
    }
}

fn smallest_free(used: impl Iterator<Item = i64>) -> i64 {
    let used: HashSet<i64> = used.collect();
    let mut id = 1;
    while used.contains(&id) {
        id += 1;
    }
    id
}
