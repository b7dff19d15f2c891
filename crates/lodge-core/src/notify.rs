//! Consumes the events the membership and messaging engines produce and
//! fans the rendered notifications out to the affected users. Delivery is
//! synchronous: the store is single-writer, so an event is applied inside
//! the same mutation that produced it.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use lodge_store::{Store, WorkspaceData};
use lodge_types::api::NotificationsResponse;
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::events::WorkspaceEvent;
use lodge_types::models::{Conversation, Notification};

use crate::identity;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)").unwrap());

/// How much of a message a tag notification quotes.
const TAG_PREVIEW_CHARS: usize = 20;

/// At most this many notifications are returned, most-recent-first.
const FEED_LIMIT: usize = 20;

pub(crate) fn apply(data: &mut WorkspaceData, event: &WorkspaceEvent) {
    match event {
        WorkspaceEvent::MemberAdded {
            inviter,
            target,
            conversation_id,
        } => {
            let Some(note) = added_notification(data, *inviter, *conversation_id) else {
                return;
            };
            if let Some(user) = data.user_mut(*target) {
                user.notifications.insert(0, note);
            }
        }
        WorkspaceEvent::MessagePosted {
            sender,
            conversation_id,
            text,
        } => {
            let Some((note, targets)) = tag_notification(data, *sender, *conversation_id, text)
            else {
                return;
            };
            for target in targets {
                if let Some(user) = data.user_mut(target) {
                    user.notifications.insert(0, note.clone());
                }
            }
        }
    }
}

pub fn notifications_get(store: &Store, token: &str) -> Result<NotificationsResponse> {
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        let user = data
            .user(caller)
            .ok_or_else(|| WorkspaceError::denied("account no longer exists"))?;
        Ok(NotificationsResponse {
            notifications: user.notifications.iter().take(FEED_LIMIT).cloned().collect(),
        })
    })
}

fn added_notification(
    data: &WorkspaceData,
    inviter: i64,
    conversation_id: i64,
) -> Option<Notification> {
    let conv = data.conversation(conversation_id)?;
    let inviter = data.user(inviter)?;
    Some(render(
        conv,
        format!("{} added you to {}", inviter.handle_str, conv.name),
    ))
}

/// Scans the text for `@handle` tokens. Only handles belonging to current
/// members of the destination notify; an unknown or non-member handle is
/// silently ignored, and a handle mentioned twice notifies once.
fn tag_notification(
    data: &WorkspaceData,
    sender: i64,
    conversation_id: i64,
    text: &str,
) -> Option<(Notification, Vec<i64>)> {
    if !text.contains('@') {
        return None;
    }
    let conv = data.conversation(conversation_id)?;
    let sender = data.user(sender)?;

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for cap in TAG_RE.captures_iter(text) {
        let handle = &cap[1];
        if !seen.insert(handle.to_string()) {
            continue;
        }
        if let Some(user) = data.user_by_handle(handle) {
            if conv.is_member(user.u_id) {
                targets.push(user.u_id);
            }
        }
    }
    if targets.is_empty() {
        return None;
    }

    let preview: String = text.chars().take(TAG_PREVIEW_CHARS).collect();
    let note = render(
        conv,
        format!("{} tagged you in {}: {}", sender.handle_str, conv.name, preview),
    );
    Some((note, targets))
}

fn render(conv: &Conversation, notification_message: String) -> Notification {
    let (channel_id, dm_id) = if conv.is_dm() {
        (-1, conv.id)
    } else {
        (conv.id, -1)
    };
    Notification {
        channel_id,
        dm_id,
        notification_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::register;
    use crate::{membership, messaging};

    fn setup() -> (Store, String, i64, String, i64) {
        let store = Store::in_memory();
        let a = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let b = register(&store, "bob@mail.com", "password", "Bob", "Banana").unwrap();
        (store, a.token, a.auth_user_id, b.token, b.auth_user_id)
    }

    #[test]
    fn invite_notifies_the_added_user() {
        let (store, a_token, _, b_token, b_id) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();
        membership::invite(&store, &a_token, created.channel_id, b_id).unwrap();

        let feed = notifications_get(&store, &b_token).unwrap();
        assert_eq!(feed.notifications.len(), 1);
        let note = &feed.notifications[0];
        assert_eq!(note.notification_message, "aliceapple added you to general");
        assert_eq!(note.channel_id, created.channel_id);
        assert_eq!(note.dm_id, -1);
    }

    #[test]
    fn tagging_a_member_notifies_with_20_char_preview() {
        let (store, a_token, _, b_token, b_id) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();
        membership::invite(&store, &a_token, created.channel_id, b_id).unwrap();

        let text = "@bobbanana this line runs well past the preview cut";
        messaging::send(&store, &a_token, created.channel_id, text).unwrap();

        let feed = notifications_get(&store, &b_token).unwrap();
        // invite notification plus the tag, most recent first
        assert_eq!(feed.notifications.len(), 2);
        assert_eq!(
            feed.notifications[0].notification_message,
            "aliceapple tagged you in general: @bobbanana this line"
        );
    }

    #[test]
    fn tagging_a_non_member_is_silent() {
        let (store, a_token, _, b_token, _) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();

        messaging::send(&store, &a_token, created.channel_id, "hi @bobbanana").unwrap();
        messaging::send(&store, &a_token, created.channel_id, "hi @nobodyatall").unwrap();

        let feed = notifications_get(&store, &b_token).unwrap();
        assert!(feed.notifications.is_empty());
    }

    #[test]
    fn repeated_tags_notify_once() {
        let (store, a_token, _, b_token, b_id) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();
        membership::invite(&store, &a_token, created.channel_id, b_id).unwrap();

        messaging::send(&store, &a_token, created.channel_id, "@bobbanana @bobbanana").unwrap();

        let feed = notifications_get(&store, &b_token).unwrap();
        assert_eq!(feed.notifications.len(), 2); // invite + one tag
    }

    #[test]
    fn feed_caps_at_twenty() {
        let (store, a_token, _, b_token, b_id) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();
        membership::invite(&store, &a_token, created.channel_id, b_id).unwrap();

        for i in 0..25 {
            messaging::send(
                &store,
                &a_token,
                created.channel_id,
                &format!("ping {i} @bobbanana"),
            )
            .unwrap();
        }

        let feed = notifications_get(&store, &b_token).unwrap();
        assert_eq!(feed.notifications.len(), 20);
        // newest first
        assert!(
            feed.notifications[0]
                .notification_message
                .contains("ping 24")
        );
    }

    #[test]
    fn self_tag_notifies_the_sender() {
        let (store, a_token, ..) = setup();
        let created = membership::create(&store, &a_token, "general", true).unwrap();
        messaging::send(&store, &a_token, created.channel_id, "note to @aliceapple").unwrap();

        let feed = notifications_get(&store, &a_token).unwrap();
        assert_eq!(feed.notifications.len(), 1);
    }
}
