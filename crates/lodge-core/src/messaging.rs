//! Message send/edit/remove/share, pagination, and search. Message ids are
//! globally unique across every conversation and minimally allocated, so
//! an id freed by deletion is reused.

use chrono::Utc;

use lodge_store::{Store, WorkspaceData};
use lodge_types::api::{MessageIdResponse, MessagesResponse, SearchResponse, ShareMessageResponse};
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::events::WorkspaceEvent;
use lodge_types::models::Message;

use crate::{identity, notify};

const MAX_MESSAGE_CHARS: usize = 1000;
const PAGE_SIZE: i64 = 50;

pub fn send(store: &Store, token: &str, channel_id: i64, message: &str) -> Result<MessageIdResponse> {
    store.with_data_mut(|data| {
        let sender = identity::resolve(data, token)?;
        let message_id = send_in(data, sender, channel_id, message)?;
        Ok(MessageIdResponse { message_id })
    })
}

/// The original delegates DM sends to the channel path without a kind
/// check; any conversation the caller belongs to accepts the message.
pub fn senddm(store: &Store, token: &str, dm_id: i64, message: &str) -> Result<MessageIdResponse> {
    send(store, token, dm_id, message)
}

pub(crate) fn send_in(
    data: &mut WorkspaceData,
    sender: i64,
    conversation_id: i64,
    text: &str,
) -> Result<i64> {
    check_length(text)?;
    {
        let conv = data
            .conversation(conversation_id)
            .ok_or_else(|| WorkspaceError::invalid("channel_id is not valid"))?;
        if !conv.is_member(sender) {
            return Err(WorkspaceError::denied(
                "caller is not a member of the channel",
            ));
        }
    }

    let message_id = data.next_message_id();
    if let Some(conv) = data.conversation_mut(conversation_id) {
        conv.messages.push(Message {
            message_id,
            u_id: sender,
            message: text.to_string(),
            time_created: Utc::now().timestamp(),
        });
    }
    notify::apply(
        data,
        &WorkspaceEvent::MessagePosted {
            sender,
            conversation_id,
            text: text.to_string(),
        },
    );
    Ok(message_id)
}

/// The author or an owner of the containing conversation may edit.
/// Editing to the empty string deletes the message; a non-empty edit
/// re-runs the tag scan.
pub fn edit(store: &Store, token: &str, message_id: i64, message: &str) -> Result<()> {
    store.with_data_mut(|data| {
        check_length(message)?;
        let editor = identity::resolve(data, token)?;
        let (ci, mi) = data
            .locate_message(message_id)
            .ok_or_else(|| WorkspaceError::invalid("message_id is not valid"))?;

        let conv = &data.conversations[ci];
        let author = conv.messages[mi].u_id;
        if editor != author && !conv.is_owner(editor) {
            return Err(WorkspaceError::denied(
                "caller is neither the author nor an owner",
            ));
        }
        let conversation_id = conv.id;

        if message.is_empty() {
            data.conversations[ci].messages.remove(mi);
            return Ok(());
        }
        data.conversations[ci].messages[mi].message = message.to_string();
        notify::apply(
            data,
            &WorkspaceEvent::MessagePosted {
                sender: editor,
                conversation_id,
                text: message.to_string(),
            },
        );
        Ok(())
    })
}

/// Stricter than edit: removal requires the caller to be the author AND
/// an owner of the containing conversation.
pub fn remove(store: &Store, token: &str, message_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let (ci, mi) = data
            .locate_message(message_id)
            .ok_or_else(|| WorkspaceError::invalid("message_id is not valid"))?;

        let conv = &data.conversations[ci];
        if conv.messages[mi].u_id != caller {
            return Err(WorkspaceError::denied("caller is not the author"));
        }
        if !conv.is_owner(caller) {
            return Err(WorkspaceError::denied(
                "caller is not an owner of the channel",
            ));
        }
        data.conversations[ci].messages.remove(mi);
        Ok(())
    })
}

/// Re-sends `"<original>, <extra>"` to exactly one destination. The caller
/// must be a member of the destination; membership of the original
/// conversation is not required.
pub fn share(
    store: &Store,
    token: &str,
    og_message_id: i64,
    message: &str,
    channel_id: i64,
    dm_id: i64,
) -> Result<ShareMessageResponse> {
    if (channel_id == -1) == (dm_id == -1) {
        return Err(WorkspaceError::invalid(
            "exactly one of channel_id and dm_id must be -1",
        ));
    }
    let destination = if channel_id == -1 { dm_id } else { channel_id };

    let og_message = store.with_data(|data| {
        identity::resolve(data, token)?;
        let (ci, mi) = data
            .locate_message(og_message_id)
            .ok_or_else(|| WorkspaceError::invalid("og_message_id is not valid"))?;
        Ok(data.conversations[ci].messages[mi].message.clone())
    })?;

    let sent = send(store, token, destination, &format!("{og_message}, {message}"))?;
    Ok(ShareMessageResponse {
        shared_message_id: sent.message_id,
    })
}

/// One page of up to 50 messages, most-recent-first from `start`. `end` is
/// -1 once the page reaches the oldest message, else `start + 50`.
pub fn messages(
    store: &Store,
    token: &str,
    conversation_id: i64,
    start: i64,
) -> Result<MessagesResponse> {
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        let conv = data
            .conversation(conversation_id)
            .ok_or_else(|| WorkspaceError::invalid("channel_id is not valid"))?;
        if !conv.is_member(caller) {
            return Err(WorkspaceError::denied(
                "caller is not a member of the channel",
            ));
        }

        let total = conv.messages.len() as i64;
        if start < 0 || start > total {
            return Err(WorkspaceError::invalid(
                "start is greater than the number of messages",
            ));
        }
        let end = if start + PAGE_SIZE > total {
            -1
        } else {
            start + PAGE_SIZE
        };

        Ok(MessagesResponse {
            messages: conv
                .messages
                .iter()
                .rev()
                .skip(start as usize)
                .take(PAGE_SIZE as usize)
                .cloned()
                .collect(),
            start,
            end,
        })
    })
}

/// Substring search over every conversation the caller belongs to.
pub fn search(store: &Store, token: &str, query_str: &str) -> Result<SearchResponse> {
    if query_str.chars().count() > MAX_MESSAGE_CHARS {
        return Err(WorkspaceError::invalid(
            "query_str is longer than 1000 characters",
        ));
    }
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        let mut messages = Vec::new();
        for conv in data.conversations.iter().filter(|c| c.is_member(caller)) {
            for message in &conv.messages {
                if message.message.contains(query_str) {
                    messages.push(message.clone());
                }
            }
        }
        Ok(SearchResponse { messages })
    })
}

fn check_length(text: &str) -> Result<()> {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(WorkspaceError::invalid(
            "message is longer than 1000 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::register;
    use crate::{dm, membership};

    fn setup() -> (Store, String, i64, String, i64) {
        let store = Store::in_memory();
        let a = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let b = register(&store, "bob@mail.com", "password", "Bob", "Banana").unwrap();
        (store, a.token, a.auth_user_id, b.token, b.auth_user_id)
    }

    fn channel(store: &Store, token: &str) -> i64 {
        membership::create(store, token, "general", true)
            .unwrap()
            .channel_id
    }

    #[test]
    fn empty_channel_pages_cleanly() {
        let (store, a_token, ..) = setup();
        let channel_id = channel(&store, &a_token);

        let page = messages(&store, &a_token, channel_id, 0).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.start, 0);
        assert_eq!(page.end, -1);

        assert!(messages(&store, &a_token, channel_id, 1).is_err());
    }

    #[test]
    fn pagination_walks_most_recent_first() {
        let (store, a_token, ..) = setup();
        let channel_id = channel(&store, &a_token);
        for i in 0..120 {
            send(&store, &a_token, channel_id, &format!("m{i}")).unwrap();
        }

        let first = messages(&store, &a_token, channel_id, 0).unwrap();
        assert_eq!(first.messages.len(), 50);
        assert_eq!(first.messages[0].message, "m119");
        assert_eq!(first.end, 50);

        let last = messages(&store, &a_token, channel_id, 100).unwrap();
        assert_eq!(last.messages.len(), 20);
        assert_eq!(last.messages[19].message, "m0");
        assert_eq!(last.end, -1);
    }

    #[test]
    fn send_validates_length_membership_and_channel() {
        let (store, a_token, _, b_token, _) = setup();
        let channel_id = channel(&store, &a_token);

        assert!(send(&store, &a_token, channel_id, &"x".repeat(1001)).is_err());
        assert!(send(&store, &a_token, 99, "hello").is_err());
        let err = send(&store, &b_token, channel_id, "hello").unwrap_err();
        assert!(matches!(err, WorkspaceError::AccessDenied(_)));

        send(&store, &a_token, channel_id, &"x".repeat(1000)).unwrap();
    }

    #[test]
    fn message_ids_are_global_and_minimal() {
        let (store, a_token, ..) = setup();
        let one = channel(&store, &a_token);
        let dm = dm::create(&store, &a_token, &[]).unwrap();
        assert_eq!(dm.dm_name, "aliceapple");

        let m1 = send(&store, &a_token, one, "first").unwrap();
        let m2 = senddm(&store, &a_token, dm.dm_id, "second").unwrap();
        assert_eq!(m1.message_id, 1);
        assert_eq!(m2.message_id, 2);

        // deleting frees the id for the next send anywhere
        edit(&store, &a_token, m1.message_id, "").unwrap();
        let m3 = send(&store, &a_token, one, "third").unwrap();
        assert_eq!(m3.message_id, 1);
    }

    #[test]
    fn empty_edit_deletes_the_message() {
        let (store, a_token, ..) = setup();
        let channel_id = channel(&store, &a_token);
        let sent = send(&store, &a_token, channel_id, "soon gone").unwrap();

        edit(&store, &a_token, sent.message_id, "").unwrap();

        let page = messages(&store, &a_token, channel_id, 0).unwrap();
        assert!(page.messages.iter().all(|m| m.message_id != sent.message_id));
        assert!(edit(&store, &a_token, sent.message_id, "back?").is_err());
    }

    #[test]
    fn author_or_owner_may_edit() {
        let (store, a_token, _, b_token, b_id) = setup();
        let channel_id = channel(&store, &a_token);
        membership::invite(&store, &a_token, channel_id, b_id).unwrap();
        let c = register(&store, "caro@mail.com", "password", "Caro", "Cherry").unwrap();
        membership::invite(&store, &a_token, channel_id, c.auth_user_id).unwrap();

        let sent = send(&store, &b_token, channel_id, "draft").unwrap();

        // another plain member may not touch it
        assert!(edit(&store, &c.token, sent.message_id, "hijack").is_err());
        // the author may
        edit(&store, &b_token, sent.message_id, "draft v2").unwrap();
        // and so may a channel owner
        edit(&store, &a_token, sent.message_id, "draft v3").unwrap();

        let page = messages(&store, &a_token, channel_id, 0).unwrap();
        assert_eq!(page.messages[0].message, "draft v3");
        assert_eq!(page.messages[0].u_id, b_id); // authorship preserved
    }

    #[test]
    fn remove_requires_author_and_owner() {
        let (store, a_token, _, b_token, b_id) = setup();
        let channel_id = channel(&store, &a_token);
        membership::invite(&store, &a_token, channel_id, b_id).unwrap();

        let theirs = send(&store, &b_token, channel_id, "from bob").unwrap();
        let mine = send(&store, &a_token, channel_id, "from alice").unwrap();

        // owner but not author
        assert!(remove(&store, &a_token, theirs.message_id).is_err());
        // author but not owner
        assert!(remove(&store, &b_token, theirs.message_id).is_err());
        // author and owner
        remove(&store, &a_token, mine.message_id).unwrap();
        assert!(remove(&store, &a_token, mine.message_id).is_err()); // gone

        let page = messages(&store, &a_token, channel_id, 0).unwrap();
        assert_eq!(page.messages.len(), 1);
    }

    #[test]
    fn share_composes_and_checks_destination_membership() {
        let (store, a_token, _, b_token, b_id) = setup();
        let channel_id = channel(&store, &a_token);
        let dm = dm::create(&store, &a_token, &[b_id]).unwrap();

        let og = send(&store, &a_token, channel_id, "original").unwrap();

        // both destinations set, or neither
        assert!(share(&store, &a_token, og.message_id, "x", channel_id, dm.dm_id).is_err());
        assert!(share(&store, &a_token, og.message_id, "x", -1, -1).is_err());
        // b is not in the channel
        assert!(share(&store, &b_token, og.message_id, "x", channel_id, -1).is_err());

        let shared = share(&store, &a_token, og.message_id, "see above", -1, dm.dm_id).unwrap();
        let page = messages(&store, &a_token, dm.dm_id, 0).unwrap();
        assert_eq!(page.messages[0].message_id, shared.shared_message_id);
        assert_eq!(page.messages[0].message, "original, see above");
    }

    #[test]
    fn search_is_scoped_to_memberships() {
        let (store, a_token, _, b_token, _) = setup();
        let mine = channel(&store, &a_token);
        let theirs = membership::create(&store, &b_token, "other", true)
            .unwrap()
            .channel_id;

        send(&store, &a_token, mine, "needle in here").unwrap();
        send(&store, &a_token, mine, "nothing else").unwrap();
        send(&store, &b_token, theirs, "needle elsewhere").unwrap();

        let found = search(&store, &a_token, "needle").unwrap();
        assert_eq!(found.messages.len(), 1);
        assert_eq!(found.messages[0].message, "needle in here");

        assert!(search(&store, &a_token, &"q".repeat(1001)).is_err());
    }
}
