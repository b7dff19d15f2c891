//! Channel membership: create, invite, join, leave, owner add/remove,
//! details, and the two listings. DM operations share these through the
//! `_in` entry points so both paths enforce one rule set.

use tracing::info;

use lodge_store::{Store, WorkspaceData};
use lodge_types::api::{
    ChannelCreateResponse, ChannelDetailsResponse, ChannelsListResponse, ConversationSummary,
};
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::events::WorkspaceEvent;
use lodge_types::models::{Conversation, ConversationKind};

use crate::{identity, notify, users};

pub fn create(store: &Store, token: &str, name: &str, is_public: bool) -> Result<ChannelCreateResponse> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let channel_id = create_in(data, caller, name, ConversationKind::Channel { is_public })?;
        Ok(ChannelCreateResponse { channel_id })
    })
}

/// Creates a conversation with the caller as sole owner and sole member.
/// Channel names are capped at 20 chars; DM names are the comma-joined
/// handles and have no cap.
pub(crate) fn create_in(
    data: &mut WorkspaceData,
    caller: i64,
    name: &str,
    kind: ConversationKind,
) -> Result<i64> {
    if name.is_empty() {
        return Err(WorkspaceError::invalid("name must not be empty"));
    }
    if matches!(kind, ConversationKind::Channel { .. }) && name.chars().count() > 20 {
        return Err(WorkspaceError::invalid(
            "name must be no longer than 20 characters",
        ));
    }

    let id = data.next_conversation_id();
    data.conversations.push(Conversation {
        id,
        name: name.to_string(),
        kind,
        owner_members: vec![caller],
        all_members: vec![caller],
        messages: Vec::new(),
    });
    info!(id, "created conversation");
    Ok(id)
}

pub fn invite(store: &Store, token: &str, channel_id: i64, u_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        invite_in(data, caller, channel_id, u_id)
    })
}

/// Adds `u_id` to the member list and notifies them. DM creation funnels
/// its implicit invites through here too, so each added member is told
/// exactly once.
pub(crate) fn invite_in(
    data: &mut WorkspaceData,
    inviter: i64,
    conversation_id: i64,
    u_id: i64,
) -> Result<()> {
    identity::existing_user(data, u_id)?;
    let conv = conversation(data, conversation_id)?;
    if !conv.is_member(inviter) {
        return Err(WorkspaceError::denied(
            "caller is not a member of the channel",
        ));
    }
    if conv.is_member(u_id) {
        return Err(WorkspaceError::invalid("user is already a member"));
    }

    if let Some(conv) = data.conversation_mut(conversation_id) {
        conv.all_members.push(u_id);
    }
    notify::apply(
        data,
        &WorkspaceEvent::MemberAdded {
            inviter,
            target: u_id,
            conversation_id,
        },
    );
    Ok(())
}

pub fn join(store: &Store, token: &str, channel_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let conv = conversation(data, channel_id)?;
        if conv.is_member(caller) {
            return Err(WorkspaceError::invalid("user is already a member"));
        }
        if !conv.is_public() && !identity::is_global_owner(data, caller) {
            return Err(WorkspaceError::denied("channel is private"));
        }
        if let Some(conv) = data.conversation_mut(channel_id) {
            conv.all_members.push(caller);
        }
        Ok(())
    })
}

/// Removes the caller from both member lists. The conversation and its
/// messages persist, and may be left ownerless.
pub fn leave(store: &Store, token: &str, conversation_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let conv = conversation(data, conversation_id)?;
        if !conv.is_member(caller) {
            return Err(WorkspaceError::denied(
                "caller is not a member of the channel",
            ));
        }
        if let Some(conv) = data.conversation_mut(conversation_id) {
            conv.all_members.retain(|&m| m != caller);
            conv.owner_members.retain(|&m| m != caller);
        }
        Ok(())
    })
}

pub fn add_owner(store: &Store, token: &str, channel_id: i64, u_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        identity::existing_user(data, u_id)?;
        let conv = conversation(data, channel_id)?;
        if conv.is_owner(u_id) {
            return Err(WorkspaceError::invalid("user is already an owner"));
        }
        // owners must first be members
        if !conv.is_member(u_id) {
            return Err(WorkspaceError::invalid("user is not a member"));
        }
        if !conv.is_owner(caller) && !identity::is_global_owner(data, caller) {
            return Err(WorkspaceError::denied(
                "caller is not an owner of the channel",
            ));
        }
        if let Some(conv) = data.conversation_mut(channel_id) {
            conv.owner_members.push(u_id);
        }
        Ok(())
    })
}

pub fn remove_owner(store: &Store, token: &str, channel_id: i64, u_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let conv = conversation(data, channel_id)?;
        if !conv.is_owner(u_id) {
            return Err(WorkspaceError::invalid("user is not an owner"));
        }
        if conv.owner_members.len() == 1 {
            return Err(WorkspaceError::invalid(
                "user is the only owner of the channel",
            ));
        }
        if !conv.is_owner(caller) && !identity::is_global_owner(data, caller) {
            return Err(WorkspaceError::denied(
                "caller is not an owner of the channel",
            ));
        }
        if let Some(conv) = data.conversation_mut(channel_id) {
            conv.owner_members.retain(|&m| m != u_id);
        }
        Ok(())
    })
}

pub fn details(store: &Store, token: &str, conversation_id: i64) -> Result<ChannelDetailsResponse> {
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        let conv = conversation(data, conversation_id)?;
        if !conv.is_member(caller) {
            return Err(WorkspaceError::denied(
                "caller is not a member of the channel",
            ));
        }
        Ok(ChannelDetailsResponse {
            channel_name: conv.name.clone(),
            is_public: conv.is_public(),
            owner_members: users::profiles(data, &conv.owner_members),
            all_members: users::profiles(data, &conv.all_members),
        })
    })
}

/// Channels the caller belongs to.
pub fn list(store: &Store, token: &str) -> Result<ChannelsListResponse> {
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        Ok(ChannelsListResponse {
            channels: summaries(data, |c| !c.is_dm() && c.is_member(caller)),
        })
    })
}

/// Every channel in the workspace, membership notwithstanding.
pub fn listall(store: &Store, token: &str) -> Result<ChannelsListResponse> {
    store.with_data(|data| {
        identity::resolve(data, token)?;
        Ok(ChannelsListResponse {
            channels: summaries(data, |c| !c.is_dm()),
        })
    })
}

fn summaries(data: &WorkspaceData, keep: impl Fn(&Conversation) -> bool) -> Vec<ConversationSummary> {
    data.conversations
        .iter()
        .filter(|c| keep(c))
        .map(|c| ConversationSummary {
            channel_id: c.id,
            channel_name: c.name.clone(),
        })
        .collect()
}

fn conversation(data: &WorkspaceData, id: i64) -> Result<&Conversation> {
    data.conversation(id)
        .ok_or_else(|| WorkspaceError::invalid("channel_id is not valid"))
}
