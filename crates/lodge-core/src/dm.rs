//! Direct messages are conversations with a derived name and no
//! visibility flag. Everything here funnels into the membership and
//! messaging engines; only creation, listing, and hard removal differ.

use tracing::info;

use lodge_store::Store;
use lodge_types::api::{
    DmCreateResponse, DmDetailsResponse, DmListResponse, DmSummary, MessagesResponse,
};
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::models::ConversationKind;

use crate::{identity, membership, messaging};

/// Creates a DM between the caller and `u_ids`. The name is every
/// participant's handle, sorted and comma-joined. Invitees are added
/// through the ordinary invite path one by one, so a failure partway
/// leaves the DM with the invitees added so far.
pub fn create(store: &Store, token: &str, u_ids: &[i64]) -> Result<DmCreateResponse> {
    let dm_name = store.with_data(|data| {
        let creator = identity::resolve(data, token)?;
        let mut handles = vec![identity::existing_user(data, creator)?.handle_str.clone()];
        for &u_id in u_ids {
            handles.push(identity::existing_user(data, u_id)?.handle_str.clone());
        }
        handles.sort();
        Ok(handles.join(","))
    })?;

    let dm_id = store.with_data_mut(|data| {
        let creator = identity::resolve(data, token)?;
        membership::create_in(data, creator, &dm_name, ConversationKind::DirectMessage)
    })?;

    for &u_id in u_ids {
        membership::invite(store, token, dm_id, u_id)?;
    }

    Ok(DmCreateResponse { dm_id, dm_name })
}

/// DMs the caller belongs to.
pub fn list(store: &Store, token: &str) -> Result<DmListResponse> {
    store.with_data(|data| {
        let caller = identity::resolve(data, token)?;
        Ok(DmListResponse {
            dms: data
                .conversations
                .iter()
                .filter(|c| c.is_dm() && c.is_member(caller))
                .map(|c| DmSummary {
                    dm_id: c.id,
                    dm_name: c.name.clone(),
                })
                .collect(),
        })
    })
}

pub fn details(store: &Store, token: &str, dm_id: i64) -> Result<DmDetailsResponse> {
    let details = membership::details(store, token, dm_id)?;
    Ok(DmDetailsResponse {
        name: details.channel_name,
        members: details.all_members,
    })
}

pub fn invite(store: &Store, token: &str, dm_id: i64, u_id: i64) -> Result<()> {
    membership::invite(store, token, dm_id, u_id)
}

pub fn leave(store: &Store, token: &str, dm_id: i64) -> Result<()> {
    membership::leave(store, token, dm_id)
}

pub fn messages(store: &Store, token: &str, dm_id: i64, start: i64) -> Result<MessagesResponse> {
    messaging::messages(store, token, dm_id, start)
}

/// Hard-deletes the DM and its messages. Only the creator (the first
/// owner) may do this; its id becomes free for reuse.
pub fn remove(store: &Store, token: &str, dm_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        let index = data
            .conversations
            .iter()
            .position(|c| c.id == dm_id)
            .ok_or_else(|| WorkspaceError::invalid("dm_id is not valid"))?;
        if data.conversations[index].creator() != Some(caller) {
            return Err(WorkspaceError::denied("only the creator may remove a dm"));
        }
        data.conversations.remove(index);
        info!(dm_id, "removed dm");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::register;
    use crate::notify;

    fn setup() -> (Store, String, i64, String, i64, String, i64) {
        let store = Store::in_memory();
        let a = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let b = register(&store, "bob@mail.com", "password", "Bob", "Banana").unwrap();
        let c = register(&store, "caro@mail.com", "password", "Caro", "Cherry").unwrap();
        (
            store,
            a.token,
            a.auth_user_id,
            b.token,
            b.auth_user_id,
            c.token,
            c.auth_user_id,
        )
    }

    #[test]
    fn dm_name_is_sorted_handles() {
        let (store, _, a_id, _, b_id, c_token, _) = setup();
        // caro creates it, but the name sorts all three handles
        let dm = create(&store, &c_token, &[a_id, b_id]).unwrap();
        assert_eq!(dm.dm_name, "aliceapple,bobbanana,carocherry");
    }

    #[test]
    fn members_see_the_dm_others_do_not() {
        let (store, a_token, _, b_token, b_id, c_token, _) = setup();
        let dm = create(&store, &a_token, &[b_id]).unwrap();

        let b_dms = list(&store, &b_token).unwrap();
        assert_eq!(b_dms.dms.len(), 1);
        assert_eq!(b_dms.dms[0].dm_id, dm.dm_id);

        // an uninvolved user sees nothing and reads nothing
        assert!(list(&store, &c_token).unwrap().dms.is_empty());
        assert!(details(&store, &c_token, dm.dm_id).is_err());

        let seen = details(&store, &b_token, dm.dm_id).unwrap();
        assert_eq!(seen.name, dm.dm_name);
        assert_eq!(seen.members.len(), 2);
    }

    #[test]
    fn dms_do_not_show_up_as_channels() {
        let (store, a_token, _, _, b_id, ..) = setup();
        create(&store, &a_token, &[b_id]).unwrap();
        assert!(crate::membership::list(&store, &a_token).unwrap().channels.is_empty());
    }

    #[test]
    fn creation_invites_notify_once_each() {
        let (store, a_token, _, b_token, b_id, ..) = setup();
        let dm = create(&store, &a_token, &[b_id]).unwrap();

        let feed = notify::notifications_get(&store, &b_token).unwrap();
        assert_eq!(feed.notifications.len(), 1);
        let note = &feed.notifications[0];
        assert_eq!(
            note.notification_message,
            format!("aliceapple added you to {}", dm.dm_name)
        );
        assert_eq!(note.channel_id, -1);
        assert_eq!(note.dm_id, dm.dm_id);
    }

    #[test]
    fn create_rejects_unknown_participants() {
        let (store, a_token, ..) = setup();
        assert!(create(&store, &a_token, &[99]).is_err());
        // nothing was created
        assert!(list(&store, &a_token).unwrap().dms.is_empty());
    }

    #[test]
    fn only_the_creator_removes_a_dm() {
        let (store, a_token, _, b_token, b_id, ..) = setup();
        let dm = create(&store, &a_token, &[b_id]).unwrap();

        let err = remove(&store, &b_token, dm.dm_id).unwrap_err();
        assert!(matches!(err, WorkspaceError::AccessDenied(_)));
        assert!(remove(&store, &a_token, 99).is_err());

        remove(&store, &a_token, dm.dm_id).unwrap();
        assert!(list(&store, &a_token).unwrap().dms.is_empty());
        // the freed id is reclaimed by the next conversation
        let next = create(&store, &a_token, &[b_id]).unwrap();
        assert_eq!(next.dm_id, dm.dm_id);
    }

    #[test]
    fn leave_keeps_the_dm_alive() {
        let (store, a_token, _, b_token, b_id, ..) = setup();
        let dm = create(&store, &a_token, &[b_id]).unwrap();

        leave(&store, &b_token, dm.dm_id).unwrap();
        assert!(list(&store, &b_token).unwrap().dms.is_empty());
        assert_eq!(details(&store, &a_token, dm.dm_id).unwrap().members.len(), 1);
    }
}
