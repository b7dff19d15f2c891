//! Profile reads and updates, plus the two global-owner administrative
//! operations. Accounts are never hard-deleted: removal overwrites the
//! name fields with a sentinel, redacts the user's messages in place, and
//! locks them out of authentication while their profile stays readable.

use tracing::info;

use lodge_store::{Store, WorkspaceData};
use lodge_types::api::{UserProfile, UsersAllResponse};
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::models::{Permission, REMOVED_USER, User};

use crate::identity;

pub fn profile(store: &Store, token: &str, u_id: i64) -> Result<UserProfile> {
    store.with_data(|data| {
        identity::resolve(data, token)?;
        Ok(profile_of(identity::any_user(data, u_id)?))
    })
}

/// Every account, removed ones included (with sentinel names).
pub fn all(store: &Store, token: &str) -> Result<UsersAllResponse> {
    store.with_data(|data| {
        identity::resolve(data, token)?;
        Ok(UsersAllResponse {
            users: data.users.iter().map(profile_of).collect(),
        })
    })
}

pub fn set_name(store: &Store, token: &str, name_first: &str, name_last: &str) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        if !identity::valid_name(name_first) {
            return Err(WorkspaceError::invalid(
                "name_first must be between 1 and 50 characters",
            ));
        }
        if !identity::valid_name(name_last) {
            return Err(WorkspaceError::invalid(
                "name_last must be between 1 and 50 characters",
            ));
        }
        let user = caller_mut(data, caller)?;
        user.name_first = name_first.to_string();
        user.name_last = name_last.to_string();
        Ok(())
    })
}

pub fn set_email(store: &Store, token: &str, email: &str) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        if !identity::valid_email(email) {
            return Err(WorkspaceError::invalid("email is not a valid address"));
        }
        if data.email_taken(email) {
            return Err(WorkspaceError::invalid("email is already registered"));
        }
        caller_mut(data, caller)?.email = email.to_string();
        Ok(())
    })
}

pub fn set_handle(store: &Store, token: &str, handle_str: &str) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        if !valid_handle(handle_str) {
            return Err(WorkspaceError::invalid(
                "handle must be 3 to 20 characters with no @ or spaces",
            ));
        }
        if data.handle_taken(handle_str) {
            return Err(WorkspaceError::invalid("handle is already in use"));
        }
        caller_mut(data, caller)?.handle_str = handle_str.to_string();
        Ok(())
    })
}

/// Soft-deletes an account: sentinel names, messages redacted in place
/// (ids and authorship preserved), login refused from then on. The last
/// global owner cannot be removed.
pub fn admin_user_remove(store: &Store, token: &str, u_id: i64) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        if !identity::is_global_owner(data, caller) {
            return Err(WorkspaceError::denied("caller is not a global owner"));
        }
        let target = identity::existing_user(data, u_id)?;
        if target.is_global_owner() && active_owner_count(data) == 1 {
            return Err(WorkspaceError::invalid("user is the only global owner"));
        }

        if let Some(target) = data.user_mut(u_id) {
            target.name_first = REMOVED_USER.to_string();
            target.name_last = REMOVED_USER.to_string();
        }
        for conv in &mut data.conversations {
            for message in conv.messages.iter_mut().filter(|m| m.u_id == u_id) {
                message.message = REMOVED_USER.to_string();
            }
        }
        info!(u_id, "removed user");
        Ok(())
    })
}

pub fn admin_userpermission_change(
    store: &Store,
    token: &str,
    u_id: i64,
    permission_id: i64,
) -> Result<()> {
    store.with_data_mut(|data| {
        let caller = identity::resolve(data, token)?;
        if !identity::is_global_owner(data, caller) {
            return Err(WorkspaceError::denied("caller is not a global owner"));
        }
        let target = identity::existing_user(data, u_id)?;
        let permission = Permission::from_id(permission_id)
            .ok_or_else(|| WorkspaceError::invalid("permission_id is not a valid permission"))?;
        if target.is_global_owner()
            && permission == Permission::Member
            && active_owner_count(data) == 1
        {
            return Err(WorkspaceError::invalid("user is the only global owner"));
        }
        if let Some(target) = data.user_mut(u_id) {
            target.permission = permission;
        }
        Ok(())
    })
}

pub(crate) fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        u_id: user.u_id,
        email: user.email.clone(),
        name_first: user.name_first.clone(),
        name_last: user.name_last.clone(),
        handle_str: user.handle_str.clone(),
    }
}

pub(crate) fn profiles(data: &WorkspaceData, ids: &[i64]) -> Vec<UserProfile> {
    ids.iter()
        .filter_map(|&id| data.user(id).map(profile_of))
        .collect()
}

fn valid_handle(handle: &str) -> bool {
    (3..=20).contains(&handle.chars().count()) && !handle.contains('@') && !handle.contains(' ')
}

/// Removed accounts keep their permission field; only live owners count
/// toward the "last owner" guard.
fn active_owner_count(data: &WorkspaceData) -> usize {
    data.users
        .iter()
        .filter(|u| u.is_global_owner() && !u.is_removed())
        .count()
}

fn caller_mut(data: &mut WorkspaceData, u_id: i64) -> Result<&mut User> {
    data.user_mut(u_id)
        .ok_or_else(|| WorkspaceError::denied("account no longer exists"))
}
