//! Registration, login, and the token-to-user resolution every other
//! operation starts from. Tokens are opaque identifiers looked up in the
//! per-user session table; session ids are the smallest positive integer
//! not already active for that user, so multi-device logins coexist.

use std::sync::LazyLock;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use lodge_store::{Store, WorkspaceData};
use lodge_types::api::{AuthResponse, LogoutResponse};
use lodge_types::error::{Result, WorkspaceError};
use lodge_types::models::{Permission, Session, User};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+[._]?[a-zA-Z0-9]+@\w+\.\w{2,3}$").unwrap());

pub fn register(
    store: &Store,
    email: &str,
    password: &str,
    name_first: &str,
    name_last: &str,
) -> Result<AuthResponse> {
    store.with_data_mut(|data| {
        if !valid_email(email) {
            return Err(WorkspaceError::invalid("email is not a valid address"));
        }
        if data.email_taken(email) {
            return Err(WorkspaceError::invalid("email is already registered"));
        }
        if password.chars().count() < 6 {
            return Err(WorkspaceError::invalid(
                "password must be at least 6 characters",
            ));
        }
        if !valid_name(name_first) {
            return Err(WorkspaceError::invalid(
                "name_first must be between 1 and 50 characters",
            ));
        }
        if !valid_name(name_last) {
            return Err(WorkspaceError::invalid(
                "name_last must be between 1 and 50 characters",
            ));
        }

        let u_id = data.next_user_id();
        // The first account ever registered administers the workspace.
        let permission = if data.users.is_empty() {
            Permission::Owner
        } else {
            Permission::Member
        };
        let handle_str = generate_handle(data, name_first, name_last);
        let token = Uuid::new_v4().to_string();

        data.users.push(User {
            u_id,
            email: email.to_string(),
            password: hash_password(password)?,
            name_first: name_first.to_string(),
            name_last: name_last.to_string(),
            handle_str,
            permission,
            sessions: vec![Session {
                session_id: 1,
                token: token.clone(),
            }],
            notifications: Vec::new(),
        });

        info!(u_id, "registered user");
        Ok(AuthResponse {
            token,
            auth_user_id: u_id,
        })
    })
}

pub fn login(store: &Store, email: &str, password: &str) -> Result<AuthResponse> {
    store.with_data_mut(|data| {
        if !valid_email(email) {
            return Err(WorkspaceError::invalid("email is not a valid address"));
        }
        let Some(user) = data.user_by_email(email) else {
            return Err(WorkspaceError::invalid("email does not belong to a user"));
        };
        if user.is_removed() {
            return Err(WorkspaceError::invalid("account has been removed"));
        }
        if !verify_password(password, &user.password)? {
            return Err(WorkspaceError::invalid("password is not correct"));
        }

        let u_id = user.u_id;
        let session_id = next_session_id(user);
        let token = Uuid::new_v4().to_string();
        if let Some(user) = data.user_mut(u_id) {
            user.sessions.push(Session {
                session_id,
                token: token.clone(),
            });
        }

        Ok(AuthResponse {
            token,
            auth_user_id: u_id,
        })
    })
}

/// Invalidates the one session named by the token. Never fails: an unknown
/// token (or a storage error) answers `is_success: false`.
pub fn logout(store: &Store, token: &str) -> LogoutResponse {
    let is_success = store
        .with_data_mut(|data| {
            for user in &mut data.users {
                if let Some(pos) = user.sessions.iter().position(|s| s.token == token) {
                    user.sessions.remove(pos);
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .unwrap_or(false);
    LogoutResponse { is_success }
}

/// Resolves a token to the caller's user id. Removed accounts cannot act,
/// even while their old sessions are still in the table.
pub fn resolve(data: &WorkspaceData, token: &str) -> Result<i64> {
    let user = data
        .user_by_token(token)
        .ok_or_else(|| WorkspaceError::denied("token does not name an active session"))?;
    if user.is_removed() {
        return Err(WorkspaceError::denied("account has been removed"));
    }
    Ok(user.u_id)
}

/// Target-user lookup that refuses removed accounts.
pub(crate) fn existing_user(data: &WorkspaceData, u_id: i64) -> Result<&User> {
    let user = any_user(data, u_id)?;
    if user.is_removed() {
        return Err(WorkspaceError::invalid("user has been removed"));
    }
    Ok(user)
}

/// Removal-tolerant lookup, for reading a removed user's profile.
pub(crate) fn any_user(data: &WorkspaceData, u_id: i64) -> Result<&User> {
    data.user(u_id)
        .ok_or_else(|| WorkspaceError::invalid("u_id does not exist"))
}

pub(crate) fn is_global_owner(data: &WorkspaceData, u_id: i64) -> bool {
    data.user(u_id).is_some_and(User::is_global_owner)
}

pub(crate) fn valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn valid_name(name: &str) -> bool {
    (1..=50).contains(&name.chars().count())
}

/// Lowercased first+last, truncated to 20 chars, `@` and spaces stripped,
/// then the smallest integer suffix (from 0) that makes it unique.
fn generate_handle(data: &WorkspaceData, name_first: &str, name_last: &str) -> String {
    let mut handle: String = format!("{}{}", name_first.to_lowercase(), name_last.to_lowercase())
        .chars()
        .take(20)
        .collect();
    handle.retain(|c| c != '@' && c != ' ');

    if !data.handle_taken(&handle) {
        return handle;
    }
    let mut i = 0;
    loop {
        let candidate = format!("{handle}{i}");
        if !data.handle_taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

fn next_session_id(user: &User) -> i64 {
    let mut id = 1;
    while user.sessions.iter().any(|s| s.session_id == id) {
        id += 1;
    }
    id
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| WorkspaceError::Storage(format!("password hash failure: {e}")))
}

fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| WorkspaceError::Storage(format!("corrupt password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_of(store: &Store, u_id: i64) -> String {
        store
            .with_data(|data| Ok(any_user(data, u_id)?.handle_str.clone()))
            .unwrap()
    }

    #[test]
    fn first_user_becomes_global_owner() {
        let store = Store::in_memory();
        let first = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let second = register(&store, "bob@mail.com", "password", "Bob", "Banana").unwrap();

        store
            .with_data(|data| {
                assert!(is_global_owner(data, first.auth_user_id));
                assert!(!is_global_owner(data, second.auth_user_id));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn rejects_malformed_registration() {
        let store = Store::in_memory();
        assert!(register(&store, "not-an-email", "password", "Alice", "Apple").is_err());
        assert!(register(&store, "alice@mail.com", "short", "Alice", "Apple").is_err());
        assert!(register(&store, "alice@mail.com", "password", "", "Apple").is_err());
        let long = "a".repeat(51);
        assert!(register(&store, "alice@mail.com", "password", "Alice", &long).is_err());

        register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        assert!(register(&store, "alice@mail.com", "password", "Alice", "Apple").is_err());
    }

    #[test]
    fn colliding_handles_get_numeric_suffixes() {
        let store = Store::in_memory();
        let a = register(&store, "jane1@mail.com", "password", "Jane", "Doe").unwrap();
        let b = register(&store, "jane2@mail.com", "password", "Jane", "Doe").unwrap();
        let c = register(&store, "jane3@mail.com", "password", "Jane", "Doe").unwrap();

        assert_eq!(handle_of(&store, a.auth_user_id), "janedoe");
        assert_eq!(handle_of(&store, b.auth_user_id), "janedoe0");
        assert_eq!(handle_of(&store, c.auth_user_id), "janedoe1");
    }

    #[test]
    fn handle_is_truncated_and_stripped() {
        let store = Store::in_memory();
        let long = register(
            &store,
            "long@mail.com",
            "password",
            "Abcdefghijklm",
            "Nopqrstuvwxyz",
        )
        .unwrap();
        assert_eq!(handle_of(&store, long.auth_user_id), "abcdefghijklmnopqrst");

        let odd = register(&store, "odd@mail.com", "password", "A b", "C@d").unwrap();
        assert_eq!(handle_of(&store, odd.auth_user_id), "abcd");
    }

    #[test]
    fn login_reuses_smallest_free_session_id() {
        let store = Store::in_memory();
        let reg = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let second = login(&store, "alice@mail.com", "password").unwrap();
        assert_ne!(reg.token, second.token);

        // two concurrent sessions: 1 and 2
        store
            .with_data(|data| {
                let ids: Vec<i64> = any_user(data, reg.auth_user_id)?
                    .sessions
                    .iter()
                    .map(|s| s.session_id)
                    .collect();
                assert_eq!(ids, vec![1, 2]);
                Ok(())
            })
            .unwrap();

        // freeing session 1 makes it the next to be handed out
        assert!(logout(&store, &reg.token).is_success);
        login(&store, "alice@mail.com", "password").unwrap();
        store
            .with_data(|data| {
                let mut ids: Vec<i64> = any_user(data, reg.auth_user_id)?
                    .sessions
                    .iter()
                    .map(|s| s.session_id)
                    .collect();
                ids.sort_unstable();
                assert_eq!(ids, vec![1, 2]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let store = Store::in_memory();
        register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();

        assert!(login(&store, "not-an-email", "password").is_err());
        assert!(login(&store, "unknown@mail.com", "password").is_err());
        assert!(login(&store, "alice@mail.com", "wrongpass").is_err());
    }

    #[test]
    fn logout_invalidates_exactly_one_session() {
        let store = Store::in_memory();
        let reg = register(&store, "alice@mail.com", "password", "Alice", "Apple").unwrap();
        let second = login(&store, "alice@mail.com", "password").unwrap();

        assert!(logout(&store, &reg.token).is_success);
        assert!(!logout(&store, &reg.token).is_success);
        assert!(!logout(&store, "never-issued").is_success);

        store
            .with_data(|data| {
                assert!(resolve(data, &reg.token).is_err());
                assert_eq!(resolve(data, &second.token).unwrap(), reg.auth_user_id);
                Ok(())
            })
            .unwrap();
    }
}
