use serde::{Deserialize, Serialize};

use crate::models::{Message, Notification};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub auth_user_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LogoutResponse {
    pub is_success: bool,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelCreateRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelCreateResponse {
    pub channel_id: i64,
}

/// Body of join/leave, which act on the caller themselves.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelIdRequest {
    pub channel_id: i64,
}

/// Body of invite/addowner/removeowner, which act on another user.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelUserRequest {
    pub channel_id: i64,
    pub u_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub channel_id: i64,
    pub channel_name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelsListResponse {
    pub channels: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize)]
pub struct ChannelDetailsResponse {
    pub channel_name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserProfile>,
    pub all_members: Vec<UserProfile>,
}

// -- DMs --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmCreateRequest {
    pub u_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct DmCreateResponse {
    pub dm_id: i64,
    pub dm_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmIdRequest {
    pub dm_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmUserRequest {
    pub dm_id: i64,
    pub u_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DmSummary {
    pub dm_id: i64,
    pub dm_name: String,
}

#[derive(Debug, Serialize)]
pub struct DmListResponse {
    pub dms: Vec<DmSummary>,
}

#[derive(Debug, Serialize)]
pub struct DmDetailsResponse {
    pub name: String,
    pub members: Vec<UserProfile>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub channel_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendDmMessageRequest {
    pub dm_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageIdResponse {
    pub message_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveMessageRequest {
    pub message_id: i64,
}

/// Exactly one of `channel_id` / `dm_id` must be -1.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareMessageRequest {
    pub og_message_id: i64,
    pub message: String,
    pub channel_id: i64,
    pub dm_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ShareMessageResponse {
    pub shared_message_id: i64,
}

/// One page of history, most-recent-first. `end` is -1 once the page reaches
/// the oldest message.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<Message>,
}

// -- Users --

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub u_id: i64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
}

#[derive(Debug, Serialize)]
pub struct UsersAllResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub handle_str: String,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminUserRemoveRequest {
    pub u_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminPermissionChangeRequest {
    pub u_id: i64,
    pub permission_id: i64,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}
