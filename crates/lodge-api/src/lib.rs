pub mod admin;
pub mod auth;
pub mod channels;
pub mod dm;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod other;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};

use lodge_store::Store;

use crate::middleware::require_auth;

pub type AppState = Arc<Store>;

/// The full route table. Everything except registration, login, logout,
/// and the test-only reset sits behind the bearer-token middleware.
pub fn router(store: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/clear", delete(other::clear))
        .with_state(store.clone());

    let protected = Router::new()
        .route("/channels/create", post(channels::create))
        .route("/channels/list", get(channels::list))
        .route("/channels/listall", get(channels::listall))
        .route("/channel/invite", post(channels::invite))
        .route("/channel/details", get(channels::details))
        .route("/channel/messages", get(channels::messages))
        .route("/channel/join", post(channels::join))
        .route("/channel/leave", post(channels::leave))
        .route("/channel/addowner", post(channels::addowner))
        .route("/channel/removeowner", post(channels::removeowner))
        .route("/dm/create", post(dm::create))
        .route("/dm/list", get(dm::list))
        .route("/dm/details", get(dm::details))
        .route("/dm/messages", get(dm::messages))
        .route("/dm/invite", post(dm::invite))
        .route("/dm/leave", post(dm::leave))
        .route("/dm/remove", delete(dm::remove))
        .route("/message/send", post(messages::send))
        .route("/message/senddm", post(messages::senddm))
        .route("/message/edit", put(messages::edit))
        .route("/message/remove", delete(messages::remove))
        .route("/message/share", post(messages::share))
        .route("/user/profile", get(users::profile))
        .route("/user/profile/setname", put(users::setname))
        .route("/user/profile/setemail", put(users::setemail))
        .route("/user/profile/sethandle", put(users::sethandle))
        .route("/users/all", get(users::all))
        .route("/admin/user/remove", delete(admin::user_remove))
        .route("/admin/userpermission/change", post(admin::permission_change))
        .route("/search", get(other::search))
        .route("/notifications/get", get(other::notifications_get))
        .layer(axum::middleware::from_fn(require_auth))
        .with_state(store);

    Router::new().merge(public).merge(protected)
}
