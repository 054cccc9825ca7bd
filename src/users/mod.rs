use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", put(handlers::register))
        .route("/user/list", get(handlers::list_users))
        .route("/user/add", post(handlers::add_user))
        .route("/user/update", patch(handlers::update_user))
        .route("/user/delete", delete(handlers::delete_user))
}
