use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::daily_routes())
        .merge(handlers::goal_routes())
        .merge(handlers::streak_routes())
}
