//! Reminder API module

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reminders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/settings",
            get(handler::get_settings).put(handler::put_settings),
        )
        .route("/run", post(handler::run))
}
