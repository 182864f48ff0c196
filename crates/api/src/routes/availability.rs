use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/operators/:id/windows",
            get(handlers::availability::list_windows).post(handlers::availability::create_window),
        )
        .route(
            "/api/windows/:id",
            put(handlers::availability::update_window)
                .delete(handlers::availability::deactivate_window),
        )
}
