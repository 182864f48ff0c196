use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            post(handlers::appointments::book_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .put(handlers::appointments::reschedule_appointment)
                .delete(handlers::appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/complete",
            post(handlers::appointments::complete_appointment),
        )
        .route(
            "/api/appointments/:id/rate",
            post(handlers::appointments::rate_appointment),
        )
        .route(
            "/api/operators/available",
            get(handlers::appointments::list_available_operators),
        )
        .route(
            "/api/operators/:id/pending-completion",
            get(handlers::appointments::pending_completion),
        )
}
