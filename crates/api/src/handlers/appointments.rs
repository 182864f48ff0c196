//! # Appointment Handlers
//!
//! Handlers for the booking and lifecycle surface: booking with automatic
//! operator matching, rescheduling, cancellation, operator completion,
//! customer rating, and the available-operator listing. The handlers stay
//! thin; validation and orchestration live in `services::booking`, the
//! scheduling rules in `slotbook_core::scheduling`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::models::{
    Appointment, BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest,
    RateAppointmentRequest, RescheduleAppointmentRequest,
};

use crate::{middleware::error_handling::AppError, services::booking, ApiState};

fn wall_clock_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::book(
        &state.db_pool,
        &state.partition_locks,
        payload,
        wall_clock_now(),
    )
    .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::get(&state.db_pool, id).await?;
    Ok(Json(appointment))
}

/// Query parameters for listing a participant's appointments
#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    pub customer_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = booking::list_for_participant(
        &state.db_pool,
        query.customer_id,
        query.operator_id,
        query.include_deleted,
    )
    .await?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::reschedule(
        &state.db_pool,
        &state.partition_locks,
        id,
        payload,
        wall_clock_now(),
    )
    .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    booking::cancel(&state.db_pool, id, payload, wall_clock_now()).await?;
    Ok(Json(serde_json::json!({ "cancelled": true })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment =
        booking::complete(&state.db_pool, id, payload, wall_clock_now()).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn rate_appointment(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::rate(&state.db_pool, id, payload).await?;
    Ok(Json(appointment))
}

/// Query parameters for the available-operator listing
///
/// # Endpoint
///
/// ```text
/// GET /api/operators/available?category_id=...&date=2026-08-10&start_time=10:00:00&duration_minutes=30
/// ```
#[derive(Debug, Deserialize)]
pub struct AvailableOperatorsQuery {
    pub category_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
}

#[axum::debug_handler]
pub async fn list_available_operators(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AvailableOperatorsQuery>,
) -> Result<Json<Vec<Uuid>>, AppError> {
    let operators = booking::list_available_operators(
        &state.db_pool,
        query.category_id,
        query.date,
        query.start_time,
        query.duration_minutes,
    )
    .await?;

    Ok(Json(operators))
}

#[axum::debug_handler]
pub async fn pending_completion(
    State(state): State<Arc<ApiState>>,
    Path(operator_id): Path<Uuid>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments =
        booking::pending_completion(&state.db_pool, operator_id, wall_clock_now()).await?;
    Ok(Json(appointments))
}
