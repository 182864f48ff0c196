//! # Availability Window Handlers
//!
//! Operators maintain a recurring weekly calendar of availability windows.
//! Creation and edits enforce the calendar invariant directly here: for one
//! operator and day of week, no two active windows may overlap. Windows are
//! soft-deactivated, never hard-deleted, because past appointments may still
//! reference the working hours they were booked under.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::{
    errors::BookingError,
    models::{AvailabilityWindow, CreateWindowRequest, Role, UpdateWindowRequest},
    scheduling::availability as availability_rules,
};
use slotbook_db::repositories::{availability as windows_repo, directory};

use crate::{middleware::error_handling::AppError, ApiState};

async fn ensure_operator_account(state: &ApiState, operator_id: Uuid) -> Result<(), AppError> {
    let role = directory::get_role(&state.db_pool, operator_id)
        .await
        .map_err(BookingError::Database)?;
    if role.as_deref().and_then(Role::parse) != Some(Role::Operator) {
        return Err(AppError(BookingError::Validation(
            "the account is not an operator".to_string(),
        )));
    }
    Ok(())
}

async fn active_windows(
    state: &ApiState,
    operator_id: Uuid,
) -> Result<Vec<AvailabilityWindow>, AppError> {
    let windows = windows_repo::list_active_windows_by_operator(&state.db_pool, operator_id)
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .map(|w| w.into_domain())
        .collect::<Result<Vec<_>, _>>()
        .map_err(BookingError::Database)?;
    Ok(windows)
}

#[axum::debug_handler]
pub async fn create_window(
    State(state): State<Arc<ApiState>>,
    Path(operator_id): Path<Uuid>,
    Json(payload): Json<CreateWindowRequest>,
) -> Result<Json<AvailabilityWindow>, AppError> {
    ensure_operator_account(&state, operator_id).await?;

    if payload.start_time >= payload.end_time {
        return Err(AppError(BookingError::Validation(
            "window start must be before its end".to_string(),
        )));
    }

    let existing = active_windows(&state, operator_id).await?;
    if availability_rules::window_overlaps_existing(
        &existing,
        payload.day_of_week,
        payload.start_time,
        payload.end_time,
        None,
    ) {
        return Err(AppError(BookingError::Conflict(
            "an active window already covers part of that interval".to_string(),
        )));
    }

    let window = windows_repo::create_window(
        &state.db_pool,
        operator_id,
        payload.day_of_week.as_str(),
        payload.start_time,
        payload.end_time,
    )
    .await
    .map_err(BookingError::Database)?
    .into_domain()
    .map_err(BookingError::Database)?;

    Ok(Json(window))
}

#[axum::debug_handler]
pub async fn list_windows(
    State(state): State<Arc<ApiState>>,
    Path(operator_id): Path<Uuid>,
) -> Result<Json<Vec<AvailabilityWindow>>, AppError> {
    let windows = windows_repo::list_windows_by_operator(&state.db_pool, operator_id)
        .await
        .map_err(BookingError::Database)?
        .into_iter()
        .map(|w| w.into_domain())
        .collect::<Result<Vec<_>, _>>()
        .map_err(BookingError::Database)?;

    Ok(Json(windows))
}

#[axum::debug_handler]
pub async fn update_window(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWindowRequest>,
) -> Result<Json<AvailabilityWindow>, AppError> {
    let existing = windows_repo::get_window_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Window with ID {} not found", id)))?
        .into_domain()
        .map_err(BookingError::Database)?;

    let day_of_week = payload.day_of_week.unwrap_or(existing.day_of_week);
    let start_time = payload.start_time.unwrap_or(existing.start_time);
    let end_time = payload.end_time.unwrap_or(existing.end_time);
    let active = payload.active.unwrap_or(existing.active);

    if start_time >= end_time {
        return Err(AppError(BookingError::Validation(
            "window start must be before its end".to_string(),
        )));
    }

    if active {
        let others = active_windows(&state, existing.operator_id).await?;
        if availability_rules::window_overlaps_existing(
            &others,
            day_of_week,
            start_time,
            end_time,
            Some(id),
        ) {
            return Err(AppError(BookingError::Conflict(
                "an active window already covers part of that interval".to_string(),
            )));
        }
    }

    let window = windows_repo::update_window(
        &state.db_pool,
        id,
        day_of_week.as_str(),
        start_time,
        end_time,
        active,
    )
    .await
    .map_err(BookingError::Database)?
    .into_domain()
    .map_err(BookingError::Database)?;

    Ok(Json(window))
}

#[axum::debug_handler]
pub async fn deactivate_window(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    windows_repo::get_window_by_id(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Window with ID {} not found", id)))?;

    windows_repo::deactivate_window(&state.db_pool, id)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(serde_json::json!({ "deactivated": true })))
}
