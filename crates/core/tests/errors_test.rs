use std::error::Error;

use slotbook_core::errors::{BookingError, BookingResult};

#[test]
fn test_booking_error_display() {
    let not_found = BookingError::NotFound("Appointment not found".to_string());
    let validation = BookingError::Validation("Invalid input".to_string());
    let conflict = BookingError::Conflict("Slot already taken".to_string());
    let no_operator = BookingError::NoOperatorAvailable;
    let authorization = BookingError::Authorization("Not authorized".to_string());
    let state = BookingError::State("Already completed".to_string());
    let database = BookingError::Database(eyre::eyre!("Database connection failed"));
    let internal = BookingError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(
        not_found.to_string(),
        "Resource not found: Appointment not found"
    );
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert_eq!(conflict.to_string(), "Booking conflict: Slot already taken");
    assert_eq!(
        no_operator.to_string(),
        "No operator available for the requested slot"
    );
    assert_eq!(
        authorization.to_string(),
        "Authorization error: Not authorized"
    );
    assert_eq!(state.to_string(), "Invalid state: Already completed");
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let booking_error = BookingError::Internal(Box::new(io_error));

    assert!(booking_error.source().is_some());
}

#[test]
fn test_booking_result() {
    let result: BookingResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BookingResult<i32> = Err(BookingError::NotFound("Not found".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_from_trait_implementation() {
    let eyre_error = eyre::eyre!("Database error");
    let booking_error = BookingError::Database(eyre_error);

    assert!(booking_error.to_string().contains("Database error"));
}
