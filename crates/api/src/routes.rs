/// Appointment booking and lifecycle endpoints
pub mod appointments;
/// Operator availability window endpoints
pub mod availability;
/// Health check endpoints
pub mod health;
