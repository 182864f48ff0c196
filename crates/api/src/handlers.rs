/// Request handlers for appointment booking and lifecycle operations
pub mod appointments;
/// Request handlers for operator availability windows
pub mod availability;
