//! Pure scheduling logic: no I/O, no clock access. Every function is a
//! function of its arguments so the callers (services and sweeps) stay
//! testable against a supplied `now`.

pub mod availability;
pub mod conflict;
pub mod lifecycle;
pub mod matcher;
pub mod reminders;
