/// Middleware for error handling and cross-cutting concerns
pub mod error_handling;
