//! Typed error definitions for the dashboard client.
//!
//! Provides [`DashError`] for failures that callers need to tell apart, most
//! importantly a business rejection from the backend (shown verbatim to the
//! user) versus a transport or decode failure. All variants implement
//! `std::error::Error` via `thiserror`, so they travel inside `anyhow::Error`
//! and can be recovered with `downcast_ref`.

use thiserror::Error;

/// Domain-specific errors for the dashboard client.
#[derive(Debug, Error)]
pub enum DashError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Request could not be sent or the connection failed mid-flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The backend answered with a non-2xx status and an `{error}` payload.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// User-supplied form input could not be coerced into a request.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl DashError {
    /// Returns the server-supplied message if this is a business rejection.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}
