use std::collections::TryReserveError;
use std::fmt;

/// Request-time CORS failure.
///
/// Policy non-matches are never errors; they are reported as a declined
/// decision. A `CorsError` means the engine could not finish building a
/// response for this request and the host should answer with a 5xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsError {
    /// Reserving memory for a header value or response body failed
    Allocation {
        /// What was being built when the reservation failed
        what: &'static str,
    },
    /// A computed header value cannot be represented as an HTTP header value
    InvalidHeaderValue {
        /// Name of the header being written
        name: &'static str,
    },
    /// The preflight body template failed to render
    TemplateRender {
        /// Template engine message
        reason: String,
    },
}

impl CorsError {
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> CorsError {
        move |_| CorsError::Allocation { what }
    }
}

impl fmt::Display for CorsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsError::Allocation { what } => {
                write!(f, "CORS internal error: allocation failed while building {what}")
            }
            CorsError::InvalidHeaderValue { name } => {
                write!(f, "CORS internal error: value for '{name}' is not a valid header value")
            }
            CorsError::TemplateRender { reason } => {
                write!(f, "CORS internal error: preflight body render failed: {reason}")
            }
        }
    }
}

impl std::error::Error for CorsError {}
