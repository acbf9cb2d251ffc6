use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{service} timed out")]
    UpstreamTimeout { service: &'static str },

    #[error("{service} is unavailable: {reason}")]
    UpstreamUnavailable { service: &'static str, reason: String },

    #[error("{service} rejected the request ({status}): {body}")]
    UpstreamRejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} failed ({status}): {body}")]
    UpstreamFailure {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable response: {reason}")]
    UpstreamDecode { service: &'static str, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl GatewayError {
    /// True for every variant produced by an upstream service call.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout { .. }
                | Self::UpstreamUnavailable { .. }
                | Self::UpstreamRejected { .. }
                | Self::UpstreamFailure { .. }
                | Self::UpstreamDecode { .. }
        )
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
