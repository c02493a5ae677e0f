use std::fmt;

use thiserror::Error;

/// Which remote list a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Countries,
    Cities,
    PrayerTimes,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Countries => write!(f, "countries"),
            Self::Cities => write!(f, "cities"),
            Self::PrayerTimes => write!(f, "prayer times"),
        }
    }
}

/// Failures surfaced by the remote client. Both kinds end up in the error
/// banner; neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Failed to fetch {resource}{}", status_suffix(.status))]
    Network {
        resource: Resource,
        status: Option<u16>,
        message: String,
    },

    #[error("Unexpected {resource} response: {reason}")]
    Data { resource: Resource, reason: String },
}

impl ApiError {
    pub fn network(resource: Resource, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Network {
            resource,
            status,
            message: message.into(),
        }
    }

    pub fn data(resource: Resource, reason: impl Into<String>) -> Self {
        Self::Data {
            resource,
            reason: reason.into(),
        }
    }

    pub fn from_transport(resource: Resource, err: TransportError) -> Self {
        match err {
            TransportError::Status { code, message } => Self::network(resource, Some(code), message),
            TransportError::Failed(message) => Self::network(resource, None, message),
            TransportError::Decode(reason) => Self::data(resource, reason),
        }
    }
}

/// What a [`crate::api::Transport`] reports before the client knows which list
/// it was fetching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("request failed: {0}")]
    Failed(String),

    #[error("invalid JSON body: {0}")]
    Decode(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |code| format!(" (HTTP {code})"))
}

/// Store failures. Logged, never shown: the widget works without persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("could not (de)serialize '{key}': {message}")]
    Serialization { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_message_includes_status_when_known() {
        let err = ApiError::network(Resource::Countries, Some(503), "service unavailable");
        assert_eq!(err.to_string(), "Failed to fetch countries (HTTP 503)");

        let err = ApiError::network(Resource::Cities, None, "dns failure");
        assert_eq!(err.to_string(), "Failed to fetch cities");
    }

    #[test]
    fn maps_transport_failures_to_api_kinds() {
        let err = ApiError::from_transport(
            Resource::PrayerTimes,
            TransportError::Decode("expected value".to_string()),
        );
        assert!(matches!(
            err,
            ApiError::Data {
                resource: Resource::PrayerTimes,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Unexpected prayer times response: expected value");

        let err = ApiError::from_transport(
            Resource::Countries,
            TransportError::Status {
                code: 404,
                message: "Not Found".to_string(),
            },
        );
        assert!(matches!(err, ApiError::Network { status: Some(404), .. }));
    }
}
