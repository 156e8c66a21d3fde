//! Network events delivered by the observer, in the two-phase capture protocol.
//!
//! A request first shows up as `ResponseStarted` (headers are known, body is
//! not) and later as `BodyReady` once the body can be fetched by request id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier the observer assigns to a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Response metadata known when the response starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    pub request_id: RequestId,
    pub url: String,
    pub mime_type: String,
    pub status_code: u16,
}

impl ResponseEvent {
    pub fn new(
        request_id: impl Into<RequestId>,
        url: impl Into<String>,
        mime_type: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            url: url.into(),
            mime_type: mime_type.into(),
            status_code,
        }
    }
}

/// One event from the network observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    ResponseStarted(ResponseEvent),
    BodyReady { request_id: RequestId },
}

impl NetworkEvent {
    pub fn body_ready(request_id: impl Into<RequestId>) -> Self {
        NetworkEvent::BodyReady {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        match self {
            NetworkEvent::ResponseStarted(r) => &r.request_id,
            NetworkEvent::BodyReady { request_id } => request_id,
        }
    }
}
