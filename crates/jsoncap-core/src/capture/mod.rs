//! Capture coordinator: drives the filter, pending table and staging list
//! against the network event stream.
//!
//! Event handling is split in two. [`Coordinator::begin`] does everything that
//! must happen before the first await (type gate and pending insert, or
//! claiming an entry on body-ready). [`Coordinator::finish`] does the rest
//! (rules lookup, body fetch, saving or staging). A body-ready that arrives
//! while its response-started task is still waiting for rules therefore finds
//! its entry.

mod body;
mod classify;
mod control;
mod coordinator;
mod notice;
mod outcome;

pub use body::format_body;
pub use classify::{
    classify_fetch_error, FetchError, FetchFailureKind, NO_RESOURCE_CODE, NO_RESOURCE_MESSAGE,
};
pub use coordinator::{Coordinator, CoordinatorOptions, Step};
pub use notice::Notice;
pub use outcome::{RequestOutcome, SessionSummary};

use async_trait::async_trait;

use crate::event::RequestId;

/// Where response bodies come from once their body-ready event has fired.
#[async_trait]
pub trait BodySource: Send + Sync {
    async fn fetch_body(&self, request_id: &RequestId) -> Result<String, FetchError>;
}
