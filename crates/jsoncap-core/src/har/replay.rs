//! Replays a HAR file as a network observer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use crate::capture::{BodySource, FetchError};
use crate::event::{NetworkEvent, RequestId, ResponseEvent};

use super::parse::HarLog;

/// One response-started and one body-ready per HAR entry, in file order.
///
/// Request ids are `har-<index>`. Bodies are `response.content.text`; entries
/// without text, or with base64 text, behave like the browser's "no resource".
#[derive(Debug, Default)]
pub struct HarReplay {
    responses: Vec<ResponseEvent>,
    bodies: HashMap<RequestId, String>,
}

impl HarReplay {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read HAR file: {}", path.display()))?;
        Self::from_slice(&bytes).with_context(|| format!("parse HAR JSON: {}", path.display()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let har: HarLog = serde_json::from_slice(bytes)?;
        let mut replay = Self::default();
        for (index, entry) in har.log.entries.into_iter().enumerate() {
            let id = RequestId::new(format!("har-{index}"));
            let response = ResponseEvent::new(
                id.clone(),
                entry.request.url,
                entry.response.mime_type(),
                entry.response.status,
            );
            let content = entry.response.content;
            let base64 = content
                .encoding
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case("base64"));
            match content.text {
                Some(text) if !base64 => {
                    replay.bodies.insert(id, text);
                }
                _ => {}
            }
            replay.responses.push(response);
        }
        tracing::debug!(
            entries = replay.responses.len(),
            bodies = replay.bodies.len(),
            "HAR loaded"
        );
        Ok(replay)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// The event stream a browser would have produced for these entries.
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.responses
            .iter()
            .flat_map(|r| {
                [
                    NetworkEvent::ResponseStarted(r.clone()),
                    NetworkEvent::body_ready(r.request_id.clone()),
                ]
            })
            .collect()
    }
}

#[async_trait]
impl BodySource for HarReplay {
    async fn fetch_body(&self, request_id: &RequestId) -> Result<String, FetchError> {
        self.bodies
            .get(request_id)
            .cloned()
            .ok_or(FetchError::NotFound)
    }
}
