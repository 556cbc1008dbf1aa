//! Test double for [`Transport`].
//!
//! Responses are matched on the API path (the part before `?`) and served in
//! order; the last response for a path repeats once the queue runs dry.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{GraytailError, Result};
use crate::fetcher::{AcceptType, Transport};

#[derive(Default)]
struct Inner {
    responses: HashMap<String, Vec<Vec<u8>>>,
    requests: Vec<(String, AcceptType)>,
}

#[derive(Default)]
pub struct FakeTransport {
    inner: Mutex<Inner>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body for `path`.
    pub fn respond(self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .responses
                .entry(path.to_string())
                .or_default()
                .push(body.into());
        }
        self
    }

    /// Every API string requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.requests.iter().map(|(api, _)| api.clone()).collect())
            .unwrap_or_default()
    }

    pub fn accept_types(&self) -> Vec<AcceptType> {
        self.inner
            .lock()
            .map(|inner| inner.requests.iter().map(|(_, accept)| *accept).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|api| api.split('?').next() == Some(path))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, api: &str, accept: AcceptType) -> Result<Vec<u8>> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| GraytailError::Transport(e.to_string()))?;
        inner.requests.push((api.to_string(), accept));

        let path = api.split('?').next().unwrap_or(api);
        let queue = inner
            .responses
            .get_mut(path)
            .ok_or_else(|| GraytailError::Transport(format!("connection refused: {}", path)))?;

        if queue.len() > 1 {
            Ok(queue.remove(0))
        } else {
            queue
                .first()
                .cloned()
                .ok_or_else(|| GraytailError::Transport(format!("no response for {}", path)))
        }
    }
}
