// In-memory upstream double for tests.
// Serves canned outcomes by path and records every request it receives.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use super::client::Upstream;
use super::types::{Failure, Outcome, Success};

type Call = (String, Vec<(String, String)>);

/// Upstream that answers from a fixed table and 404s everything else.
#[derive(Default)]
pub struct FakeUpstream {
    responses: HashMap<String, Outcome>,
    calls: Mutex<Vec<Call>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with a 200 and `body`.
    pub fn ok(mut self, path: &str, body: Value) -> Self {
        self.responses
            .insert(path.to_string(), Ok(Success { status: 200, body }));
        self
    }

    /// Answer `path` with a non-2xx status and optional headers.
    pub fn status(mut self, path: &str, status: u16, headers: &[(&'static str, &str)]) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        self.responses.insert(
            path.to_string(),
            Err(Failure::Status {
                status,
                message: "upstream said no".to_string(),
                headers: map,
            }),
        );
        self
    }

    /// Answer `path` as if the network were down.
    pub fn unreachable(mut self, path: &str) -> Self {
        self.responses
            .insert(path.to_string(), Err(Failure::transport("connection refused")));
        self
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Outcome {
        self.calls.lock().unwrap().push((
            path.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        match self.responses.get(path) {
            Some(outcome) => outcome.clone(),
            None => Err(Failure::Status {
                status: 404,
                message: "Not Found".to_string(),
                headers: HeaderMap::new(),
            }),
        }
    }
}
