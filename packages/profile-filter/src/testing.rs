//! Testing utilities including mock implementations.
//!
//! Useful for exercising the location pipeline without network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{LookupError, LookupResult};
use crate::geocoder::Geocoder;

/// Canned behavior for one query.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    /// Return this formatted address
    Address(String),
    /// Return no match
    NotFound,
    /// Fail with a transport error
    Fail(String),
    /// Never answer in time
    Hang,
}

/// A mock geocoder with deterministic answers and call tracking.
///
/// Queries without a canned answer resolve to "not found".
#[derive(Default, Clone)]
pub struct MockGeocoder {
    answers: Arc<RwLock<HashMap<String, MockAnswer>>>,

    /// Latency added to every call
    delay: Option<Duration>,

    /// Queries received, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with a formatted address.
    pub fn with_address(self, query: impl Into<String>, address: impl Into<String>) -> Self {
        self.with_answer(query, MockAnswer::Address(address.into()))
    }

    /// Fail lookups of `query` with a transport error.
    pub fn with_failure(self, query: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_answer(query, MockAnswer::Fail(message.into()))
    }

    /// Make lookups of `query` hang until the caller gives up.
    pub fn with_hang(self, query: impl Into<String>) -> Self {
        self.with_answer(query, MockAnswer::Hang)
    }

    pub fn with_answer(self, query: impl Into<String>, answer: MockAnswer) -> Self {
        self.answers.write().unwrap().insert(query.into(), answer);
        self
    }

    /// Add latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all queries made to this mock.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made for one query.
    pub fn call_count(&self, query: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|q| *q == query).count()
    }

    /// Clear recorded calls.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str) -> LookupResult<Option<String>> {
        self.calls.write().unwrap().push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let answer = self
            .answers
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or(MockAnswer::NotFound);

        match answer {
            MockAnswer::Address(address) => Ok(Some(address)),
            MockAnswer::NotFound => Ok(None),
            MockAnswer::Fail(message) => Err(LookupError::Transport(message.into())),
            MockAnswer::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(LookupError::Timeout)
            }
        }
    }
}
