//! Test doubles for the model backend.
//!
//! [`MockModel`] is `Clone` (state behind `Arc`) so one scripted backend
//! can serve both the classifier and the site validator in a test.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{ModelError, ModelResult};
use crate::traits::Model;

/// Scripted model backend.
///
/// Serves queued responses in order, then repeats the last one; an
/// unscripted mock returns [`ModelError::EmptyResponse`]. Optional
/// failure modes: a fixed number of leading rate-limit errors, or
/// permanent unavailability.
#[derive(Clone, Default)]
pub struct MockModel {
    responses: Arc<RwLock<VecDeque<String>>>,
    last_response: Arc<RwLock<Option<String>>>,
    rate_limits_remaining: Arc<RwLock<u32>>,
    always_unavailable: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that fails every call with [`ModelError::Unavailable`].
    pub fn unavailable() -> Self {
        Self {
            always_unavailable: true,
            ..Self::default()
        }
    }

    /// Queue one response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(response.into());
        self
    }

    /// Queue several responses, served in order.
    pub fn with_responses(self, responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.responses
            .write()
            .unwrap()
            .extend(responses.into_iter().map(|r| r.into()));
        self
    }

    /// Fail the first `count` calls with [`ModelError::RateLimited`]
    /// before serving responses.
    pub fn with_rate_limits(self, count: u32) -> Self {
        *self.rate_limits_remaining.write().unwrap() = count;
        self
    }

    /// Prompts received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Model for MockModel {
    async fn complete(&self, prompt: &str) -> ModelResult<String> {
        self.calls.write().unwrap().push(prompt.to_string());

        if self.always_unavailable {
            return Err(ModelError::Unavailable("scripted outage".into()));
        }

        {
            let mut remaining = self.rate_limits_remaining.write().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ModelError::RateLimited);
            }
        }

        if let Some(next) = self.responses.write().unwrap().pop_front() {
            *self.last_response.write().unwrap() = Some(next.clone());
            return Ok(next);
        }
        match self.last_response.read().unwrap().clone() {
            Some(last) => Ok(last),
            None => Err(ModelError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_queue_then_repeats_last() {
        let model = MockModel::new().with_responses(["one", "two"]);
        assert_eq!(model.complete("a").await.unwrap(), "one");
        assert_eq!(model.complete("b").await.unwrap(), "two");
        assert_eq!(model.complete("c").await.unwrap(), "two");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn rate_limits_then_recovers() {
        let model = MockModel::new().with_rate_limits(1).with_response("ok");
        assert!(matches!(
            model.complete("a").await,
            Err(ModelError::RateLimited)
        ));
        assert_eq!(model.complete("a").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn clones_share_scripted_state() {
        let model = MockModel::new().with_response("shared");
        let clone = model.clone();
        assert_eq!(clone.complete("a").await.unwrap(), "shared");
        assert_eq!(model.call_count(), 1);
    }
}
