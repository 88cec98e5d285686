use super::parse::{clean_name, parse_merge, parse_proposals, parse_split};
use super::{ClusterDigest, MergeDecision, Oracle, SplitDecision};
use crate::config::OracleRetryConfig;
use crate::error::{FeatureError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Timeout, retry and answer normalization around an [`Oracle`].
///
/// Every public method is infallible: once the retry budget is spent the
/// failure is logged, counted and replaced by the conservative default
/// (keep clusters apart, do not split, no name).
pub struct OracleGateway {
    oracle: Arc<dyn Oracle>,
    retry: OracleRetryConfig,
    failures: AtomicUsize,
}

impl OracleGateway {
    pub fn new(oracle: Arc<dyn Oracle>, retry: OracleRetryConfig) -> Self {
        Self {
            oracle,
            retry,
            failures: AtomicUsize::new(0),
        }
    }

    /// Oracle calls that failed after every retry
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    pub async fn summarize(&self, text: &str) -> Option<String> {
        let answer = self.call("summarize", || self.oracle.summarize(text)).await?;
        let answer = answer.trim();
        (!answer.is_empty()).then(|| answer.to_string())
    }

    pub async fn propose_feature_names(&self, summary: &str) -> Vec<String> {
        self.call("propose_feature_names", || {
            self.oracle.propose_feature_names(summary)
        })
        .await
        .map(|answer| parse_proposals(&answer))
        .unwrap_or_default()
    }

    pub async fn refine_feature_name(&self, raw: &str) -> Option<String> {
        self.call("refine_feature_name", || self.oracle.refine_feature_name(raw))
            .await
            .and_then(|answer| clean_name(&answer))
    }

    pub async fn decide_merge(&self, a: &ClusterDigest, b: &ClusterDigest) -> MergeDecision {
        self.call("decide_merge", || self.oracle.decide_merge(a, b))
            .await
            .map_or(MergeDecision::Keep, |answer| parse_merge(&answer))
    }

    pub async fn decide_split(&self, name: &str, summary: &str) -> SplitDecision {
        self.call("decide_split", || self.oracle.decide_split(name, summary))
            .await
            .map_or(SplitDecision::Keep, |answer| parse_split(&answer))
    }

    pub async fn name_cluster(&self, summary: &str, known_features: &[String]) -> Option<String> {
        self.call("name_cluster", || {
            self.oracle.name_cluster(summary, known_features)
        })
        .await
        .and_then(|answer| clean_name(&answer))
    }

    async fn call<F, Fut>(&self, op: &str, mut request: F) -> Option<String>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let timeout = self.retry.timeout();
        let mut last_error = None;
        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.backoff(attempt - 1)).await;
            }
            let outcome = match tokio::time::timeout(timeout, request()).await {
                Ok(result) => result,
                Err(_) => Err(FeatureError::OracleTimeout(timeout)),
            };
            match outcome {
                Ok(answer) => return Some(answer),
                Err(e) => {
                    log::debug!(
                        "Oracle {op} attempt {attempt}/{} failed: {e}",
                        self.retry.max_attempts
                    );
                    last_error = Some(e);
                }
            }
        }

        self.failures.fetch_add(1, Ordering::Relaxed);
        if let Some(e) = last_error {
            log::warn!("Oracle {op} gave up after {} attempts: {e}", self.retry.max_attempts);
        }
        None
    }
}
