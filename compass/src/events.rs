use crate::ports::ErrorReporter;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierOperation {
    Read,
    Decode,
    Write,
    Encode,
    Invalidate,
    Flush,
}

impl TierOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierOperation::Read => "read",
            TierOperation::Decode => "decode",
            TierOperation::Write => "write",
            TierOperation::Encode => "encode",
            TierOperation::Invalidate => "invalidate",
            TierOperation::Flush => "flush",
        }
    }
}

/// A distributed-tier failure that was recovered from locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierFailure {
    pub operation: TierOperation,
    /// Cache key, or the pattern for invalidations.
    pub key: String,
    pub message: String,
    pub timestamp: i64,
}

impl TierFailure {
    pub fn new(operation: TierOperation, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation,
            key: key.into(),
            message: message.into(),
            timestamp: now_timestamp_ms(),
        }
    }
}

/// Current time in milliseconds since UNIX epoch
pub fn now_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Logs failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: TierFailure) {
        tracing::warn!(
            operation = failure.operation.as_str(),
            key = %failure.key,
            "Distributed cache {} failed, continuing without it: {}",
            failure.operation.as_str(),
            failure.message
        );
    }
}

/// Logs failures and fans them out to subscribers (e.g. the SSE endpoint).
#[derive(Debug, Clone)]
pub struct BroadcastReporter {
    sender: broadcast::Sender<TierFailure>,
}

impl BroadcastReporter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TierFailure> {
        self.sender.subscribe()
    }
}

impl ErrorReporter for BroadcastReporter {
    fn report(&self, failure: TierFailure) {
        TracingReporter.report(failure.clone());

        match self.sender.send(failure) {
            Ok(subscriber_count) => {
                tracing::debug!("Broadcasted tier failure to {} subscriber(s)", subscriber_count);
            }
            Err(_) => {
                tracing::trace!("No subscribers for tier failure event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reporter_delivers_to_subscribers() {
        let reporter = BroadcastReporter::new(8);
        let mut rx = reporter.subscribe();

        reporter.report(TierFailure::new(
            TierOperation::Read,
            "booking:details:42",
            "connection refused",
        ));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.operation, TierOperation::Read);
        assert_eq!(received.key, "booking:details:42");
        assert_eq!(received.message, "connection refused");
    }

    #[test]
    fn test_broadcast_reporter_without_subscribers_does_not_panic() {
        let reporter = BroadcastReporter::new(1);
        reporter.report(TierFailure::new(TierOperation::Flush, "*", "timeout"));
    }

    #[test]
    fn test_failure_serializes_with_snake_case_operation() {
        let failure = TierFailure::new(TierOperation::Decode, "k", "bad gzip");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["operation"], "decode");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }
}
