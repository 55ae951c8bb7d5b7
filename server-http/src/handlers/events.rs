use crate::api::requests::{ApiQuery, EventsQuery};
use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use compass::TierFailure;
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    operations: Vec<String>,
}

impl EventFilter {
    /// CSV list, e.g. `read,write`. Empty means everything.
    fn parse(raw: Option<&str>) -> Self {
        let operations = raw
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self { operations }
    }

    fn accepts(&self, failure: &TierFailure) -> bool {
        self.operations.is_empty()
            || self
                .operations
                .iter()
                .any(|op| op == failure.operation.as_str())
    }
}

/// GET /api/cache/events
///
/// Streams distributed-tier failures that were recovered from.
pub async fn stream_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = EventFilter::parse(query.operation.as_deref());
    tracing::info!(
        "New SSE client connected. Filters: operation={:?}",
        filter.operations
    );

    let stream = BroadcastStream::new(state.failures.subscribe());

    let filtered_stream = stream.filter_map(move |result| {
        let filter = filter.clone();
        async move {
            match result {
                Ok(failure) if filter.accepts(&failure) => Some(Ok(to_sse_event(&failure))),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(n)) => Some(Ok(Event::default()
                    .event("error")
                    .data(format!("Lagged by {} events", n)))),
            }
        }
    });

    Sse::new(filtered_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse_event(failure: &TierFailure) -> Event {
    Event::default()
        .event("tier.failure")
        .json_data(failure)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
