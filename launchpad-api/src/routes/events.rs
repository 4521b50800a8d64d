/// Application change feed (SSE)
///
/// Streams application change events so the dashboard can refetch what it
/// shows instead of polling. Events carry identifiers only, never
/// application content, so the stream is safe to expose unauthenticated.
///
/// # Endpoint
///
/// `GET /v1/applications/events`
///
/// # SSE Event Format
///
/// ```text
/// event: application_change
/// data: {"kind":"submitted","application_id":"...","user_id":"...","occurred_at":"2025-03-01T12:00:00Z"}
/// ```
///
/// A subscriber that falls behind the feed's buffer loses events; the stream
/// ends and the client is expected to reconnect and refetch.
///
/// # Example
///
/// ```bash
/// curl -N "http://localhost:8080/v1/applications/events"
/// ```

use crate::app::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

/// Change feed handler
///
/// Opens a subscription on the portal's change feed and forwards every event
/// as an SSE message, with a heartbeat to keep intermediaries from closing
/// the connection.
pub async fn watch(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.portal.feed().subscribe();

    let stream = BroadcastStream::new(rx).map_while(|item| match item {
        Ok(event) => Event::default()
            .event("application_change")
            .json_data(&event)
            .ok()
            .map(Ok),
        // Lagged subscribers have lost events; end their stream so the
        // client reconnects and refetches.
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged behind the change feed");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(25))
            .text("keep-alive"),
    )
}
