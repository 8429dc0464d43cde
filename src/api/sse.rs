//! Server-Sent Events support

use crate::runtime::{FrameworkStream, StreamEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;

/// Convert a workflow event stream to an SSE response
pub fn sse_stream(events: FrameworkStream) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(events.map(|event| Ok(stream_event_to_axum(&event)))).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn stream_event_to_axum(event: &StreamEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize stream event");
        serde_json::json!({"type": "error", "message": e.to_string()}).to_string()
    });
    Event::default().event(event.name()).data(data)
}
