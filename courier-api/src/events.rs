use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use courier_shared::events::WorkflowEvent;
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/events", get(stream_events))
}

/// GET /v1/events
/// SSE stream of workflow notifications; each `OrderCreated`/`OrderDelivered`
/// transition produces exactly one event.
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = {
        let workflow = state.workflow.lock().await;
        workflow.subscribe()
    };

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(
        |result: Result<WorkflowEvent, BroadcastStreamRecvError>| async move {
            match result {
                Ok(event) => {
                    let data = serde_json::to_string(&event).ok()?;
                    Some(Ok(Event::default().event(event.kind()).data(data)))
                }
                // Lagged receivers drop missed notifications rather than erroring
                Err(_) => None,
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
