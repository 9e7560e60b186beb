use crate::state::RosterState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseEvent {
    StudentsChanged,
}

impl SseEvent {
    pub const fn name(self) -> &'static str {
        match self {
            Self::StudentsChanged => "students_changed",
        }
    }
}

pub async fn sse_feed(
    State(state): State<RosterState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    //lagged receivers just skip what they missed, the next event triggers a full refetch anyway
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed())
        .filter_map(Result::ok)
        .map(|event| Ok::<_, Infallible>(Event::default().event(event.name()).data("refresh")));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
