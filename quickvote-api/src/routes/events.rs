use super::extract::CurrentUser;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream};
use quickvote_app::application::{OwnerWatch, PollChange, PollWatch};
use quickvote_app::domain::{sign_in_redirect, PollView};
use quickvote_app::AppContext;
use quickvote_errors::AppError;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/polls/{id}/events", get(poll_events))
        .route("/api/my-polls/events", get(my_polls_events))
}

fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("keep-alive")
}

fn json_event(name: &str, data: &impl Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to encode {} event: {}", name, e);
            Event::default().event("error").data("encoding failed")
        })
}

enum Phase {
    Initial,
    Live,
}

/// `snapshot` with the current [`PollView`] on connect and after every change,
/// `deleted` once the poll is removed, `not_found` if it never existed.
/// The subscription is released when the client goes away.
async fn poll_events(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let watch = ctx.poll_queries.watch_poll(&id).await?;
    let viewer = user.map(|u| u.uid);

    let stream = stream::unfold(
        Some((watch, viewer, Phase::Initial)),
        |state: Option<(PollWatch, Option<String>, Phase)>| async move {
            let (mut watch, viewer, phase) = state?;

            if let Phase::Initial = phase {
                return match watch.initial.take() {
                    Some(poll) => {
                        let event = json_event("snapshot", &PollView::new(&poll, viewer.as_deref()));
                        Some((Ok(event), Some((watch, viewer, Phase::Live))))
                    }
                    None => Some((Ok(Event::default().event("not_found").data("{}")), None)),
                };
            }

            match watch.next().await? {
                Ok(PollChange::Snapshot(poll)) => {
                    let event = json_event("snapshot", &PollView::new(&poll, viewer.as_deref()));
                    Some((Ok(event), Some((watch, viewer, Phase::Live))))
                }
                Ok(PollChange::Deleted) => {
                    let poll_id = watch.poll_id().to_string();
                    let event = json_event("deleted", &serde_json::json!({ "pollId": poll_id }));
                    Some((Ok(event), None))
                }
                Err(e) => {
                    tracing::error!("Failed to reload poll {}: {}", watch.poll_id(), e);
                    let event = Event::default().event("error").data(e.user_message());
                    Some((Ok(event), Some((watch, viewer, Phase::Live))))
                }
            }
        },
    );

    Ok(Sse::new(stream).keep_alive(keep_alive()))
}

/// `snapshot` with the owner's grouped polls on connect and after every change.
async fn my_polls_events(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let user = user.ok_or_else(|| AppError::Unauthenticated {
        redirect: sign_in_redirect("/my-polls"),
    })?;
    let watch = ctx.poll_queries.watch_my_polls(&user).await?;

    let stream = stream::unfold(
        (watch, Phase::Initial),
        |(mut watch, phase): (OwnerWatch, Phase)| async move {
            if let Phase::Initial = phase {
                let groups = std::mem::take(&mut watch.initial);
                return Some((Ok(json_event("snapshot", &groups)), (watch, Phase::Live)));
            }

            let event = match watch.next().await? {
                Ok(groups) => json_event("snapshot", &groups),
                Err(e) => {
                    tracing::error!("Failed to reload owner polls: {}", e);
                    Event::default().event("error").data(e.user_message())
                }
            };
            Some((Ok(event), (watch, Phase::Live)))
        },
    );

    Ok(Sse::new(stream).keep_alive(keep_alive()))
}
