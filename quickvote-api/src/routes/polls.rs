use super::extract::CurrentUser;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use quickvote_app::application::VoteOutcome;
use quickvote_app::domain::{sign_in_redirect, CategoryGroup, Poll, PollDraft, PollView};
use quickvote_app::AppContext;
use quickvote_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    option: usize,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    outcome: VoteOutcome,
    poll: PollView,
}

/// Malformed bodies get the same `{error}` shape as every other failure.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::validation("Invalid request body")
    })
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/polls", post(create_poll))
        .route("/api/polls/{id}", get(get_poll).delete(delete_poll))
        .route("/api/polls/{id}/vote", post(cast_vote))
        .route("/api/my-polls", get(my_polls))
}

async fn create_poll(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    draft: Result<Json<PollDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Poll>), AppError> {
    let poll = ctx.create_poll.execute(user.as_ref(), body(draft)?).await?;
    Ok((StatusCode::CREATED, Json(poll)))
}

async fn get_poll(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PollView>, AppError> {
    let view = ctx.poll_queries.get_view(&id, user.as_ref()).await?;
    Ok(Json(view))
}

async fn cast_vote(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    req: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, AppError> {
    let req = body(req)?;
    let (outcome, poll) = ctx.cast_vote.execute(user.as_ref(), &id, req.option).await?;
    let viewer = user.as_ref().map(|u| u.uid.as_str());
    Ok(Json(VoteResponse {
        outcome,
        poll: PollView::new(&poll, viewer),
    }))
}

async fn delete_poll(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ctx.delete_poll.execute(user.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn my_polls(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CategoryGroup>>, AppError> {
    let user = user.ok_or_else(|| AppError::Unauthenticated {
        redirect: sign_in_redirect("/my-polls"),
    })?;
    Ok(Json(ctx.poll_queries.my_polls(&user).await?))
}
