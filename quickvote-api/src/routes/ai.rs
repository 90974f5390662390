use super::extract::ClientIp;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use quickvote_app::application::DraftAssistant;
use quickvote_app::AppContext;
use quickvote_errors::AppError;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptionsRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    used_options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefineQuestionRequest {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
pub struct CategorizePollRequest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    options: Vec<String>,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/api/ai/generate-options", post(generate_options))
        .route("/api/ai/refine-question", post(refine_question))
        .route("/api/ai/categorize-poll", post(categorize_poll))
}

/// Error body for the AI endpoints. Upstream failures get the endpoint's own
/// generic message; the cause is only logged.
fn ai_error(err: AppError, key: &str, failure: &str) -> Response {
    let (status, message) = match &err {
        AppError::AiFailed(cause) => {
            tracing::error!("{}: {}", failure, cause);
            (StatusCode::INTERNAL_SERVER_ERROR, failure.to_string())
        }
        AppError::AiNotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        AppError::RateLimited(_) => {
            tracing::warn!("AI request rejected: {}", err);
            (err.status_code(), err.user_message())
        }
        _ => (err.status_code(), err.user_message()),
    };
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), message.into());
    (status, Json(serde_json::Value::Object(body))).into_response()
}

/// Input is checked before the rate limit so malformed requests cost no quota.
fn admit(ctx: &AppContext, ip: ClientIp, input: Result<(), AppError>) -> Result<(), AppError> {
    input?;
    ctx.rate_limiter.check_rate_limit(ip.0)?;
    Ok(())
}

async fn generate_options(
    State(ctx): State<AppContext>,
    ip: ClientIp,
    Json(req): Json<GenerateOptionsRequest>,
) -> Response {
    let input = DraftAssistant::check_question(&req.question).map(|_| ());
    let result = match admit(&ctx, ip, input) {
        Ok(()) => {
            ctx.draft_assistant
                .generate_options(&req.question, &req.used_options)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(options) => Json(json!({ "options": options })).into_response(),
        Err(e) => ai_error(e, "error", "Failed to generate options"),
    }
}

async fn refine_question(
    State(ctx): State<AppContext>,
    ip: ClientIp,
    Json(req): Json<RefineQuestionRequest>,
) -> Response {
    let input = DraftAssistant::check_question(&req.question).map(|_| ());
    let result = match admit(&ctx, ip, input) {
        Ok(()) => ctx.draft_assistant.refine_question(&req.question).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(refined) => Json(json!({ "refined": refined })).into_response(),
        Err(e) => ai_error(e, "message", "AI request failed"),
    }
}

async fn categorize_poll(
    State(ctx): State<AppContext>,
    ip: ClientIp,
    Json(req): Json<CategorizePollRequest>,
) -> Response {
    let input = DraftAssistant::check_category_input(&req.title, &req.options).map(|_| ());
    let result = match admit(&ctx, ip, input) {
        Ok(()) => ctx.draft_assistant.categorize(&req.title, &req.options).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(category) => Json(json!({ "category": category })).into_response(),
        Err(e) => ai_error(e, "error", "Failed to categorize poll"),
    }
}
