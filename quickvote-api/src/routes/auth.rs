use super::extract::CurrentUser;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use oauth2::PkceCodeVerifier;
use quickvote_app::domain::{sanitize_return_to, SessionUser, SESSION_USER_KEY};
use quickvote_app::AppContext;
use quickvote_errors::{AppError, AuthError};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

const OAUTH_CSRF_KEY: &str = "oauth_csrf";
const OAUTH_PKCE_KEY: &str = "oauth_pkce";
const OAUTH_RETURN_TO_KEY: &str = "oauth_return_to";

const VERIFY_EMAIL_SENT: &str =
    "Account created. We sent you a verification email; please verify your email before signing in.";
const RESET_EMAIL_SENT: &str = "Password reset email sent. Check your inbox.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    email: String,
    password: String,
    return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
    #[serde(default)]
    name: String,
    email: String,
    password: String,
    repeat_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    email: String,
}

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Back to a form page with a flash parameter the page renders.
fn back_to(page: &str, key: &str, text: &str, return_to: Option<&str>) -> Redirect {
    let mut location = format!("{}?{}={}", page, key, urlencoding::encode(text));
    if let Some(path) = return_to.filter(|p| *p != "/") {
        location.push_str(&format!("&returnTo={}", urlencoding::encode(path)));
    }
    Redirect::to(&location)
}

fn failure_message(err: &AppError) -> String {
    if !err.is_client_error() {
        tracing::error!("Auth flow failed: {}", err);
    }
    err.user_message()
}

/// Starts a fresh session for the user so a pre-login session id is never reused.
async fn establish(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.cycle_id().await.map_err(|e| {
        tracing::error!("Failed to rotate session id: {}", e);
        AppError::Internal(e.to_string())
    })?;
    session.insert(SESSION_USER_KEY, user).await.map_err(|e| {
        tracing::error!("Failed to store session user: {}", e);
        AppError::Internal(e.to_string())
    })?;
    tracing::info!("User {} signed in via {:?}", user.uid, user.provider);
    Ok(())
}

async fn login(
    State(ctx): State<AppContext>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Response {
    let return_to = sanitize_return_to(query.return_to.as_deref());

    let Some(oauth) = ctx.google_oauth.as_ref() else {
        let err = AppError::Auth(AuthError::ProviderUnavailable);
        return back_to("/signin", "error", &err.user_message(), Some(&return_to)).into_response();
    };

    let (auth_url, csrf_token, pkce_verifier) = oauth.get_auth_url();

    let stored = async {
        session.insert(OAUTH_CSRF_KEY, csrf_token.secret()).await?;
        session.insert(OAUTH_PKCE_KEY, pkce_verifier.secret()).await?;
        session.insert(OAUTH_RETURN_TO_KEY, &return_to).await
    }
    .await;

    if let Err(e) = stored {
        tracing::error!("Failed to store OAuth state: {}", e);
        let err = AppError::Internal(e.to_string());
        return back_to("/signin", "error", &err.user_message(), Some(&return_to)).into_response();
    }

    Redirect::to(&auth_url).into_response()
}

async fn callback(
    State(ctx): State<AppContext>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let expected_state: Option<String> = session.remove(OAUTH_CSRF_KEY).await.ok().flatten();
    let verifier: Option<String> = session.remove(OAUTH_PKCE_KEY).await.ok().flatten();
    let return_to: Option<String> = session.remove(OAUTH_RETURN_TO_KEY).await.ok().flatten();
    let return_to = sanitize_return_to(return_to.as_deref());

    if let Some(error) = query.error {
        tracing::warn!("Google sign-in cancelled: {}", error);
        return back_to("/signin", "error", "Google sign-in was cancelled.", Some(&return_to))
            .into_response();
    }

    let (Some(code), Some(state), Some(expected), Some(verifier)) =
        (query.code, query.state, expected_state, verifier)
    else {
        tracing::warn!("OAuth callback without matching session state");
        return back_to("/signin", "error", "Sign-in expired. Please try again.", Some(&return_to))
            .into_response();
    };

    if state != expected {
        tracing::warn!("OAuth state mismatch");
        return back_to("/signin", "error", "Sign-in expired. Please try again.", Some(&return_to))
            .into_response();
    }

    let Some(oauth) = ctx.google_oauth.as_ref() else {
        let err = AppError::Auth(AuthError::ProviderUnavailable);
        return back_to("/signin", "error", &err.user_message(), Some(&return_to)).into_response();
    };

    let result = match oauth.exchange_code(&code, PkceCodeVerifier::new(verifier)).await {
        Ok(user) => establish(&session, &user).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Redirect::to(&return_to).into_response(),
        Err(e) => back_to("/signin", "error", &failure_message(&e), Some(&return_to)).into_response(),
    }
}

async fn sign_in(
    State(ctx): State<AppContext>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Redirect {
    let return_to = sanitize_return_to(form.return_to.as_deref());

    let result = match ctx.identity.sign_in(&form.email, &form.password).await {
        Ok(user) => establish(&session, &user).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Redirect::to(&return_to),
        Err(e) => back_to("/signin", "error", &failure_message(&e), Some(&return_to)),
    }
}

async fn sign_up(State(ctx): State<AppContext>, Form(form): Form<SignUpForm>) -> Redirect {
    match ctx
        .identity
        .sign_up(&form.name, &form.email, &form.password, &form.repeat_password)
        .await
    {
        Ok(()) => back_to("/signin", "message", VERIFY_EMAIL_SENT, None),
        Err(e) => back_to("/signup", "error", &failure_message(&e), None),
    }
}

async fn forgot_password(
    State(ctx): State<AppContext>,
    Form(form): Form<ForgotPasswordForm>,
) -> Redirect {
    match ctx.identity.send_password_reset(&form.email).await {
        Ok(()) => back_to("/forgot-password", "message", RESET_EMAIL_SENT, None),
        Err(e) => back_to("/forgot-password", "error", &failure_message(&e), None),
    }
}

async fn logout(session: Session) -> Redirect {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to clear session: {}", e);
    }
    Redirect::to("/")
}

async fn me(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "authenticated": user.is_some(),
        "user": user,
    }))
}
