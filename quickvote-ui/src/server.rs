use axum::extract::ConnectInfo;
use leptos::prelude::*;
use quickvote_app::domain::{SessionUser, SESSION_USER_KEY};
use quickvote_app::AppContext;
use quickvote_errors::AppError;
use server_fn::ServerFnError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_sessions::Session;

pub fn app_context() -> Result<AppContext, ServerFnError> {
    use_context::<AppContext>().ok_or_else(|| ServerFnError::new("Application context missing"))
}

/// The signed-in user for the current request, if any.
pub async fn session_user() -> Option<SessionUser> {
    let session = match leptos_axum::extract::<Session>().await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("No session on request: {}", e);
            return None;
        }
    };
    session
        .get::<SessionUser>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Unreadable session user: {}", e);
            None
        })
}

pub async fn client_ip() -> IpAddr {
    leptos_axum::extract::<ConnectInfo<SocketAddr>>()
        .await
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Rate limit for the paid AI helpers, keyed by caller address.
pub async fn check_ai_rate_limit(ctx: &AppContext) -> Result<(), ServerFnError> {
    let ip = client_ip().await;
    ctx.rate_limiter
        .check_rate_limit(ip)
        .map_err(|e| to_server_error(e.into()))
}

/// Sends unauthenticated callers to sign-in; everything else becomes the user-facing message.
pub fn to_server_error(err: AppError) -> ServerFnError {
    if let AppError::Unauthenticated { redirect } = &err {
        leptos_axum::redirect(redirect);
    }
    if !err.is_client_error() {
        tracing::error!("Server function failed: {}", err);
    }
    ServerFnError::new(err.user_message())
}
