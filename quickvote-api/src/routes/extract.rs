use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use quickvote_app::domain::{SessionUser, SESSION_USER_KEY};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower_sessions::Session;

/// Peer address of the caller; loopback when the server was not started with connect info.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        Ok(ClientIp(ip))
    }
}

/// The signed-in user, if the session carries one.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await else {
            return Ok(CurrentUser(None));
        };
        let user = session
            .get::<SessionUser>(SESSION_USER_KEY)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Unreadable session user: {}", e);
                None
            });
        Ok(CurrentUser(user))
    }
}
