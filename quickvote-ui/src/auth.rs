use leptos::prelude::*;
use quickvote_app::domain::{AuthState, SessionUser};
use server_fn::ServerFnError;

#[server(GetCurrentUserFn, "/rpc", endpoint = "current_user")]
pub async fn get_current_user() -> Result<Option<SessionUser>, ServerFnError> {
    Ok(crate::server::session_user().await)
}

/// Provides the read-only auth state to everything below it. Only the session
/// lookup writes it; pages read it through [`use_auth`].
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let lookup = Resource::new(|| (), |_| get_current_user());

    let state = Signal::derive(move || match lookup.get() {
        None => AuthState::loading(),
        Some(Ok(user)) => AuthState::resolved(user),
        Some(Err(e)) => {
            tracing::warn!("Session lookup failed: {}", e);
            AuthState::resolved(None)
        }
    });
    provide_context(state);

    children()
}

pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>().unwrap_or_else(|| Signal::stored(AuthState::resolved(None)))
}
