use serde::{Deserialize, Serialize};

/// Session key under which the signed-in [`SessionUser`] is stored.
pub const SESSION_USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Google,
    Password,
}

/// The identity a request acts as, as handed to us by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: AuthProvider,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Read-only snapshot of who is signed in; only the auth provider updates it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub loading: bool,
}

impl AuthState {
    pub fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn resolved(user: Option<SessionUser>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Keeps post-login redirects on this site: local absolute paths only.
pub fn sanitize_return_to(return_to: Option<&str>) -> String {
    match return_to.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

pub fn sign_in_redirect(return_to: &str) -> String {
    format!("/signin?returnTo={}", urlencoding::encode(return_to))
}

pub fn google_login_path(return_to: &str) -> String {
    format!("/auth/login?returnTo={}", urlencoding::encode(return_to))
}
