use crate::domain::{AuthProvider, SessionUser};
use quickvote_errors::{AppError, AuthError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Email/password accounts backed by an Identity Toolkit compatible REST API.
#[derive(Clone)]
pub struct IdentityClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    local_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_IDENTITY_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Signs in and refuses accounts whose email has not been verified yet.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidEmail.into());
        }

        let token: TokenResponse = self
            .call(
                "accounts:signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let lookup: LookupResponse = self
            .call(
                "accounts:lookup",
                &IdTokenRequest {
                    id_token: &token.id_token,
                },
            )
            .await?;

        let account = lookup
            .users
            .into_iter()
            .find(|u| u.local_id == token.local_id)
            .ok_or(AuthError::UserNotFound)?;

        if !account.email_verified {
            tracing::warn!("Sign-in refused for unverified account {}", account.local_id);
            return Err(AuthError::EmailNotVerified.into());
        }

        Ok(SessionUser {
            uid: account.local_id,
            email: account.email,
            name: account.display_name.filter(|n| !n.is_empty()),
            avatar_url: account.photo_url,
            provider: AuthProvider::Password,
        })
    }

    /// Creates the account, sets its display name and sends the verification
    /// email. The caller is not signed in; they must verify first.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        repeat_password: &str,
    ) -> Result<(), AppError> {
        if password != repeat_password {
            return Err(AuthError::PasswordMismatch.into());
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidEmail.into());
        }

        let token: TokenResponse = self
            .call(
                "accounts:signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let name = name.trim();
        if !name.is_empty() {
            let _: serde_json::Value = self
                .call(
                    "accounts:update",
                    &UpdateProfileRequest {
                        id_token: &token.id_token,
                        display_name: name,
                        return_secure_token: false,
                    },
                )
                .await?;
        }

        let _: serde_json::Value = self
            .call(
                "accounts:sendOobCode",
                &OobRequest {
                    request_type: "VERIFY_EMAIL",
                    email: None,
                    id_token: Some(&token.id_token),
                },
            )
            .await?;

        tracing::info!("Created account {}, verification email sent", token.local_id);
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidEmail.into());
        }

        let _: serde_json::Value = self
            .call(
                "accounts:sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email: Some(email),
                    id_token: None,
                },
            )
            .await?;
        Ok(())
    }

    async fn call<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AuthError::ProviderUnavailable)?;
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity request {} failed: {}", method, e);
                AppError::Auth(AuthError::ProviderUnavailable)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_default();
            tracing::warn!("Identity {} rejected: {} {}", method, status, code);
            return Err(AuthError::from_provider_code(&code).into());
        }

        response.json::<R>().await.map_err(|e| {
            tracing::error!("Identity {} returned an unreadable body: {}", method, e);
            AppError::Auth(AuthError::Unknown(e.to_string()))
        })
    }
}
