use crate::AuthError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// `redirect` is the sign-in URL that brings the caller back afterwards.
    #[error("Sign in required")]
    Unauthenticated { redirect: String },

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Authentication failed: {0}")]
    Auth(AuthError),

    #[error("Poll not found")]
    NotFound,

    #[error("API key not configured")]
    AiNotConfigured,

    #[error("AI request failed: {0}")]
    AiFailed(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Unauthenticated { .. } => "Please sign in to continue.".to_string(),
            Self::Forbidden(_) => "You are not allowed to do that.".to_string(),
            Self::Auth(err) => err.user_message().to_string(),
            Self::NotFound => {
                "The poll you are looking for doesn't exist or was deleted.".to_string()
            }
            Self::AiNotConfigured => "AI suggestions are not available right now.".to_string(),
            Self::AiFailed(_) => "AI request failed. Please try again.".to_string(),
            Self::RateLimited(msg) => msg.clone(),
            Self::Database(_) => "Could not save your changes. Please try again.".to_string(),
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// True for failures caused by the caller rather than by us or an upstream service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Unauthenticated { .. }
                | Self::Forbidden(_)
                | Self::Auth(_)
                | Self::NotFound
                | Self::RateLimited(_)
        )
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect: Option<String>,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::Validation(_) | AppError::Auth(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::AiFailed(_) => StatusCode::BAD_GATEWAY,
                AppError::AiNotConfigured | AppError::Database(_) | AppError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let error = match &self {
                AppError::AiNotConfigured => self.to_string(),
                _ => self.user_message(),
            };
            let redirect = match self {
                AppError::Unauthenticated { redirect } => Some(redirect),
                _ => None,
            };
            (status, Json(ErrorResponse { error, redirect })).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_details_stay_out_of_user_message() {
        let err = AppError::Database("relation \"polls\" does not exist".to_string());
        assert!(!err.user_message().contains("relation"));

        let err = AppError::AiFailed("401 Unauthorized from upstream".to_string());
        assert_eq!(err.user_message(), "AI request failed. Please try again.");
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = AppError::validation("Please provide at least 2 options");
        assert_eq!(err.user_message(), "Please provide at least 2 options");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_auth_error_converts() {
        let err: AppError = AuthError::EmailInUse.into();
        assert_eq!(err.user_message(), "Email already in use");
    }
}
