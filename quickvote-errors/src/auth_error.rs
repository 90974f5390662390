use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Failures reported by the identity providers, normalised to what we show users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,

    #[error("weak password")]
    WeakPassword,

    #[error("email already in use")]
    EmailInUse,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email not verified")]
    EmailNotVerified,

    #[error("user not found")]
    UserNotFound,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("sign-in method not configured")]
    ProviderUnavailable,

    #[error("provider error: {0}")]
    Unknown(String),
}

impl FromStr for AuthError {
    type Err = std::convert::Infallible;

    /// Accepts both SDK-style codes (`auth/weak-password`) and identity REST
    /// codes (`WEAK_PASSWORD : Password should be at least 6 characters`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.split(" : ").next().unwrap_or(s).trim();
        let err = match code {
            "auth/email-already-in-use" | "EMAIL_EXISTS" => AuthError::EmailInUse,
            "auth/invalid-email" | "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "auth/weak-password" | "WEAK_PASSWORD" => AuthError::WeakPassword,
            "auth/invalid-credential"
            | "auth/wrong-password"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_PASSWORD"
            | "MISSING_PASSWORD"
            | "USER_DISABLED" => AuthError::InvalidCredentials,
            "auth/user-not-found" | "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
            other => AuthError::Unknown(other.to_string()),
        };
        Ok(err)
    }
}

impl AuthError {
    pub fn from_provider_code(code: &str) -> Self {
        match code.parse() {
            Ok(err) => err,
            Err(never) => match never {},
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidEmail => "Invalid email address",
            Self::WeakPassword => "Password should be at least 6 characters",
            Self::EmailInUse => "Email already in use",
            Self::InvalidCredentials => "Invalid Credentials",
            Self::EmailNotVerified => "Please verify your email before logging in.",
            Self::UserNotFound => "No account found with this email",
            Self::PasswordMismatch => "Passwords do not match",
            Self::ProviderUnavailable => "This sign-in method is not available right now.",
            Self::Unknown(_) => "An error occurred. Please try again.",
        }
    }
}
