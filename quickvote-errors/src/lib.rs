mod app_error;
mod auth_error;

pub use app_error::AppError;
pub use auth_error::AuthError;
