mod google_oauth;
mod identity;

pub use google_oauth::{GoogleOAuth, GoogleUserInfo};
pub use identity::{IdentityClient, DEFAULT_IDENTITY_URL};
