mod confirm_dialog;
mod error_display;
mod loading_spinner;
mod nav_bar;
mod share_buttons;
mod sign_in_prompt;
mod vote_bar;

pub use confirm_dialog::ConfirmDialog;
pub use error_display::ErrorDisplay;
pub use loading_spinner::LoadingSpinner;
pub use nav_bar::NavBar;
pub use share_buttons::ShareButtons;
pub use sign_in_prompt::SignInPrompt;
pub use vote_bar::VoteBar;
