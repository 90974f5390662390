mod category;
mod poll;
mod share;
mod tally;
mod user;

pub use category::{group_by_category, CategoryExpansion, CategoryGroup};
pub use poll::{
    normalize_category, NewPoll, Poll, PollDraft, PollPointer, VotePlan, DEFAULT_CATEGORY,
    MAX_OPTIONS, MIN_OPTIONS,
};
pub use share::{poll_path, ShareLinks};
pub use tally::{display_total, percentage, OptionResult, PollView};
pub use user::{
    google_login_path, sanitize_return_to, sign_in_redirect, AuthProvider, AuthState,
    SessionUser, SESSION_USER_KEY,
};
