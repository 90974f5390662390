mod about;
mod auth_forms;
mod create_poll;
mod home;
mod my_polls;
mod poll;

pub use about::AboutPage;
pub use auth_forms::{ForgotPasswordPage, SignInPage, SignUpPage};
pub use create_poll::{
    CategorizePollFn, CreatePollFn, CreatePollPage, GenerateOptionsFn, RefineQuestionFn,
};
pub use home::HomePage;
pub use my_polls::{DeletePollFn, GetMyPollsFn, MyPollsPage};
pub use poll::{GetPollPageFn, PollPage, PollPageData};

use server_fn::ServerFnError;

/// The message a server function failed with, without the transport prefix.
pub(crate) fn error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(message) => message.clone(),
        other => {
            tracing::warn!("Server function transport error: {}", other);
            "Something went wrong. Please try again.".to_string()
        }
    }
}
