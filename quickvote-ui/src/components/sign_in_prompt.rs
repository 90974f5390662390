use leptos::prelude::*;
use quickvote_app::domain::sign_in_redirect;

/// Shown in place of pages that need an account.
#[component]
pub fn SignInPrompt(#[prop(into)] message: String, #[prop(into)] return_to: String) -> impl IntoView {
    view! {
        <div class="prompt">
            <p class="prompt__message">{message}</p>
            <a href=sign_in_redirect(&return_to) class="button button--primary">"Sign in"</a>
        </div>
    }
}
