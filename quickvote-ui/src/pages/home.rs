use crate::auth::use_auth;
use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="hero">
            <h1 class="hero__title">"QuickVote"</h1>
            <p class="hero__subtitle">
                "Ask a question, share the link and watch the answers come in live."
            </p>
            <div class="hero__actions">
                <a href="/create" class="button button--primary">"Create a poll"</a>
                <Transition fallback=|| ()>
                    {move || auth.get().is_signed_in().then(|| view! {
                        <a href="/my-polls" class="button">"My polls"</a>
                    })}
                </Transition>
            </div>
        </div>

        <ul class="features">
            <li>"AI suggests answer options, tidies your question and picks a category."</li>
            <li>"Everyone gets one vote and can change it at any time."</li>
            <li>"Results update on every screen the moment someone votes."</li>
        </ul>
    }
}
