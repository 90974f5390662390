use crate::auth::use_auth;
use leptos::prelude::*;

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();

    view! {
        <nav class="nav">
            <a href="/" class="nav__brand">"QuickVote"</a>
            <div class="nav__links">
                <a href="/create">"Create"</a>
                <a href="/my-polls">"My polls"</a>
                <a href="/about">"About"</a>
            </div>
            <Transition fallback=|| ()>
                {move || {
                    let state = auth.get();
                    match state.user {
                        Some(user) => view! {
                            <div class="nav__user">
                                {user.avatar_url.clone().map(|src| view! {
                                    <img src=src alt="" class="nav__avatar"/>
                                })}
                                <span class="nav__name">{user.display_name().to_string()}</span>
                                <form action="/auth/logout" method="post">
                                    <button type="submit" class="nav__logout">"Sign out"</button>
                                </form>
                            </div>
                        }.into_any(),
                        None if state.loading => view! { <span class="nav__user"></span> }.into_any(),
                        None => view! {
                            <a href="/signin" class="button button--primary">"Sign in"</a>
                        }.into_any(),
                    }
                }}
            </Transition>
        </nav>
    }
}
