pub mod auth;
pub mod components;
pub mod pages;

#[cfg(feature = "ssr")]
mod server;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use auth::AuthProvider;
use components::NavBar;
use pages::{
    AboutPage, CreatePollPage, ForgotPasswordPage, HomePage, MyPollsPage, PollPage, SignInPage,
    SignUpPage,
};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="QuickVote | Create polls in seconds"/>
        <Meta name="description" content="Create a poll, share the link and watch the votes come in live"/>

        <AuthProvider>
            <Router>
                <NavBar/>
                <main class="container">
                    <Routes fallback=|| "Page not found">
                        <Route path=path!("/") view=HomePage/>
                        <Route path=path!("/create") view=CreatePollPage/>
                        <Route path=path!("/poll/:id") view=PollPage/>
                        <Route path=path!("/my-polls") view=MyPollsPage/>
                        <Route path=path!("/signin") view=SignInPage/>
                        <Route path=path!("/signup") view=SignUpPage/>
                        <Route path=path!("/forgot-password") view=ForgotPasswordPage/>
                        <Route path=path!("/about") view=AboutPage/>
                    </Routes>
                </main>
            </Router>
        </AuthProvider>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
