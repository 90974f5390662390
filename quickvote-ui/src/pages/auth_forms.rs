use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use quickvote_app::domain::{google_login_path, sanitize_return_to};

/// `?error=` and `?message=` set by the auth handlers when they redirect back here.
fn flash() -> (Memo<Option<String>>, Memo<Option<String>>) {
    let query = use_query_map();
    let error = Memo::new(move |_| query.read().get("error"));
    let message = Memo::new(move |_| query.read().get("message"));
    (error, message)
}

#[component]
fn Flash(error: Memo<Option<String>>, message: Memo<Option<String>>) -> impl IntoView {
    view! {
        {move || error.get().map(|e| view! { <p class="form__error" role="alert">{e}</p> })}
        {move || message.get().map(|m| view! { <p class="form__message" role="status">{m}</p> })}
    }
}

#[component]
pub fn SignInPage() -> impl IntoView {
    let query = use_query_map();
    let return_to = Memo::new(move |_| sanitize_return_to(query.read().get("returnTo").as_deref()));
    let google_href = move || google_login_path(&return_to.get());
    let (error, message) = flash();

    view! {
        <div class="auth">
            <h1 class="page-title">"Sign in"</h1>
            <Flash error=error message=message/>

            <a href=google_href class="button google-login-btn">"Continue with Google"</a>
            <p class="auth__divider">"or"</p>

            <form action="/auth/signin" method="post" class="form">
                <input type="hidden" name="returnTo" prop:value=move || return_to.get()/>
                <label class="form__label" for="email">"Email"</label>
                <input id="email" name="email" type="email" class="form__input" required/>
                <label class="form__label" for="password">"Password"</label>
                <input id="password" name="password" type="password" class="form__input" required/>
                <button type="submit" class="button button--primary">"Sign in"</button>
            </form>

            <p class="auth__links">
                <a href="/forgot-password">"Forgot your password?"</a>
                " · "
                <a href="/signup">"Create an account"</a>
            </p>
        </div>
    }
}

#[component]
pub fn SignUpPage() -> impl IntoView {
    let (error, message) = flash();

    view! {
        <div class="auth">
            <h1 class="page-title">"Create an account"</h1>
            <Flash error=error message=message/>

            <form action="/auth/signup" method="post" class="form">
                <label class="form__label" for="name">"Name"</label>
                <input id="name" name="name" class="form__input" required/>
                <label class="form__label" for="email">"Email"</label>
                <input id="email" name="email" type="email" class="form__input" required/>
                <label class="form__label" for="password">"Password"</label>
                <input id="password" name="password" type="password" class="form__input" minlength="6" required/>
                <label class="form__label" for="repeatPassword">"Repeat password"</label>
                <input id="repeatPassword" name="repeatPassword" type="password" class="form__input" required/>
                <button type="submit" class="button button--primary">"Sign up"</button>
            </form>

            <p class="auth__links">
                "Already have an account? " <a href="/signin">"Sign in"</a>
            </p>
        </div>
    }
}

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let (error, message) = flash();

    view! {
        <div class="auth">
            <h1 class="page-title">"Reset your password"</h1>
            <Flash error=error message=message/>

            <form action="/auth/forgot-password" method="post" class="form">
                <label class="form__label" for="email">"Email"</label>
                <input id="email" name="email" type="email" class="form__input" required/>
                <button type="submit" class="button button--primary">"Send reset link"</button>
            </form>

            <p class="auth__links">
                <a href="/signin">"Back to sign in"</a>
            </p>
        </div>
    }
}
