use leptos::prelude::*;

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <article class="about">
            <h1>"About QuickVote"</h1>
            <p>
                "QuickVote is a small polling app. Sign in, write a question with two to six "
                "answers and share the link. Anyone with an account can vote once and switch "
                "their answer later; results are shown as live percentages."
            </p>
            <p>
                "The AI helpers on the create page suggest answer options, rewrite a question "
                "so it reads clearly and pick a category. They only ever see the text of your poll."
            </p>
            <p>
                "Your polls are grouped by category under "
                <a href="/my-polls">"My polls"</a>
                ", where you can also delete them."
            </p>
        </article>
    }
}
