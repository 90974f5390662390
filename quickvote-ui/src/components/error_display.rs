use leptos::prelude::*;

/// Inline error box. `on_retry` adds a retry button, e.g. to refetch a resource.
#[component]
pub fn ErrorDisplay(
    #[prop(into)] message: String,
    #[prop(optional, into)] title: Option<String>,
    #[prop(optional)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    let title = title.unwrap_or_else(|| "Something went wrong".to_string());

    view! {
        <div class="error" role="alert">
            <p class="error__title">{title}</p>
            <p class="error__message">{message}</p>
            {on_retry.map(|retry| view! {
                <button type="button" class="error__retry" on:click=move |_| retry.run(())>
                    "Try again"
                </button>
            })}
        </div>
    }
}
