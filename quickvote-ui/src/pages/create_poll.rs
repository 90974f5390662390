use crate::auth::use_auth;
use crate::components::{ErrorDisplay, LoadingSpinner, SignInPrompt};
use crate::pages::error_message;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use quickvote_app::domain::{poll_path, MAX_OPTIONS, MIN_OPTIONS};
use server_fn::ServerFnError;

#[server(
    name = CreatePollFn,
    prefix = "/rpc",
    endpoint = "create_poll",
    input = server_fn::codec::Json
)]
pub async fn create_poll(
    title: String,
    options: Vec<String>,
    category: Option<String>,
) -> Result<String, ServerFnError> {
    use crate::server::{app_context, session_user, to_server_error};
    use quickvote_app::domain::PollDraft;

    let ctx = app_context()?;
    let user = session_user().await;
    let draft = PollDraft {
        title,
        options,
        category,
    };

    ctx.create_poll
        .execute(user.as_ref(), draft)
        .await
        .map(|poll| poll.id)
        .map_err(to_server_error)
}

#[server(
    name = GenerateOptionsFn,
    prefix = "/rpc",
    endpoint = "generate_options",
    input = server_fn::codec::Json
)]
pub async fn generate_options(
    question: String,
    used_options: Vec<String>,
) -> Result<Vec<String>, ServerFnError> {
    use crate::server::{app_context, check_ai_rate_limit, to_server_error};
    use quickvote_app::application::DraftAssistant;

    let ctx = app_context()?;
    DraftAssistant::check_question(&question).map_err(to_server_error)?;
    check_ai_rate_limit(&ctx).await?;
    ctx.draft_assistant
        .generate_options(&question, &used_options)
        .await
        .map_err(to_server_error)
}

#[server(RefineQuestionFn, "/rpc", endpoint = "refine_question")]
pub async fn refine_question(question: String) -> Result<String, ServerFnError> {
    use crate::server::{app_context, check_ai_rate_limit, to_server_error};
    use quickvote_app::application::DraftAssistant;

    let ctx = app_context()?;
    DraftAssistant::check_question(&question).map_err(to_server_error)?;
    check_ai_rate_limit(&ctx).await?;
    ctx.draft_assistant
        .refine_question(&question)
        .await
        .map_err(to_server_error)
}

#[server(
    name = CategorizePollFn,
    prefix = "/rpc",
    endpoint = "categorize_poll",
    input = server_fn::codec::Json
)]
pub async fn categorize_poll(title: String, options: Vec<String>) -> Result<String, ServerFnError> {
    use crate::server::{app_context, check_ai_rate_limit, to_server_error};
    use quickvote_app::application::DraftAssistant;

    let ctx = app_context()?;
    DraftAssistant::check_category_input(&title, &options).map_err(to_server_error)?;
    check_ai_rate_limit(&ctx).await?;
    ctx.draft_assistant
        .categorize(&title, &options)
        .await
        .map_err(to_server_error)
}

/// The AI helpers only run on a question longer than this.
const MIN_AI_QUESTION_CHARS: usize = 10;

fn filled(options: &[String]) -> Vec<String> {
    options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

fn long_enough_for_ai(question: &str) -> bool {
    question.trim().chars().count() > MIN_AI_QUESTION_CHARS
}

/// Every suggestion accepted so far plus what the form holds now, without repeats.
/// An accepted suggestion the user later removed stays excluded.
fn used_options(accepted: &[String], options: &[String]) -> Vec<String> {
    let mut used: Vec<String> = Vec::new();
    for option in accepted.iter().cloned().chain(filled(options)) {
        if !used.contains(&option) {
            used.push(option);
        }
    }
    used
}

fn has_room(options: &[String]) -> bool {
    options.len() < MAX_OPTIONS || options.iter().any(|o| o.trim().is_empty())
}

/// Fills the first blank option with `suggestion`, or appends it while there is room.
fn place_suggestion(options: &mut Vec<String>, suggestion: &str) -> bool {
    if let Some(slot) = options.iter_mut().find(|o| o.trim().is_empty()) {
        *slot = suggestion.to_string();
        return true;
    }
    if options.len() < MAX_OPTIONS {
        options.push(suggestion.to_string());
        return true;
    }
    false
}

#[component]
pub fn CreatePollPage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <h1 class="page-title">"Create a poll"</h1>
        <Transition fallback=|| view! { <LoadingSpinner/> }>
            {move || {
                let state = auth.get();
                if state.loading {
                    view! { <LoadingSpinner/> }.into_any()
                } else if state.is_signed_in() {
                    view! { <PollForm/> }.into_any()
                } else {
                    view! {
                        <SignInPrompt message="Sign in to create a poll." return_to="/create"/>
                    }
                    .into_any()
                }
            }}
        </Transition>
    }
}

#[component]
fn PollForm() -> impl IntoView {
    let title = RwSignal::new(String::new());
    let options = RwSignal::new(vec![String::new(); MIN_OPTIONS]);
    let category = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);

    let accepted = RwSignal::new(Vec::<String>::new());
    let suggestions = RwSignal::new(Vec::<String>::new());
    let generated = RwSignal::new(false);
    let refined = RwSignal::new(None::<String>);
    let navigate = use_navigate();

    let suggest = Action::new(move |_: &()| {
        let question = title.get_untracked();
        let used = used_options(&accepted.get_untracked(), &options.get_untracked());
        async move { generate_options(question, used).await }
    });
    let refine = Action::new(move |_: &()| {
        let question = title.get_untracked();
        async move { refine_question(question).await }
    });
    let categorize = Action::new(move |_: &()| {
        let question = title.get_untracked();
        let current = filled(&options.get_untracked());
        async move { categorize_poll(question, current).await }
    });
    let submit = Action::new(move |_: &()| {
        let question = title.get_untracked();
        let current = filled(&options.get_untracked());
        let category = Some(category.get_untracked()).filter(|c| !c.trim().is_empty());
        async move { create_poll(question, current, category).await }
    });

    Effect::new(move |_| {
        if let Some(result) = suggest.value().get() {
            match result {
                Ok(fresh) if fresh.is_empty() => error.set(Some(
                    "No new suggestions for this question. Try rephrasing it.".to_string(),
                )),
                Ok(fresh) => {
                    suggestions.set(fresh);
                    generated.set(true);
                }
                Err(e) => error.set(Some(error_message(&e))),
            }
        }
    });
    Effect::new(move |_| {
        if let Some(result) = refine.value().get() {
            match result {
                Ok(text) => {
                    let current = title.get_untracked();
                    refined.set(Some(text).filter(|t| t.trim() != current.trim()));
                }
                Err(e) => error.set(Some(error_message(&e))),
            }
        }
    });
    Effect::new(move |_| {
        if let Some(result) = categorize.value().get() {
            match result {
                Ok(label) => category.set(label),
                Err(e) => error.set(Some(error_message(&e))),
            }
        }
    });
    Effect::new(move |_| {
        if let Some(result) = submit.value().get() {
            match result {
                Ok(poll_id) => navigate(&poll_path(&poll_id), Default::default()),
                Err(e) => error.set(Some(error_message(&e))),
            }
        }
    });

    let accept = move |suggestion: String| {
        let placed = options
            .try_update(|o| place_suggestion(o, &suggestion))
            .unwrap_or(false);
        if placed {
            accepted.update(|a| a.push(suggestion.clone()));
            suggestions.update(|s| s.retain(|x| x != &suggestion));
        }
    };

    let busy = move || {
        suggest.pending().get()
            || refine.pending().get()
            || categorize.pending().get()
            || submit.pending().get()
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        error.set(None);
        submit.dispatch(());
    };

    view! {
        <form class="poll-form" on:submit=on_submit>
            <label class="poll-form__label" for="title">"Question"</label>
            <div class="poll-form__row">
                <input
                    id="title"
                    class="poll-form__input"
                    placeholder="What should we have for lunch?"
                    prop:value=move || title.get()
                    on:input=move |ev| {
                        title.set(event_target_value(&ev));
                        refined.set(None);
                    }
                />
                <button
                    type="button"
                    class="button"
                    prop:disabled=busy
                    on:click=move |_| {
                        error.set(None);
                        if !long_enough_for_ai(&title.get_untracked()) {
                            error.set(Some("Please enter a longer question to refine".to_string()));
                            return;
                        }
                        refined.set(None);
                        refine.dispatch(());
                    }
                >
                    {move || if refine.pending().get() { "Refining..." } else { "Refine" }}
                </button>
            </div>
            {move || refined.get().map(|text| {
                let chosen = text.clone();
                view! {
                    <div class="refined">
                        <p class="refined__label">"Suggested:"</p>
                        <div class="refined__row">
                            <button
                                type="button"
                                class="refined__accept"
                                on:click=move |_| {
                                    title.set(chosen.clone());
                                    refined.set(None);
                                }
                            >
                                {text}
                            </button>
                            <button
                                type="button"
                                class="button button--ghost"
                                aria-label="Dismiss refined question"
                                on:click=move |_| refined.set(None)
                            >
                                "×"
                            </button>
                        </div>
                    </div>
                }
            })}

            <span class="poll-form__label">"Options"</span>
            <ol class="poll-form__options">
                <For
                    each=move || (0..options.with(Vec::len))
                    key=|index| *index
                    children=move |index| {
                        view! {
                            <li class="poll-form__option">
                                <input
                                    class="poll-form__input"
                                    placeholder=format!("Option {}", index + 1)
                                    prop:value=move || {
                                        options.with(|o| o.get(index).cloned().unwrap_or_default())
                                    }
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        options.update(|o| {
                                            if let Some(slot) = o.get_mut(index) {
                                                *slot = value;
                                            }
                                        });
                                    }
                                />
                                <button
                                    type="button"
                                    class="button button--ghost"
                                    prop:disabled=move || options.with(Vec::len) <= MIN_OPTIONS
                                    on:click=move |_| options.update(|o| {
                                        if o.len() > MIN_OPTIONS && index < o.len() {
                                            o.remove(index);
                                        }
                                    })
                                >
                                    "Remove"
                                </button>
                            </li>
                        }
                    }
                />
            </ol>
            <div class="poll-form__row">
                <button
                    type="button"
                    class="button"
                    prop:disabled=move || options.with(Vec::len) >= MAX_OPTIONS
                    on:click=move |_| options.update(|o| {
                        if o.len() < MAX_OPTIONS {
                            o.push(String::new());
                        }
                    })
                >
                    "Add option"
                </button>
                <button
                    type="button"
                    class="button"
                    prop:disabled=busy
                    on:click=move |_| {
                        error.set(None);
                        if !long_enough_for_ai(&title.get_untracked()) {
                            error.set(Some(
                                "Please enter a longer poll question for better suggestions".to_string(),
                            ));
                            return;
                        }
                        suggest.dispatch(());
                    }
                >
                    {move || match (suggest.pending().get(), generated.get()) {
                        (true, _) => "Thinking...",
                        (false, true) => "More suggestions",
                        (false, false) => "Suggest options",
                    }}
                </button>
            </div>

            <Show when=move || suggestions.with(|s| !s.is_empty())>
                <div class="suggestions">
                    <div class="suggestions__header">
                        <span class="suggestions__title">"AI suggestions"</span>
                        <button
                            type="button"
                            class="button button--ghost"
                            on:click=move |_| suggestions.set(Vec::new())
                        >
                            "Dismiss all"
                        </button>
                    </div>
                    <ul class="suggestions__list">
                        <For
                            each=move || suggestions.get()
                            key=|suggestion| suggestion.clone()
                            children=move |suggestion| {
                                let label = suggestion.clone();
                                let dismissed = suggestion.clone();
                                view! {
                                    <li class="chip">
                                        <button
                                            type="button"
                                            class="chip__add"
                                            prop:disabled=move || !options.with(|o| has_room(o))
                                            on:click=move |_| accept(suggestion.clone())
                                        >
                                            "+ " {label}
                                        </button>
                                        <button
                                            type="button"
                                            class="chip__dismiss"
                                            aria-label="Dismiss suggestion"
                                            on:click=move |_| {
                                                suggestions.update(|s| s.retain(|x| x != &dismissed))
                                            }
                                        >
                                            "×"
                                        </button>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </div>
            </Show>

            <label class="poll-form__label" for="category">"Category"</label>
            <div class="poll-form__row">
                <input
                    id="category"
                    class="poll-form__input"
                    placeholder="Uncategorized"
                    prop:value=move || category.get()
                    on:input=move |ev| category.set(event_target_value(&ev))
                />
                <button
                    type="button"
                    class="button"
                    prop:disabled=busy
                    on:click=move |_| {
                        error.set(None);
                        categorize.dispatch(());
                    }
                >
                    "Suggest category"
                </button>
            </div>

            {move || error.get().map(|message| view! { <ErrorDisplay message=message/> })}

            <button type="submit" class="button button--primary" prop:disabled=busy>
                {move || if submit.pending().get() { "Creating..." } else { "Create poll" }}
            </button>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filled_drops_blank_options() {
        let options = strings(&[" Pizza ", "   ", "Sushi"]);
        assert_eq!(filled(&options), strings(&["Pizza", "Sushi"]));
    }

    #[test]
    fn test_short_questions_skip_ai() {
        assert!(!long_enough_for_ai("  Lunch?   "));
        assert!(!long_enough_for_ai("0123456789"));
        assert!(long_enough_for_ai("Best lunch spot?"));
    }

    #[test]
    fn test_used_options_remember_removed_suggestions() {
        let accepted = strings(&["Pizza", "Sushi"]);
        // "Sushi" was accepted and then removed from the form.
        let options = strings(&["Pizza", "Tacos", ""]);

        assert_eq!(used_options(&accepted, &options), strings(&["Pizza", "Sushi", "Tacos"]));
    }

    #[test]
    fn test_place_suggestion_fills_blank_then_appends_until_full() {
        let mut options = strings(&["Pizza", ""]);
        assert!(place_suggestion(&mut options, "Sushi"));
        assert_eq!(options, strings(&["Pizza", "Sushi"]));

        while options.len() < MAX_OPTIONS {
            assert!(place_suggestion(&mut options, "More"));
        }
        assert!(!has_room(&options));
        assert!(!place_suggestion(&mut options, "Tacos"));
        assert_eq!(options.len(), MAX_OPTIONS);
    }
}
