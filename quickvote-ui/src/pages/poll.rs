use crate::components::{ErrorDisplay, LoadingSpinner, ShareButtons, VoteBar};
use crate::pages::error_message;
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use quickvote_app::domain::{PollView, ShareLinks};
use serde::{Deserialize, Serialize};
use server_fn::ServerFnError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPageData {
    pub view: PollView,
    pub share: ShareLinks,
}

/// `None` when the poll does not exist (or was deleted).
#[server(GetPollPageFn, "/rpc", endpoint = "poll_page")]
pub async fn get_poll_page(poll_id: String) -> Result<Option<PollPageData>, ServerFnError> {
    use crate::server::{app_context, session_user, to_server_error};
    use quickvote_errors::AppError;

    let ctx = app_context()?;
    let user = session_user().await;

    match ctx.poll_queries.get_view(&poll_id, user.as_ref()).await {
        Ok(view) => Ok(Some(PollPageData {
            share: ctx.share_links(&view.id),
            view,
        })),
        Err(AppError::NotFound) => Ok(None),
        Err(e) => Err(to_server_error(e)),
    }
}

#[component]
pub fn PollPage() -> impl IntoView {
    let params = use_params_map();
    let poll_id = move || params.read().get("id").unwrap_or_default();
    let page = Resource::new(poll_id, get_poll_page);

    view! {
        <Suspense fallback=|| view! { <LoadingSpinner text="Loading poll..."/> }>
            {move || page.get().map(|result| match result {
                Ok(Some(data)) => view! { <PollDetail data=data/> }.into_any(),
                Ok(None) => view! {
                    <div class="prompt">
                        <p class="prompt__message">
                            "The poll you are looking for doesn't exist or was deleted."
                        </p>
                        <a href="/create" class="button button--primary">"Create a poll"</a>
                    </div>
                }
                .into_any(),
                Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
            })}
        </Suspense>
    }
}

/// Rendered once on the server; the live script keeps the numbers current
/// and sends votes.
#[component]
fn PollDetail(data: PollPageData) -> impl IntoView {
    let PollPageData { view: poll, share } = data;
    let total = poll.total_label();
    let my_choice = poll.my_choice;

    view! {
        <section class="poll" id="poll" data-poll-id=poll.id.clone()>
            <span class="poll__category">{poll.category.clone()}</span>
            <h1 class="poll__title">{poll.title.clone()}</h1>
            <ul class="poll__options">
                {poll
                    .options
                    .into_iter()
                    .map(|option| {
                        let selected = my_choice == Some(option.index);
                        view! { <VoteBar option=option selected=selected/> }
                    })
                    .collect::<Vec<_>>()}
            </ul>
            <p class="poll__total" id="poll-total">{total}</p>
            <p class="poll__status" id="poll-status" role="status"></p>
            <ShareButtons links=share/>
        </section>
    }
}
