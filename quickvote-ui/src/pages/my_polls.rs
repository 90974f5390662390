use crate::auth::use_auth;
use crate::components::{ConfirmDialog, ErrorDisplay, LoadingSpinner, ShareButtons, SignInPrompt};
use crate::pages::error_message;
use leptos::prelude::*;
use quickvote_app::domain::{poll_path, CategoryExpansion, CategoryGroup, ShareLinks};
use serde::{Deserialize, Serialize};
use server_fn::ServerFnError;
use std::collections::HashSet;

const DELETE_WARNING: &str =
    "Are you sure you want to delete this poll? This action cannot be undone.";

/// The owner's grouped polls and the origin their share links point at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyPolls {
    pub groups: Vec<CategoryGroup>,
    pub public_origin: String,
}

impl MyPolls {
    pub fn share_links(&self, poll_id: &str) -> ShareLinks {
        ShareLinks::for_poll(&self.public_origin, poll_id)
    }
}

/// Poll waiting for the user to confirm its deletion.
#[derive(Debug, Clone, PartialEq)]
struct PendingDelete {
    poll_id: String,
    title: String,
}

impl PendingDelete {
    fn dialog_title(&self) -> String {
        format!("Delete \"{}\"?", self.title)
    }
}

#[server(GetMyPollsFn, "/rpc", endpoint = "my_polls")]
pub async fn get_my_polls() -> Result<MyPolls, ServerFnError> {
    use crate::server::{app_context, session_user, to_server_error};
    use quickvote_app::domain::sign_in_redirect;
    use quickvote_errors::AppError;

    let ctx = app_context()?;
    let user = session_user().await.ok_or_else(|| {
        to_server_error(AppError::Unauthenticated {
            redirect: sign_in_redirect("/my-polls"),
        })
    })?;

    let groups = ctx.poll_queries.my_polls(&user).await.map_err(to_server_error)?;
    Ok(MyPolls {
        groups,
        public_origin: ctx.config.public_origin.clone(),
    })
}

#[server(DeletePollFn, "/rpc", endpoint = "delete_poll")]
pub async fn delete_poll(poll_id: String) -> Result<(), ServerFnError> {
    use crate::server::{app_context, session_user, to_server_error};

    let ctx = app_context()?;
    let user = session_user().await;
    ctx.delete_poll
        .execute(user.as_ref(), &poll_id)
        .await
        .map_err(to_server_error)
}

#[component]
pub fn MyPollsPage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <h1 class="page-title">"My polls"</h1>
        <Transition fallback=|| view! { <LoadingSpinner/> }>
            {move || {
                let state = auth.get();
                if state.loading {
                    view! { <LoadingSpinner/> }.into_any()
                } else if state.is_signed_in() {
                    view! { <PollGroups/> }.into_any()
                } else {
                    view! {
                        <SignInPrompt message="Sign in to see your polls." return_to="/my-polls"/>
                    }
                    .into_any()
                }
            }}
        </Transition>
    }
}

#[component]
fn PollGroups() -> impl IntoView {
    let data = Resource::new(|| (), |_| get_my_polls());
    let expansion = RwSignal::new(CategoryExpansion::default());
    let deleting = RwSignal::new(HashSet::<String>::new());
    let pending = RwSignal::new(None::<PendingDelete>);
    let error = RwSignal::new(None::<String>);

    let delete = Action::new(move |poll_id: &String| {
        let poll_id = poll_id.clone();
        deleting.update(|ids| {
            ids.insert(poll_id.clone());
        });
        async move {
            let result = delete_poll(poll_id.clone()).await;
            deleting.update(|ids| {
                ids.remove(&poll_id);
            });
            result
        }
    });

    Effect::new(move |_| {
        if let Some(result) = delete.value().get() {
            match result {
                Ok(()) => data.refetch(),
                Err(e) => error.set(Some(error_message(&e))),
            }
        }
    });

    let confirm = Callback::new(move |_| {
        if let Some(target) = pending.try_update(Option::take).flatten() {
            delete.dispatch(target.poll_id);
        }
    });
    let cancel = Callback::new(move |_| pending.set(None));

    view! {
        {move || error.get().map(|message| view! { <ErrorDisplay title="Delete failed" message=message/> })}
        {move || pending.get().map(|target| view! {
            <ConfirmDialog
                title=target.dialog_title()
                message=DELETE_WARNING
                on_confirm=confirm
                on_cancel=cancel
            />
        })}
        <div id="my-polls">
            <Transition fallback=|| view! { <LoadingSpinner text="Loading your polls..."/> }>
                {move || data.get().map(|result| match result {
                    Ok(mine) if mine.groups.is_empty() => view! {
                        <div class="prompt">
                            <p class="prompt__message">"You have not created any polls yet."</p>
                            <a href="/create" class="button button--primary">"Create a poll"</a>
                        </div>
                    }
                    .into_any(),
                    Ok(mine) => mine
                        .groups
                        .iter()
                        .map(|group| {
                            let links = group
                                .polls
                                .iter()
                                .map(|poll| mine.share_links(&poll.id))
                                .collect::<Vec<_>>();
                            view! {
                                <CategorySection
                                    group=group.clone()
                                    links=links
                                    expansion=expansion
                                    deleting=deleting
                                    pending=pending
                                />
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any(),
                    Err(e) => view! {
                        <ErrorDisplay
                            title="Could not load your polls"
                            message=error_message(&e)
                            on_retry=Callback::new(move |_| data.refetch())
                        />
                    }
                    .into_any(),
                })}
            </Transition>
        </div>
    }
}

#[component]
fn CategorySection(
    group: CategoryGroup,
    links: Vec<ShareLinks>,
    expansion: RwSignal<CategoryExpansion>,
    deleting: RwSignal<HashSet<String>>,
    pending: RwSignal<Option<PendingDelete>>,
) -> impl IntoView {
    let CategoryGroup { category, polls } = group;
    let count = polls.len();
    let key = category.clone();
    let is_open = move || expansion.with(|e| e.is_expanded(&key));
    let toggle_key = category.clone();

    view! {
        <section class="category">
            <button
                type="button"
                class="category__header"
                on:click=move |_| expansion.update(|e| e.toggle(&toggle_key))
            >
                <span class="category__name">{category}</span>
                <span class="category__count">{count}</span>
            </button>
            <Show when=is_open.clone()>
                <ul class="category__polls">
                    {polls
                        .iter()
                        .zip(links.iter())
                        .map(|(poll, share)| {
                            let target = PendingDelete {
                                poll_id: poll.id.clone(),
                                title: poll.title.clone(),
                            };
                            let busy_id = poll.id.clone();
                            let label_id = poll.id.clone();
                            let is_deleting = move || deleting.with(|ids| ids.contains(&busy_id));
                            let is_deleting_label = move || deleting.with(|ids| ids.contains(&label_id));
                            view! {
                                <li class="category__poll">
                                    <a href=poll_path(&poll.id)>{poll.title.clone()}</a>
                                    <span class="category__votes">
                                        {poll.options.len()} " options · " {poll.total_votes()} " votes"
                                    </span>
                                    <ShareButtons links=share.clone() compact=true/>
                                    <button
                                        type="button"
                                        class="button button--danger"
                                        prop:disabled=is_deleting
                                        on:click=move |_| pending.set(Some(target.clone()))
                                    >
                                        {move || if is_deleting_label() { "Deleting..." } else { "Delete" }}
                                    </button>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()}
                </ul>
            </Show>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_links_use_public_origin() {
        let mine = MyPolls {
            groups: Vec::new(),
            public_origin: "https://quickvote.app".to_string(),
        };
        assert_eq!(mine.share_links("abc").poll_url, "https://quickvote.app/poll/abc");
    }

    #[test]
    fn test_confirm_takes_pending_delete_once() {
        let mut pending = Some(PendingDelete {
            poll_id: "abc".to_string(),
            title: "Lunch?".to_string(),
        });
        assert_eq!(pending.as_ref().map(PendingDelete::dialog_title).as_deref(), Some("Delete \"Lunch?\"?"));

        let confirmed = pending.take();
        assert_eq!(confirmed.map(|p| p.poll_id).as_deref(), Some("abc"));
        assert!(pending.take().is_none());
    }
}
