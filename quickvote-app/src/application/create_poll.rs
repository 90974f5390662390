use crate::domain::{sign_in_redirect, Poll, PollDraft, SessionUser};
use crate::infrastructure::live::PollFeed;
use crate::infrastructure::store::PollStore;
use quickvote_errors::AppError;

pub struct CreatePoll {
    store: PollStore,
    feed: PollFeed,
}

impl CreatePoll {
    pub fn new(store: PollStore, feed: PollFeed) -> Self {
        Self { store, feed }
    }

    /// Validates the draft before anything is written, then stores the poll
    /// together with its owner pointer.
    pub async fn execute(
        &self,
        user: Option<&SessionUser>,
        draft: PollDraft,
    ) -> Result<Poll, AppError> {
        let user = user.ok_or_else(|| AppError::Unauthenticated {
            redirect: sign_in_redirect("/create"),
        })?;

        let new_poll = draft.validate(&user.uid)?;
        let poll = self.store.insert(new_poll).await?;

        tracing::info!(
            "Poll {} created by {} in {:?}",
            poll.id,
            poll.user_id,
            poll.category
        );
        self.feed.publish_updated(&poll);
        Ok(poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuthProvider;
    use crate::infrastructure::live::FeedKey;

    fn user(uid: &str) -> SessionUser {
        SessionUser {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            name: None,
            avatar_url: None,
            provider: AuthProvider::Password,
        }
    }

    fn draft(options: &[&str]) -> PollDraft {
        PollDraft {
            title: "Where to eat?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_create_stores_poll_and_pointer() {
        let store = PollStore::in_memory();
        let create = CreatePoll::new(store.clone(), PollFeed::new());

        let poll = create
            .execute(Some(&user("alice")), draft(&["Pizza", "Sushi"]))
            .await
            .unwrap();

        assert_eq!(poll.category, "Uncategorized");
        assert_eq!(poll.total_votes(), 0);
        assert!(store.get(&poll.id).await.unwrap().is_some());
        assert!(store.get_pointer("alice", &poll.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_single_option_is_rejected_before_write() {
        let store = PollStore::in_memory();
        let create = CreatePoll::new(store.clone(), PollFeed::new());

        let err = create
            .execute(Some(&user("alice")), draft(&["Pizza", "   "]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list_by_owner("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requires_sign_in() {
        let create = CreatePoll::new(PollStore::in_memory(), PollFeed::new());
        let err = create.execute(None, draft(&["A", "B"])).await.unwrap_err();
        assert_eq!(
            err,
            AppError::Unauthenticated {
                redirect: "/signin?returnTo=%2Fcreate".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_owner_list_watchers_hear_about_new_poll() {
        let feed = PollFeed::new();
        let mut sub = feed.subscribe(FeedKey::Owner("alice".to_string()));
        let create = CreatePoll::new(PollStore::in_memory(), feed);

        let poll = create
            .execute(Some(&user("alice")), draft(&["A", "B"]))
            .await
            .unwrap();

        assert_eq!(sub.next().await.map(|e| e.poll_id().to_string()), Some(poll.id));
    }
}
