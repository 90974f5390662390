use crate::domain::{group_by_category, CategoryGroup, Poll, PollView, SessionUser};
use crate::infrastructure::live::{FeedKey, PollEvent, PollFeed, Subscription};
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::store::PollStore;
use quickvote_errors::AppError;

#[derive(Clone)]
pub struct PollQueries {
    store: PollStore,
    feed: PollFeed,
}

/// What a poll watcher sees after a change.
#[derive(Debug, Clone, PartialEq)]
pub enum PollChange {
    Snapshot(Poll),
    Deleted,
}

/// Live view of one poll: the state at subscribe time plus the changes after it.
/// Feed events only say that something changed; the poll is re-read from the
/// store, so the last snapshot a watcher sees is never older than the store.
pub struct PollWatch {
    pub initial: Option<Poll>,
    poll_id: String,
    store: PollStore,
    subscription: Subscription,
}

impl PollWatch {
    pub fn poll_id(&self) -> &str {
        &self.poll_id
    }

    pub async fn next(&mut self) -> Option<Result<PollChange, AppError>> {
        let mut deleted = matches!(self.subscription.next().await?, PollEvent::Deleted { .. });
        // Anything already queued is covered by the one read below.
        while let Some(event) = self.subscription.try_next() {
            deleted |= matches!(event, PollEvent::Deleted { .. });
        }
        if deleted {
            return Some(Ok(PollChange::Deleted));
        }

        Some(self.store.get(&self.poll_id).await.map(|poll| match poll {
            Some(poll) => PollChange::Snapshot(poll),
            None => PollChange::Deleted,
        }))
    }
}

/// Live view of one owner's polls, regrouped after every change.
pub struct OwnerWatch {
    pub initial: Vec<CategoryGroup>,
    user_id: String,
    store: PollStore,
    subscription: Subscription,
}

impl OwnerWatch {
    pub async fn next(&mut self) -> Option<Result<Vec<CategoryGroup>, AppError>> {
        self.subscription.next().await?;
        Some(
            self.store
                .list_by_owner(&self.user_id)
                .await
                .map(group_by_category),
        )
    }
}

impl PollQueries {
    pub fn new(store: PollStore, feed: PollFeed) -> Self {
        Self { store, feed }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn get_poll(&self, poll_id: &str) -> Result<Poll, AppError> {
        let poll_id = InputSanitizer::validate_poll_id(poll_id)?;
        self.store.get(poll_id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get_view(
        &self,
        poll_id: &str,
        viewer: Option<&SessionUser>,
    ) -> Result<PollView, AppError> {
        let poll = self.get_poll(poll_id).await?;
        Ok(PollView::new(&poll, viewer.map(|u| u.uid.as_str())))
    }

    pub async fn my_polls(&self, user: &SessionUser) -> Result<Vec<CategoryGroup>, AppError> {
        let polls = self.store.list_by_owner(&user.uid).await?;
        Ok(group_by_category(polls))
    }

    // Subscribing before the first read means no change can fall between the two.
    pub async fn watch_poll(&self, poll_id: &str) -> Result<PollWatch, AppError> {
        let poll_id = InputSanitizer::validate_poll_id(poll_id)?;
        let subscription = self.feed.subscribe(FeedKey::Poll(poll_id.to_string()));
        let initial = self.store.get(poll_id).await?;
        Ok(PollWatch {
            initial,
            poll_id: poll_id.to_string(),
            store: self.store.clone(),
            subscription,
        })
    }

    pub async fn watch_my_polls(&self, user: &SessionUser) -> Result<OwnerWatch, AppError> {
        let subscription = self.feed.subscribe(FeedKey::Owner(user.uid.clone()));
        let initial = self.my_polls(user).await?;
        Ok(OwnerWatch {
            initial,
            user_id: user.uid.clone(),
            store: self.store.clone(),
            subscription,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{CastVote, DeletePoll};
    use crate::domain::{AuthProvider, NewPoll};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn user(uid: &str) -> SessionUser {
        SessionUser {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            name: None,
            avatar_url: None,
            provider: AuthProvider::Password,
        }
    }

    async fn add(store: &PollStore, owner: &str, title: &str, category: &str) -> Poll {
        store
            .insert(NewPoll {
                title: title.to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
                category: category.to_string(),
                user_id: owner.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_my_polls_are_grouped_and_scoped_to_owner() {
        let store = PollStore::in_memory();
        add(&store, "alice", "Pizza?", "food").await;
        add(&store, "alice", "Rust?", "Technology").await;
        add(&store, "alice", "Tacos?", "food").await;
        add(&store, "bob", "Other", "Art").await;

        let queries = PollQueries::new(store, PollFeed::new());
        let groups = queries.my_polls(&user("alice")).await.unwrap();

        let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["food", "Technology"]);
        assert_eq!(groups[0].polls.len(), 2);
    }

    #[tokio::test]
    async fn test_view_reports_viewer_choice() {
        let store = PollStore::in_memory();
        let poll = add(&store, "alice", "Pizza?", "food").await;
        store.cast_vote(&poll.id, "bob", 1).await.unwrap();

        let queries = PollQueries::new(store, PollFeed::new());
        let view = queries.get_view(&poll.id, Some(&user("bob"))).await.unwrap();

        assert_eq!(view.my_choice, Some(1));
        assert_eq!(view.options[1].percent, 100);
    }

    #[tokio::test]
    async fn test_watch_poll_sees_initial_state_then_changes() {
        let store = PollStore::in_memory();
        let feed = PollFeed::new();
        let poll = add(&store, "alice", "Pizza?", "food").await;
        let queries = PollQueries::new(store.clone(), feed.clone());

        let mut watch = queries.watch_poll(&poll.id).await.unwrap();
        assert_eq!(watch.initial.as_ref().map(|p| p.total_votes()), Some(0));

        let (_, updated) = store.cast_vote(&poll.id, "bob", 0).await.unwrap();
        feed.publish_updated(&updated);

        match watch.next().await {
            Some(Ok(PollChange::Snapshot(p))) => assert_eq!(p.vote_count(0), 1),
            other => panic!("unexpected change: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watch_poll_reports_deletion() {
        let store = PollStore::in_memory();
        let feed = PollFeed::new();
        let poll = add(&store, "alice", "Pizza?", "food").await;
        let queries = PollQueries::new(store.clone(), feed.clone());
        let mut watch = queries.watch_poll(&poll.id).await.unwrap();

        DeletePoll::new(store, feed)
            .execute(Some(&user("alice")), &poll.id)
            .await
            .unwrap();

        assert_eq!(watch.next().await.unwrap().unwrap(), PollChange::Deleted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_last_snapshot_matches_store_under_concurrent_votes() {
        const VOTERS: u32 = 200;

        let store = PollStore::in_memory();
        let feed = PollFeed::new();
        let poll = add(&store, "alice", "Pizza?", "food").await;
        let queries = PollQueries::new(store.clone(), feed.clone());
        let cast = Arc::new(CastVote::new(store.clone(), feed));

        let mut watch = queries.watch_poll(&poll.id).await.unwrap();
        let last_total = Arc::new(Mutex::new(None::<u32>));
        let seen = last_total.clone();
        let watcher = tokio::spawn(async move {
            while let Some(Ok(PollChange::Snapshot(p))) = watch.next().await {
                *seen.lock().unwrap() = Some(p.total_votes());
            }
        });

        let votes: Vec<_> = (0..VOTERS)
            .map(|i| {
                let cast = cast.clone();
                let id = poll.id.clone();
                tokio::spawn(async move {
                    cast.execute(Some(&user(&format!("v{i}"))), &id, (i % 2) as usize)
                        .await
                        .unwrap();
                })
            })
            .collect();
        for vote in votes {
            vote.await.unwrap();
        }

        let stored = store.get(&poll.id).await.unwrap().unwrap().total_votes();
        assert_eq!(stored, VOTERS);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while *last_total.lock().unwrap() != Some(stored) {
            assert!(
                tokio::time::Instant::now() < deadline,
                "watcher settled on {:?}, store has {}",
                last_total.lock().unwrap(),
                stored
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Nothing older may arrive after the current state.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*last_total.lock().unwrap(), Some(stored));

        watcher.abort();
    }

    #[tokio::test]
    async fn test_watch_missing_poll_has_no_initial_state() {
        let queries = PollQueries::new(PollStore::in_memory(), PollFeed::new());
        let watch = queries.watch_poll("gone").await.unwrap();
        assert!(watch.initial.is_none());
    }

    #[tokio::test]
    async fn test_owner_watch_regroups_after_change() {
        let store = PollStore::in_memory();
        let feed = PollFeed::new();
        let queries = PollQueries::new(store.clone(), feed.clone());
        let alice = user("alice");

        let mut watch = queries.watch_my_polls(&alice).await.unwrap();
        assert!(watch.initial.is_empty());

        let poll = add(&store, "alice", "Pizza?", "food").await;
        feed.publish_updated(&poll);

        let groups = watch.next().await.unwrap().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].polls[0].id, poll.id);
    }
}
