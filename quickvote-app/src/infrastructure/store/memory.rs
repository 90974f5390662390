use crate::domain::{NewPoll, Poll, PollPointer, VotePlan};
use dashmap::DashMap;
use quickvote_errors::AppError;
use std::sync::Arc;

/// In-process document store: `polls/{id}` plus `users/{uid}/polls/{id}` pointers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    polls: Arc<DashMap<String, Poll>>,
    pointers: Arc<DashMap<(String, String), PollPointer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, new_poll: NewPoll) -> Poll {
        let id = uuid::Uuid::new_v4().to_string();
        let poll = new_poll.into_poll(id, chrono::Utc::now());
        self.pointers
            .insert((poll.user_id.clone(), poll.id.clone()), poll.pointer());
        self.polls.insert(poll.id.clone(), poll.clone());
        poll
    }

    pub fn get(&self, poll_id: &str) -> Option<Poll> {
        self.polls.get(poll_id).map(|p| p.clone())
    }

    pub fn get_pointer(&self, user_id: &str, poll_id: &str) -> Option<PollPointer> {
        self.pointers
            .get(&(user_id.to_string(), poll_id.to_string()))
            .map(|p| p.clone())
    }

    pub fn list_by_owner(&self, user_id: &str) -> Vec<Poll> {
        let ids: Vec<String> = self
            .pointers
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.value().poll_id.clone())
            .collect();

        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Plans and applies the vote while holding the poll's entry lock.
    pub fn cast_vote(
        &self,
        poll_id: &str,
        voter: &str,
        choice: usize,
    ) -> Result<(VotePlan, Poll), AppError> {
        let mut poll = self.polls.get_mut(poll_id).ok_or(AppError::NotFound)?;
        let plan = poll.plan_vote(voter, choice)?;
        poll.apply_vote(voter, plan);
        Ok((plan, poll.clone()))
    }

    pub fn delete(&self, poll_id: &str, user_id: &str) {
        self.polls.remove(poll_id);
        self.pointers
            .remove(&(user_id.to_string(), poll_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_poll(owner: &str) -> NewPoll {
        NewPoll {
            title: "Cats or dogs?".to_string(),
            options: vec!["Cats".to_string(), "Dogs".to_string()],
            category: "Pets".to_string(),
            user_id: owner.to_string(),
        }
    }

    #[test]
    fn test_insert_writes_poll_and_pointer() {
        let store = MemoryStore::new();
        let poll = store.insert(new_poll("owner"));

        assert_eq!(store.get(&poll.id), Some(poll.clone()));
        let pointer = store.get_pointer("owner", &poll.id).unwrap();
        assert_eq!(pointer.poll_id, poll.id);
        assert_eq!(pointer.category, "Pets");
    }

    #[test]
    fn test_delete_removes_both_records() {
        let store = MemoryStore::new();
        let poll = store.insert(new_poll("owner"));

        store.delete(&poll.id, "owner");
        assert!(store.get(&poll.id).is_none());
        assert!(store.get_pointer("owner", &poll.id).is_none());
    }

    #[test]
    fn test_list_by_owner_only_returns_own_polls() {
        let store = MemoryStore::new();
        store.insert(new_poll("alice"));
        store.insert(new_poll("alice"));
        store.insert(new_poll("bob"));

        assert_eq!(store.list_by_owner("alice").len(), 2);
        assert_eq!(store.list_by_owner("bob").len(), 1);
        assert!(store.list_by_owner("carol").is_empty());
    }

    #[test]
    fn test_cast_vote_on_missing_poll() {
        let store = MemoryStore::new();
        assert_eq!(store.cast_vote("nope", "alice", 0), Err(AppError::NotFound));
    }

    #[test]
    fn test_concurrent_votes_keep_sum_consistent() {
        let store = MemoryStore::new();
        let poll = store.insert(new_poll("owner"));

        std::thread::scope(|scope| {
            for t in 0..8 {
                let store = store.clone();
                let id = poll.id.clone();
                scope.spawn(move || {
                    for i in 0..50 {
                        let voter = format!("voter-{}", (t * 50 + i) % 120);
                        store.cast_vote(&id, &voter, (t + i) % 2).unwrap();
                    }
                });
            }
        });

        let poll = store.get(&poll.id).unwrap();
        assert_eq!(poll.total_votes() as usize, poll.voters.len());
        assert_eq!(poll.voters.len(), 120);
    }
}
