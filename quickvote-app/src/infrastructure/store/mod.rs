mod memory;

pub use memory::MemoryStore;

use crate::domain::{NewPoll, Poll, PollPointer, VotePlan};
use crate::infrastructure::db::PollRepository;
use quickvote_errors::AppError;

/// Where polls live. Both backends keep the canonical record and the owner pointer in step.
#[derive(Clone)]
pub enum PollStore {
    Memory(MemoryStore),
    Postgres(PollRepository),
}

impl PollStore {
    pub fn in_memory() -> Self {
        PollStore::Memory(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            PollStore::Memory(_) => "memory",
            PollStore::Postgres(_) => "postgres",
        }
    }

    pub async fn insert(&self, new_poll: NewPoll) -> Result<Poll, AppError> {
        match self {
            PollStore::Memory(store) => Ok(store.insert(new_poll)),
            PollStore::Postgres(repo) => repo.create(new_poll).await,
        }
    }

    pub async fn get(&self, poll_id: &str) -> Result<Option<Poll>, AppError> {
        match self {
            PollStore::Memory(store) => Ok(store.get(poll_id)),
            PollStore::Postgres(repo) => repo.find_by_id(poll_id).await,
        }
    }

    pub async fn get_pointer(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> Result<Option<PollPointer>, AppError> {
        match self {
            PollStore::Memory(store) => Ok(store.get_pointer(user_id, poll_id)),
            PollStore::Postgres(repo) => repo.find_pointer(user_id, poll_id).await,
        }
    }

    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Poll>, AppError> {
        match self {
            PollStore::Memory(store) => Ok(store.list_by_owner(user_id)),
            PollStore::Postgres(repo) => repo.find_by_owner(user_id).await,
        }
    }

    /// Atomically records `voter`'s choice; returns what changed and the resulting poll.
    pub async fn cast_vote(
        &self,
        poll_id: &str,
        voter: &str,
        choice: usize,
    ) -> Result<(VotePlan, Poll), AppError> {
        match self {
            PollStore::Memory(store) => store.cast_vote(poll_id, voter, choice),
            PollStore::Postgres(repo) => repo.cast_vote(poll_id, voter, choice).await,
        }
    }

    /// Removes `polls/{id}` and `users/{uid}/polls/{id}` together.
    pub async fn delete(&self, poll_id: &str, user_id: &str) -> Result<(), AppError> {
        match self {
            PollStore::Memory(store) => {
                store.delete(poll_id, user_id);
                Ok(())
            }
            PollStore::Postgres(repo) => repo.delete(poll_id, user_id).await,
        }
    }
}
