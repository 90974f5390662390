use crate::domain::{poll_path, sign_in_redirect, Poll, SessionUser, VotePlan};
use crate::infrastructure::live::PollFeed;
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::store::PollStore;
use quickvote_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoteOutcome {
    Recorded,
    Unchanged,
    Switched { from: usize },
}

impl From<VotePlan> for VoteOutcome {
    fn from(plan: VotePlan) -> Self {
        match plan {
            VotePlan::Record { .. } => VoteOutcome::Recorded,
            VotePlan::Unchanged { .. } => VoteOutcome::Unchanged,
            VotePlan::Switch { from, .. } => VoteOutcome::Switched { from },
        }
    }
}

pub struct CastVote {
    store: PollStore,
    feed: PollFeed,
}

impl CastVote {
    pub fn new(store: PollStore, feed: PollFeed) -> Self {
        Self { store, feed }
    }

    pub async fn execute(
        &self,
        user: Option<&SessionUser>,
        poll_id: &str,
        choice: usize,
    ) -> Result<(VoteOutcome, Poll), AppError> {
        let poll_id = InputSanitizer::validate_poll_id(poll_id)?;
        let user = user.ok_or_else(|| AppError::Unauthenticated {
            redirect: sign_in_redirect(&poll_path(poll_id)),
        })?;

        let (plan, poll) = self.store.cast_vote(poll_id, &user.uid, choice).await?;

        if plan.writes() {
            tracing::debug!("Vote on {} by {}: {:?}", poll.id, user.uid, plan);
            self.feed.publish_updated(&poll);
        }

        Ok((plan.into(), poll))
    }
}
