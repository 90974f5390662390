use crate::domain::{sign_in_redirect, SessionUser};
use crate::infrastructure::live::PollFeed;
use crate::infrastructure::security::InputSanitizer;
use crate::infrastructure::store::PollStore;
use quickvote_errors::AppError;

pub struct DeletePoll {
    store: PollStore,
    feed: PollFeed,
}

impl DeletePoll {
    pub fn new(store: PollStore, feed: PollFeed) -> Self {
        Self { store, feed }
    }

    /// Removes the poll and its owner pointer. Only the owner may do this.
    pub async fn execute(&self, user: Option<&SessionUser>, poll_id: &str) -> Result<(), AppError> {
        let poll_id = InputSanitizer::validate_poll_id(poll_id)?;
        let user = user.ok_or_else(|| AppError::Unauthenticated {
            redirect: sign_in_redirect("/my-polls"),
        })?;

        let poll = self.store.get(poll_id).await?.ok_or(AppError::NotFound)?;
        if !poll.is_owned_by(&user.uid) {
            tracing::warn!("{} tried to delete poll {} owned by {}", user.uid, poll.id, poll.user_id);
            return Err(AppError::Forbidden("only the creator can delete a poll".to_string()));
        }

        self.store.delete(&poll.id, &user.uid).await?;
        tracing::info!("Poll {} deleted by owner", poll.id);
        self.feed.publish_deleted(&poll.id, &user.uid);
        Ok(())
    }
}
