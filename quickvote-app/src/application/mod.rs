mod cast_vote;
mod create_poll;
mod delete_poll;
mod draft_assistant;
mod poll_queries;

pub use cast_vote::{CastVote, VoteOutcome};
pub use create_poll::CreatePoll;
pub use delete_poll::DeletePoll;
pub use draft_assistant::DraftAssistant;
pub use poll_queries::{OwnerWatch, PollChange, PollQueries, PollWatch};
