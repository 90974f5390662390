pub mod poll;
pub mod user_poll;

pub use poll::Entity as Poll;
pub use user_poll::Entity as UserPoll;
