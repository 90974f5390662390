mod feed;

pub use feed::{FeedKey, PollEvent, PollFeed, Subscription};
