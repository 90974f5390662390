use crate::domain::Poll;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

const CHANNEL_CAPACITY: usize = 64;

/// What a subscriber is watching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedKey {
    Poll(String),
    Owner(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Updated(Poll),
    Deleted { poll_id: String },
}

impl PollEvent {
    pub fn poll_id(&self) -> &str {
        match self {
            PollEvent::Updated(poll) => &poll.id,
            PollEvent::Deleted { poll_id } => poll_id,
        }
    }
}

type Channels = Arc<DashMap<FeedKey, broadcast::Sender<PollEvent>>>;

/// Fan-out hub for poll changes. Channels exist only while someone listens.
#[derive(Clone, Default)]
pub struct PollFeed {
    channels: Channels,
}

impl PollFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, key: FeedKey) -> Subscription {
        let rx = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        Subscription {
            key,
            rx,
            channels: self.channels.clone(),
        }
    }

    /// Notifies watchers of the poll and of its owner's list.
    pub fn publish_updated(&self, poll: &Poll) {
        let event = PollEvent::Updated(poll.clone());
        self.send(&FeedKey::Poll(poll.id.clone()), event.clone());
        self.send(&FeedKey::Owner(poll.user_id.clone()), event);
    }

    pub fn publish_deleted(&self, poll_id: &str, owner_id: &str) {
        let event = PollEvent::Deleted {
            poll_id: poll_id.to_string(),
        };
        self.send(&FeedKey::Poll(poll_id.to_string()), event.clone());
        self.send(&FeedKey::Owner(owner_id.to_string()), event);
    }

    pub fn subscriber_count(&self, key: &FeedKey) -> usize {
        self.channels
            .get(key)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn send(&self, key: &FeedKey, event: PollEvent) {
        if let Some(tx) = self.channels.get(key) {
            // No receivers is not an error: the last one may have just gone away.
            let _ = tx.send(event);
        }
    }
}

/// A live listener. Dropping it releases the listener and, if it was the
/// last one, the channel itself.
pub struct Subscription {
    key: FeedKey,
    rx: broadcast::Receiver<PollEvent>,
    channels: Channels,
}

impl Subscription {
    pub fn key(&self) -> &FeedKey {
        &self.key
    }

    /// Waits for the next event. `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<PollEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber {:?} lagged, skipped {} events", self.key, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// An event that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<PollEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscriber {:?} lagged, skipped {} events", self.key, skipped);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Our own receiver is still counted here.
        self.channels
            .remove_if(&self.key, |_, tx| tx.receiver_count() <= 1);
    }
}
