//! Notifications for runs being created or deleted.
//!
//! Consumers subscribe and re-aggregate when a change for their owner
//! arrives.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{OwnerId, RunId};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunChangeKind {
    Created,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunChange {
    pub owner_id: OwnerId,
    pub season: i32,
    pub run_id: RunId,
    pub kind: RunChangeKind,
}

/// Broadcast channel of run changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<RunChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunChange> {
        self.sender.subscribe()
    }

    /// Publish a change. Having no subscribers is fine.
    pub fn publish(&self, change: RunChange) {
        match self.sender.send(change) {
            Ok(receivers) => debug!("Published run change to {} subscribers", receivers),
            Err(broadcast::error::SendError(change)) => {
                debug!("No subscribers for run change {:?}", change.run_id)
            }
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(owner_id: OwnerId, kind: RunChangeKind) -> RunChange {
        RunChange {
            owner_id,
            season: 0,
            run_id: RunId::from("abc"),
            kind,
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let feed = ChangeFeed::new();
        let mut rx1 = feed.subscribe();
        let mut rx2 = feed.subscribe();

        feed.publish(change(1, RunChangeKind::Created));

        assert_eq!(rx1.recv().await.unwrap(), change(1, RunChangeKind::Created));
        assert_eq!(rx2.recv().await.unwrap(), change(1, RunChangeKind::Created));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::default();
        feed.publish(change(1, RunChangeKind::Deleted));
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_changes() {
        let feed = ChangeFeed::new();
        feed.publish(change(1, RunChangeKind::Created));

        let mut rx = feed.subscribe();
        feed.publish(change(2, RunChangeKind::Deleted));

        assert_eq!(rx.recv().await.unwrap().owner_id, 2);
    }
}
