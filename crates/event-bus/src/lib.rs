//! Generic publish/subscribe bus.
//!
//! The orchestrator instantiates `InMemoryBus<AgentEvent>` to back its
//! event stream (`state_change, thought, action, observation, plan_update,
//! error, complete` — §6); anything `Clone + Send + Sync + Debug` can ride
//! the same bus, so tests use it with simpler payloads too.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use browzer_types::BrowzerError;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

#[async_trait]
pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BrowzerError>;
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// In-memory bus backed by a tokio broadcast channel.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    async fn publish(&self, event: E) -> Result<(), BrowzerError> {
        // No subscribers is not an error: the orchestrator may run with
        // streaming disabled and no one listening on the bus at all.
        match self.sender.send(event) {
            Ok(_) => Ok(()),
            Err(_) if self.sender.receiver_count() == 0 => Ok(()),
            Err(err) => Err(BrowzerError::internal(err.to_string())),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Materializes an mpsc receiver from a bus subscription so callers can
/// await events without handling broadcast lag/closed semantics directly.
pub fn to_mpsc<E>(bus: Arc<InMemoryBus<E>>, capacity: usize) -> mpsc::Receiver<E>
where
    E: Event,
{
    let mut rx = bus.subscribe();
    let (tx, out_rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            if tx.send(ev).await.is_err() {
                break;
            }
        }
    });
    out_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Ping(u32);

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = InMemoryBus::<Ping>::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Ping(1)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Ping(1));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_not_an_error() {
        let bus = InMemoryBus::<Ping>::new(8);
        assert!(bus.publish(Ping(1)).await.is_ok());
    }

    #[tokio::test]
    async fn to_mpsc_relays_events_in_order() {
        let bus = InMemoryBus::<Ping>::new(8);
        let mut rx = to_mpsc(bus.clone(), 8);
        bus.publish(Ping(1)).await.unwrap();
        bus.publish(Ping(2)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Ping(1));
        assert_eq!(rx.recv().await.unwrap(), Ping(2));
    }
}
