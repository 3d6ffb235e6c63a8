//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::RunEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Task activation and results
    Task,
    /// Preemption of the active task
    Interruption,
    /// Step advancement and run lifecycle
    Run,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Task, Topic::Interruption, Topic::Run];
}

impl RunEvent {
    pub fn topic(&self) -> Topic {
        match self {
            RunEvent::TaskStarted { .. }
            | RunEvent::TaskSkipped { .. }
            | RunEvent::TaskFinished { .. } => Topic::Task,
            RunEvent::Interrupted { .. } => Topic::Interruption,
            RunEvent::StepAdvanced { .. } | RunEvent::RunEnded | RunEvent::RunAborted { .. } => {
                Topic::Run
            }
        }
    }
}

/// Topic-based event bus
///
/// Channels are created up front for every topic and never change, so the
/// map is shared without a lock.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<RunEvent>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: RunEvent) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", "No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<RunEvent> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Unreachable: every topic is created in `with_capacity`.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<RunEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut run = bus.subscribe(Topic::Run);
        let mut tasks = bus.subscribe(Topic::Task);

        bus.publish(RunEvent::RunEnded);

        assert_eq!(run.try_recv().ok(), Some(RunEvent::RunEnded));
        assert!(tasks.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(RunEvent::RunAborted {
            reason: "nobody listens".into(),
        });
    }
}
