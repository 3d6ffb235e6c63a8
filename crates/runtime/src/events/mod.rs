//! Topic-based event bus for dispatcher events.
//!
//! Events are published to topics and consumers subscribe only to the topics
//! they need. Publishing never blocks and never fails: with no subscriber the
//! event is simply dropped.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{InterruptCause, RunEvent};
