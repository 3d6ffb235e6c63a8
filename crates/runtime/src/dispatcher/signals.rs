//! Inbound signals from host callbacks.
//!
//! Host event handlers (damage, chat errors, UI buttons) may fire at any time
//! and from any thread. They only enqueue a [`Signal`]; the dispatcher drains
//! the queue at the start of its next tick, so executor state is never touched
//! outside a tick.
use quest_core::ObjectId;
use tokio::sync::mpsc;

use crate::api::{Result, RuntimeError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// The actor took damage from a hostile.
    Damaged { source: Option<ObjectId> },
    /// The host reported an error message.
    ErrorNotification(String),
    /// Preempt the active task regardless of its policy.
    Interrupt,
    SkipStep,
    Stop,
}

/// Cloneable handle for enqueueing signals.
#[derive(Clone, Debug)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { tx }
    }

    pub fn send(&self, signal: Signal) -> Result<()> {
        self.tx
            .send(signal)
            .map_err(|_| RuntimeError::SignalChannelClosed)
    }

    pub fn damaged(&self, source: Option<ObjectId>) -> Result<()> {
        self.send(Signal::Damaged { source })
    }

    pub fn error_notification(&self, message: impl Into<String>) -> Result<()> {
        self.send(Signal::ErrorNotification(message.into()))
    }

    pub fn interrupt(&self) -> Result<()> {
        self.send(Signal::Interrupt)
    }

    pub fn skip_step(&self) -> Result<()> {
        self.send(Signal::SkipStep)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Signal::Stop)
    }
}
