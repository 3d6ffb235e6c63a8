//! Error types surfaced by the runtime control API.
//!
//! Executor failures never reach the host as errors: they abort the run and are
//! reported through [`crate::StepHooks::notify_error`]. `RuntimeError` only
//! covers misuse of the control surface and closed signal channels.
use quest_core::AbortReason;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no run is in progress")]
    NotRunning,

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("dispatcher signal channel closed")]
    SignalChannelClosed,

    #[error("run aborted: {0}")]
    Aborted(#[source] AbortReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_carries_the_reason() {
        let err = RuntimeError::Aborted(AbortReason::NoCombatModule);
        assert_eq!(
            err.to_string(),
            "run aborted: no combat module can handle this encounter"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
