//! Typed abort signal raised by task executors.
//!
//! Executors return `Result<_, AbortReason>` from both `start` and `update`.
//! The dispatcher handles every variant the same way (stop the run, notify
//! once); [`ErrorSeverity`] only decides how loudly the failure is logged.

use thiserror::Error;

use crate::state::{DataId, ItemId, Position};

/// Whether a failure was anticipated by the executor that raised it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// A known precondition failed (missing item, object never appeared, ...).
    Expected,
    /// Something the executor did not plan for.
    Unexpected,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Unexpected => "unexpected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AbortReason {
    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error("object {data_id} is not present")]
    MissingObject { data_id: DataId },

    #[error("{item} is not in the inventory")]
    MissingItem { item: ItemId },

    #[error("{action} did not take effect after {attempts} attempts")]
    RetriesExhausted { action: &'static str, attempts: u32 },

    #[error("could not reach {destination}: {reason}")]
    MovementFailed { destination: Position, reason: String },

    #[error("no combat module can handle this encounter")]
    NoCombatModule,

    #[error("unexpected fault: {0}")]
    Fault(String),
}

impl AbortReason {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Fault(_) => ErrorSeverity::Unexpected,
            _ => ErrorSeverity::Expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_faults_are_unexpected() {
        assert_eq!(
            AbortReason::Fault("boom".into()).severity(),
            ErrorSeverity::Unexpected
        );
        assert_eq!(
            AbortReason::NoCombatModule.severity(),
            ErrorSeverity::Expected
        );
        assert_eq!(ErrorSeverity::Unexpected.as_str(), "unexpected");
    }

    #[test]
    fn messages_name_the_subject() {
        let err = AbortReason::MissingItem { item: ItemId(2000) };
        assert_eq!(err.to_string(), "item:2000 is not in the inventory");
        let err = AbortReason::RetriesExhausted {
            action: "interact",
            attempts: 3,
        };
        assert_eq!(err.to_string(), "interact did not take effect after 3 attempts");
    }
}
