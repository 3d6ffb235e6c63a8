//! Quest progress variables and the predicates evaluated against them.
//!
//! A quest exposes six progress bytes. Scripts describe expected progress per
//! byte, split into high and low nibbles, with `None` meaning "don't care".

use super::QuestId;

/// How a nibble expectation is compared with the live value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuestWorkMode {
    /// Nibble must equal the expected value.
    #[default]
    Exact,
    /// Every bit set in the expected value must be set in the nibble.
    Bitwise,
}

/// Expectation over one progress byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestWorkValue {
    #[cfg_attr(feature = "serde", serde(default))]
    pub high: Option<u8>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub low: Option<u8>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: QuestWorkMode,
}

impl QuestWorkValue {
    pub const fn exact(high: Option<u8>, low: Option<u8>) -> Self {
        Self {
            high,
            low,
            mode: QuestWorkMode::Exact,
        }
    }

    pub const fn bitwise(high: Option<u8>, low: Option<u8>) -> Self {
        Self {
            high,
            low,
            mode: QuestWorkMode::Bitwise,
        }
    }

    /// Checks this expectation against a raw progress byte.
    pub fn matches(&self, value: u8) -> bool {
        let high = value >> 4;
        let low = value & 0x0F;
        nibble_matches(self.high, high, self.mode) && nibble_matches(self.low, low, self.mode)
    }
}

fn nibble_matches(expected: Option<u8>, actual: u8, mode: QuestWorkMode) -> bool {
    match (expected, mode) {
        (None, _) => true,
        (Some(expected), QuestWorkMode::Exact) => expected == actual,
        (Some(expected), QuestWorkMode::Bitwise) => actual & expected == expected,
    }
}

/// Live progress of one accepted quest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestProgress {
    pub quest: QuestId,
    pub sequence: u8,
    pub variables: [u8; 6],
}

/// Returns true if at least one byte carries an expectation.
pub fn has_completion_flags(flags: &[Option<QuestWorkValue>]) -> bool {
    flags.iter().any(Option::is_some)
}

/// Evaluates a completion predicate against live progress.
///
/// A predicate without any expectation never matches; otherwise every
/// specified byte must match. Entries past the sixth byte are ignored.
pub fn matches_quest_work(flags: &[Option<QuestWorkValue>], progress: &QuestProgress) -> bool {
    if !has_completion_flags(flags) {
        return false;
    }

    flags
        .iter()
        .zip(progress.variables.iter())
        .all(|(flag, &value)| flag.is_none_or(|flag| flag.matches(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(variables: [u8; 6]) -> QuestProgress {
        QuestProgress {
            quest: QuestId(1),
            sequence: 1,
            variables,
        }
    }

    #[test]
    fn empty_predicate_never_matches() {
        assert!(!matches_quest_work(&[], &progress([0; 6])));
        assert!(!matches_quest_work(&[None, None], &progress([0; 6])));
    }

    #[test]
    fn exact_compares_both_nibbles() {
        let flags = [Some(QuestWorkValue::exact(Some(2), Some(1)))];
        assert!(matches_quest_work(&flags, &progress([0x21, 0, 0, 0, 0, 0])));
        assert!(!matches_quest_work(&flags, &progress([0x22, 0, 0, 0, 0, 0])));
    }

    #[test]
    fn bitwise_requires_expected_bits_only() {
        let flags = [None, Some(QuestWorkValue::bitwise(None, Some(0b0100)))];
        assert!(matches_quest_work(&flags, &progress([0, 0x0F, 0, 0, 0, 0])));
        assert!(!matches_quest_work(&flags, &progress([0, 0x0B, 0, 0, 0, 0])));
    }

    #[test]
    fn unspecified_nibble_is_ignored() {
        let value = QuestWorkValue::exact(Some(3), None);
        assert!(value.matches(0x3A));
        assert!(!value.matches(0x4A));
    }

    #[test]
    fn fresh_progress_satisfies_only_zero_flags() {
        let fresh = QuestProgress::default();
        assert_eq!(fresh.quest, QuestId(0));
        assert_eq!(fresh.variables, [0; 6]);
        let zeroed = [Some(QuestWorkValue::exact(Some(0), Some(0)))];
        assert!(matches_quest_work(&zeroed, &fresh));
        let started = [Some(QuestWorkValue::exact(Some(1), None))];
        assert!(!matches_quest_work(&started, &fresh));
    }
}
