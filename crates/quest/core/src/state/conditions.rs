use bitflags::bitflags;

bitflags! {
    /// Condition flags of the controlled actor, as reported by the host.
    ///
    /// The engine only ever reads these; changing them is the world's job.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Conditions: u16 {
        const IN_COMBAT     = 1 << 0;
        const MOUNTED       = 1 << 1;
        const CASTING       = 1 << 2;
        const OCCUPIED      = 1 << 3;
        const BETWEEN_AREAS = 1 << 4;
        const DIVING        = 1 << 5;
        const JUMPING       = 1 << 6;
        const IN_CUTSCENE   = 1 << 7;
    }
}

impl Conditions {
    /// Returns true when the actor cannot start a new action right now.
    pub fn is_busy(self) -> bool {
        self.intersects(Self::CASTING | Self::OCCUPIED | Self::BETWEEN_AREAS | Self::IN_CUTSCENE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_ignores_combat_and_mount() {
        assert!(!(Conditions::IN_COMBAT | Conditions::MOUNTED).is_busy());
        assert!(Conditions::CASTING.is_busy());
        assert!((Conditions::MOUNTED | Conditions::OCCUPIED).is_busy());
    }
}
