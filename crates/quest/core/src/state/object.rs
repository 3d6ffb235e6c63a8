use super::{ClassRole, DataId, ObjectId, Position};

/// Broad classification of a visible object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    /// Regular hostile creature.
    #[default]
    Enemy,
    /// Separately targetable part of a larger hostile.
    EnemyPart,
    /// Friendly NPC (quest givers, guards, escorts).
    Friendly,
    /// Summoned companion owned by someone else.
    Pet,
    /// Interactable event object (chests, levers, quest items on the ground).
    EventObject,
    Aetheryte,
    Player,
}

impl ObjectKind {
    /// Kinds the combat engine is allowed to consider as targets.
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Enemy | Self::EnemyPart)
    }
}

/// Snapshot of a single visible object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameObject {
    pub id: ObjectId,
    pub data_id: DataId,
    /// Name row for objects whose template is shared by differently named mobs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name_id: Option<u32>,
    pub kind: ObjectKind,
    pub position: Position,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hitbox_radius: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_dead: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub is_targetable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_quest_marker: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub in_combat: bool,
    /// Object this one is currently targeting, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<ObjectId>,
    /// Belongs to a co-located encounter unrelated to the quest (e.g. a public event).
    #[cfg_attr(feature = "serde", serde(default))]
    pub unrelated_spawn: bool,
    #[cfg_attr(feature = "serde", serde(default = "full_health"))]
    pub health_percent: u8,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
fn full_health() -> u8 {
    100
}

impl GameObject {
    /// Creates a live, targetable, out-of-combat object at full health.
    pub fn new(id: ObjectId, data_id: DataId, kind: ObjectKind, position: Position) -> Self {
        Self {
            id,
            data_id,
            name_id: None,
            kind,
            position,
            hitbox_radius: 0.5,
            is_dead: false,
            is_targetable: true,
            has_quest_marker: false,
            in_combat: false,
            target: None,
            unrelated_spawn: false,
            health_percent: 100,
        }
    }

    #[must_use]
    pub fn with_quest_marker(mut self) -> Self {
        self.has_quest_marker = true;
        self
    }

    #[must_use]
    pub fn with_name_id(mut self, name_id: u32) -> Self {
        self.name_id = Some(name_id);
        self
    }

    #[must_use]
    pub fn with_hitbox(mut self, radius: f32) -> Self {
        self.hitbox_radius = radius;
        self
    }

    /// Marks the object as engaged and targeting `target`.
    #[must_use]
    pub fn engaged_with(mut self, target: Option<ObjectId>) -> Self {
        self.in_combat = true;
        self.target = target;
        self
    }

    /// Distance between the two hitbox surfaces, never negative.
    pub fn surface_distance(&self, position: Position, hitbox_radius: f32) -> f32 {
        (self.position.distance(position) - self.hitbox_radius - hitbox_radius).max(0.0)
    }
}

/// The controlled actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: ObjectId,
    pub position: Position,
    pub hitbox_radius: f32,
    pub role: ClassRole,
}

impl PlayerState {
    pub fn new(id: ObjectId, position: Position, role: ClassRole) -> Self {
        Self {
            id,
            position,
            hitbox_radius: 0.5,
            role,
        }
    }
}
