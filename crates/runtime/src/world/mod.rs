//! The host world as seen by the runtime.
//!
//! [`World`] is the only way executors and the combat engine observe or act on
//! the game. Reads return owned snapshots, so nothing borrowed from the host
//! outlives a call; commands return immediately and report their effect
//! through later snapshots (or a [`MoveHandle`] for movement).
//!
//! [`SimWorld`] is a scripted in-memory implementation used by tests and the
//! headless client.
mod movement;
mod sim;

pub use movement::{MoveCompleter, MoveError, MoveHandle, MovePoll, PendingMove};
pub use sim::{Effect, Reaction, SimCommand, SimWorld, Trigger};

use std::time::Instant;

use quest_core::{
    AetheryteId, Conditions, DataId, GameObject, ItemId, ObjectId, PlayerState, Position, QuestId,
    QuestProgress,
};

/// Host collaborator polled by the dispatcher each tick.
pub trait World {
    /// Monotonic clock; all runtime timers read this instead of the system clock.
    fn now(&self) -> Instant;

    /// The controlled actor, or `None` while it is not loaded (zoning, login).
    fn player(&self) -> Option<PlayerState>;

    fn conditions(&self) -> Conditions;

    /// Every object currently visible to the actor.
    fn objects(&self) -> Vec<GameObject>;

    fn object(&self, id: ObjectId) -> Option<GameObject> {
        self.objects().into_iter().find(|object| object.id == id)
    }

    /// Nearest live object spawned from `data_id`.
    fn find_object(&self, data_id: DataId) -> Option<GameObject> {
        let origin = self
            .player()
            .map_or(Position::ORIGIN, |player| player.position);
        self.objects()
            .into_iter()
            .filter(|object| object.data_id == data_id && !object.is_dead)
            .min_by(|a, b| {
                a.position
                    .distance_squared(origin)
                    .total_cmp(&b.position.distance_squared(origin))
            })
    }

    /// Objects holding threat on the actor.
    fn hate_list(&self) -> Vec<ObjectId>;

    fn in_line_of_sight(&self, object: &GameObject) -> bool;

    fn quest_progress(&self, quest: QuestId) -> Option<QuestProgress>;

    fn item_count(&self, item: ItemId) -> u32;

    fn is_attuned(&self, aetheryte: AetheryteId) -> bool;

    fn target(&self) -> Option<ObjectId>;

    fn set_target(&mut self, target: Option<ObjectId>);

    /// Straight-line movement without pathfinding.
    fn move_direct(&mut self, destination: Position, stop_distance: f32) -> MoveHandle;

    /// Pathfinding-assisted movement.
    fn navigate_to(&mut self, destination: Position, stop_distance: f32) -> MoveHandle;

    fn stop_movement(&mut self);

    /// Returns false if the host refused the interaction outright.
    fn interact(&mut self, object: ObjectId) -> bool;

    fn use_item(&mut self, item: ItemId, target: Option<ObjectId>) -> bool;

    fn mount(&mut self) -> bool;

    fn unmount(&mut self) -> bool;

    fn set_auto_rotation(&mut self, enabled: bool);

    /// Start attacking `target` with whatever the rotation provides.
    fn engage(&mut self, target: ObjectId) -> bool;
}
