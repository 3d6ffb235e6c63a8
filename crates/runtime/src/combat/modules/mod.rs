//! Pluggable fighting strategies.
//!
//! The engine picks exactly one module per encounter (the first whose
//! [`CombatModule::can_handle_fight`] accepts the descriptor) and drives it
//! with the currently selected target. Modules decide *how* to attack; the
//! engine decides *what* to attack and when the encounter is over.
mod item_use;
mod rotation;

pub use item_use::ItemUseModule;
pub use rotation::RotationModule;

use quest_core::{CombatData, GameObject};

use crate::world::World;

pub trait CombatModule {
    fn name(&self) -> &'static str;

    fn can_handle_fight(&self, data: &CombatData) -> bool;

    /// Prepares the module for an encounter. Returns false if it cannot run it.
    fn start(&mut self, data: &CombatData, world: &mut dyn World) -> bool;

    /// Attacks `target`, which the engine keeps selected and in range.
    fn update(&mut self, target: &GameObject, world: &mut dyn World);

    /// Filters candidates before prioritization.
    fn can_attack(&self, _candidate: &GameObject) -> bool {
        true
    }

    fn stop(&mut self, world: &mut dyn World);
}

/// Modules tried in order for every encounter.
pub fn default_modules() -> Vec<Box<dyn CombatModule>> {
    vec![
        Box::new(ItemUseModule::default()),
        Box::new(RotationModule::default()),
    ]
}
