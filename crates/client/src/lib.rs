//! Headless quest automation driver.
//!
//! Loads a RON [`Scenario`], builds the scripted world it describes and runs
//! the quest runtime against it on a fixed frame interval:
//!
//! ```text
//! Scenario ──→ SimWorld ──┐
//!          └─→ ScriptedQuest (step hooks) ──→ Dispatcher ──tick──→ SimWorld
//! ```
//!
//! [`config`] reads driver settings from the environment, [`logging`] installs
//! the subscriber, and [`run_scenario`] owns the frame loop.
pub mod config;
pub mod logging;
pub mod scenario;

mod driver;

pub use config::ClientConfig;
pub use driver::{RunSummary, run_scenario};
pub use scenario::{Scenario, ScriptedQuest, Step};
