//! Public surface for hosts embedding the runtime.
//!
//! Re-exports the error type and the signal sender so hosts can import the
//! control API from one place.
mod errors;

pub use crate::dispatcher::{Signal, SignalSender};
pub use errors::{Result, RuntimeError};
