//! Tempo Runtime - Per-frame callback dispatch
//!
//! Provides the building blocks a host frame loop drives:
//! - `Update` / `FixedUpdate` / `LateUpdate` — capability traits registrants implement
//! - `Dispatcher` — three ordered registries invoked once per phase per frame
//! - `Registration` — scoped registration that unregisters on drop
//! - `global` — lazily created per-thread dispatcher instance

mod dispatcher;
pub mod global;
mod phase;
mod registration;
mod registry;

pub use dispatcher::Dispatcher;
pub use phase::{FixedUpdate, LateUpdate, Phase, Update};
pub use registration::Registration;
pub use registry::PhaseStats;
