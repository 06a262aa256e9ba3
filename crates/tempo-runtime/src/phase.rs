//! Frame phases and the capability traits registrants implement

use std::fmt;

/// One of the three moments in a frame at which callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fixed-timestep physics tick, possibly several per frame
    FixedUpdate,
    /// General per-frame tick
    Update,
    /// Post-tick, after every update callback has run
    LateUpdate,
}

impl Phase {
    /// All phases in the order a host loop runs them within a frame
    pub const ALL: [Phase; 3] = [Phase::FixedUpdate, Phase::Update, Phase::LateUpdate];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::FixedUpdate => "fixed_update",
            Phase::Update => "update",
            Phase::LateUpdate => "late_update",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives the general per-frame tick
pub trait Update {
    fn update(&mut self);
}

/// Receives the fixed-timestep tick
pub trait FixedUpdate {
    fn fixed_update(&mut self);
}

/// Receives the post-update tick
pub trait LateUpdate {
    fn late_update(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_order() {
        assert_eq!(
            Phase::ALL,
            [Phase::FixedUpdate, Phase::Update, Phase::LateUpdate]
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(Phase::FixedUpdate.to_string(), "fixed_update");
        assert_eq!(Phase::Update.to_string(), "update");
        assert_eq!(Phase::LateUpdate.to_string(), "late_update");
    }
}
