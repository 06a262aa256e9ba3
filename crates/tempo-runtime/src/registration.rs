//! Scoped registrations that unregister themselves on drop

use crate::dispatcher::Dispatcher;
use crate::phase::{FixedUpdate, LateUpdate, Phase, Update};
use crate::registry::{address_of, Address};
use std::cell::RefCell;
use std::rc::Weak;

/// The registered handle, kept weakly so its address stays reserved while
/// the guard exists.
pub(crate) enum Target {
    Update(Weak<RefCell<dyn Update>>),
    FixedUpdate(Weak<RefCell<dyn FixedUpdate>>),
    LateUpdate(Weak<RefCell<dyn LateUpdate>>),
}

impl Target {
    fn phase(&self) -> Phase {
        match self {
            Target::Update(_) => Phase::Update,
            Target::FixedUpdate(_) => Phase::FixedUpdate,
            Target::LateUpdate(_) => Phase::LateUpdate,
        }
    }

    fn address(&self) -> Address {
        match self {
            Target::Update(w) => address_of(w.as_ptr()),
            Target::FixedUpdate(w) => address_of(w.as_ptr()),
            Target::LateUpdate(w) => address_of(w.as_ptr()),
        }
    }
}

/// One occurrence of a handle in one phase, removed when this guard drops.
///
/// Created by [`Dispatcher::register_update`] and its siblings. Neither the
/// dispatcher nor the registrant is kept alive by the guard; if the
/// dispatcher is already gone, dropping does nothing.
#[must_use = "dropping a Registration unregisters the callback immediately"]
pub struct Registration {
    dispatcher: Weak<Dispatcher>,
    phase: Phase,
    target: Option<Target>,
}

impl Registration {
    pub(crate) fn new(dispatcher: Weak<Dispatcher>, target: Target) -> Self {
        Self {
            dispatcher,
            phase: target.phase(),
            target: Some(target),
        }
    }

    /// Phase this registration belongs to
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Unregister now. Returns false if the dispatcher is gone or the
    /// handle had already been removed by other means.
    pub fn release(mut self) -> bool {
        self.unregister()
    }

    fn unregister(&mut self) -> bool {
        let Some(target) = self.target.take() else {
            return false;
        };
        match self.dispatcher.upgrade() {
            Some(dispatcher) => dispatcher.remove_address(self.phase, target.address()),
            None => false,
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("phase", &self.phase)
            .field("active", &self.target.is_some())
            .finish()
    }
}
