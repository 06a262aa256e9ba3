//! Ordered, non-owning callback registry for a single phase

use crate::phase::Phase;
use std::cell::{Cell, RefCell};
use std::rc::Weak;

/// Counters accumulated by a phase registry across dispatches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Number of dispatch calls
    pub dispatches: u64,
    /// Callbacks actually invoked
    pub invoked: u64,
    /// Handles skipped because their registrant was dropped
    pub skipped_stale: u64,
    /// Handles skipped because their registrant was already mid-callback
    pub skipped_busy: u64,
}

impl PhaseStats {
    fn merge(self, other: PhaseStats) -> PhaseStats {
        PhaseStats {
            dispatches: self.dispatches + other.dispatches,
            invoked: self.invoked + other.invoked,
            skipped_stale: self.skipped_stale + other.skipped_stale,
            skipped_busy: self.skipped_busy + other.skipped_busy,
        }
    }
}

/// Identity of a registrant: the address of its allocation, without
/// trait-object metadata.
pub(crate) type Address = *const ();

pub(crate) fn address_of<T: ?Sized>(ptr: *const T) -> Address {
    ptr.cast()
}

/// Insertion-ordered handles for one phase.
///
/// Handles are weak, so the registry never keeps a registrant alive.
/// Duplicates are kept; removal drops only the first match.
pub(crate) struct CallbackRegistry<T: ?Sized> {
    phase: Phase,
    handles: RefCell<Vec<Weak<RefCell<T>>>>,
    stats: Cell<PhaseStats>,
    log_stale: bool,
}

impl<T: ?Sized> CallbackRegistry<T> {
    pub fn new(phase: Phase, capacity: usize, log_stale: bool) -> Self {
        Self {
            phase,
            handles: RefCell::new(Vec::with_capacity(capacity)),
            stats: Cell::new(PhaseStats::default()),
            log_stale,
        }
    }

    pub fn push(&self, handle: Weak<RefCell<T>>) {
        let mut handles = self.handles.borrow_mut();
        handles.push(handle);
        log::debug!("Added {} callback ({} registered)", self.phase, handles.len());
    }

    /// Remove the first handle pointing at `target`. Returns false if none does.
    pub fn remove_first(&self, target: Address) -> bool {
        let mut handles = self.handles.borrow_mut();
        let position = handles
            .iter()
            .position(|h| address_of(h.as_ptr()) == target);
        match position {
            Some(index) => {
                handles.remove(index);
                log::debug!("Removed {} callback ({} registered)", self.phase, handles.len());
                true
            }
            None => false,
        }
    }

    pub fn occurrences(&self, target: Address) -> usize {
        self.handles
            .borrow()
            .iter()
            .filter(|h| address_of(h.as_ptr()) == target)
            .count()
    }

    pub fn len(&self) -> usize {
        self.handles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.handles.borrow_mut().clear();
    }

    /// Drop handles whose registrant no longer exists. Returns how many went.
    pub fn prune_stale(&self) -> usize {
        let mut handles = self.handles.borrow_mut();
        let before = handles.len();
        handles.retain(|h| h.strong_count() > 0);
        let pruned = before - handles.len();
        if pruned > 0 {
            log::debug!("Pruned {} stale {} callback(s)", pruned, self.phase);
        }
        pruned
    }

    pub fn stats(&self) -> PhaseStats {
        self.stats.get()
    }

    /// Invoke every handle registered when this call begins, in order.
    ///
    /// The sequence is copied before the first callback runs and no borrow of
    /// it is held while callbacks execute, so callbacks may add or remove
    /// handles freely; those changes take effect from the next dispatch.
    pub fn dispatch(&self, mut invoke: impl FnMut(&mut T)) {
        let snapshot: Vec<Weak<RefCell<T>>> = self.handles.borrow().clone();
        log::trace!("Dispatching {} to {} callback(s)", self.phase, snapshot.len());

        let mut run = PhaseStats {
            dispatches: 1,
            ..PhaseStats::default()
        };
        for handle in &snapshot {
            let Some(target) = handle.upgrade() else {
                run.skipped_stale += 1;
                if self.log_stale {
                    log::debug!("Skipping stale {} callback", self.phase);
                }
                continue;
            };
            // Already borrowed means this registrant is somewhere up the stack
            // in a nested dispatch of the same phase.
            let Ok(mut registrant) = target.try_borrow_mut() else {
                run.skipped_busy += 1;
                log::warn!("Skipping {} callback already running higher in the stack", self.phase);
                continue;
            };
            invoke(&mut *registrant);
            run.invoked += 1;
        }

        self.stats.set(self.stats.get().merge(run));
    }
}
