//! Per-frame callback dispatcher

use crate::phase::{FixedUpdate, LateUpdate, Phase, Update};
use crate::registration::{Registration, Target};
use crate::registry::{address_of, Address, CallbackRegistry, PhaseStats};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tempo_core::DispatcherConfig;

/// Owns the three phase registries and invokes them when the host asks.
///
/// Registrants are shared as `Rc<RefCell<T>>` and held weakly, so dropping
/// the last strong reference turns a handle stale rather than dangling. All
/// methods take `&self`: callbacks may register or unregister anything,
/// themselves included, while a dispatch is running. Such changes apply
/// from the next dispatch of the affected phase.
///
/// A host owns one dispatcher for the whole run (see [`crate::global`] for a
/// lazily created instance) and calls, once per frame,
/// [`dispatch_fixed_update`](Self::dispatch_fixed_update) for each physics
/// step, then [`dispatch_update`](Self::dispatch_update), then
/// [`dispatch_late_update`](Self::dispatch_late_update).
///
/// ```ignore
/// let dispatcher = Rc::new(Dispatcher::new());
/// let spinner = Rc::new(RefCell::new(Spinner::default()));
/// dispatcher.add_update(&spinner);
/// dispatcher.dispatch_update();
/// assert!(dispatcher.remove_update(&spinner));
/// ```
pub struct Dispatcher {
    update: CallbackRegistry<dyn Update>,
    fixed_update: CallbackRegistry<dyn FixedUpdate>,
    late_update: CallbackRegistry<dyn LateUpdate>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_config(&DispatcherConfig::default())
    }

    pub fn with_config(config: &DispatcherConfig) -> Self {
        let capacity = config.initial_capacity;
        let log_stale = config.log_stale;
        Self {
            update: CallbackRegistry::new(Phase::Update, capacity, log_stale),
            fixed_update: CallbackRegistry::new(Phase::FixedUpdate, capacity, log_stale),
            late_update: CallbackRegistry::new(Phase::LateUpdate, capacity, log_stale),
        }
    }

    // --- Registration ---

    /// Append `handle` to the update sequence. Registering twice means two calls per dispatch.
    pub fn add_update<U: Update + 'static>(&self, handle: &Rc<RefCell<U>>) {
        let handle: Rc<RefCell<dyn Update>> = handle.clone();
        self.add_update_dyn(&handle);
    }

    /// Append `handle` to the fixed-update sequence.
    pub fn add_fixed_update<U: FixedUpdate + 'static>(&self, handle: &Rc<RefCell<U>>) {
        let handle: Rc<RefCell<dyn FixedUpdate>> = handle.clone();
        self.add_fixed_update_dyn(&handle);
    }

    /// Append `handle` to the late-update sequence.
    pub fn add_late_update<U: LateUpdate + 'static>(&self, handle: &Rc<RefCell<U>>) {
        let handle: Rc<RefCell<dyn LateUpdate>> = handle.clone();
        self.add_late_update_dyn(&handle);
    }

    /// [`add_update`](Self::add_update) for a registrant already held as a trait object
    pub fn add_update_dyn(&self, handle: &Rc<RefCell<dyn Update>>) {
        self.update.push(Rc::downgrade(handle));
    }

    pub fn add_fixed_update_dyn(&self, handle: &Rc<RefCell<dyn FixedUpdate>>) {
        self.fixed_update.push(Rc::downgrade(handle));
    }

    pub fn add_late_update_dyn(&self, handle: &Rc<RefCell<dyn LateUpdate>>) {
        self.late_update.push(Rc::downgrade(handle));
    }

    /// Remove the first occurrence of `handle` from the update sequence.
    ///
    /// Returns false if it was not registered.
    pub fn remove_update<U: Update + ?Sized>(&self, handle: &Rc<RefCell<U>>) -> bool {
        self.update.remove_first(address_of(Rc::as_ptr(handle)))
    }

    /// Remove the first occurrence of `handle` from the fixed-update sequence.
    pub fn remove_fixed_update<U: FixedUpdate + ?Sized>(&self, handle: &Rc<RefCell<U>>) -> bool {
        self.fixed_update.remove_first(address_of(Rc::as_ptr(handle)))
    }

    /// Remove the first occurrence of `handle` from the late-update sequence.
    pub fn remove_late_update<U: LateUpdate + ?Sized>(&self, handle: &Rc<RefCell<U>>) -> bool {
        self.late_update.remove_first(address_of(Rc::as_ptr(handle)))
    }

    /// Register for updates until the returned guard is dropped or released
    pub fn register_update<U: Update + 'static>(
        self: &Rc<Self>,
        handle: &Rc<RefCell<U>>,
    ) -> Registration {
        let handle: Rc<RefCell<dyn Update>> = handle.clone();
        self.register_update_dyn(&handle)
    }

    /// Register for fixed updates until the returned guard is dropped or released
    pub fn register_fixed_update<U: FixedUpdate + 'static>(
        self: &Rc<Self>,
        handle: &Rc<RefCell<U>>,
    ) -> Registration {
        let handle: Rc<RefCell<dyn FixedUpdate>> = handle.clone();
        self.register_fixed_update_dyn(&handle)
    }

    /// Register for late updates until the returned guard is dropped or released
    pub fn register_late_update<U: LateUpdate + 'static>(
        self: &Rc<Self>,
        handle: &Rc<RefCell<U>>,
    ) -> Registration {
        let handle: Rc<RefCell<dyn LateUpdate>> = handle.clone();
        self.register_late_update_dyn(&handle)
    }

    pub fn register_update_dyn(
        self: &Rc<Self>,
        handle: &Rc<RefCell<dyn Update>>,
    ) -> Registration {
        self.add_update_dyn(handle);
        Registration::new(Rc::downgrade(self), Target::Update(Rc::downgrade(handle)))
    }

    pub fn register_fixed_update_dyn(
        self: &Rc<Self>,
        handle: &Rc<RefCell<dyn FixedUpdate>>,
    ) -> Registration {
        self.add_fixed_update_dyn(handle);
        Registration::new(Rc::downgrade(self), Target::FixedUpdate(Rc::downgrade(handle)))
    }

    pub fn register_late_update_dyn(
        self: &Rc<Self>,
        handle: &Rc<RefCell<dyn LateUpdate>>,
    ) -> Registration {
        self.add_late_update_dyn(handle);
        Registration::new(Rc::downgrade(self), Target::LateUpdate(Rc::downgrade(handle)))
    }

    pub(crate) fn remove_address(&self, phase: Phase, target: Address) -> bool {
        match phase {
            Phase::Update => self.update.remove_first(target),
            Phase::FixedUpdate => self.fixed_update.remove_first(target),
            Phase::LateUpdate => self.late_update.remove_first(target),
        }
    }

    // --- Dispatch ---

    /// Invoke every update callback registered when this call begins
    pub fn dispatch_update(&self) {
        self.update.dispatch(|target| target.update());
    }

    /// Invoke every fixed-update callback registered when this call begins
    pub fn dispatch_fixed_update(&self) {
        self.fixed_update.dispatch(|target| target.fixed_update());
    }

    /// Invoke every late-update callback registered when this call begins
    pub fn dispatch_late_update(&self) {
        self.late_update.dispatch(|target| target.late_update());
    }

    pub fn dispatch(&self, phase: Phase) {
        match phase {
            Phase::Update => self.dispatch_update(),
            Phase::FixedUpdate => self.dispatch_fixed_update(),
            Phase::LateUpdate => self.dispatch_late_update(),
        }
    }

    // --- Queries and maintenance ---

    /// Number of handles in a phase, stale ones included
    pub fn len(&self, phase: Phase) -> usize {
        match phase {
            Phase::Update => self.update.len(),
            Phase::FixedUpdate => self.fixed_update.len(),
            Phase::LateUpdate => self.late_update.len(),
        }
    }

    /// True when no phase has any handle
    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.fixed_update.is_empty() && self.late_update.is_empty()
    }

    /// How many times `handle` appears in a phase's sequence
    pub fn occurrences<U: ?Sized>(&self, phase: Phase, handle: &Rc<RefCell<U>>) -> usize {
        let target = address_of(Rc::as_ptr(handle));
        match phase {
            Phase::Update => self.update.occurrences(target),
            Phase::FixedUpdate => self.fixed_update.occurrences(target),
            Phase::LateUpdate => self.late_update.occurrences(target),
        }
    }

    pub fn stats(&self, phase: Phase) -> PhaseStats {
        match phase {
            Phase::Update => self.update.stats(),
            Phase::FixedUpdate => self.fixed_update.stats(),
            Phase::LateUpdate => self.late_update.stats(),
        }
    }

    /// Drop stale handles from every phase. Dispatch never does this on its own.
    pub fn prune_stale(&self) -> usize {
        self.update.prune_stale() + self.fixed_update.prune_stale() + self.late_update.prune_stale()
    }

    /// Unregister everything
    pub fn clear(&self) {
        self.update.clear();
        self.fixed_update.clear();
        self.late_update.clear();
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("update", &self.update.len())
            .field("fixed_update", &self.fixed_update.len())
            .field("late_update", &self.late_update.len())
            .finish()
    }
}
