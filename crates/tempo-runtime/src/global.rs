//! Lazily created dispatcher instance shared by everything on a thread.
//!
//! Hosts that prefer an explicit context can own a [`Dispatcher`] directly
//! and skip this module. Those that want a single well-known instance use the
//! free functions here: the first `add_*` (or [`instance`]) creates it, and
//! every later access sees the same one.
//!
//! Removal and dispatch never create the instance. Once [`teardown`] has run,
//! or while the thread's locals are being destroyed, `remove_*` returns
//! false instead of bringing the dispatcher back.

use crate::dispatcher::Dispatcher;
use crate::phase::{FixedUpdate, LateUpdate, Update};
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    static INSTANCE: RefCell<Option<Rc<Dispatcher>>> = const { RefCell::new(None) };
}

/// The current instance, created on first access.
///
/// # Panics
///
/// Panics if called while this thread's locals are being destroyed.
pub fn instance() -> Rc<Dispatcher> {
    INSTANCE.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| {
                log::debug!("Creating dispatcher instance");
                Rc::new(Dispatcher::new())
            })
            .clone()
    })
}

/// The current instance, if one exists. Never creates one.
pub fn try_instance() -> Option<Rc<Dispatcher>> {
    INSTANCE
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
}

/// Make `dispatcher` the instance. A second installation is discarded and
/// returns false, leaving the first in place.
pub fn install(dispatcher: Rc<Dispatcher>) -> bool {
    INSTANCE
        .try_with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                log::warn!("Dispatcher instance already exists, discarding duplicate");
                return false;
            }
            *slot = Some(dispatcher);
            true
        })
        .unwrap_or(false)
}

/// Detach the instance. Handles it holds stay with the returned dispatcher.
pub fn teardown() -> Option<Rc<Dispatcher>> {
    INSTANCE
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
}

pub fn add_update<U: Update + 'static>(handle: &Rc<RefCell<U>>) {
    instance().add_update(handle);
}

pub fn add_fixed_update<U: FixedUpdate + 'static>(handle: &Rc<RefCell<U>>) {
    instance().add_fixed_update(handle);
}

pub fn add_late_update<U: LateUpdate + 'static>(handle: &Rc<RefCell<U>>) {
    instance().add_late_update(handle);
}

pub fn add_update_dyn(handle: &Rc<RefCell<dyn Update>>) {
    instance().add_update_dyn(handle);
}

pub fn add_fixed_update_dyn(handle: &Rc<RefCell<dyn FixedUpdate>>) {
    instance().add_fixed_update_dyn(handle);
}

pub fn add_late_update_dyn(handle: &Rc<RefCell<dyn LateUpdate>>) {
    instance().add_late_update_dyn(handle);
}

pub fn remove_update<U: Update + ?Sized>(handle: &Rc<RefCell<U>>) -> bool {
    try_instance().is_some_and(|d| d.remove_update(handle))
}

pub fn remove_fixed_update<U: FixedUpdate + ?Sized>(handle: &Rc<RefCell<U>>) -> bool {
    try_instance().is_some_and(|d| d.remove_fixed_update(handle))
}

pub fn remove_late_update<U: LateUpdate + ?Sized>(handle: &Rc<RefCell<U>>) -> bool {
    try_instance().is_some_and(|d| d.remove_late_update(handle))
}

pub fn dispatch_update() {
    if let Some(dispatcher) = try_instance() {
        dispatcher.dispatch_update();
    }
}

pub fn dispatch_fixed_update() {
    if let Some(dispatcher) = try_instance() {
        dispatcher.dispatch_fixed_update();
    }
}

pub fn dispatch_late_update() {
    if let Some(dispatcher) = try_instance() {
        dispatcher.dispatch_late_update();
    }
}
