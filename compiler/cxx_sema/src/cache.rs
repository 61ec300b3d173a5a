//! Single-flight instantiation cache.
//!
//! One slot per `(template, enclosing instance, arguments)` key. The first
//! requester of a key claims the slot and computes the instance; concurrent
//! requesters of the same key wait on the slot instead of computing it
//! again. A claim dropped without completing (cancellation, failure)
//! abandons the slot: waiters retry and nothing is published.

use std::sync::{Arc, OnceLock};

use cxx_types::{SymbolId, TemplateArg};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxBuildHasher;

use crate::{Ctx, InstanceId};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) struct CacheKey {
    pub template: SymbolId,
    pub parent: Ctx,
    pub args: Arc<[TemplateArg]>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum SlotState {
    InFlight,
    Done,
    Abandoned,
}

struct Slot {
    /// Set once on completion; read without taking the mutex.
    done: OnceLock<InstanceId>,
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn in_flight() -> Self {
        Slot {
            done: OnceLock::new(),
            state: Mutex::new(SlotState::InFlight),
            ready: Condvar::new(),
        }
    }
}

pub(crate) enum Claim<'c> {
    Ready(InstanceId),
    /// The caller computes the instance and must complete the guard.
    Owner(SlotGuard<'c>),
}

#[derive(Default)]
pub(crate) struct InstantiationCache {
    slots: DashMap<CacheKey, Arc<Slot>, FxBuildHasher>,
}

impl InstantiationCache {
    /// Completed instance of `key`, if any.
    pub(crate) fn get(&self, key: &CacheKey) -> Option<InstanceId> {
        self.slots.get(key).and_then(|slot| slot.done.get().copied())
    }

    /// Wait for the instance of `key` or become the one computing it.
    pub(crate) fn claim(&self, key: CacheKey) -> Claim<'_> {
        loop {
            let slot = match self.slots.entry(key.clone()) {
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    let slot = Arc::new(Slot::in_flight());
                    entry.insert(Arc::clone(&slot));
                    return Claim::Owner(SlotGuard {
                        cache: self,
                        key,
                        slot,
                        completed: false,
                    });
                }
            };
            if let Some(&id) = slot.done.get() {
                return Claim::Ready(id);
            }
            let mut state = slot.state.lock();
            while *state == SlotState::InFlight {
                slot.ready.wait(&mut state);
            }
            if *state == SlotState::Done {
                if let Some(&id) = slot.done.get() {
                    return Claim::Ready(id);
                }
            }
            drop(state);
            tracing::trace!(template = ?key.template, "retrying abandoned instantiation");
            self.slots.remove_if(&key, |_, current| Arc::ptr_eq(current, &slot));
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Exclusive right to publish the instance of one key.
pub(crate) struct SlotGuard<'c> {
    cache: &'c InstantiationCache,
    key: CacheKey,
    slot: Arc<Slot>,
    completed: bool,
}

impl SlotGuard<'_> {
    pub(crate) fn complete(mut self, id: InstanceId) -> InstanceId {
        let published = *self.slot.done.get_or_init(|| id);
        *self.slot.state.lock() = SlotState::Done;
        self.slot.ready.notify_all();
        self.completed = true;
        published
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        *self.slot.state.lock() = SlotState::Abandoned;
        self.slot.ready.notify_all();
        let slot = &self.slot;
        self.cache
            .slots
            .remove_if(&self.key, |_, current| Arc::ptr_eq(current, slot));
    }
}
