// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use core::cell::Cell;

/// Generational handle to a node in a [`Scene`](crate::Scene).
///
/// ### Generations
///
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale handles never alias a different live node. Use
/// [`Scene::is_alive`](crate::Scene::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot generation of this handle.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Shared counter handing out serial numbers.
///
/// Every node gets a serial when it is added to a container, and stages take
/// theirs from the same source, so serials are unique across every stage
/// that shares one `IdSource`. Clones share the counter.
#[derive(Clone, Debug, Default)]
pub struct IdSource(Rc<Cell<u64>>);

impl IdSource {
    /// A fresh counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next serial.
    pub fn next_id(&self) -> u64 {
        let id = self.0.get();
        self.0.set(id + 1);
        id
    }

    /// The serial the next call to [`IdSource::next_id`] will return.
    pub fn peek(&self) -> u64 {
        self.0.get()
    }
}
