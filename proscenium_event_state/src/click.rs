// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-click / double-tap windows.
//!
//! Every registered click opens (or re-opens) a window for its node. A click that lands
//! while its node's window is still open is a double click. Timestamps are supplied by
//! the caller in milliseconds, so no timer is needed: a window simply expires once
//! `now` passes its deadline.
//!
//! ```
//! use proscenium_event_state::click::ClickWindows;
//!
//! let mut clicks = ClickWindows::new(400);
//! assert!(!clicks.register("a", 1_000));
//! assert!(clicks.register("a", 1_250));   // double click
//! assert!(!clicks.register("b", 1_300));  // windows are per node
//! assert!(!clicks.register("a", 2_000));  // expired
//! ```

use core::hash::Hash;

use hashbrown::HashMap;

/// Default double-click window in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 400;

/// Per-node double-click windows.
#[derive(Clone, Debug)]
pub struct ClickWindows<K> {
    window_ms: u64,
    deadlines: HashMap<K, u64>,
}

impl<K: Hash + Eq + Copy> Default for ClickWindows<K> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

impl<K: Hash + Eq + Copy> ClickWindows<K> {
    /// Creates a tracker with the given window length.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            deadlines: HashMap::new(),
        }
    }

    /// Window length in milliseconds.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Changes the window length for clicks registered from now on.
    pub fn set_window_ms(&mut self, window_ms: u64) {
        self.window_ms = window_ms;
    }

    /// Whether `node`'s window is open at `now_ms`.
    pub fn is_open(&self, node: K, now_ms: u64) -> bool {
        self.deadlines.get(&node).is_some_and(|&d| now_ms < d)
    }

    /// Records a click on `node` at `now_ms`.
    ///
    /// Returns `true` when the click landed inside the node's open window.
    /// The window is re-armed either way.
    pub fn register(&mut self, node: K, now_ms: u64) -> bool {
        let open = self.is_open(node, now_ms);
        self.deadlines
            .insert(node, now_ms.saturating_add(self.window_ms));
        open
    }

    /// Forgets `node`, e.g. when it is destroyed.
    pub fn forget(&mut self, node: K) {
        self.deadlines.remove(&node);
    }

    /// Keeps only the windows of nodes for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(K) -> bool) {
        self.deadlines.retain(|node, _| keep(*node));
    }

    /// Drops every window that has expired by `now_ms`.
    pub fn prune(&mut self, now_ms: u64) {
        self.deadlines.retain(|_, d| now_ms < *d);
    }

    /// Number of windows currently tracked (open or expired but not pruned).
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether no windows are tracked.
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
