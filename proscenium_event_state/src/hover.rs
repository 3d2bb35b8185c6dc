// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer target tracking across hit-test passes.
//!
//! A stage hit-tests shapes topmost first and stops at the first one that handles
//! the event. The tracker remembers the current target and whether the pass has
//! walked past it, so that a different shape only becomes the new target once the
//! old one is known to no longer be under the pointer. Mouseout for the old target is
//! deferred and fired either right before the next mouseover or at the end of a pass
//! that hit nothing.
//!
//! ## Usage
//!
//! 1) [`TargetTracker::begin_pass`] at the start of every input event.
//! 2) For every shape visited, [`TargetTracker::observe`] before testing it.
//! 3) On a hit, [`TargetTracker::claim`] reports whether the shape is a new target
//!    (and parks the old one as pending mouseout); on a miss of the current target,
//!    [`TargetTracker::release`].
//! 4) Drain [`TargetTracker::take_mouseout`] when appropriate.

/// Current hover target plus a deferred mouseout.
#[derive(Clone, Copy, Debug)]
pub struct TargetTracker<K> {
    target: Option<K>,
    target_found: bool,
    mouseout: Option<K>,
}

impl<K> Default for TargetTracker<K> {
    fn default() -> Self {
        Self {
            target: None,
            target_found: false,
            mouseout: None,
        }
    }
}

impl<K: Copy + PartialEq> TargetTracker<K> {
    /// Starts a new hit-test pass.
    pub fn begin_pass(&mut self) {
        self.target_found = false;
    }

    /// Notes that `node` is being visited in this pass.
    pub fn observe(&mut self, node: K) {
        if self.target == Some(node) {
            self.target_found = true;
        }
    }

    /// The current target.
    pub fn target(&self) -> Option<K> {
        self.target
    }

    /// Whether the current target was visited in this pass.
    pub fn target_found(&self) -> bool {
        self.target_found
    }

    /// Whether `node` should replace the current target.
    ///
    /// True when there is no target, or when the pass has not reached the current
    /// target and `node` is a different node.
    pub fn is_new_target(&self, node: K) -> bool {
        match self.target {
            None => true,
            Some(t) => !self.target_found && t != node,
        }
    }

    /// If `node` is a new target, parks the old target as pending mouseout and returns `true`.
    ///
    /// The caller makes `node` the target with [`TargetTracker::set_target`] once its
    /// mouseover has been delivered.
    pub fn claim(&mut self, node: K) -> bool {
        if !self.is_new_target(node) {
            return false;
        }
        if let Some(old) = self.target {
            self.mouseout = Some(old);
        }
        true
    }

    /// Makes `node` the target.
    pub fn set_target(&mut self, node: K) {
        self.target = Some(node);
        self.target_found = true;
    }

    /// The pointer left the current target: clear it and defer its mouseout.
    pub fn release(&mut self) -> Option<K> {
        let old = self.target.take();
        self.target_found = true;
        if old.is_some() {
            self.mouseout = old;
        }
        old
    }

    /// Pending mouseout target, without consuming it.
    pub fn pending_mouseout(&self) -> Option<K> {
        self.mouseout
    }

    /// Takes the pending mouseout target.
    pub fn take_mouseout(&mut self) -> Option<K> {
        self.mouseout.take()
    }

    /// Forgets `node` everywhere, e.g. when it is destroyed.
    pub fn forget(&mut self, node: K) {
        if self.target == Some(node) {
            self.target = None;
        }
        if self.mouseout == Some(node) {
            self.mouseout = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_is_new_target() {
        let mut t = TargetTracker::default();
        t.begin_pass();
        assert!(t.claim(1_u32));
        assert_eq!(t.take_mouseout(), None);
        t.set_target(1);
        assert_eq!(t.target(), Some(1));
    }

    #[test]
    fn same_target_is_not_new() {
        let mut t = TargetTracker::default();
        t.set_target(1_u32);
        t.begin_pass();
        t.observe(1);
        assert!(!t.claim(1));
    }

    #[test]
    fn shape_above_old_target_takes_over() {
        let mut t = TargetTracker::default();
        t.set_target(1_u32);
        t.begin_pass();
        // Shape 2 is visited before the old target, so the old target is not found yet.
        t.observe(2);
        assert!(t.claim(2));
        assert_eq!(t.pending_mouseout(), Some(1));
        t.set_target(2);
        assert_eq!(t.take_mouseout(), Some(1));
    }

    #[test]
    fn shape_below_found_target_is_ignored() {
        let mut t = TargetTracker::default();
        t.set_target(1_u32);
        t.begin_pass();
        t.observe(1);
        t.observe(2);
        assert!(!t.claim(2));
    }

    #[test]
    fn release_defers_mouseout() {
        let mut t = TargetTracker::default();
        t.set_target(3_u32);
        assert_eq!(t.release(), Some(3));
        assert_eq!(t.target(), None);
        assert_eq!(t.take_mouseout(), Some(3));
        assert_eq!(t.take_mouseout(), None);
    }

    #[test]
    fn forget_clears_stale_references() {
        let mut t = TargetTracker::default();
        t.set_target(3_u32);
        t.release();
        t.set_target(4);
        t.forget(3);
        t.forget(4);
        assert_eq!(t.target(), None);
        assert_eq!(t.pending_mouseout(), None);
    }
}
