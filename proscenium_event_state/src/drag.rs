// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag session state: which node is dragged, where it was grabbed, and whether it moved.
//!
//! ## Usage
//!
//! 1) On press over a draggable node, call [`DragSession::begin`] with the node and the
//!    pointer-to-node offset.
//! 2) On each move, compute the proposed position (`pointer - offset`), filter it through
//!    [`DragBounds::apply`], then call [`DragSession::update`]. The first update reports
//!    `first_move`, which is when a "drag start" notification belongs.
//! 3) On release (or the pointer leaving the surface) call [`DragSession::end`]; it reports
//!    whether any movement happened so "drag end" can be skipped for plain clicks.
//!
//! There is at most one session at a time; beginning a new one replaces the old.

use kurbo::{Point, Vec2};

/// Axis restriction applied while dragging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragConstraint {
    /// Both axes move.
    #[default]
    None,
    /// Only `x` moves.
    Horizontal,
    /// Only `y` moves.
    Vertical,
}

impl DragConstraint {
    /// Whether the horizontal axis may move.
    pub fn allows_x(self) -> bool {
        matches!(self, Self::None | Self::Horizontal)
    }

    /// Whether the vertical axis may move.
    pub fn allows_y(self) -> bool {
        matches!(self, Self::None | Self::Vertical)
    }
}

/// Optional per-edge limits for a dragged position.
///
/// Limits are strict and reject rather than clamp: a proposed coordinate is
/// accepted only if it lies strictly inside every defined edge, otherwise that
/// axis keeps its current value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragBounds {
    /// Smallest `x` (exclusive).
    pub left: Option<f64>,
    /// Smallest `y` (exclusive).
    pub top: Option<f64>,
    /// Largest `x` (exclusive).
    pub right: Option<f64>,
    /// Largest `y` (exclusive).
    pub bottom: Option<f64>,
}

impl DragBounds {
    /// No limits.
    pub const UNBOUNDED: Self = Self {
        left: None,
        top: None,
        right: None,
        bottom: None,
    };

    fn accepts_x(&self, x: f64) -> bool {
        self.left.is_none_or(|l| l < x) && self.right.is_none_or(|r| r > x)
    }

    fn accepts_y(&self, y: f64) -> bool {
        self.top.is_none_or(|t| t < y) && self.bottom.is_none_or(|b| b > y)
    }

    /// Resolves the next position from `current` and `proposed` under `constraint`.
    pub fn apply(&self, current: Point, proposed: Point, constraint: DragConstraint) -> Point {
        let mut next = current;
        if constraint.allows_x() && self.accepts_x(proposed.x) {
            next.x = proposed.x;
        }
        if constraint.allows_y() && self.accepts_y(proposed.y) {
            next.y = proposed.y;
        }
        next
    }
}

/// Result of [`DragSession::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragStep<K> {
    /// Dragged node.
    pub node: K,
    /// Grab offset recorded at [`DragSession::begin`].
    pub offset: Vec2,
    /// `true` only for the first update of the session.
    pub first_move: bool,
}

/// Result of [`DragSession::end`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragEnd<K> {
    /// Node that was being dragged.
    pub node: K,
    /// Whether any update happened during the session.
    pub moved: bool,
}

/// The active drag, if any.
#[derive(Clone, Copy, Debug)]
pub struct DragSession<K> {
    node: Option<K>,
    offset: Vec2,
    moving: bool,
}

impl<K> Default for DragSession<K> {
    fn default() -> Self {
        Self {
            node: None,
            offset: Vec2::ZERO,
            moving: false,
        }
    }
}

impl<K: Copy + PartialEq> DragSession<K> {
    /// Starts a session for `node`, replacing any current one.
    pub fn begin(&mut self, node: K, offset: Vec2) {
        self.node = Some(node);
        self.offset = offset;
        self.moving = false;
    }

    /// The node being dragged, moved or not.
    pub fn node(&self) -> Option<K> {
        self.node
    }

    /// Grab offset of the current session.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Whether a session exists.
    pub fn is_active(&self) -> bool {
        self.node.is_some()
    }

    /// Whether the current session has moved at least once.
    pub fn is_moving(&self) -> bool {
        self.node.is_some() && self.moving
    }

    /// Whether `node` is being dragged and has moved.
    pub fn is_dragging(&self, node: K) -> bool {
        self.moving && self.node == Some(node)
    }

    /// Records a move. Returns `None` when no session is active.
    pub fn update(&mut self) -> Option<DragStep<K>> {
        let node = self.node?;
        let first_move = !self.moving;
        self.moving = true;
        Some(DragStep {
            node,
            offset: self.offset,
            first_move,
        })
    }

    /// Ends the session. Returns `None` when no session was active.
    pub fn end(&mut self) -> Option<DragEnd<K>> {
        let node = self.node.take()?;
        let moved = core::mem::replace(&mut self.moving, false);
        self.offset = Vec2::ZERO;
        Some(DragEnd { node, moved })
    }

    /// Drops the session without reporting, e.g. when its node is destroyed.
    pub fn cancel(&mut self) {
        self.node = None;
        self.moving = false;
        self.offset = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let mut s = DragSession::<u32>::default();
        assert!(!s.is_active());
        assert!(!s.is_moving());
        assert!(s.update().is_none());
        assert!(s.end().is_none());
    }

    #[test]
    fn first_update_is_flagged_once() {
        let mut s = DragSession::default();
        s.begin(1_u32, Vec2::new(3.0, 4.0));
        assert!(!s.is_dragging(1));

        let first = s.update().unwrap();
        assert!(first.first_move);
        assert_eq!(first.offset, Vec2::new(3.0, 4.0));
        assert!(!s.update().unwrap().first_move);
        assert!(s.is_dragging(1));
        assert!(!s.is_dragging(2));
    }

    #[test]
    fn end_reports_movement() {
        let mut s = DragSession::default();
        s.begin(1_u32, Vec2::ZERO);
        assert_eq!(s.end(), Some(DragEnd { node: 1, moved: false }));

        s.begin(2_u32, Vec2::ZERO);
        s.update();
        assert_eq!(s.end(), Some(DragEnd { node: 2, moved: true }));
        assert!(!s.is_active());
    }

    #[test]
    fn begin_replaces_previous_session() {
        let mut s = DragSession::default();
        s.begin(1_u32, Vec2::new(1.0, 1.0));
        s.update();
        s.begin(2_u32, Vec2::new(9.0, 9.0));
        assert_eq!(s.node(), Some(2));
        assert!(!s.is_moving());
        assert_eq!(s.offset(), Vec2::new(9.0, 9.0));
    }

    #[test]
    fn horizontal_drag_rejects_out_of_bounds_x_and_keeps_y() {
        let bounds = DragBounds {
            left: Some(0.0),
            right: Some(100.0),
            ..DragBounds::UNBOUNDED
        };
        let current = Point::new(50.0, 20.0);

        let past_right = bounds.apply(current, Point::new(150.0, 20.0), DragConstraint::Horizontal);
        assert!(past_right.x < 100.0);
        assert_eq!(past_right, current);

        let vertical_attempt =
            bounds.apply(current, Point::new(50.0, 80.0), DragConstraint::Horizontal);
        assert_eq!(vertical_attempt.y, 20.0);

        let inside = bounds.apply(current, Point::new(99.0, 80.0), DragConstraint::Horizontal);
        assert_eq!(inside, Point::new(99.0, 20.0));
    }

    #[test]
    fn bounds_are_exclusive() {
        let bounds = DragBounds {
            top: Some(10.0),
            ..DragBounds::UNBOUNDED
        };
        let current = Point::new(0.0, 50.0);
        assert_eq!(
            bounds.apply(current, Point::new(0.0, 10.0), DragConstraint::Vertical),
            current
        );
        assert_eq!(
            bounds.apply(current, Point::new(0.0, 10.5), DragConstraint::Vertical),
            Point::new(0.0, 10.5)
        );
    }

    #[test]
    fn unconstrained_moves_both_axes() {
        let moved = DragBounds::UNBOUNDED.apply(
            Point::ZERO,
            Point::new(-40.0, 12.0),
            DragConstraint::None,
        );
        assert_eq!(moved, Point::new(-40.0, 12.0));
    }

    #[test]
    fn cancel_is_silent() {
        let mut s = DragSession::default();
        s.begin(5_u32, Vec2::ZERO);
        s.update();
        s.cancel();
        assert!(s.end().is_none());
    }
}
