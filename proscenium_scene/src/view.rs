// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage view state: pan position, scale and limits.
//!
//! The view maps stage space onto the surfaces. A node's view transform
//! starts with the view (translate by the negated view position, then
//! scale) before its ancestors' local transforms.
//!
//! When world limits are set, the pan position is clamped so the view stays
//! inside the world. The limits are derived from the world rectangle, the
//! view scale and the view size:
//!
//! ```text
//! left   = world.left
//! top    = world.top
//! right  = world.right  * scale.x - width
//! bottom = world.bottom * scale.y - height
//! ```
//!
//! A world smaller than the view collapses that axis to its rounded
//! midpoint, centring the world.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size, Vec2};
use proscenium_geom::{BoundsRect, Transform};

/// Rounds halves towards positive infinity.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Pan and zoom of a stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    size: Size,
    target: Point,
    applied: Point,
    scale: Option<Vec2>,
    world_limits: Option<BoundsRect>,
    view_limits: Option<BoundsRect>,
}

impl ViewState {
    /// A view of the given size at the origin, unscaled.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// View size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Changes the view size and recomputes the limits.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.recalc_limits();
    }

    /// Sets or clears the world limits.
    ///
    /// Clearing them also clears the view limits without re-clamping the
    /// current position.
    pub fn set_world_limits(&mut self, world: Option<BoundsRect>) {
        self.world_limits = world;
        if world.is_none() {
            self.view_limits = None;
            return;
        }
        self.recalc_limits();
    }

    /// World limits, if set.
    pub fn world_limits(&self) -> Option<BoundsRect> {
        self.world_limits
    }

    /// Derived view limits, if world limits are set.
    pub fn view_limits(&self) -> Option<BoundsRect> {
        self.view_limits
    }

    /// Sets the requested pan position; the applied position is clamped into
    /// the view limits.
    pub fn set_target_pos(&mut self, x: f64, y: f64) {
        self.target = Point::new(x, y);
        let (mut x, mut y) = (x, y);
        if let Some(l) = &self.view_limits {
            x = x.max(l.left()).min(l.right());
            y = y.max(l.top()).min(l.bottom());
        }
        self.applied = Point::new(x, y);
    }

    /// The requested pan position.
    pub fn target_pos(&self) -> Point {
        self.target
    }

    /// The pan position in effect, after clamping.
    pub fn view_pos(&self) -> Point {
        self.applied
    }

    /// Sets the view scale and recomputes the limits.
    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scale = if sx == 1.0 && sy == 1.0 {
            None
        } else {
            Some(Vec2::new(sx, sy))
        };
        self.recalc_limits();
    }

    /// View scale.
    pub fn scale(&self) -> Vec2 {
        self.scale.unwrap_or(Vec2::new(1.0, 1.0))
    }

    /// Whether the view changes coordinates at all.
    pub fn is_identity(&self) -> bool {
        self.applied == Point::ORIGIN && self.scale.is_none()
    }

    /// Appends the view transform to `t`.
    pub fn apply(&self, t: &mut Transform) {
        if self.applied != Point::ORIGIN {
            t.translate(-self.applied.x, -self.applied.y);
        }
        if let Some(s) = self.scale {
            t.scale(s.x, s.y);
        }
    }

    fn recalc_limits(&mut self) {
        let Some(world) = self.world_limits else {
            return;
        };
        let scale = self.scale();
        let mut left = world.left();
        let mut top = world.top();
        let mut right = world.right() * scale.x - self.size.width;
        let mut bottom = world.bottom() * scale.y - self.size.height;
        if right < left {
            left = round_half_up((right + left) * 0.5);
            right = left;
        }
        if bottom < top {
            top = round_half_up((top + bottom) * 0.5);
            bottom = top;
        }
        self.view_limits = Some(BoundsRect::from_bounds(left, top, right, bottom));
        let target = self.target;
        self.set_target_pos(target.x, target.y);
    }
}
