// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw pointer input as delivered by the host.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Kind of raw pointer input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse button was pressed.
    MouseDown,
    /// The mouse moved.
    MouseMove,
    /// A mouse button was released.
    MouseUp,
    /// The mouse entered the stage container.
    MouseOver,
    /// The mouse left the stage container.
    MouseOut,
    /// A touch began.
    TouchStart,
    /// A touch moved.
    TouchMove,
    /// A touch ended.
    TouchEnd,
}

impl PointerKind {
    /// Whether this is a touch input.
    pub fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchMove | Self::TouchEnd)
    }
}

/// One pointer input in host client coordinates.
///
/// The stage turns client coordinates into stage coordinates by subtracting
/// its container offset and adding `page_offset` (the host's scroll
/// position). Touch inputs only update the touch position when exactly one
/// touch is present.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerInput {
    /// What happened.
    pub kind: PointerKind,
    /// Mouse position in client coordinates.
    pub client: Point,
    /// Active touches in client coordinates.
    pub touches: SmallVec<[Point; 2]>,
    /// Scroll offset of the host page.
    pub page_offset: Vec2,
    /// Timestamp, used for double click windows.
    pub time_ms: u64,
}

impl PointerInput {
    /// A mouse input at `client`.
    pub fn mouse(kind: PointerKind, client: Point) -> Self {
        Self {
            kind,
            client,
            touches: SmallVec::new(),
            page_offset: Vec2::ZERO,
            time_ms: 0,
        }
    }

    /// A touch input with the given active touches.
    pub fn touch(kind: PointerKind, touches: impl IntoIterator<Item = Point>) -> Self {
        Self {
            kind,
            client: Point::ORIGIN,
            touches: touches.into_iter().collect(),
            page_offset: Vec2::ZERO,
            time_ms: 0,
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn at(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    /// Sets the page scroll offset.
    #[must_use]
    pub fn with_page_offset(mut self, offset: Vec2) -> Self {
        self.page_offset = offset;
        self
    }

    /// The mouse position in stage coordinates.
    pub fn mouse_position(&self, container_offset: Vec2) -> Point {
        self.client - container_offset + self.page_offset
    }

    /// The touch position in stage coordinates, when exactly one touch is
    /// active.
    pub fn touch_position(&self, container_offset: Vec2) -> Option<Point> {
        match self.touches.as_slice() {
            [touch] => Some(*touch - container_offset + self.page_offset),
            _ => None,
        }
    }
}
