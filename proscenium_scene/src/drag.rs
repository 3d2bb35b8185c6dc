// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node drag behavior.

use core::fmt::Debug;

use kurbo::{Point, Vec2};

use crate::{NodeId, Scene};

/// Hooks run while a node is dragged.
///
/// The defaults move the node so that it keeps its offset from the pointer,
/// honoring the node's drag constraint and drag bounds.
pub trait DragHandler: Debug {
    /// Called on press. Returns the offset kept between pointer and node.
    fn drag_start(&self, scene: &Scene, node: NodeId, pointer: Point) -> Vec2 {
        let position = scene.get(node).map_or(Point::ORIGIN, |n| n.position());
        pointer - position
    }

    /// Called on every pointer move while dragging.
    fn drag_update(&self, scene: &mut Scene, node: NodeId, pointer: Point, offset: Vec2) {
        default_drag_update(scene, node, pointer, offset);
    }

    /// Called when the drag ends, whether or not it moved.
    fn drag_stop(&self, scene: &mut Scene, node: NodeId) {
        let _ = (scene, node);
    }
}

fn default_drag_update(scene: &mut Scene, node: NodeId, pointer: Point, offset: Vec2) {
    let Some(n) = scene.get(node) else {
        return;
    };
    let next = n
        .drag_bounds()
        .apply(n.position(), pointer - offset, n.drag_constraint());
    scene.set_position(node, next.x, next.y);
}

/// The built-in behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDrag;

impl DragHandler for DefaultDrag {}

impl Scene {
    /// Starts dragging `node`; returns the pointer offset to keep.
    pub fn drag_start(&self, node: NodeId, pointer: Point) -> Vec2 {
        match self.get(node).and_then(|n| n.drag_handler.clone()) {
            Some(handler) => handler.drag_start(self, node, pointer),
            None => DefaultDrag.drag_start(self, node, pointer),
        }
    }

    /// Moves a dragged node for a new pointer position.
    pub fn drag_update(&mut self, node: NodeId, pointer: Point, offset: Vec2) {
        match self.get(node).and_then(|n| n.drag_handler.clone()) {
            Some(handler) => handler.drag_update(self, node, pointer, offset),
            None => DefaultDrag.drag_update(self, node, pointer, offset),
        }
    }

    /// Ends dragging `node`.
    pub fn drag_stop(&mut self, node: NodeId) {
        if let Some(handler) = self.get(node).and_then(|n| n.drag_handler.clone()) {
            handler.drag_stop(self, node);
        }
    }
}
