// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene arena.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use kurbo::{Affine, Point, Size};
use peniko::{BlendMode, Brush};
use proscenium_event_state::drag::{DragBounds, DragConstraint};
use proscenium_geom::{BoundsRect, Transform};
use proscenium_render::{Canvas, Surface};
use smallvec::SmallVec;

use crate::container::{Container, DrawOrder};
use crate::drag::DragHandler;
use crate::layer::Layer;
use crate::node::{NodeFlags, ParentLink};
use crate::shapes::{DrawContext, Drawable, ShapeStyle};
use crate::view::ViewState;
use crate::{DrawError, IdSource, Node, NodeId, NodeKind, SceneError};

type Chain = SmallVec<[NodeId; 8]>;

/// Outcome of drawing one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawReport {
    /// Shapes drawn successfully.
    pub drawn: usize,
    /// Shapes whose draw failed and were skipped.
    pub failed: usize,
}

/// All nodes of one stage, plus the stage's layer list and view.
///
/// Nodes live in a generational arena addressed by [`NodeId`]. Containers
/// hold their children's ids; children hold a non-owning [`ParentLink`].
/// Removing a node destroys its whole subtree and invalidates every handle
/// into it.
#[derive(Debug)]
pub struct Scene {
    slots: Vec<Option<Node>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    root: Container,
    view: ViewState,
    ids: IdSource,
    pub(crate) next_handler: u64,
    bounds_computations: Cell<u64>,
    wake: bool,
}

impl Scene {
    /// An empty scene with a view of the given size.
    pub fn new(size: Size) -> Self {
        Self::with_ids(IdSource::new(), size)
    }

    /// An empty scene drawing serials from a shared counter.
    pub fn with_ids(ids: IdSource, size: Size) -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            root: Container::default(),
            view: ViewState::new(size),
            ids,
            next_handler: 0,
            bounds_computations: Cell::new(0),
            wake: false,
        }
    }

    /// The serial counter.
    pub fn ids(&self) -> &IdSource {
        &self.ids
    }

    // --- arena ---

    /// Moves a node into the arena. It starts detached.
    pub fn create(&mut self, mut node: Node) -> NodeId {
        node.parent = ParentLink::Detached;
        node.index = 0;
        if let Some(idx) = self.free.pop() {
            let i = idx as usize;
            self.slots[i] = Some(node);
            NodeId::new(idx, self.generations[i])
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(node));
            self.generations.push(0);
            NodeId::new(idx, 0)
        }
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.generations.get(id.idx()) == Some(&id.generation())
            && self.slots.get(id.idx()).is_some_and(Option::is_some)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The node, if alive.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.generations.get(id.idx()) != Some(&id.generation()) {
            return None;
        }
        self.slots.get(id.idx())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.generations.get(id.idx()) != Some(&id.generation()) {
            return None;
        }
        self.slots.get_mut(id.idx())?.as_mut()
    }

    /// The node, or [`SceneError::StaleNode`].
    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::StaleNode(id))
    }

    pub(crate) fn layer_mut(&mut self, id: NodeId) -> Option<&mut Layer> {
        self.get_mut(id)?.as_layer_mut()
    }

    fn container_at(&self, link: ParentLink) -> Option<&Container> {
        match link {
            ParentLink::Detached => None,
            ParentLink::Stage => Some(&self.root),
            ParentLink::Node(p) => self.get(p)?.container(),
        }
    }

    fn container_at_mut(&mut self, link: ParentLink) -> Option<&mut Container> {
        match link {
            ParentLink::Detached => None,
            ParentLink::Stage => Some(&mut self.root),
            ParentLink::Node(p) => self.get_mut(p)?.container_mut(),
        }
    }

    fn renumber(&mut self, link: ParentLink, from: usize) {
        let Some(children) = self.container_at(link).map(|c| c.children.clone()) else {
            return;
        };
        for (i, child) in children.into_iter().enumerate().skip(from) {
            if let Some(n) = self.get_mut(child) {
                n.index = i;
            }
        }
    }

    /// Ancestors of `id` including itself, leaf first, and whether the chain
    /// reaches the stage.
    fn chain(&self, id: NodeId) -> (Chain, bool) {
        let mut out = Chain::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(n) = self.get(c) else {
                return (out, false);
            };
            out.push(c);
            match n.parent {
                ParentLink::Node(p) => cur = Some(p),
                ParentLink::Stage => return (out, true),
                ParentLink::Detached => cur = None,
            }
        }
        (out, false)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.chain(node).0.contains(&ancestor)
    }

    // --- structure ---

    /// Appends `child` to the group or layer `parent`, on top of its siblings.
    ///
    /// The child gets a serial from the shared counter the first time it is
    /// added anywhere.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let c = self.node(child)?;
        if c.parent != ParentLink::Detached {
            return Err(SceneError::AlreadyAttached(child));
        }
        self.check_insert(parent, child)?;
        self.attach(ParentLink::Node(parent), child);
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if self.node(child)?.is_layer() {
            return Err(SceneError::LayerOutsideStage(child));
        }
        if self.node(parent)?.container().is_none() {
            return Err(SceneError::NotAContainer(parent));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::Cycle(child));
        }
        Ok(())
    }

    fn attach(&mut self, link: ParentLink, child: NodeId) {
        let Some(container) = self.container_at(link) else {
            return;
        };
        let index = container.len();
        let ids = self.ids.clone();
        let Some(n) = self.get_mut(child) else {
            return;
        };
        if n.serial.is_none() {
            n.serial = Some(ids.next_id());
        }
        n.index = index;
        n.parent = link;
        let name = n.name.clone();
        if let Some(container) = self.container_at_mut(link) {
            container.children.push(child);
            container.register_name(name.as_deref(), child);
        }
        self.invalidate_ancestors(child);
        self.mark_for_redraw(child);
    }

    /// Puts a layer on the stage, on top of the others. The layer is sized
    /// to the view and marked for redraw.
    pub fn add_layer(&mut self, layer: NodeId) -> Result<(), SceneError> {
        let n = self.node(layer)?;
        if !n.is_layer() {
            return Err(SceneError::NotALayer(layer));
        }
        if n.parent != ParentLink::Detached {
            return Err(SceneError::AlreadyAttached(layer));
        }
        let size = self.view.size();
        if let Some(l) = self.layer_mut(layer) {
            l.resize(size);
        }
        self.invalidate_bounds(layer);
        self.attach(ParentLink::Stage, layer);
        Ok(())
    }

    /// Takes `id` out of its container without destroying it. Its serial is
    /// kept; listeners and state stay intact.
    pub fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        let link = self.node(id)?.parent;
        if link == ParentLink::Detached {
            return Ok(());
        }
        // Redraw the layer the node is leaving before the link is cut.
        self.mark_for_redraw(id);
        self.invalidate_ancestors(id);
        let (index, name) = {
            let n = self.node(id)?;
            (n.index, n.name.clone())
        };
        if let Some(container) = self.container_at_mut(link) {
            if container.children.get(index) == Some(&id) {
                container.children.remove(index);
            } else {
                container.children.retain(|c| *c != id);
            }
            container.unregister_name(name.as_deref(), id);
        }
        self.renumber(link, index);
        let n = self.node_mut(id)?;
        n.parent = ParentLink::Detached;
        n.index = 0;
        Ok(())
    }

    /// Removes `id` from its container and destroys it with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.detach(id)?;
        let mut stack = alloc::vec![id];
        let mut destroyed = 0_usize;
        while let Some(cur) = stack.pop() {
            if let Some(c) = self.get(cur).and_then(Node::container) {
                stack.extend_from_slice(&c.children);
            }
            let i = cur.idx();
            self.slots[i] = None;
            self.generations[i] = self.generations[i].wrapping_add(1);
            self.free.push(i as u32);
            destroyed += 1;
        }
        tracing::debug!(?id, destroyed, "removed subtree");
        Ok(())
    }

    /// Removes and destroys every child of a group or layer.
    pub fn remove_children(&mut self, container: NodeId) -> Result<(), SceneError> {
        let children = self
            .node(container)?
            .container()
            .ok_or(SceneError::NotAContainer(container))?
            .children
            .clone();
        for child in children.into_iter().rev() {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Moves `id` into another group or layer, keeping its serial.
    pub fn move_to(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        self.check_insert(new_parent, id)?;
        self.detach(id)?;
        self.attach(ParentLink::Node(new_parent), id);
        Ok(())
    }

    fn reorder(&mut self, id: NodeId, to: impl FnOnce(usize, usize) -> usize) {
        let Some(n) = self.get(id) else {
            return;
        };
        let (link, from) = (n.parent, n.index);
        let Some(container) = self.container_at_mut(link) else {
            return;
        };
        let len = container.children.len();
        let target = to(from, len).min(len.saturating_sub(1));
        if target == from || container.children.get(from) != Some(&id) {
            return;
        }
        container.children.remove(from);
        container.children.insert(target, id);
        self.renumber(link, from.min(target));
        self.mark_for_redraw(id);
    }

    /// Swaps with the sibling above.
    pub fn move_up(&mut self, id: NodeId) {
        self.reorder(id, |i, _| i + 1);
    }

    /// Swaps with the sibling below.
    pub fn move_down(&mut self, id: NodeId) {
        self.reorder(id, |i, _| i.saturating_sub(1));
    }

    /// Moves above every sibling.
    pub fn move_to_top(&mut self, id: NodeId) {
        self.reorder(id, |_, len| len.saturating_sub(1));
    }

    /// Moves below every sibling.
    pub fn move_to_bottom(&mut self, id: NodeId) {
        self.reorder(id, |_, _| 0);
    }

    /// Moves to sibling position `index`, clamped to the last position.
    pub fn set_z_index(&mut self, id: NodeId, index: usize) {
        self.reorder(id, |_, _| index);
    }

    // --- lookup ---

    /// Children of a group or layer; empty for shapes and stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .and_then(Node::container)
            .map_or(&[], Container::children)
    }

    /// Layers on the stage, bottom first.
    pub fn layers(&self) -> &[NodeId] {
        self.root.children()
    }

    /// Child of `container` registered under `name`.
    pub fn child_by_name(&self, container: NodeId, name: &str) -> Option<NodeId> {
        self.get(container)?.container()?.child_by_name(name)
    }

    /// Layer registered under `name`.
    pub fn layer_by_name(&self, name: &str) -> Option<NodeId> {
        self.root.child_by_name(name)
    }

    /// Renames a node, keeping its container's name index in sync.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) -> Result<(), SceneError> {
        let n = self.node_mut(id)?;
        let old = core::mem::replace(&mut n.name, name.clone());
        let link = n.parent;
        if let Some(container) = self.container_at_mut(link) {
            container.unregister_name(old.as_deref(), id);
            container.register_name(name.as_deref(), id);
        }
        Ok(())
    }

    /// Sets or clears the comparator used to order a container's draw pass.
    pub fn set_draw_order(
        &mut self,
        container: NodeId,
        order: Option<DrawOrder>,
    ) -> Result<(), SceneError> {
        let c = self
            .node_mut(container)?
            .container_mut()
            .ok_or(SceneError::NotAContainer(container))?;
        c.draw_order = order;
        self.mark_for_redraw(container);
        Ok(())
    }

    // --- transforms and bounds ---

    /// Local transform of `id`, position included.
    pub fn transform_local(&self, id: NodeId) -> Result<Transform, SceneError> {
        Ok(self.node(id)?.transform_local())
    }

    /// Appends the full view transform of `id` to `t`: the stage view (when
    /// attached), then every ancestor's local transform from the root down.
    pub fn apply_transform(&self, id: NodeId, t: &mut Transform) -> Result<(), SceneError> {
        self.node(id)?;
        let (chain, attached) = self.chain(id);
        if attached {
            self.view.apply(t);
        }
        for &n in chain.iter().rev() {
            if let Some(node) = self.get(n) {
                node.apply_local(t, true);
            }
        }
        Ok(())
    }

    /// Transform from the local space of `id` to surface space.
    pub fn transform_view(&self, id: NodeId) -> Result<Transform, SceneError> {
        let mut t = Transform::IDENTITY;
        self.apply_transform(id, &mut t)?;
        Ok(t)
    }

    /// Bounds of `id` in its parent's space.
    ///
    /// The part that does not depend on position is cached until the next
    /// geometry change; position is added on every call.
    pub fn bounds_local(&self, id: NodeId) -> Result<BoundsRect, SceneError> {
        let n = self.node(id)?;
        let cached = match n.bounds_cache.get() {
            Some(b) => b,
            None => {
                self.bounds_computations
                    .set(self.bounds_computations.get() + 1);
                let mut t = Transform::IDENTITY;
                n.apply_local(&mut t, false);
                let b = self.bounds_untransformed(id)?.transformed(&t);
                n.bounds_cache.set(Some(b));
                b
            }
        };
        Ok(cached.translated(n.position.x, n.position.y))
    }

    /// Bounds of `id` in its own space.
    pub fn bounds_untransformed(&self, id: NodeId) -> Result<BoundsRect, SceneError> {
        let n = self.node(id)?;
        Ok(match &n.kind {
            NodeKind::Shape(shape) => shape.drawable.bounds(),
            NodeKind::Layer(layer) => BoundsRect::new(0.0, 0.0, layer.size.width, layer.size.height),
            NodeKind::Group(c) => {
                let mut out: Option<BoundsRect> = None;
                for &child in &c.children {
                    if !self.get(child).is_some_and(Node::is_visible) {
                        continue;
                    }
                    let b = self.bounds_local(child)?;
                    match &mut out {
                        Some(acc) => {
                            acc.enclose_rect(&b);
                        }
                        None => out = Some(b),
                    }
                }
                out.unwrap_or(BoundsRect::ZERO)
            }
        })
    }

    /// How many times the position-free bounds have been recomputed.
    pub fn bounds_computations(&self) -> u64 {
        self.bounds_computations.get()
    }

    /// Drops the cached bounds of `id` and of every group above it up to
    /// the first layer.
    pub fn invalidate_bounds(&mut self, id: NodeId) {
        if let Some(n) = self.get(id) {
            n.bounds_cache.set(None);
        }
        self.invalidate_ancestors(id);
    }

    fn invalidate_ancestors(&self, id: NodeId) {
        let mut link = self.get(id).map_or(ParentLink::Detached, |n| n.parent);
        while let ParentLink::Node(p) = link {
            let Some(n) = self.get(p) else {
                return;
            };
            if n.is_layer() {
                return;
            }
            n.bounds_cache.set(None);
            link = n.parent;
        }
    }

    // --- setters ---

    fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> bool {
        match self.get_mut(id) {
            Some(n) => {
                f(n);
                true
            }
            None => false,
        }
    }

    fn moved(&mut self, id: NodeId) {
        self.invalidate_ancestors(id);
        self.mark_for_redraw(id);
    }

    fn reshaped(&mut self, id: NodeId) {
        self.invalidate_bounds(id);
        self.mark_for_redraw(id);
    }

    /// Sets the position.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        if self.edit(id, |n| n.position = Point::new(x, y)) {
            self.moved(id);
        }
    }

    /// Moves by an offset.
    pub fn move_by(&mut self, id: NodeId, dx: f64, dy: f64) {
        if self.edit(id, |n| n.position += kurbo::Vec2::new(dx, dy)) {
            self.moved(id);
        }
    }

    /// Sets x.
    pub fn set_x(&mut self, id: NodeId, x: f64) {
        if self.edit(id, |n| n.position.x = x) {
            self.moved(id);
        }
    }

    /// Sets y.
    pub fn set_y(&mut self, id: NodeId, y: f64) {
        if self.edit(id, |n| n.position.y = y) {
            self.moved(id);
        }
    }

    /// Sets the scale.
    pub fn set_scale(&mut self, id: NodeId, sx: f64, sy: f64) {
        if self.edit(id, |n| n.scale = kurbo::Vec2::new(sx, sy)) {
            self.reshaped(id);
        }
    }

    /// Sets the rotation in radians.
    pub fn set_rotation(&mut self, id: NodeId, radians: f64) {
        if self.edit(id, |n| n.rotation = radians) {
            self.reshaped(id);
        }
    }

    /// Sets the rotation in degrees.
    pub fn set_rotation_deg(&mut self, id: NodeId, degrees: f64) {
        self.set_rotation(id, degrees.to_radians());
    }

    /// Adds to the rotation, in radians.
    pub fn rotate(&mut self, id: NodeId, radians: f64) {
        if self.edit(id, |n| n.rotation += radians) {
            self.reshaped(id);
        }
    }

    /// Adds to the rotation, in degrees.
    pub fn rotate_deg(&mut self, id: NodeId, degrees: f64) {
        self.rotate(id, degrees.to_radians());
    }

    /// Sets the pivot.
    pub fn set_center_offset(&mut self, id: NodeId, x: f64, y: f64) {
        if self.edit(id, |n| n.center_offset = kurbo::Vec2::new(x, y)) {
            self.reshaped(id);
        }
    }

    /// Sets the opacity.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) {
        if self.edit(id, |n| n.alpha = alpha) {
            self.mark_for_redraw(id);
        }
    }

    /// Shows or hides the node.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if self.edit(id, |n| n.flags.set(NodeFlags::VISIBLE, visible)) {
            self.moved(id);
        }
    }

    /// Enables or disables hit testing.
    pub fn set_listening(&mut self, id: NodeId, listening: bool) {
        self.edit(id, |n| n.flags.set(NodeFlags::LISTENING, listening));
    }

    /// Enables or disables dragging.
    pub fn set_draggable(&mut self, id: NodeId, draggable: bool) {
        self.edit(id, |n| n.flags.set(NodeFlags::DRAGGABLE, draggable));
    }

    /// Sets the drag axis restriction.
    pub fn set_drag_constraint(&mut self, id: NodeId, constraint: DragConstraint) {
        self.edit(id, |n| n.drag_constraint = constraint);
    }

    /// Sets the drag limits.
    pub fn set_drag_bounds(&mut self, id: NodeId, bounds: DragBounds) {
        self.edit(id, |n| n.drag_bounds = bounds);
    }

    /// Replaces (or, with `None`, resets) the drag behavior.
    pub fn set_drag_handler(&mut self, id: NodeId, handler: Option<Rc<dyn DragHandler>>) {
        self.edit(id, |n| n.drag_handler = handler);
    }

    fn edit_shape(&mut self, id: NodeId, f: impl FnOnce(&mut crate::Shape)) {
        let changed = self.edit(id, |n| {
            if let NodeKind::Shape(shape) = &mut n.kind {
                f(shape);
            }
        });
        if changed {
            self.mark_for_redraw(id);
        }
    }

    /// Replaces the paint style of a shape.
    pub fn set_style(&mut self, id: NodeId, style: ShapeStyle) {
        self.edit_shape(id, |s| s.style = style.normalized());
    }

    /// Sets the fill of a shape.
    pub fn set_fill(&mut self, id: NodeId, fill: Option<Brush>) {
        self.edit_shape(id, |s| s.style.fill = fill);
    }

    /// Sets the stroke paint of a shape.
    pub fn set_stroke(&mut self, id: NodeId, stroke: Option<Brush>) {
        self.edit_shape(id, |s| s.style.stroke = stroke);
    }

    /// Sets the stroke width of a shape.
    pub fn set_stroke_width(&mut self, id: NodeId, width: f64) {
        self.edit_shape(id, |s| s.style.stroke_width = Some(width));
    }

    /// Sets the composite mode of a shape.
    pub fn set_blend_mode(&mut self, id: NodeId, mode: Option<BlendMode>) {
        self.edit_shape(id, |s| s.blend = mode);
    }

    /// Mutates the drawable of a shape node and invalidates its bounds.
    pub fn update_shape<T: Drawable, R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, SceneError> {
        let n = self.node_mut(id)?;
        let NodeKind::Shape(shape) = &mut n.kind else {
            return Err(SceneError::ShapeTypeMismatch(id));
        };
        let drawable = shape
            .downcast_mut::<T>()
            .ok_or(SceneError::ShapeTypeMismatch(id))?;
        let out = f(drawable);
        self.reshaped(id);
        Ok(out)
    }

    /// The drawable of a shape node, if it has type `T`.
    pub fn shape<T: Drawable>(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.as_shape()?.downcast_ref::<T>()
    }

    // --- attachment queries ---

    /// Sum of the positions from `id` up to its layer.
    pub fn absolute_position(&self, id: NodeId) -> Result<Point, SceneError> {
        self.node(id)?;
        let (chain, attached) = self.chain(id);
        if !attached {
            return Err(SceneError::Detached(id));
        }
        let mut p = Point::ORIGIN;
        for n in chain.iter().filter_map(|&c| self.get(c)) {
            p += n.position.to_vec2();
        }
        Ok(p)
    }

    /// Product of the opacities from `id` up to its layer.
    pub fn absolute_alpha(&self, id: NodeId) -> Result<f64, SceneError> {
        self.node(id)?;
        let (chain, attached) = self.chain(id);
        if !attached {
            return Err(SceneError::Detached(id));
        }
        Ok(self.chain_alpha(&chain))
    }

    fn chain_alpha(&self, chain: &[NodeId]) -> f64 {
        chain
            .iter()
            .filter_map(|&c| self.get(c))
            .map(|n| n.alpha)
            .product()
    }

    /// The layer containing `id`; a layer is its own layer.
    pub fn layer_of(&self, id: NodeId) -> Option<NodeId> {
        self.chain(id)
            .0
            .into_iter()
            .find(|&c| self.get(c).is_some_and(Node::is_layer))
    }

    /// Whether the ancestor chain of `id` reaches the stage.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.chain(id).1
    }

    /// Parent link of `id`.
    pub fn parent(&self, id: NodeId) -> Option<ParentLink> {
        self.get(id).map(|n| n.parent)
    }

    // --- redraw bookkeeping ---

    /// Flags the layer containing `id` for redraw and raises the wake
    /// request if the flag was not already set.
    pub fn mark_for_redraw(&mut self, id: NodeId) {
        let Some(layer) = self.layer_of(id) else {
            return;
        };
        if let Some(l) = self.layer_mut(layer)
            && !l.needs_redraw
        {
            l.needs_redraw = true;
            self.wake = true;
        }
    }

    /// Flags every layer for redraw.
    pub fn mark_layers_for_redraw(&mut self) {
        for layer in self.root.children.clone() {
            self.mark_for_redraw(layer);
        }
    }

    /// Whether the layer `layer` has a pending redraw.
    pub fn needs_redraw(&self, layer: NodeId) -> bool {
        self.get(layer)
            .and_then(Node::as_layer)
            .is_some_and(Layer::needs_redraw)
    }

    /// Whether any layer has a pending redraw.
    pub fn any_needs_redraw(&self) -> bool {
        self.layers().iter().any(|&l| self.needs_redraw(l))
    }

    /// Raises the wake request.
    pub fn request_wake(&mut self) {
        self.wake = true;
    }

    /// Returns and clears the wake request.
    pub fn take_wake_request(&mut self) -> bool {
        core::mem::take(&mut self.wake)
    }

    /// The view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Mutable view state. Callers are responsible for marking layers.
    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Resizes the view and every layer.
    pub fn resize(&mut self, size: Size) {
        self.view.set_size(size);
        for layer in self.root.children.clone() {
            if let Some(l) = self.layer_mut(layer) {
                l.resize(size);
            }
            self.invalidate_bounds(layer);
        }
        self.mark_layers_for_redraw();
    }

    // --- drawing ---

    /// Children of `container` to draw (and hit-test), bottom first.
    ///
    /// A draw-order comparator sorts a copy of the child list. Culling
    /// layers keep only children whose local bounds overlap the surface
    /// rectangle mapped into the layer's space; if the layer's transform
    /// cannot be inverted nothing is drawn.
    pub fn draw_list(&self, container: NodeId) -> Vec<NodeId> {
        let Some(n) = self.get(container) else {
            return Vec::new();
        };
        let Some(c) = n.container() else {
            return Vec::new();
        };
        let mut list = c.children.clone();
        if let Some(order) = &c.draw_order {
            list.sort_by(|a, b| match (self.get(*a), self.get(*b)) {
                (Some(a), Some(b)) => order(a, b),
                _ => core::cmp::Ordering::Equal,
            });
        }
        let Some(layer) = n.as_layer().filter(|l| l.culling) else {
            return list;
        };
        let Ok(view) = self.transform_view(container) else {
            return Vec::new();
        };
        let Some(inverse) = view.try_invert() else {
            tracing::warn!(?container, "layer transform is singular, culling everything");
            return Vec::new();
        };
        let visible = BoundsRect::new(0.0, 0.0, layer.size.width, layer.size.height)
            .transformed(&inverse);
        list.retain(|&child| {
            self.bounds_local(child)
                .is_ok_and(|b| b.overlaps(&visible))
        });
        list
    }

    /// Clears and redraws a layer, then clears its redraw flag.
    ///
    /// Shapes that fail to draw are skipped and counted.
    pub fn draw_layer(&mut self, layer: NodeId) -> Result<DrawReport, SceneError> {
        let visible = self.node(layer)?.is_visible();
        let l = self.layer_mut(layer).ok_or(SceneError::NotALayer(layer))?;
        l.needs_redraw = false;
        let Some(mut surface) = l.surface.take() else {
            tracing::warn!(?layer, "layer surface is already in use");
            return Ok(DrawReport::default());
        };
        surface.clear();
        let mut report = DrawReport::default();
        if visible {
            self.draw_children(layer, surface.as_mut(), &mut report);
        }
        if let Some(l) = self.layer_mut(layer) {
            l.surface = Some(surface);
        }
        tracing::trace!(?layer, drawn = report.drawn, failed = report.failed, "layer drawn");
        Ok(report)
    }

    fn draw_children(&self, container: NodeId, surface: &mut dyn Surface, report: &mut DrawReport) {
        for child in self.draw_list(container) {
            let Some(n) = self.get(child) else {
                continue;
            };
            if !n.is_visible() {
                continue;
            }
            if n.is_shape() {
                match self.draw_shape(child, surface, false) {
                    Ok(()) => report.drawn += 1,
                    Err(err) => {
                        tracing::warn!(node = ?child, %err, "shape draw failed");
                        report.failed += 1;
                    }
                }
            } else {
                self.draw_children(child, surface, report);
            }
        }
    }

    /// Draws one shape under its view transform, composite mode and
    /// accumulated opacity. Non-shapes draw nothing.
    pub fn draw_shape(
        &self,
        id: NodeId,
        surface: &mut dyn Surface,
        hit_test: bool,
    ) -> Result<(), DrawError> {
        let Some(shape) = self.get(id).and_then(Node::as_shape) else {
            return Ok(());
        };
        let Ok(view) = self.transform_view(id) else {
            return Ok(());
        };
        let viewport = surface.size();
        let canvas: &mut dyn Canvas = surface;
        canvas.save();
        canvas.set_transform(Affine::from(view));
        if let Some(mode) = shape.blend {
            canvas.set_blend_mode(mode);
        }
        canvas.set_global_alpha(self.chain_alpha(&self.chain(id).0));
        let mut cx = DrawContext {
            canvas: &mut *canvas,
            style: &shape.style,
            hit_test,
            viewport,
        };
        let result = shape.drawable.draw(&mut cx);
        canvas.restore();
        result
    }

    /// Whether `pos` lies inside the path of shape `id`, using `scratch`
    /// as the hit surface.
    pub fn hit_test_shape(&self, id: NodeId, scratch: &mut dyn Surface, pos: Point) -> bool {
        scratch.clear();
        match self.draw_shape(id, scratch, true) {
            Ok(()) => scratch.is_point_in_path(pos),
            Err(err) => {
                tracing::debug!(node = ?id, %err, "hit test draw failed");
                false
            }
        }
    }

    /// Clears a layer's surface without redrawing.
    pub fn clear_layer(&mut self, layer: NodeId) {
        if let Some(surface) = self.layer_mut(layer).and_then(|l| l.surface.as_mut()) {
            surface.clear();
        }
    }

    /// A layer's surface.
    pub fn layer_surface(&self, layer: NodeId) -> Option<&dyn Surface> {
        self.get(layer)?.as_layer()?.surface()
    }

    /// A layer's surface as its concrete type.
    pub fn layer_surface_as<T: Surface>(&self, layer: NodeId) -> Option<&T> {
        let surface: &dyn core::any::Any = self.layer_surface(layer)?;
        surface.downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, RectShape};
    use proscenium_render::{CanvasOp, RecordingCanvas};

    fn stage() -> (Scene, NodeId) {
        let mut scene = Scene::new(Size::new(400.0, 300.0));
        let layer = scene.create(Node::layer());
        scene.add_layer(layer).unwrap();
        (scene, layer)
    }

    fn assert_indices(scene: &Scene, parent: NodeId) {
        for (i, &c) in scene.children(parent).iter().enumerate() {
            assert_eq!(scene.get(c).unwrap().z_index(), i);
        }
    }

    #[test]
    fn circle_bounds_in_layer() {
        let (mut scene, layer) = stage();
        let c = scene.create(Node::shape(Circle::new(20.0)).with_position(100.0, 100.0));
        scene.add(layer, c).unwrap();
        assert_eq!(
            scene.bounds_local(c).unwrap(),
            BoundsRect::new(80.0, 80.0, 40.0, 40.0)
        );
    }

    #[test]
    fn structural_errors() {
        let (mut scene, layer) = stage();
        let shape = scene.create(Node::shape(Circle::new(1.0)));
        let group = scene.create(Node::group());
        let other_layer = scene.create(Node::layer());
        assert_eq!(scene.add(shape, group), Err(SceneError::NotAContainer(shape)));
        assert_eq!(
            scene.add(layer, other_layer),
            Err(SceneError::LayerOutsideStage(other_layer))
        );
        assert_eq!(scene.add_layer(group), Err(SceneError::NotALayer(group)));
        scene.add(layer, group).unwrap();
        assert_eq!(scene.add(layer, group), Err(SceneError::AlreadyAttached(group)));
        assert_eq!(scene.add(group, group), Err(SceneError::AlreadyAttached(group)));
        let inner = scene.create(Node::group());
        scene.add(group, inner).unwrap();
        assert_eq!(scene.move_to(group, inner), Err(SceneError::Cycle(group)));
    }

    #[test]
    fn serials_increase_and_survive_moves() {
        let (mut scene, layer) = stage();
        let a = scene.create(Node::group());
        let b = scene.create(Node::group());
        scene.add(layer, a).unwrap();
        scene.add(layer, b).unwrap();
        let sa = scene.get(a).unwrap().serial().unwrap();
        let sb = scene.get(b).unwrap().serial().unwrap();
        assert!(sb > sa);
        scene.move_to(b, a).unwrap();
        assert_eq!(scene.get(b).unwrap().serial(), Some(sb));
        assert_eq!(scene.parent(b), Some(ParentLink::Node(a)));
    }

    #[test]
    fn sibling_indices_stay_contiguous() {
        let (mut scene, layer) = stage();
        let ids: Vec<_> = (0..5)
            .map(|i| {
                let n = scene.create(Node::group().with_name(alloc::format!("n{i}")));
                scene.add(layer, n).unwrap();
                n
            })
            .collect();
        scene.move_up(ids[0]);
        assert_indices(&scene, layer);
        scene.move_to_top(ids[1]);
        assert_indices(&scene, layer);
        scene.move_down(ids[4]);
        assert_indices(&scene, layer);
        scene.move_to_bottom(ids[3]);
        assert_indices(&scene, layer);
        scene.set_z_index(ids[2], 99);
        assert_indices(&scene, layer);
        scene.remove(ids[0]).unwrap();
        assert_indices(&scene, layer);
        assert_eq!(scene.children(layer).len(), 4);
        assert_eq!(scene.children(layer).last(), Some(&ids[2]));
        assert_eq!(scene.child_by_name(layer, "n0"), None);
        assert_eq!(scene.child_by_name(layer, "n1"), Some(ids[1]));
    }

    #[test]
    fn remove_destroys_subtree() {
        let (mut scene, layer) = stage();
        let g = scene.create(Node::group());
        let c = scene.create(Node::shape(Circle::new(1.0)));
        scene.add(layer, g).unwrap();
        scene.add(g, c).unwrap();
        let before = scene.node_count();
        scene.remove(g).unwrap();
        assert!(!scene.is_alive(g) && !scene.is_alive(c));
        assert_eq!(scene.node_count(), before - 2);
        let reused = scene.create(Node::group());
        assert_ne!(reused, g);
        assert_ne!(reused, c);
        assert_eq!(scene.node(c).err(), Some(SceneError::StaleNode(c)));
    }

    #[test]
    fn rename_updates_index() {
        let (mut scene, layer) = stage();
        let n = scene.create(Node::group().with_name("a"));
        scene.add(layer, n).unwrap();
        scene.set_name(n, Some(String::from("b"))).unwrap();
        assert_eq!(scene.child_by_name(layer, "a"), None);
        assert_eq!(scene.child_by_name(layer, "b"), Some(n));
    }

    #[test]
    fn position_changes_keep_cache() {
        let (mut scene, layer) = stage();
        let r = scene.create(Node::shape(RectShape::new(10.0, 20.0)));
        scene.add(layer, r).unwrap();
        let b0 = scene.bounds_local(r).unwrap();
        let count = scene.bounds_computations();
        scene.set_position(r, 50.0, 60.0);
        let b1 = scene.bounds_local(r).unwrap();
        assert_eq!(scene.bounds_computations(), count);
        assert_eq!((b1.width, b1.height), (b0.width, b0.height));
        assert_eq!((b1.x, b1.y), (50.0, 60.0));

        scene.set_rotation_deg(r, 90.0);
        let b2 = scene.bounds_local(r).unwrap();
        assert_eq!(scene.bounds_computations(), count + 1);
        assert!((b2.width - 20.0).abs() < 1e-9 && (b2.height - 10.0).abs() < 1e-9);
    }

    #[test]
    fn group_bounds_follow_children() {
        let (mut scene, layer) = stage();
        let g = scene.create(Node::group().with_position(100.0, 0.0));
        let a = scene.create(Node::shape(RectShape::new(10.0, 10.0)));
        let b = scene.create(Node::shape(RectShape::new(10.0, 10.0)).with_position(30.0, 40.0));
        scene.add(layer, g).unwrap();
        scene.add(g, a).unwrap();
        scene.add(g, b).unwrap();
        assert_eq!(
            scene.bounds_local(g).unwrap(),
            BoundsRect::new(100.0, 0.0, 40.0, 50.0)
        );
        scene.set_position(b, 0.0, 0.0);
        assert_eq!(
            scene.bounds_local(g).unwrap(),
            BoundsRect::new(100.0, 0.0, 10.0, 10.0)
        );
        scene.set_visible(a, false);
        scene.set_visible(b, false);
        assert_eq!(scene.bounds_local(g).unwrap(), BoundsRect::new(100.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn update_shape_checks_type_and_invalidates() {
        let (mut scene, layer) = stage();
        let c = scene.create(Node::shape(Circle::new(5.0)));
        scene.add(layer, c).unwrap();
        assert_eq!(scene.bounds_local(c).unwrap().width, 10.0);
        scene.update_shape::<Circle, _>(c, |circle| circle.radius = 8.0).unwrap();
        assert_eq!(scene.bounds_local(c).unwrap().width, 16.0);
        assert_eq!(
            scene.update_shape::<RectShape, _>(c, |_| ()),
            Err(SceneError::ShapeTypeMismatch(c))
        );
        assert_eq!(scene.shape::<Circle>(c).map(|c| c.radius), Some(8.0));
    }

    #[test]
    fn detached_queries_fail() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let g = scene.create(Node::group().with_position(1.0, 2.0));
        assert_eq!(scene.absolute_position(g), Err(SceneError::Detached(g)));
        assert_eq!(scene.absolute_alpha(g), Err(SceneError::Detached(g)));
        assert!(!scene.is_attached(g));
        // Detached nodes still have a local transform.
        let t = scene.transform_view(g).unwrap();
        assert_eq!(t.transform_point(Point::ORIGIN), Point::new(1.0, 2.0));
    }

    #[test]
    fn absolute_values_accumulate() {
        let (mut scene, layer) = stage();
        let g = scene.create(Node::group().with_position(10.0, 10.0).with_alpha(0.5));
        let c = scene.create(Node::shape(Circle::new(1.0)).with_position(5.0, 0.0).with_alpha(0.5));
        scene.add(layer, g).unwrap();
        scene.add(g, c).unwrap();
        assert_eq!(scene.absolute_position(c).unwrap(), Point::new(15.0, 10.0));
        assert_eq!(scene.absolute_alpha(c).unwrap(), 0.25);
        assert_eq!(scene.layer_of(c), Some(layer));
        assert_eq!(scene.layer_of(layer), Some(layer));
    }

    #[test]
    fn view_is_part_of_transform() {
        let (mut scene, layer) = stage();
        let c = scene.create(Node::shape(Circle::new(1.0)).with_position(50.0, 50.0));
        scene.add(layer, c).unwrap();
        scene.view_mut().set_target_pos(20.0, 10.0);
        scene.view_mut().set_scale(2.0, 2.0);
        let t = scene.transform_view(c).unwrap();
        assert_eq!(t.transform_point(Point::ORIGIN), Point::new(80.0, 90.0));
    }

    #[test]
    fn redraw_flag_raises_wake_once() {
        let (mut scene, layer) = stage();
        let _ = scene.take_wake_request();
        scene.draw_layer(layer).unwrap();
        let c = scene.create(Node::shape(Circle::new(1.0)));
        scene.add(layer, c).unwrap();
        assert!(scene.needs_redraw(layer));
        assert!(scene.take_wake_request());
        scene.set_x(c, 3.0);
        assert!(!scene.take_wake_request());
        scene.draw_layer(layer).unwrap();
        assert!(!scene.needs_redraw(layer));
    }

    #[test]
    fn draw_order_sorts_a_copy() {
        let (mut scene, layer) = stage();
        let a = scene.create(Node::group().with_position(0.0, 30.0));
        let b = scene.create(Node::group().with_position(0.0, 10.0));
        scene.add(layer, a).unwrap();
        scene.add(layer, b).unwrap();
        let by_y: DrawOrder = Rc::new(|l: &Node, r: &Node| l.position().y.total_cmp(&r.position().y));
        scene.set_draw_order(layer, Some(by_y)).unwrap();
        assert_eq!(scene.draw_list(layer), alloc::vec![b, a]);
        assert_eq!(scene.children(layer), &[a, b]);
    }

    #[test]
    fn culling_layer_keeps_overlapping_children() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let layer = scene.create(Node::culling_layer());
        scene.add_layer(layer).unwrap();
        let inside = scene.create(Node::shape(RectShape::new(10.0, 10.0)).with_position(10.0, 10.0));
        let edge = scene.create(Node::shape(RectShape::new(10.0, 10.0)).with_position(95.0, 50.0));
        let outside = scene.create(Node::shape(RectShape::new(10.0, 10.0)).with_position(200.0, 10.0));
        let touching = scene.create(Node::shape(RectShape::new(10.0, 10.0)).with_position(100.0, 0.0));
        for n in [inside, edge, outside, touching] {
            scene.add(layer, n).unwrap();
        }
        assert_eq!(scene.draw_list(layer), alloc::vec![inside, edge]);

        scene.view_mut().set_target_pos(150.0, 0.0);
        assert_eq!(scene.draw_list(layer), alloc::vec![outside]);

        scene.set_scale(layer, 0.0, 1.0);
        assert!(scene.draw_list(layer).is_empty());
    }

    #[test]
    fn failed_shape_does_not_stop_layer() {
        use crate::shapes::{Image, ImageSource};
        use proscenium_render::{ImageHandle, ImageId};

        let (mut scene, layer) = stage();
        let a = scene.create(Node::shape(Circle::new(5.0)).with_fill(peniko::Color::BLACK));
        let img = scene.create(Node::shape(
            Image::new(ImageSource::Full(ImageHandle::pending(ImageId(9)))).with_size(5.0, 5.0),
        ));
        let b = scene.create(Node::shape(RectShape::new(5.0, 5.0)).with_fill(peniko::Color::WHITE));
        for n in [a, img, b] {
            scene.add(layer, n).unwrap();
        }
        let report = scene.draw_layer(layer).unwrap();
        assert_eq!(report, DrawReport { drawn: 2, failed: 1 });
    }

    #[test]
    fn shapes_draw_with_accumulated_alpha() {
        let (mut scene, layer) = stage();
        let g = scene.create(Node::group().with_alpha(0.5));
        let c = scene.create(
            Node::shape(Circle::new(5.0))
                .with_position(20.0, 20.0)
                .with_fill(peniko::Color::BLACK),
        );
        scene.add(layer, g).unwrap();
        scene.add(g, c).unwrap();
        let mut canvas = RecordingCanvas::new(Size::new(400.0, 300.0));
        scene.draw_shape(c, &mut canvas, false).unwrap();
        let CanvasOp::Fill { state, .. } = &canvas.ops()[0] else {
            panic!("expected a fill");
        };
        assert_eq!(state.alpha, 0.5);
        assert_eq!(state.transform, Affine::translate((20.0, 20.0)));
        // Restored afterwards.
        assert_eq!(canvas.state().alpha, 1.0);
    }

    #[test]
    fn hit_test_uses_path() {
        let (mut scene, layer) = stage();
        let c = scene.create(Node::shape(Circle::new(20.0)).with_position(100.0, 100.0));
        scene.add(layer, c).unwrap();
        let mut scratch = RecordingCanvas::path_only(Size::new(400.0, 300.0));
        assert!(scene.hit_test_shape(c, &mut scratch, Point::new(100.0, 100.0)));
        // Inside the bounding box but outside the circle.
        assert!(!scene.hit_test_shape(c, &mut scratch, Point::new(82.0, 82.0)));
        assert!(!scene.hit_test_shape(c, &mut scratch, Point::new(10.0, 10.0)));
    }

    #[test]
    fn resize_reaches_layers() {
        let (mut scene, layer) = stage();
        scene.draw_layer(layer).unwrap();
        scene.resize(Size::new(800.0, 600.0));
        assert_eq!(scene.layer_surface(layer).unwrap().size(), Size::new(800.0, 600.0));
        assert_eq!(
            scene.bounds_local(layer).unwrap(),
            BoundsRect::new(0.0, 0.0, 800.0, 600.0)
        );
        assert!(scene.needs_redraw(layer));
    }
}
