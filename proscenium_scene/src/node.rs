// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node data and construction.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;

use kurbo::{Point, Vec2};
use peniko::{BlendMode, Brush};
use proscenium_event_state::drag::{DragBounds, DragConstraint};
use proscenium_geom::{BoundsRect, Transform};
use proscenium_render::Surface;

use crate::container::Container;
use crate::drag::DragHandler;
use crate::event::Listeners;
use crate::layer::Layer;
use crate::shapes::{Drawable, Shape, ShapeStyle};
use crate::NodeId;

bitflags::bitflags! {
    /// Node flags controlling visibility, event participation and dragging.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is drawn, and hit-tested when it is a shape.
        const VISIBLE   = 0b0000_0001;
        /// Node takes part in hit testing.
        const LISTENING = 0b0000_0010;
        /// A press on this node (or a descendant) starts a drag of this node.
        const DRAGGABLE = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::LISTENING
    }
}

/// Non-owning link from a node to its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParentLink {
    /// Not in any container.
    #[default]
    Detached,
    /// Directly under the stage (layers only).
    Stage,
    /// Inside a group or layer.
    Node(NodeId),
}

impl ParentLink {
    /// The parent node, if the parent is a node.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }
}

/// What a node is.
#[derive(Debug)]
pub enum NodeKind {
    /// A drawable leaf.
    Shape(Shape),
    /// A container whose bounds enclose its visible children.
    Group(Container),
    /// A container with its own drawing surface.
    Layer(Layer),
}

/// A scene node: transform state, flags, listeners and its kind.
///
/// Nodes are built with the `with_*` methods and handed to
/// [`Scene::create`](crate::Scene::create); afterwards they are mutated
/// through the scene so that bounds caches and redraw flags stay correct.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<String>,
    pub(crate) serial: Option<u64>,
    pub(crate) index: usize,
    pub(crate) parent: ParentLink,
    pub(crate) position: Point,
    pub(crate) scale: Vec2,
    pub(crate) rotation: f64,
    pub(crate) center_offset: Vec2,
    pub(crate) alpha: f64,
    pub(crate) flags: NodeFlags,
    pub(crate) listeners: Listeners,
    pub(crate) drag_constraint: DragConstraint,
    pub(crate) drag_bounds: DragBounds,
    pub(crate) drag_handler: Option<Rc<dyn DragHandler>>,
    /// Local bounds without the position term.
    pub(crate) bounds_cache: Cell<Option<BoundsRect>>,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            serial: None,
            index: 0,
            parent: ParentLink::Detached,
            position: Point::ORIGIN,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            center_offset: Vec2::ZERO,
            alpha: 1.0,
            flags: NodeFlags::default(),
            listeners: Listeners::default(),
            drag_constraint: DragConstraint::None,
            drag_bounds: DragBounds::UNBOUNDED,
            drag_handler: None,
            bounds_cache: Cell::new(None),
        }
    }

    /// A shape node drawing `drawable`.
    pub fn shape(drawable: impl Drawable) -> Self {
        Self::with_kind(NodeKind::Shape(Shape::new(Box::new(drawable))))
    }

    /// An empty group.
    pub fn group() -> Self {
        Self::with_kind(NodeKind::Group(Container::default()))
    }

    /// A layer drawing onto the reference recording surface.
    pub fn layer() -> Self {
        Self::with_kind(NodeKind::Layer(Layer::recording(false)))
    }

    /// A layer drawing onto `surface`.
    pub fn layer_on(surface: Box<dyn Surface>) -> Self {
        Self::with_kind(NodeKind::Layer(Layer::new(surface, false)))
    }

    /// A layer that skips children outside the visible area.
    pub fn culling_layer() -> Self {
        Self::with_kind(NodeKind::Layer(Layer::recording(true)))
    }

    /// A culling layer drawing onto `surface`.
    pub fn culling_layer_on(surface: Box<dyn Surface>) -> Self {
        Self::with_kind(NodeKind::Layer(Layer::new(surface, true)))
    }

    /// Sets the name used for lookups in the parent container.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the position relative to the parent.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Sets a non-uniform scale.
    #[must_use]
    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }

    /// Sets the rotation in radians.
    #[must_use]
    pub fn with_rotation(mut self, radians: f64) -> Self {
        self.rotation = radians;
        self
    }

    /// Sets the rotation in degrees.
    #[must_use]
    pub fn with_rotation_deg(self, degrees: f64) -> Self {
        self.with_rotation(degrees.to_radians())
    }

    /// Sets the pivot for scale and rotation.
    #[must_use]
    pub fn with_center_offset(mut self, x: f64, y: f64) -> Self {
        self.center_offset = Vec2::new(x, y);
        self
    }

    /// Sets the opacity in `0..=1`.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Shows or hides the node.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.flags.set(NodeFlags::VISIBLE, visible);
        self
    }

    /// Enables or disables hit testing.
    #[must_use]
    pub fn with_listening(mut self, listening: bool) -> Self {
        self.flags.set(NodeFlags::LISTENING, listening);
        self
    }

    /// Enables or disables dragging.
    #[must_use]
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.flags.set(NodeFlags::DRAGGABLE, draggable);
        self
    }

    /// Restricts dragging to one axis.
    #[must_use]
    pub fn with_drag_constraint(mut self, constraint: DragConstraint) -> Self {
        self.drag_constraint = constraint;
        self
    }

    /// Limits where dragging may move the node.
    #[must_use]
    pub fn with_drag_bounds(mut self, bounds: DragBounds) -> Self {
        self.drag_bounds = bounds;
        self
    }

    /// Replaces the default drag behavior.
    #[must_use]
    pub fn with_drag_handler(mut self, handler: impl DragHandler + 'static) -> Self {
        self.drag_handler = Some(Rc::new(handler));
        self
    }

    /// Sets the paint style. Ignored for groups and layers.
    #[must_use]
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        if let NodeKind::Shape(shape) = &mut self.kind {
            shape.style = style.normalized();
        }
        self
    }

    /// Sets the fill. Ignored for groups and layers.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        if let NodeKind::Shape(shape) = &mut self.kind {
            shape.style.fill = Some(fill.into());
        }
        self
    }

    /// Sets stroke paint and width. Ignored for groups and layers.
    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, width: f64) -> Self {
        if let NodeKind::Shape(shape) = &mut self.kind {
            shape.style.stroke = Some(stroke.into());
            shape.style.stroke_width = Some(width);
        }
        self
    }

    /// Sets the composite mode. Ignored for groups and layers.
    #[must_use]
    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        if let NodeKind::Shape(shape) = &mut self.kind {
            shape.blend = Some(mode);
        }
        self
    }

    /// What this node is.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The shape data, for shape nodes.
    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.kind {
            NodeKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// The layer data, for layers.
    pub fn as_layer(&self) -> Option<&Layer> {
        match &self.kind {
            NodeKind::Layer(l) => Some(l),
            _ => None,
        }
    }

    pub(crate) fn as_layer_mut(&mut self) -> Option<&mut Layer> {
        match &mut self.kind {
            NodeKind::Layer(l) => Some(l),
            _ => None,
        }
    }

    /// The child container, for groups and layers.
    pub fn container(&self) -> Option<&Container> {
        match &self.kind {
            NodeKind::Group(c) => Some(c),
            NodeKind::Layer(l) => Some(&l.container),
            NodeKind::Shape(_) => None,
        }
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            NodeKind::Group(c) => Some(c),
            NodeKind::Layer(l) => Some(&mut l.container),
            NodeKind::Shape(_) => None,
        }
    }

    /// Whether this is a shape.
    pub fn is_shape(&self) -> bool {
        matches!(self.kind, NodeKind::Shape(_))
    }

    /// Whether this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    /// Whether this is a layer.
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, NodeKind::Layer(_))
    }

    /// Name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Serial assigned when the node was first added to a container.
    pub fn serial(&self) -> Option<u64> {
        self.serial
    }

    /// Position among siblings; later siblings draw on top.
    pub fn z_index(&self) -> usize {
        self.index
    }

    /// Link to the container.
    pub fn parent(&self) -> ParentLink {
        self.parent
    }

    /// Position relative to the parent.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Scale factors.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rotation in degrees.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation.to_degrees()
    }

    /// Pivot for scale and rotation.
    pub fn center_offset(&self) -> Vec2 {
        self.center_offset
    }

    /// Own opacity.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// All flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether the node is visible.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Whether the node takes part in hit testing.
    pub fn is_listening(&self) -> bool {
        self.flags.contains(NodeFlags::LISTENING)
    }

    /// Whether the node can be dragged.
    pub fn is_draggable(&self) -> bool {
        self.flags.contains(NodeFlags::DRAGGABLE)
    }

    /// Drag axis restriction.
    pub fn drag_constraint(&self) -> DragConstraint {
        self.drag_constraint
    }

    /// Drag limits.
    pub fn drag_bounds(&self) -> DragBounds {
        self.drag_bounds
    }

    /// Appends this node's local transform to `t`.
    ///
    /// Order, last applied first: translate(position), translate(pivot),
    /// scale, rotate, translate(-pivot). Identity steps are skipped.
    pub(crate) fn apply_local(&self, t: &mut Transform, with_position: bool) {
        if with_position && (self.position.x != 0.0 || self.position.y != 0.0) {
            t.translate(self.position.x, self.position.y);
        }
        let pivot = self.center_offset;
        let has_pivot = pivot.x != 0.0 || pivot.y != 0.0;
        if has_pivot {
            t.translate(pivot.x, pivot.y);
        }
        if self.scale.x != 1.0 || self.scale.y != 1.0 {
            t.scale(self.scale.x, self.scale.y);
        }
        if self.rotation != 0.0 {
            t.rotate(self.rotation);
        }
        if has_pivot {
            t.translate(-pivot.x, -pivot.y);
        }
    }

    /// The local transform (position included).
    pub fn transform_local(&self) -> Transform {
        let mut t = Transform::IDENTITY;
        self.apply_local(&mut t, true);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Circle;

    #[test]
    fn defaults_are_visible_and_listening() {
        let n = Node::group();
        assert!(n.is_visible());
        assert!(n.is_listening());
        assert!(!n.is_draggable());
        assert_eq!(n.parent(), ParentLink::Detached);
        assert_eq!(n.scale(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn local_transform_rotates_about_pivot() {
        let n = Node::shape(Circle::new(5.0))
            .with_position(10.0, 0.0)
            .with_center_offset(5.0, 5.0)
            .with_rotation_deg(180.0);
        let t = n.transform_local();
        // The pivot maps onto itself before translation.
        let p = t.transform_point(Point::new(5.0, 5.0));
        assert!((p.x - 15.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9, "{p:?}");
        let q = t.transform_point(Point::new(0.0, 0.0));
        assert!((q.x - 20.0).abs() < 1e-9 && (q.y - 10.0).abs() < 1e-9, "{q:?}");
    }

    #[test]
    fn identity_node_has_identity_transform() {
        assert!(Node::group().transform_local().is_identity());
    }

    #[test]
    fn style_builders_only_touch_shapes() {
        let group = Node::group().with_fill(peniko::Color::BLACK);
        assert!(group.as_shape().is_none());
        let shape = Node::shape(Circle::new(1.0)).with_stroke(peniko::Color::BLACK, 3.0);
        let style = &shape.as_shape().unwrap().style;
        assert_eq!(style.stroke_width, Some(3.0));
    }
}
