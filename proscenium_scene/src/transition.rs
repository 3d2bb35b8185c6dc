// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed property transitions.
//!
//! A transition interpolates some of a node's properties from their values
//! at start to target values over a duration. Transitions live on the
//! node's layer and are advanced by the frame loop through
//! [`Scene::advance_transitions`]; each node has at most one running.
//!
//! ```
//! use kurbo::Size;
//! use proscenium_scene::{Easing, Node, Scene, TransitionConfig, shapes::Circle};
//!
//! let mut scene = Scene::new(Size::new(200.0, 200.0));
//! let layer = scene.create(Node::layer());
//! scene.add_layer(layer).unwrap();
//! let ball = scene.create(Node::shape(Circle::new(5.0)));
//! scene.add(layer, ball).unwrap();
//!
//! scene
//!     .transition_to(ball, TransitionConfig::new(1.0).to_x(100.0).with_easing(Easing::Linear))
//!     .unwrap();
//! scene.advance_transitions(layer, 250.0);
//! assert_eq!(scene.get(ball).unwrap().position().x, 25.0);
//! scene.advance_transitions(layer, 750.0);
//! assert_eq!(scene.get(ball).unwrap().position().x, 100.0);
//! assert!(!scene.has_transition(ball));
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use smallvec::SmallVec;

use crate::{NodeId, NodeKind, Scene, SceneError};

/// Interpolation curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,
    /// Starts slow.
    EaseIn,
    /// Ends slow.
    EaseOut,
    /// Starts and ends slow.
    EaseInOut,
}

impl Easing {
    /// Exponent of the power curve at `time_ms` into a `duration_ms` run.
    pub fn power(self, time_ms: f64, duration_ms: f64) -> f64 {
        match self {
            Self::Linear => 1.0,
            Self::EaseIn => 2.5,
            Self::EaseOut => 0.4,
            Self::EaseInOut => 2.5 + (-2.1 / duration_ms) * time_ms,
        }
    }

    /// Value at `time_ms` when moving from `start` to `end` in `duration_ms`.
    pub fn value(self, start: f64, end: f64, time_ms: f64, duration_ms: f64) -> f64 {
        let p = self.power(time_ms, duration_ms);
        (end - start) / duration_ms.powf(p) * time_ms.powf(p) + start
    }
}

/// Single-valued properties a transition can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarProperty {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Rotation in radians.
    Rotation,
    /// Opacity.
    Alpha,
    /// Stroke width of a shape.
    StrokeWidth,
}

/// Two-component properties a transition can drive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorProperty {
    /// Position.
    Position,
    /// Scale.
    Scale,
    /// Pivot.
    CenterOffset,
}

/// One property and its final value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionTarget {
    /// A scalar property.
    Scalar {
        /// Property.
        property: ScalarProperty,
        /// Final value.
        to: f64,
    },
    /// Either or both components of a vector property.
    Vector {
        /// Property.
        property: VectorProperty,
        /// Final x, if x is animated.
        x: Option<f64>,
        /// Final y, if y is animated.
        y: Option<f64>,
    },
}

/// Callback run once a transition completes.
pub type TransitionCallback = Box<dyn FnOnce(&mut Scene)>;

/// Everything needed to start a transition.
pub struct TransitionConfig {
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Curve.
    pub easing: Easing,
    /// Properties to animate.
    pub targets: SmallVec<[TransitionTarget; 4]>,
    /// Run after the final values are applied.
    pub callback: Option<TransitionCallback>,
}

impl fmt::Debug for TransitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionConfig")
            .field("duration_secs", &self.duration_secs)
            .field("easing", &self.easing)
            .field("targets", &self.targets)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl TransitionConfig {
    /// A linear transition with no targets yet.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            easing: Easing::Linear,
            targets: SmallVec::new(),
            callback: None,
        }
    }

    /// Sets the curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Adds a target.
    #[must_use]
    pub fn with_target(mut self, target: TransitionTarget) -> Self {
        self.targets.push(target);
        self
    }

    fn scalar(self, property: ScalarProperty, to: f64) -> Self {
        self.with_target(TransitionTarget::Scalar { property, to })
    }

    fn vector(self, property: VectorProperty, x: f64, y: f64) -> Self {
        self.with_target(TransitionTarget::Vector {
            property,
            x: Some(x),
            y: Some(y),
        })
    }

    /// Animates x.
    #[must_use]
    pub fn to_x(self, x: f64) -> Self {
        self.scalar(ScalarProperty::X, x)
    }

    /// Animates y.
    #[must_use]
    pub fn to_y(self, y: f64) -> Self {
        self.scalar(ScalarProperty::Y, y)
    }

    /// Animates the rotation (radians).
    #[must_use]
    pub fn to_rotation(self, radians: f64) -> Self {
        self.scalar(ScalarProperty::Rotation, radians)
    }

    /// Animates the opacity.
    #[must_use]
    pub fn to_alpha(self, alpha: f64) -> Self {
        self.scalar(ScalarProperty::Alpha, alpha)
    }

    /// Animates the stroke width.
    #[must_use]
    pub fn to_stroke_width(self, width: f64) -> Self {
        self.scalar(ScalarProperty::StrokeWidth, width)
    }

    /// Animates the position.
    #[must_use]
    pub fn to_position(self, x: f64, y: f64) -> Self {
        self.vector(VectorProperty::Position, x, y)
    }

    /// Animates the scale.
    #[must_use]
    pub fn to_scale(self, x: f64, y: f64) -> Self {
        self.vector(VectorProperty::Scale, x, y)
    }

    /// Animates the pivot.
    #[must_use]
    pub fn to_center_offset(self, x: f64, y: f64) -> Self {
        self.vector(VectorProperty::CenterOffset, x, y)
    }

    /// Runs `f` when the transition completes.
    #[must_use]
    pub fn on_finish(mut self, f: impl FnOnce(&mut Scene) + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    X,
    Y,
    ScaleX,
    ScaleY,
    Rotation,
    Alpha,
    StrokeWidth,
    CenterX,
    CenterY,
}

#[derive(Clone, Copy, Debug)]
struct Track {
    channel: Channel,
    start: f64,
    end: f64,
}

/// A running transition.
pub(crate) struct Transition {
    node: NodeId,
    time_ms: f64,
    duration_ms: f64,
    easing: Easing,
    tracks: SmallVec<[Track; 4]>,
    callback: Option<TransitionCallback>,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("node", &self.node)
            .field("time_ms", &self.time_ms)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("tracks", &self.tracks)
            .finish_non_exhaustive()
    }
}

impl Scene {
    fn channel_value(&self, node: NodeId, channel: Channel) -> Option<f64> {
        let n = self.get(node)?;
        Some(match channel {
            Channel::X => n.position.x,
            Channel::Y => n.position.y,
            Channel::ScaleX => n.scale.x,
            Channel::ScaleY => n.scale.y,
            Channel::Rotation => n.rotation,
            Channel::Alpha => n.alpha,
            Channel::CenterX => n.center_offset.x,
            Channel::CenterY => n.center_offset.y,
            Channel::StrokeWidth => match &n.kind {
                NodeKind::Shape(shape) => shape.style.effective_stroke_width(),
                _ => return None,
            },
        })
    }

    fn set_channel(&mut self, node: NodeId, channel: Channel, value: f64) {
        let Some(n) = self.get(node) else {
            return;
        };
        let (scale, pivot) = (n.scale, n.center_offset);
        match channel {
            Channel::X => self.set_x(node, value),
            Channel::Y => self.set_y(node, value),
            Channel::ScaleX => self.set_scale(node, value, scale.y),
            Channel::ScaleY => self.set_scale(node, scale.x, value),
            Channel::Rotation => self.set_rotation(node, value),
            Channel::Alpha => self.set_alpha(node, value),
            Channel::StrokeWidth => self.set_stroke_width(node, value),
            Channel::CenterX => self.set_center_offset(node, value, pivot.y),
            Channel::CenterY => self.set_center_offset(node, pivot.x, value),
        }
    }

    /// Starts a transition, replacing any running one on the same node.
    pub fn transition_to(
        &mut self,
        node: NodeId,
        config: TransitionConfig,
    ) -> Result<(), SceneError> {
        self.node(node)?;
        let layer = self.layer_of(node).ok_or(SceneError::NoLayer(node))?;
        self.clear_transition(node);

        let mut tracks = SmallVec::new();
        let mut push = |scene: &Self, channel: Channel, end: f64| {
            if let Some(start) = scene.channel_value(node, channel) {
                tracks.push(Track {
                    channel,
                    start,
                    end,
                });
            }
        };
        for target in &config.targets {
            match *target {
                TransitionTarget::Scalar { property, to } => {
                    let channel = match property {
                        ScalarProperty::X => Channel::X,
                        ScalarProperty::Y => Channel::Y,
                        ScalarProperty::Rotation => Channel::Rotation,
                        ScalarProperty::Alpha => Channel::Alpha,
                        ScalarProperty::StrokeWidth => Channel::StrokeWidth,
                    };
                    push(self, channel, to);
                }
                TransitionTarget::Vector { property, x, y } => {
                    let (cx, cy) = match property {
                        VectorProperty::Position => (Channel::X, Channel::Y),
                        VectorProperty::Scale => (Channel::ScaleX, Channel::ScaleY),
                        VectorProperty::CenterOffset => (Channel::CenterX, Channel::CenterY),
                    };
                    if let Some(x) = x {
                        push(self, cx, x);
                    }
                    if let Some(y) = y {
                        push(self, cy, y);
                    }
                }
            }
        }

        let transition = Transition {
            node,
            time_ms: 0.0,
            duration_ms: config.duration_secs * 1000.0,
            easing: config.easing,
            tracks,
            callback: config.callback,
        };
        if let Some(l) = self.layer_mut(layer) {
            l.transitions.push(transition);
        }
        tracing::trace!(?node, ?layer, "transition started");
        self.request_wake();
        Ok(())
    }

    /// Stops the transition running on `node`, leaving properties as they are.
    pub fn clear_transition(&mut self, node: NodeId) {
        for layer in self.layers().to_vec() {
            if let Some(l) = self.layer_mut(layer) {
                l.transitions.retain(|t| t.node != node);
            }
        }
    }

    /// Whether `node` has a running transition.
    pub fn has_transition(&self, node: NodeId) -> bool {
        self.layers().iter().any(|&layer| {
            self.get(layer)
                .and_then(|n| n.as_layer())
                .is_some_and(|l| l.transitions.iter().any(|t| t.node == node))
        })
    }

    /// Advances every transition on `layer` by `dt_ms`.
    ///
    /// Completed transitions get their exact final values, are removed and
    /// then have their callbacks run. Returns whether any transition ran.
    pub fn advance_transitions(&mut self, layer: NodeId, dt_ms: f64) -> bool {
        let Some(l) = self.layer_mut(layer) else {
            return false;
        };
        let running = core::mem::take(&mut l.transitions);
        if running.is_empty() {
            return false;
        }

        let mut kept = Vec::with_capacity(running.len());
        let mut callbacks = Vec::new();
        for mut t in running {
            if !self.is_alive(t.node) {
                continue;
            }
            t.time_ms += dt_ms;
            if t.time_ms >= t.duration_ms {
                for track in &t.tracks {
                    self.set_channel(t.node, track.channel, track.end);
                }
                tracing::trace!(node = ?t.node, "transition finished");
                if let Some(cb) = t.callback.take() {
                    callbacks.push(cb);
                }
            } else {
                for track in &t.tracks {
                    let v = t.easing.value(track.start, track.end, t.time_ms, t.duration_ms);
                    self.set_channel(t.node, track.channel, v);
                }
                kept.push(t);
            }
        }

        if let Some(l) = self.layer_mut(layer) {
            kept.append(&mut l.transitions);
            l.transitions = kept;
        }
        for cb in callbacks {
            cb(self);
        }
        true
    }

    /// Whether any layer has a running transition.
    pub fn has_transitions(&self) -> bool {
        self.layers().iter().any(|&layer| {
            self.get(layer)
                .and_then(|n| n.as_layer())
                .is_some_and(|l| !l.transitions.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use crate::shapes::RectShape;
    use alloc::rc::Rc;
    use core::cell::Cell;
    use kurbo::Size;

    fn setup() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new(Size::new(200.0, 200.0));
        let layer = scene.create(Node::layer());
        scene.add_layer(layer).unwrap();
        let n = scene.create(Node::shape(RectShape::new(10.0, 10.0)));
        scene.add(layer, n).unwrap();
        (scene, layer, n)
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for e in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert!((e.value(10.0, 20.0, 0.0, 500.0) - 10.0).abs() < 1e-9, "{e:?}");
        }
        // Linear, ease-in and ease-out reach the end at t = d.
        for e in [Easing::Linear, Easing::EaseIn, Easing::EaseOut] {
            assert!((e.value(10.0, 20.0, 500.0, 500.0) - 20.0).abs() < 1e-9, "{e:?}");
        }
        let half_in = Easing::EaseIn.value(0.0, 1.0, 250.0, 500.0);
        let half_out = Easing::EaseOut.value(0.0, 1.0, 250.0, 500.0);
        assert!(half_in < 0.5 && half_out > 0.5);
    }

    #[test]
    fn detached_node_has_no_layer() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let n = scene.create(Node::group());
        assert_eq!(
            scene.transition_to(n, TransitionConfig::new(1.0).to_x(1.0)),
            Err(SceneError::NoLayer(n))
        );
    }

    #[test]
    fn vector_targets_animate_selected_components() {
        let (mut scene, layer, n) = setup();
        scene.set_scale(n, 1.0, 1.0);
        scene
            .transition_to(
                n,
                TransitionConfig::new(0.1).with_target(TransitionTarget::Vector {
                    property: VectorProperty::Scale,
                    x: Some(3.0),
                    y: None,
                }),
            )
            .unwrap();
        scene.advance_transitions(layer, 50.0);
        let s = scene.get(n).unwrap().scale();
        assert!((s.x - 2.0).abs() < 1e-9 && s.y == 1.0);
    }

    #[test]
    fn new_transition_replaces_old_and_callback_runs_once() {
        let (mut scene, layer, n) = setup();
        let done = Rc::new(Cell::new(0));
        let d = done.clone();
        scene
            .transition_to(n, TransitionConfig::new(1.0).to_x(500.0))
            .unwrap();
        scene
            .transition_to(
                n,
                TransitionConfig::new(0.2)
                    .to_alpha(0.0)
                    .to_stroke_width(5.0)
                    .on_finish(move |_| d.set(d.get() + 1)),
            )
            .unwrap();
        assert_eq!(scene.get(layer).unwrap().as_layer().unwrap().transition_count(), 1);
        assert!(scene.advance_transitions(layer, 300.0));
        assert_eq!(done.get(), 1);
        let node = scene.get(n).unwrap();
        assert_eq!(node.alpha(), 0.0);
        assert_eq!(node.position().x, 0.0);
        assert_eq!(node.as_shape().unwrap().style().stroke_width, Some(5.0));
        assert!(!scene.advance_transitions(layer, 16.0));
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn callback_can_chain_a_transition() {
        let (mut scene, layer, n) = setup();
        scene
            .transition_to(
                n,
                TransitionConfig::new(0.0).to_x(10.0).on_finish(move |scene| {
                    scene
                        .transition_to(n, TransitionConfig::new(1.0).to_x(20.0))
                        .unwrap();
                }),
            )
            .unwrap();
        scene.advance_transitions(layer, 16.0);
        assert_eq!(scene.get(n).unwrap().position().x, 10.0);
        assert!(scene.has_transition(n));
    }

    #[test]
    fn removed_nodes_drop_their_transition() {
        let (mut scene, layer, n) = setup();
        scene
            .transition_to(n, TransitionConfig::new(1.0).to_y(50.0))
            .unwrap();
        scene.remove(n).unwrap();
        scene.advance_transitions(layer, 16.0);
        assert!(!scene.has_transitions());
    }
}
