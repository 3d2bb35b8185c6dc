// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stage: layers, view, hit-testing and pointer state.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size, Vec2};
use proscenium_event_state::click::ClickWindows;
use proscenium_event_state::drag::DragSession;
use proscenium_event_state::hover::TargetTracker;
use proscenium_geom::BoundsRect;
use proscenium_render::{RecordingCanvas, Surface};
use proscenium_scene::{DrawReport, Event, EventType, NodeId, Scene, SceneError};

use crate::dispatch;
use crate::input::{PointerInput, PointerKind};
use crate::runtime::FrameInfo;
use crate::{DragKey, StageConfig, StageId};

/// Per-frame callback of an animating stage.
pub type FrameCallback = Box<dyn FnMut(&mut Scene, &FrameInfo)>;

/// Pointer positions plus the one-shot flags of the current input.
#[derive(Clone, Copy, Debug, Default)]
struct PointerState {
    mouse: Option<Point>,
    touch: Option<Point>,
    mouse_down: bool,
    mouse_up: bool,
    touch_start: bool,
    touch_end: bool,
    /// A press landed on a shape and has not been released yet.
    click_start: bool,
    time_ms: u64,
}

impl PointerState {
    fn clear_one_shots(&mut self) {
        self.mouse_down = false;
        self.mouse_up = false;
        self.touch_start = false;
        self.touch_end = false;
    }
}

/// The root of a scene: owns the [`Scene`], turns pointer input into node
/// events, and draws layers.
///
/// Hit-testing redraws candidate shapes, one at a time, as bare paths onto a
/// hidden backstage surface and asks that surface whether the pointer lies
/// inside. Layers are visited topmost first and children back to front, so
/// the first shape that handles the input is the topmost one under the
/// pointer.
pub struct Stage {
    id: StageId,
    scene: Scene,
    buffer: Box<dyn Surface>,
    backstage: Box<dyn Surface>,
    container_offset: Vec2,
    pointer: PointerState,
    hover: TargetTracker<NodeId>,
    clicks: ClickWindows<NodeId>,
    redraw: bool,
    animating: bool,
    wake: bool,
    on_frame: Option<FrameCallback>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("id", &self.id)
            .field("scene", &self.scene)
            .field("buffer", &self.buffer)
            .field("backstage", &self.backstage)
            .field("container_offset", &self.container_offset)
            .field("pointer", &self.pointer)
            .field("hover", &self.hover)
            .field("clicks", &self.clicks)
            .field("redraw", &self.redraw)
            .field("animating", &self.animating)
            .field("wake", &self.wake)
            .field("on_frame", &self.on_frame.is_some())
            .finish()
    }
}

impl Stage {
    /// A stage over `scene`, using recording surfaces for the buffer and
    /// the backstage.
    pub fn new(id: StageId, scene: Scene, config: StageConfig) -> Self {
        let size = config.size;
        Self::with_surfaces(
            id,
            scene,
            config,
            Box::new(RecordingCanvas::new(size)),
            Box::new(RecordingCanvas::path_only(size)),
        )
    }

    /// A stage with host-provided buffer and backstage surfaces.
    pub fn with_surfaces(
        id: StageId,
        mut scene: Scene,
        config: StageConfig,
        mut buffer: Box<dyn Surface>,
        mut backstage: Box<dyn Surface>,
    ) -> Self {
        scene.resize(config.size);
        buffer.resize(config.size);
        backstage.resize(config.size);
        Self {
            id,
            scene,
            buffer,
            backstage,
            container_offset: Vec2::ZERO,
            pointer: PointerState::default(),
            hover: TargetTracker::default(),
            clicks: ClickWindows::new(config.double_click_window_ms),
            redraw: false,
            animating: false,
            wake: false,
            on_frame: None,
        }
    }

    /// This stage's id.
    pub fn id(&self) -> StageId {
        self.id
    }

    /// The scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The scene, for building and editing nodes.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    // --- layers ---

    /// Puts a layer on the stage; it is sized to the stage and marked for
    /// redraw.
    pub fn add_layer(&mut self, layer: NodeId) -> Result<(), SceneError> {
        self.scene.add_layer(layer)
    }

    /// Removes and destroys a layer.
    pub fn remove_layer(&mut self, layer: NodeId) -> Result<(), SceneError> {
        if !self.scene.node(layer)?.is_layer() {
            return Err(SceneError::NotALayer(layer));
        }
        self.scene.remove(layer)?;
        self.forget_removed();
        Ok(())
    }

    /// Clears every layer surface without redrawing.
    pub fn clear(&mut self) {
        for layer in self.scene.layers().to_vec() {
            self.scene.clear_layer(layer);
        }
    }

    /// Redraws every layer and clears the stage redraw flag.
    pub fn draw(&mut self) -> DrawReport {
        self.redraw = false;
        let mut total = DrawReport::default();
        for layer in self.scene.layers().to_vec() {
            if let Ok(report) = self.scene.draw_layer(layer) {
                total.drawn += report.drawn;
                total.failed += report.failed;
            }
        }
        total
    }

    /// Redraws one layer.
    pub fn draw_layer(&mut self, layer: NodeId) -> Result<DrawReport, SceneError> {
        self.scene.draw_layer(layer)
    }

    /// Composites every visible layer, bottom first, onto the buffer
    /// surface and returns it.
    pub fn composite(&mut self) -> &dyn Surface {
        self.buffer.clear();
        for &layer in self.scene.layers() {
            if !self.scene.get(layer).is_some_and(|n| n.is_visible()) {
                continue;
            }
            if let Some(surface) = self.scene.layer_surface(layer) {
                self.buffer.blit(surface);
            }
        }
        &*self.buffer
    }

    /// The buffer surface, as last composited.
    pub fn buffer(&self) -> &dyn Surface {
        &*self.buffer
    }

    // --- redraw and animation flags ---

    /// Requests a redraw of the whole stage on the next frame.
    pub fn mark_for_redraw(&mut self) {
        if !self.redraw {
            self.redraw = true;
            self.wake = true;
        }
    }

    /// Whether a whole-stage redraw is pending.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    /// Whether the stage runs its frame callback every frame.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
        self.wake = true;
    }

    /// Sets the callback run every frame while the stage is animating.
    pub fn on_frame(&mut self, callback: impl FnMut(&mut Scene, &FrameInfo) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    /// Whether the frame loop has work for this stage.
    pub(crate) fn has_frame_work(&self) -> bool {
        self.redraw
            || self.animating
            || self.scene.any_needs_redraw()
            || self.scene.has_transitions()
    }

    /// Returns and clears pending wake requests from the stage and its scene.
    pub(crate) fn take_wake(&mut self) -> bool {
        let stage = core::mem::take(&mut self.wake);
        let scene = self.scene.take_wake_request();
        stage || scene
    }

    /// Runs one frame: the frame callback, then transitions on every layer,
    /// then drawing.
    ///
    /// When the stage itself needs a redraw, all layers are drawn once at
    /// the end instead of one by one.
    pub(crate) fn run_frame(&mut self, frame: &FrameInfo) {
        let stage_redraw = self.redraw;
        if self.animating
            && let Some(callback) = self.on_frame.as_mut()
        {
            callback(&mut self.scene, frame);
        }
        for layer in self.scene.layers().to_vec() {
            let transitioned = self.scene.advance_transitions(layer, frame.time_diff_ms);
            if stage_redraw {
                continue;
            }
            if transitioned || self.scene.needs_redraw(layer) {
                let _ = self.scene.draw_layer(layer);
            }
        }
        if stage_redraw {
            self.draw();
        }
    }

    // --- view ---

    /// Stage size.
    pub fn size(&self) -> Size {
        self.scene.view().size()
    }

    /// Resizes the view, the buffer, the backstage and every layer.
    pub fn set_size(&mut self, size: Size) {
        self.scene.resize(size);
        self.buffer.resize(size);
        self.backstage.resize(size);
        self.mark_for_redraw();
    }

    /// Limits panning so the view stays inside `world`; `None` removes the
    /// limits.
    pub fn set_view_limits_by_world_bounds(&mut self, world: Option<BoundsRect>) {
        self.scene.view_mut().set_world_limits(world);
        self.mark_for_redraw();
    }

    /// Requests a pan position; the applied one is clamped to the limits.
    pub fn set_target_view_pos(&mut self, x: f64, y: f64) {
        self.scene.view_mut().set_target_pos(x, y);
        self.mark_for_redraw();
    }

    /// The requested pan position.
    pub fn target_view_pos(&self) -> Point {
        self.scene.view().target_pos()
    }

    /// The applied pan position.
    pub fn view_pos(&self) -> Point {
        self.scene.view().view_pos()
    }

    /// Sets the view scale.
    pub fn set_scale(&mut self, sx: f64, sy: f64) {
        self.scene.view_mut().set_scale(sx, sy);
        self.mark_for_redraw();
    }

    /// The view scale.
    pub fn scale(&self) -> Vec2 {
        self.scene.view().scale()
    }

    // --- pointer ---

    /// Offset of the stage container in host client coordinates.
    pub fn set_container_offset(&mut self, offset: Vec2) {
        self.container_offset = offset;
    }

    /// Offset of the stage container in host client coordinates.
    pub fn container_offset(&self) -> Vec2 {
        self.container_offset
    }

    /// Last mouse position in stage coordinates.
    pub fn mouse_position(&self) -> Option<Point> {
        self.pointer.mouse
    }

    /// Last single-touch position in stage coordinates.
    pub fn touch_position(&self) -> Option<Point> {
        self.pointer.touch
    }

    /// The touch position if there is one, otherwise the mouse position.
    pub fn user_position(&self) -> Option<Point> {
        self.pointer.touch.or(self.pointer.mouse)
    }

    /// The node currently under the pointer, as far as mouseover goes.
    pub fn hover_target(&self) -> Option<NodeId> {
        self.hover.target()
    }

    /// Handles one pointer input: updates pointer state, hit-tests, fires
    /// node events and drives the drag session.
    ///
    /// Returns the shape that handled the input, if any.
    pub fn handle_input(
        &mut self,
        input: &PointerInput,
        drag: &mut DragSession<DragKey>,
    ) -> Option<NodeId> {
        self.pointer.time_ms = input.time_ms;
        if input.kind.is_touch() {
            if let Some(pos) = input.touch_position(self.container_offset) {
                self.pointer.touch = Some(pos);
            }
        } else if input.kind != PointerKind::MouseOut {
            self.pointer.mouse = Some(input.mouse_position(self.container_offset));
        }

        let handled = match input.kind {
            PointerKind::MouseDown => {
                self.pointer.mouse_down = true;
                self.hit_pass(drag)
            }
            PointerKind::MouseMove => {
                self.pointer.mouse_up = false;
                self.pointer.mouse_down = false;
                let handled = self.hit_pass(drag);
                self.drag_move(drag);
                handled
            }
            PointerKind::MouseUp => {
                self.pointer.mouse_up = true;
                self.pointer.mouse_down = false;
                let handled = self.hit_pass(drag);
                self.pointer.click_start = false;
                self.end_drag(drag);
                handled
            }
            PointerKind::MouseOver => self.hit_pass(drag),
            PointerKind::MouseOut => {
                self.pointer.mouse = None;
                let handled = self.hit_pass(drag);
                self.end_drag(drag);
                handled
            }
            PointerKind::TouchStart => {
                self.pointer.touch_start = true;
                self.hit_pass(drag)
            }
            PointerKind::TouchMove => {
                let handled = self.hit_pass(drag);
                self.drag_move(drag);
                handled
            }
            PointerKind::TouchEnd => {
                self.pointer.touch_end = true;
                let handled = self.hit_pass(drag);
                self.end_drag(drag);
                handled
            }
        };
        tracing::trace!(stage = ?self.id, kind = ?input.kind, ?handled, "pointer input");
        handled
    }

    /// Drops hover and double-click state held for nodes that no longer exist.
    fn forget_removed(&mut self) {
        let scene = &self.scene;
        self.clicks.retain(|node| scene.is_alive(node));
        for node in [self.hover.target(), self.hover.pending_mouseout()]
            .into_iter()
            .flatten()
        {
            if !self.scene.is_alive(node) {
                tracing::trace!(stage = ?self.id, ?node, "forgetting removed node");
                self.hover.forget(node);
            }
        }
    }

    fn hit_pass(&mut self, drag: &mut DragSession<DragKey>) -> Option<NodeId> {
        self.forget_removed();
        self.backstage.clear();
        self.hover.begin_pass();
        self.clicks.prune(self.pointer.time_ms);

        let mut handled = None;
        for layer in self.scene.layers().iter().rev().copied().collect::<Vec<_>>() {
            let enabled = self
                .scene
                .get(layer)
                .is_some_and(|n| n.is_visible() && n.is_listening());
            if enabled && let Some(hit) = self.traverse(layer, drag) {
                handled = Some(hit);
                break;
            }
        }
        if handled.is_none()
            && let Some(out) = self.hover.take_mouseout()
        {
            self.fire(out, EventType::MouseOut, None, drag);
        }
        self.pointer.clear_one_shots();
        handled
    }

    fn traverse(&mut self, container: NodeId, drag: &mut DragSession<DragKey>) -> Option<NodeId> {
        for child in self.scene.draw_list(container).into_iter().rev() {
            let Some(node) = self.scene.get(child) else {
                continue;
            };
            if node.is_shape() {
                if self.detect(child, drag) {
                    return Some(child);
                }
            } else if node.is_visible()
                && node.is_listening()
                && let Some(hit) = self.traverse(child, drag)
            {
                return Some(hit);
            }
        }
        None
    }

    /// Tests one shape and fires whatever the current input means for it.
    ///
    /// Returns whether the shape handled the input and ends the walk.
    fn detect(&mut self, shape: NodeId, drag: &mut DragSession<DragKey>) -> bool {
        let Some(node) = self.scene.get(shape) else {
            return false;
        };
        if !node.is_listening() {
            return false;
        }
        let visible = node.is_visible();
        let dragging = drag.is_moving();
        self.hover.observe(shape);

        let hit = visible
            && self.user_position().is_some_and(|pos| {
                self.scene
                    .hit_test_shape(shape, self.backstage.as_mut(), pos)
            });
        if !hit {
            if !dragging && self.hover.target() == Some(shape) {
                self.hover.release();
            }
            return false;
        }

        let p = &mut self.pointer;
        if !dragging && p.mouse_down {
            p.mouse_down = false;
            p.click_start = true;
            self.fire(shape, EventType::MouseDown, None, drag);
        } else if p.mouse_up {
            p.mouse_up = false;
            let click = p.click_start && !drag.is_moving();
            self.fire(shape, EventType::MouseUp, None, drag);
            if click {
                self.fire(shape, EventType::Click, None, drag);
                if self.clicks.register(shape, self.pointer.time_ms) {
                    self.fire(shape, EventType::DblClick, None, drag);
                }
            }
        } else if p.touch_start {
            p.touch_start = false;
            self.fire(shape, EventType::TouchStart, None, drag);
            if self.clicks.register(shape, self.pointer.time_ms) {
                self.fire(shape, EventType::DblTap, None, drag);
            }
        } else if p.touch_end {
            p.touch_end = false;
            self.fire(shape, EventType::TouchEnd, None, drag);
        } else if !dragging && self.hover.claim(shape) {
            let out = self.hover.take_mouseout();
            if let Some(out) = out {
                self.fire(out, EventType::MouseOut, Some(shape), drag);
            }
            self.fire(shape, EventType::MouseOver, out, drag);
            self.hover.set_target(shape);
        } else if !dragging {
            self.fire(shape, EventType::MouseMove, None, drag);
            self.fire(shape, EventType::TouchMove, None, drag);
        } else {
            // Mid-drag moves are not handled by shapes; the walk goes on.
            return false;
        }
        true
    }

    /// Builds an event at `node` and bubbles it. Press events start a drag
    /// on every draggable node they reach; the outermost one wins.
    fn fire(
        &mut self,
        node: NodeId,
        kind: EventType,
        related: Option<NodeId>,
        drag: &mut DragSession<DragKey>,
    ) {
        let pointer = self.user_position();
        let mut event = Event::new(kind, node)
            .with_pointer(pointer)
            .with_time(self.pointer.time_ms)
            .with_related(related);
        let path = dispatch::bubble_path(&self.scene, node, related, kind);
        let starts_drag = matches!(kind, EventType::MouseDown | EventType::TouchStart);
        let stage = self.id;
        dispatch::run(&mut self.scene, &path, &mut event, |scene, n, _| {
            let Some(pos) = pointer.filter(|_| starts_drag) else {
                return;
            };
            if scene
                .get(n)
                .is_some_and(|n| n.is_draggable() && n.is_listening())
            {
                let offset = scene.drag_start(n, pos);
                drag.begin(DragKey { stage, node: n }, offset);
                tracing::debug!(?stage, node = ?n, "drag armed");
            }
        });
    }

    fn drag_move(&mut self, drag: &mut DragSession<DragKey>) {
        let Some(key) = drag.node().filter(|k| k.stage == self.id) else {
            return;
        };
        if !self.scene.is_alive(key.node) {
            drag.cancel();
            return;
        }
        let Some(pos) = self.user_position() else {
            return;
        };
        self.scene.drag_update(key.node, pos, drag.offset());
        if let Some(step) = drag.update() {
            if step.first_move {
                tracing::debug!(stage = ?self.id, node = ?key.node, "drag started");
                self.fire(key.node, EventType::DragStart, None, drag);
            }
            self.fire(key.node, EventType::DragMove, None, drag);
        }
    }

    fn end_drag(&mut self, drag: &mut DragSession<DragKey>) {
        if !drag.node().is_some_and(|k| k.stage == self.id) {
            return;
        }
        let Some(end) = drag.end() else {
            return;
        };
        let node = end.node.node;
        if !self.scene.is_alive(node) {
            return;
        }
        if end.moved {
            self.fire(node, EventType::DragEnd, None, drag);
        }
        self.scene.drag_stop(node);
        tracing::debug!(stage = ?self.id, ?node, moved = end.moved, "drag ended");
    }
}
