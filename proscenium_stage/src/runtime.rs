// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The runtime: stage registry, the shared drag session and the frame loop.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use proscenium_event_state::drag::DragSession;
use proscenium_scene::{IdSource, NodeId, Scene};

use crate::input::PointerInput;
use crate::{RuntimeConfig, Stage, StageConfig};

/// Identifies a stage registered with a [`SceneRuntime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub u32);

/// A node on a particular stage; the key of the drag session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DragKey {
    /// Stage the node belongs to.
    pub stage: StageId,
    /// The dragged node.
    pub node: NodeId,
}

/// Host hook that schedules the next call to [`SceneRuntime::run_frame`].
pub trait FrameScheduler {
    /// Asks the host for one more frame. Hosts without a display-synced
    /// callback can use `interval_ms` as a timer delay.
    fn request_frame(&mut self, interval_ms: f64);
}

/// Frame timing handed to frame callbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInfo {
    /// Time accumulated since the loop (re)started.
    pub time_ms: f64,
    /// Time since the previous frame; zero on the first frame of a loop.
    pub time_diff_ms: f64,
}

/// Owns every stage, the serial counter they share, the single drag session
/// and the animation loop.
///
/// The loop only runs while some stage has work: a pending redraw, a
/// running transition, or an animating frame callback. Anything that creates
/// work through [`SceneRuntime::with_stage`] or [`SceneRuntime::dispatch`]
/// restarts it.
pub struct SceneRuntime {
    ids: IdSource,
    stages: Vec<Stage>,
    next_stage: u32,
    drag: DragSession<DragKey>,
    scheduler: Box<dyn FrameScheduler>,
    config: RuntimeConfig,
    loop_active: bool,
    frame: FrameInfo,
    last_time: Option<f64>,
}

impl fmt::Debug for SceneRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRuntime")
            .field("ids", &self.ids)
            .field("stages", &self.stages)
            .field("next_stage", &self.next_stage)
            .field("drag", &self.drag)
            .field("config", &self.config)
            .field("loop_active", &self.loop_active)
            .field("frame", &self.frame)
            .field("last_time", &self.last_time)
            .finish_non_exhaustive()
    }
}

impl SceneRuntime {
    /// A runtime with no stages.
    pub fn new(scheduler: impl FrameScheduler + 'static, config: RuntimeConfig) -> Self {
        Self {
            ids: IdSource::new(),
            stages: Vec::new(),
            next_stage: 0,
            drag: DragSession::default(),
            scheduler: Box::new(scheduler),
            config,
            loop_active: false,
            frame: FrameInfo::default(),
            last_time: None,
        }
    }

    /// The shared serial counter.
    pub fn ids(&self) -> &IdSource {
        &self.ids
    }

    /// Registers a new stage.
    pub fn create_stage(&mut self, config: StageConfig) -> StageId {
        let id = StageId(self.next_stage);
        self.next_stage += 1;
        let scene = Scene::with_ids(self.ids.clone(), config.size);
        self.stages.push(Stage::new(id, scene, config));
        tracing::debug!(stage = ?id, "stage registered");
        id
    }

    /// Unregisters a stage and hands it back. A drag on that stage is
    /// dropped.
    pub fn remove_stage(&mut self, id: StageId) -> Option<Stage> {
        let index = self.stages.iter().position(|s| s.id() == id)?;
        if self.drag.node().is_some_and(|k| k.stage == id) {
            self.drag.cancel();
        }
        tracing::debug!(stage = ?id, "stage removed");
        Some(self.stages.remove(index))
    }

    /// A stage.
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id() == id)
    }

    /// A stage, mutably. Changes made through this reference do not start
    /// the frame loop; prefer [`SceneRuntime::with_stage`].
    pub fn stage_mut(&mut self, id: StageId) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.id() == id)
    }

    /// Ids of every registered stage, in creation order.
    pub fn stage_ids(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.iter().map(Stage::id)
    }

    /// Runs `f` on a stage, then starts the frame loop if the stage asked
    /// for a frame.
    pub fn with_stage<R>(&mut self, id: StageId, f: impl FnOnce(&mut Stage) -> R) -> Option<R> {
        let stage = self.stage_mut(id)?;
        let out = f(stage);
        if stage.take_wake() {
            self.handle_animation();
        }
        Some(out)
    }

    /// Routes a pointer input to a stage.
    ///
    /// Returns the shape that handled it, if any.
    pub fn dispatch(&mut self, id: StageId, input: &PointerInput) -> Option<NodeId> {
        let index = self.stages.iter().position(|s| s.id() == id)?;
        let stage = &mut self.stages[index];
        let handled = stage.handle_input(input, &mut self.drag);
        if stage.take_wake() {
            self.handle_animation();
        }
        handled
    }

    /// Whether a drag has moved and is still in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_moving()
    }

    /// The node being dragged, if any.
    pub fn drag_node(&self) -> Option<DragKey> {
        self.drag.node()
    }

    /// Starts running a stage's frame callback every frame.
    pub fn start(&mut self, id: StageId) {
        self.with_stage(id, |s| s.set_animating(true));
    }

    /// Stops running a stage's frame callback.
    pub fn stop(&mut self, id: StageId) {
        self.with_stage(id, |s| s.set_animating(false));
    }

    /// Sets the frame interval from a rate in frames per second.
    pub fn set_frame_rate(&mut self, hz: f64) {
        self.config.set_frame_rate(hz);
    }

    /// The configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Whether a frame has been requested and not yet run to a stop.
    pub fn is_loop_active(&self) -> bool {
        self.loop_active
    }

    /// The timing of the last frame.
    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    /// Requests a frame unless the loop is already running.
    pub fn handle_animation(&mut self) {
        if self.loop_active {
            return;
        }
        self.loop_active = true;
        tracing::debug!("frame loop started");
        self.scheduler.request_frame(self.config.frame_update_ms);
    }

    /// Whether any stage has frame work.
    pub fn is_animating(&self) -> bool {
        self.stages.iter().any(Stage::has_frame_work)
    }

    /// Runs one frame at host time `now_ms`.
    ///
    /// With work pending, every stage runs its frame and another frame is
    /// requested. Without work the loop stops and frame timing resets, so
    /// the next loop starts with a zero time step.
    pub fn run_frame(&mut self, now_ms: f64) {
        if !self.is_animating() {
            self.loop_active = false;
            self.last_time = None;
            tracing::debug!("frame loop stopped");
            return;
        }
        self.update_frame(now_ms);
        let frame = self.frame;
        for stage in &mut self.stages {
            stage.run_frame(&frame);
            // The loop is already scheduled; drop wake requests raised
            // while running the frame.
            let _ = stage.take_wake();
        }
        self.loop_active = true;
        self.scheduler.request_frame(self.config.frame_update_ms);
    }

    fn update_frame(&mut self, now_ms: f64) {
        match self.last_time {
            None => self.frame.time_diff_ms = 0.0,
            Some(last) => {
                self.frame.time_diff_ms = now_ms - last;
                self.frame.time_ms += self.frame.time_diff_ms;
            }
        }
        self.last_time = Some(now_ms);
    }
}
