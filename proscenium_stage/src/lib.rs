// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=proscenium_stage --heading-base-level=0

//! Proscenium Stage: pointer input, hit-testing and the frame loop.
//!
//! A [`Stage`] wraps a [`Scene`](proscenium_scene::Scene) and turns raw
//! [`PointerInput`] into node events:
//!
//! - Positions are normalized from host client coordinates.
//! - Shapes are hit-tested against their real paths on a hidden backstage
//!   surface, topmost first.
//! - The matched shape receives mousedown, mouseup, click, dblclick,
//!   touchstart, dbltap, touchend, mouseover or mousemove, in that order
//!   of priority, and the event [bubbles](dispatch) to its ancestors.
//! - Presses on draggable nodes start a drag; later moves drive it.
//!
//! A [`SceneRuntime`] owns the stages, the drag session they share, and the
//! animation loop. The host supplies a [`FrameScheduler`] and calls
//! [`SceneRuntime::run_frame`] whenever a requested frame comes due.
//!
//! ```rust
//! use kurbo::Point;
//! use proscenium_scene::{Node, shapes::Circle};
//! use proscenium_stage::{
//!     FrameScheduler, PointerInput, PointerKind, RuntimeConfig, SceneRuntime, StageConfig,
//! };
//!
//! struct NoFrames;
//! impl FrameScheduler for NoFrames {
//!     fn request_frame(&mut self, _interval_ms: f64) {}
//! }
//!
//! let mut runtime = SceneRuntime::new(NoFrames, RuntimeConfig::default());
//! let stage = runtime.create_stage(StageConfig::new(400.0, 300.0));
//! let ball = runtime
//!     .with_stage(stage, |stage| {
//!         let scene = stage.scene_mut();
//!         let layer = scene.create(Node::layer());
//!         scene.add_layer(layer).unwrap();
//!         let ball = scene.create(Node::shape(Circle::new(20.0)).with_position(100.0, 100.0));
//!         scene.add(layer, ball).unwrap();
//!         ball
//!     })
//!     .unwrap();
//!
//! let down = PointerInput::mouse(PointerKind::MouseDown, Point::new(100.0, 100.0));
//! assert_eq!(runtime.dispatch(stage, &down), Some(ball));
//! let miss = PointerInput::mouse(PointerKind::MouseDown, Point::new(10.0, 10.0));
//! assert_eq!(runtime.dispatch(stage, &miss), None);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod config;
pub mod dispatch;
mod input;
mod runtime;
mod stage;

pub use config::{RuntimeConfig, StageConfig};
pub use input::{PointerInput, PointerKind};
pub use runtime::{DragKey, FrameInfo, FrameScheduler, SceneRuntime, StageId};
pub use stage::{FrameCallback, Stage};
