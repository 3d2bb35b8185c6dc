// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=proscenium_render --heading-base-level=0

//! Proscenium Render: the drawing surface contract for the scene graph.
//!
//! The scene graph never rasterizes anything itself. It talks to a
//! [`Canvas`], an immediate-mode 2D context with a save/restore state stack,
//! a current transform, global alpha, a composite mode, a current path, and
//! fill/stroke/image/text operations. A [`Surface`] is a canvas with a size that
//! can be cleared, resized and blitted onto another surface; every layer owns
//! one, and the stage owns two more (a compositing buffer and the hidden
//! hit-testing "backstage").
//!
//! [`RecordingCanvas`] is the reference surface: it keeps the current path in
//! device space as a [`kurbo::BezPath`] so that [`Canvas::is_point_in_path`]
//! is exact, and records every paint operation together with the state it was
//! issued under. It does **not** rasterize; it exists for tests, debugging,
//! and as the hit-testing surface.
//!
//! ```rust
//! use kurbo::{Affine, Point, Rect, Size};
//! use peniko::{Brush, Color};
//! use proscenium_render::{Canvas, RecordingCanvas, Surface};
//!
//! let mut canvas = RecordingCanvas::new(Size::new(100.0, 100.0));
//! canvas.set_transform(Affine::translate((10.0, 10.0)));
//! canvas.begin_path();
//! canvas.rect(Rect::new(0.0, 0.0, 20.0, 20.0));
//! canvas.fill(&Brush::Solid(Color::BLACK));
//!
//! assert!(canvas.is_point_in_path(Point::new(15.0, 15.0)));
//! assert!(!canvas.is_point_in_path(Point::new(5.0, 5.0)));
//! assert_eq!(canvas.ops().len(), 1);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod canvas;
mod recording;

pub use canvas::{
    AVERAGE_ADVANCE_EM, Canvas, CanvasExt, Font, ImageHandle, ImageId, RenderError, Surface,
};
pub use recording::{CanvasOp, CanvasState, RecordMode, RecordingCanvas};

pub use peniko::{BlendMode, Brush, Color};
