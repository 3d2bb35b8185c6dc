// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Size;
use proscenium_render::{RecordingCanvas, Surface};

use crate::container::Container;
use crate::transition::Transition;

/// A container with its own surface, redraw flag and transition list.
///
/// The surface always matches the stage size. A culling layer draws (and
/// hit-tests) only the children whose local bounds overlap the visible area.
#[derive(Debug)]
pub struct Layer {
    pub(crate) container: Container,
    /// Taken out while the layer is being drawn.
    pub(crate) surface: Option<Box<dyn Surface>>,
    pub(crate) size: Size,
    pub(crate) needs_redraw: bool,
    pub(crate) culling: bool,
    pub(crate) transitions: Vec<Transition>,
}

impl Layer {
    pub(crate) fn new(surface: Box<dyn Surface>, culling: bool) -> Self {
        let size = surface.size();
        Self {
            container: Container::default(),
            surface: Some(surface),
            size,
            needs_redraw: false,
            culling,
            transitions: Vec::new(),
        }
    }

    pub(crate) fn recording(culling: bool) -> Self {
        Self::new(Box::new(RecordingCanvas::new(Size::ZERO)), culling)
    }

    /// Children container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Whether a redraw is pending.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Whether this layer culls by bounds.
    pub fn is_culling(&self) -> bool {
        self.culling
    }

    /// Number of running transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// The surface.
    pub fn surface(&self) -> Option<&dyn Surface> {
        self.surface.as_deref()
    }

    pub(crate) fn resize(&mut self, size: Size) {
        self.size = size;
        if let Some(surface) = &mut self.surface {
            surface.resize(size);
        }
    }
}
