// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stage and runtime configuration.

use kurbo::Size;
use proscenium_event_state::click::DEFAULT_WINDOW_MS;

/// Settings for a new [`Stage`](crate::Stage).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageConfig {
    /// Size of the view and of every layer surface.
    pub size: Size,
    /// Time in which a second click or tap on the same shape counts as a
    /// double click or double tap.
    pub double_click_window_ms: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            size: Size::ZERO,
            double_click_window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

impl StageConfig {
    /// A stage of the given size with default timings.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            ..Self::default()
        }
    }

    /// Sets the double click window.
    #[must_use]
    pub fn with_double_click_window_ms(mut self, window_ms: u64) -> Self {
        self.double_click_window_ms = window_ms;
        self
    }
}

/// Settings for the [`SceneRuntime`](crate::SceneRuntime) frame loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Frame interval passed to the scheduler, for hosts that drive frames
    /// from a timer.
    pub frame_update_ms: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_update_ms: 1000.0 / 60.0,
        }
    }
}

impl RuntimeConfig {
    /// Sets the interval from a rate in frames per second.
    pub fn set_frame_rate(&mut self, hz: f64) {
        self.frame_update_ms = 1000.0 / hz;
    }
}
