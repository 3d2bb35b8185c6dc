// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=proscenium_event_state --heading-base-level=0

//! Proscenium Event State: pointer interaction state machines.
//!
//! Small state holders for the interactions a stage has to remember between
//! input events:
//!
//! - [`drag`]: the single active drag session, axis constraints and strict
//!   drag bounds.
//! - [`click`]: per-node double-click / double-tap windows.
//! - [`hover`]: the current pointer target, whether it was seen during the
//!   current hit-test pass, and a deferred mouseout target.
//!
//! None of these know about the scene graph. They are generic over the node
//! key type and take positions and timestamps from the caller, so they can be
//! driven directly from tests.
//!
//! ```rust
//! use kurbo::{Point, Vec2};
//! use proscenium_event_state::drag::{DragBounds, DragConstraint, DragSession};
//!
//! let mut session = DragSession::default();
//! session.begin(7_u32, Vec2::new(5.0, 5.0));
//!
//! let bounds = DragBounds { right: Some(100.0), ..DragBounds::default() };
//! let moved = bounds.apply(
//!     Point::new(10.0, 10.0),
//!     Point::new(150.0, 40.0) - session.offset(),
//!     DragConstraint::Horizontal,
//! );
//! // Out of bounds on x, and y is locked by the constraint.
//! assert_eq!(moved, Point::new(10.0, 10.0));
//!
//! assert!(session.update().unwrap().first_move);
//! assert!(session.is_dragging(7));
//! assert!(session.end().unwrap().moved);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

pub mod click;
pub mod drag;
pub mod hover;
