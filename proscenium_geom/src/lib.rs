// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=proscenium_geom --heading-base-level=0

//! Proscenium Geom: transforms and bounds for a retained 2D scene graph.
//!
//! Two small value types carry all of the spatial math the scene graph needs:
//!
//! - [`Transform`]: a 2D affine matrix stored as six coefficients, with the
//!   closed-form `rotate`/`scale`/`translate`/`invert` updates used when
//!   composing node transforms from the stage down to a leaf.
//! - [`BoundsRect`]: an axis-aligned rectangle with union (`enclose_*`), a
//!   strict overlap test, and a transform that takes a cheap path when the
//!   matrix has no rotation.
//!
//! Both convert to and from their `kurbo` counterparts ([`kurbo::Affine`] and
//! [`kurbo::Rect`]) so that rendering backends can consume them directly.
//!
//! ## Example
//!
//! ```rust
//! use proscenium_geom::{BoundsRect, Transform};
//!
//! let mut t = Transform::IDENTITY;
//! t.translate(100.0, 100.0).scale(2.0, 2.0);
//!
//! let local = BoundsRect::new(-20.0, -20.0, 40.0, 40.0);
//! let placed = local.transformed(&t);
//! assert_eq!(placed, BoundsRect::new(60.0, 60.0, 80.0, 80.0));
//!
//! let back = t.inverse().transform_point(kurbo::Point::new(100.0, 100.0));
//! assert_eq!(back, kurbo::Point::ORIGIN);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod bounds;
mod transform;

pub use bounds::BoundsRect;
pub use transform::Transform;
