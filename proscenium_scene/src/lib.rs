// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=proscenium_scene --heading-base-level=0

//! Proscenium Scene: a retained 2D scene graph.
//!
//! A [`Scene`] owns every node of one stage in a generational arena. Nodes
//! are shapes, groups or layers:
//!
//! - Shapes wrap a [`Drawable`] (circles, rectangles, polygons, stars,
//!   images and tile maps live in [`shapes`]) plus a paint style.
//! - Groups hold ordered children and report bounds enclosing the visible
//!   ones.
//! - Layers sit directly on the stage. Each owns a [`Surface`], a redraw
//!   flag and its running transitions. A culling layer draws only the
//!   children whose bounds overlap the visible area.
//!
//! Every node carries a position, scale, rotation, pivot and opacity. Local
//! bounds are cached per node without the position term, so moving a node
//! never recomputes its geometry.
//!
//! ```rust
//! use kurbo::Size;
//! use proscenium_geom::BoundsRect;
//! use proscenium_scene::{Node, Scene, shapes::Circle};
//!
//! let mut scene = Scene::new(Size::new(400.0, 300.0));
//! let layer = scene.create(Node::layer());
//! scene.add_layer(layer).unwrap();
//!
//! let ball = scene.create(Node::shape(Circle::new(20.0)).with_position(100.0, 100.0));
//! scene.add(layer, ball).unwrap();
//! assert_eq!(scene.bounds_local(ball).unwrap(), BoundsRect::new(80.0, 80.0, 40.0, 40.0));
//!
//! let report = scene.draw_layer(layer).unwrap();
//! assert_eq!(report.drawn, 1);
//! ```
//!
//! Listeners and namespaced bindings are in [`Scene::on`]; drag behavior is
//! pluggable through [`DragHandler`]; property tweens are started with
//! [`Scene::transition_to`].
//!
//! [`Surface`]: proscenium_render::Surface
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod container;
mod drag;
mod error;
mod event;
mod id;
mod layer;
mod node;
mod scene;
pub mod shapes;
pub mod tiles;
mod transition;
mod view;

pub use container::{Container, DrawOrder};
pub use drag::{DefaultDrag, DragHandler};
pub use error::{DrawError, SceneError};
pub use event::{Event, EventType, Handler, HandlerId, Listeners};
pub use id::{IdSource, NodeId};
pub use layer::Layer;
pub use node::{Node, NodeFlags, NodeKind, ParentLink};
pub use scene::{DrawReport, Scene};
pub use shapes::{DrawContext, Drawable, Shape, ShapeStyle};
pub use transition::{
    Easing, ScalarProperty, TransitionCallback, TransitionConfig, TransitionTarget,
    VectorProperty,
};
pub use view::ViewState;
