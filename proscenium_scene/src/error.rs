// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use proscenium_render::RenderError;

use crate::NodeId;

/// Errors from structural and state operations on a [`Scene`](crate::Scene).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The handle refers to a node that has been removed.
    #[error("node {0:?} no longer exists")]
    StaleNode(NodeId),
    /// The node's ancestor chain does not reach the stage.
    #[error("node {0:?} is not attached to a stage")]
    Detached(NodeId),
    /// The node is not inside any layer.
    #[error("node {0:?} is not inside a layer")]
    NoLayer(NodeId),
    /// Children can only be added to groups and layers.
    #[error("node {0:?} cannot hold children")]
    NotAContainer(NodeId),
    /// The node already has a parent.
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    /// Layers live directly under the stage.
    #[error("layer {0:?} can only be added to the stage")]
    LayerOutsideStage(NodeId),
    /// The operation needs a layer.
    #[error("node {0:?} is not a layer")]
    NotALayer(NodeId),
    /// The node is not a shape of the requested type.
    #[error("node {0:?} does not hold the requested shape type")]
    ShapeTypeMismatch(NodeId),
    /// Re-parenting would put a node inside its own subtree.
    #[error("node {0:?} cannot be moved into its own subtree")]
    Cycle(NodeId),
    /// The event type string is not recognized.
    #[error("unknown event type `{0}`")]
    UnknownEvent(String),
}

/// Errors from drawing a single shape.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DrawError {
    /// The surface rejected an operation, typically a missing image.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The shape has no drawable geometry.
    #[error("shape geometry is degenerate")]
    Degenerate,
}
