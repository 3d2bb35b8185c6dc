// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;

use crate::{Node, NodeId};

/// Comparator used to order children for drawing.
pub type DrawOrder = Rc<dyn Fn(&Node, &Node) -> Ordering>;

/// Ordered children plus a name index.
///
/// Child order is the z-order: each child's index equals its position here.
#[derive(Default)]
pub struct Container {
    pub(crate) children: Vec<NodeId>,
    pub(crate) names: HashMap<String, NodeId>,
    pub(crate) draw_order: Option<DrawOrder>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("children", &self.children)
            .field("names", &self.names)
            .field("draw_order", &self.draw_order.is_some())
            .finish()
    }
}

impl Container {
    /// Children in z-order, bottom first.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Child registered under `name`.
    pub fn child_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether a draw-order comparator is set.
    pub fn has_draw_order(&self) -> bool {
        self.draw_order.is_some()
    }

    pub(crate) fn register_name(&mut self, name: Option<&str>, id: NodeId) {
        if let Some(name) = name {
            self.names.insert(String::from(name), id);
        }
    }

    pub(crate) fn unregister_name(&mut self, name: Option<&str>, id: NodeId) {
        if let Some(name) = name
            && self.names.get(name) == Some(&id)
        {
            self.names.remove(name);
        }
    }
}
