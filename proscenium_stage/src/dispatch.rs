// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubbling: walk an event from its target up to the layer.
//!
//! A bubble path lists the target followed by each ancestor up to, and
//! including, its layer. The path is computed before any handler runs, so a
//! handler that restructures the scene does not change who receives the
//! event; nodes destroyed along the way are skipped.
//!
//! Mouseover and mouseout carry a counterpart: the node the pointer came from
//! (for mouseover) or went to (for mouseout). Walking both chains up in step,
//! an ancestor that sits at the same height in the counterpart's chain is the
//! same container on both sides, so it does not receive the event.
//!
//! ```
//! use kurbo::Size;
//! use proscenium_scene::{EventType, Node, Scene, shapes::Circle};
//! use proscenium_stage::dispatch;
//!
//! let mut scene = Scene::new(Size::new(100.0, 100.0));
//! let layer = scene.create(Node::layer());
//! scene.add_layer(layer).unwrap();
//! let group = scene.create(Node::group());
//! let a = scene.create(Node::shape(Circle::new(5.0)));
//! let b = scene.create(Node::shape(Circle::new(5.0)));
//! scene.add(layer, group).unwrap();
//! scene.add(group, a).unwrap();
//! scene.add(group, b).unwrap();
//!
//! // Moving from `a` to `b` enters `b` but not `group` or `layer`.
//! let path = dispatch::bubble_path(&scene, b, Some(a), EventType::MouseOver);
//! let receivers: Vec<_> = path.iter().filter(|s| !s.skip).map(|s| s.node).collect();
//! assert_eq!(receivers, vec![b]);
//! ```

use proscenium_scene::{Event, EventType, NodeId, Scene};
use smallvec::SmallVec;

/// One entry of a bubble path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleStep {
    /// Node to deliver to.
    pub node: NodeId,
    /// Whether the node's own bindings are skipped at this step.
    pub skip: bool,
}

/// A bubble path, target first.
pub type BubblePath = SmallVec<[BubbleStep; 8]>;

fn ancestry(scene: &Scene, node: NodeId) -> SmallVec<[NodeId; 8]> {
    let mut out = SmallVec::new();
    let mut cur = Some(node);
    while let Some(n) = cur {
        if !scene.is_alive(n) {
            break;
        }
        out.push(n);
        cur = scene.parent(n).and_then(|p| p.node());
    }
    out
}

/// Builds the bubble path for an event of type `kind` targeted at `target`.
pub fn bubble_path(
    scene: &Scene,
    target: NodeId,
    counterpart: Option<NodeId>,
    kind: EventType,
) -> BubblePath {
    let paired = matches!(kind, EventType::MouseOver | EventType::MouseOut);
    let other = match counterpart {
        Some(c) if paired => ancestry(scene, c),
        _ => SmallVec::new(),
    };
    ancestry(scene, target)
        .into_iter()
        .enumerate()
        .map(|(depth, node)| BubbleStep {
            node,
            skip: other.get(depth) == Some(&node),
        })
        .collect()
}

/// Delivers `event` along `path`.
///
/// At each live step the node's bindings run (unless skipped), then
/// `after_step` runs for the same node. Delivery stops once a handler sets
/// [`Event::cancel_bubble`].
pub fn run(
    scene: &mut Scene,
    path: &[BubbleStep],
    event: &mut Event,
    mut after_step: impl FnMut(&mut Scene, NodeId, &mut Event),
) {
    for step in path {
        if !scene.is_alive(step.node) {
            continue;
        }
        if !step.skip {
            scene.fire(step.node, event);
        }
        after_step(scene, step.node, event);
        if event.cancel_bubble {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Size;
    use proscenium_scene::Node;
    use proscenium_scene::shapes::Circle;

    struct Tree {
        scene: Scene,
        layer: NodeId,
        left: NodeId,
        right: NodeId,
        a: NodeId,
        b: NodeId,
        c: NodeId,
    }

    /// layer ─┬─ left ─┬─ a
    ///        │        └─ b
    ///        └─ right ── c
    fn tree() -> Tree {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let layer = scene.create(Node::layer());
        scene.add_layer(layer).unwrap();
        let left = scene.create(Node::group());
        let right = scene.create(Node::group());
        let a = scene.create(Node::shape(Circle::new(1.0)));
        let b = scene.create(Node::shape(Circle::new(1.0)));
        let c = scene.create(Node::shape(Circle::new(1.0)));
        scene.add(layer, left).unwrap();
        scene.add(layer, right).unwrap();
        scene.add(left, a).unwrap();
        scene.add(left, b).unwrap();
        scene.add(right, c).unwrap();
        Tree {
            scene,
            layer,
            left,
            right,
            a,
            b,
            c,
        }
    }

    fn receivers(path: &BubblePath) -> Vec<NodeId> {
        path.iter().filter(|s| !s.skip).map(|s| s.node).collect()
    }

    #[test]
    fn plain_events_reach_every_ancestor() {
        let t = tree();
        let path = bubble_path(&t.scene, t.a, Some(t.b), EventType::Click);
        assert_eq!(receivers(&path), vec![t.a, t.left, t.layer]);
    }

    #[test]
    fn paired_events_skip_shared_containers() {
        let t = tree();
        let out = bubble_path(&t.scene, t.a, Some(t.c), EventType::MouseOut);
        // `left` and `right` differ; the layer is shared.
        assert_eq!(receivers(&out), vec![t.a, t.left]);
        let over = bubble_path(&t.scene, t.c, Some(t.a), EventType::MouseOver);
        assert_eq!(receivers(&over), vec![t.c, t.right]);
    }

    #[test]
    fn depth_mismatch_does_not_skip() {
        let t = tree();
        // `a` sits one level deeper than `right`, so the chains never line up.
        let over = bubble_path(&t.scene, t.a, Some(t.right), EventType::MouseOver);
        assert_eq!(receivers(&over), vec![t.a, t.left, t.layer]);
    }

    #[test]
    fn cancel_stops_delivery() {
        let mut t = tree();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for node in [t.a, t.left, t.layer] {
            let seen = seen.clone();
            t.scene
                .on(node, "mouseup", move |_: &mut Scene, e: &mut Event| {
                    seen.borrow_mut().push(e.current_target);
                    e.cancel_bubble = e.current_target != e.target;
                })
                .unwrap();
        }
        let path = bubble_path(&t.scene, t.a, None, EventType::MouseUp);
        let mut visited = Vec::new();
        let mut event = Event::new(EventType::MouseUp, t.a);
        run(&mut t.scene, &path, &mut event, |_, node, _| visited.push(node));
        assert_eq!(*seen.borrow(), vec![t.a, t.left]);
        assert_eq!(visited, vec![t.a, t.left]);
    }

    #[test]
    fn destroyed_nodes_are_skipped() {
        let mut t = tree();
        let path = bubble_path(&t.scene, t.b, None, EventType::Click);
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let b = t.b;
        t.scene
            .on(t.b, "click", move |scene: &mut Scene, _: &mut Event| {
                scene.remove(b).unwrap();
            })
            .unwrap();
        t.scene
            .on(t.layer, "click", move |_: &mut Scene, _: &mut Event| {
                *counter.borrow_mut() += 1;
            })
            .unwrap();
        let mut event = Event::new(EventType::Click, t.b);
        run(&mut t.scene, &path, &mut event, |_, _, _| {});
        assert!(!t.scene.is_alive(t.b));
        assert_eq!(*hits.borrow(), 1);
    }
}
