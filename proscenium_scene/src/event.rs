// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event types, payloads and per-node listener tables.
//!
//! Listeners are bound with a space-separated list of event names, each
//! optionally suffixed with `.namespace`:
//!
//! ```
//! use proscenium_scene::{Node, Scene, shapes::Circle};
//! # use kurbo::Size;
//! let mut scene = Scene::new(Size::new(100.0, 100.0));
//! let dot = scene.create(Node::shape(Circle::new(4.0)));
//! scene.on(dot, "click mouseover.hud", |_, _| {}).unwrap();
//! assert!(scene.on(dot, "hover", |_, _| {}).is_err());
//!
//! // Drop everything bound in the `hud` namespace.
//! scene.off(dot, ".hud").unwrap();
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::str::FromStr;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;

use crate::{NodeId, Scene, SceneError};

/// Events a node can listen for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Pointer entered the shape.
    MouseOver,
    /// Pointer moved over the shape.
    MouseMove,
    /// Pointer left the shape.
    MouseOut,
    /// Button pressed over the shape.
    MouseDown,
    /// Button released over the shape.
    MouseUp,
    /// Press and release on the same shape without a drag in between.
    Click,
    /// Second click within the double-click window.
    DblClick,
    /// Single touch began over the shape.
    TouchStart,
    /// Single touch moved over the shape.
    TouchMove,
    /// Touch ended over the shape.
    TouchEnd,
    /// Second touch within the double-tap window.
    DblTap,
    /// First movement of a drag.
    DragStart,
    /// Every movement of a drag.
    DragMove,
    /// Drag finished after moving.
    DragEnd,
}

impl EventType {
    /// Every event type.
    pub const ALL: [Self; 14] = [
        Self::MouseOver,
        Self::MouseMove,
        Self::MouseOut,
        Self::MouseDown,
        Self::MouseUp,
        Self::Click,
        Self::DblClick,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::DblTap,
        Self::DragStart,
        Self::DragMove,
        Self::DragEnd,
    ];

    /// Lowercase name used in binding strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MouseOver => "mouseover",
            Self::MouseMove => "mousemove",
            Self::MouseOut => "mouseout",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::DblTap => "dbltap",
            Self::DragStart => "dragstart",
            Self::DragMove => "dragmove",
            Self::DragEnd => "dragend",
        }
    }
}

impl FromStr for EventType {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SceneError::UnknownEvent(s.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event type.
    pub kind: EventType,
    /// Shape the event was detected on.
    pub target: NodeId,
    /// Node whose listeners are running.
    pub current_target: NodeId,
    /// For mouseover the previous target, for mouseout the new one.
    pub related: Option<NodeId>,
    /// Stage-space pointer position, if known.
    pub pointer: Option<Point>,
    /// Input timestamp.
    pub time_ms: u64,
    /// Set to stop bubbling to further ancestors.
    pub cancel_bubble: bool,
}

impl Event {
    /// An event targeted at `target`.
    pub fn new(kind: EventType, target: NodeId) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            related: None,
            pointer: None,
            time_ms: 0,
            cancel_bubble: false,
        }
    }

    /// Sets the pointer position.
    #[must_use]
    pub fn with_pointer(mut self, pointer: Option<Point>) -> Self {
        self.pointer = pointer;
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    /// Sets the related node.
    #[must_use]
    pub fn with_related(mut self, related: Option<NodeId>) -> Self {
        self.related = related;
        self
    }
}

/// Shared listener callback.
pub type Handler = Rc<RefCell<dyn FnMut(&mut Scene, &mut Event)>>;

/// Identifies one `on` call; removes every binding it made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

#[derive(Clone)]
struct Binding {
    id: HandlerId,
    namespace: Option<String>,
    handler: Handler,
}

/// Listener table of one node.
#[derive(Clone, Default)]
pub struct Listeners {
    bindings: HashMap<EventType, Vec<Binding>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, list) in &self.bindings {
            map.entry(kind, &list.len());
        }
        map.finish()
    }
}

impl Listeners {
    /// Number of bindings for `kind`.
    pub fn count(&self, kind: EventType) -> usize {
        self.bindings.get(&kind).map_or(0, Vec::len)
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.values().all(Vec::is_empty)
    }

    fn add(&mut self, kind: EventType, namespace: Option<&str>, id: HandlerId, handler: Handler) {
        self.bindings.entry(kind).or_default().push(Binding {
            id,
            namespace: namespace.map(String::from),
            handler,
        });
    }

    fn remove(&mut self, kind: Option<EventType>, namespace: Option<&str>) {
        let matches = |b: &Binding| namespace.is_none_or(|ns| b.namespace.as_deref() == Some(ns));
        match kind {
            Some(kind) => {
                if let Some(list) = self.bindings.get_mut(&kind) {
                    list.retain(|b| !matches(b));
                }
            }
            None => {
                for list in self.bindings.values_mut() {
                    list.retain(|b| !matches(b));
                }
            }
        }
        self.bindings.retain(|_, list| !list.is_empty());
    }

    fn remove_id(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        for list in self.bindings.values_mut() {
            let before = list.len();
            list.retain(|b| b.id != id);
            removed |= list.len() != before;
        }
        self.bindings.retain(|_, list| !list.is_empty());
        removed
    }

    fn snapshot(&self, kind: EventType) -> SmallVec<[Handler; 2]> {
        self.bindings
            .get(&kind)
            .map(|list| list.iter().map(|b| b.handler.clone()).collect())
            .unwrap_or_default()
    }
}

/// Splits `"click.ns"` into the type and namespace. An empty type (as in
/// `".ns"`) matches every type.
fn parse_binding(token: &str) -> Result<(Option<EventType>, Option<&str>), SceneError> {
    let (name, namespace) = match token.split_once('.') {
        Some((name, ns)) => (name, Some(ns).filter(|ns| !ns.is_empty())),
        None => (token, None),
    };
    let kind = if name.is_empty() {
        None
    } else {
        Some(name.parse::<EventType>()?)
    };
    Ok((kind, namespace))
}

impl Scene {
    /// Binds `handler` to each event type in `types`.
    ///
    /// Nothing is bound if any name is unknown.
    pub fn on(
        &mut self,
        node: NodeId,
        types: &str,
        handler: impl FnMut(&mut Self, &mut Event) + 'static,
    ) -> Result<HandlerId, SceneError> {
        let mut parsed: SmallVec<[(EventType, Option<&str>); 2]> = SmallVec::new();
        for token in types.split_whitespace() {
            match parse_binding(token)? {
                (Some(kind), ns) => parsed.push((kind, ns)),
                (None, _) => return Err(SceneError::UnknownEvent(token.to_string())),
            }
        }
        let id = HandlerId(self.next_handler);
        let handler: Handler = Rc::new(RefCell::new(handler));
        let n = self.node_mut(node)?;
        for (kind, ns) in parsed {
            n.listeners.add(kind, ns, id, handler.clone());
        }
        self.next_handler += 1;
        Ok(id)
    }

    /// Removes bindings. `"click"` drops every click binding, `"click.ns"`
    /// only those in `ns`, `".ns"` everything in `ns`.
    pub fn off(&mut self, node: NodeId, types: &str) -> Result<(), SceneError> {
        let mut parsed: SmallVec<[(Option<EventType>, Option<&str>); 2]> = SmallVec::new();
        for token in types.split_whitespace() {
            parsed.push(parse_binding(token)?);
        }
        let n = self.node_mut(node)?;
        for (kind, ns) in parsed {
            if kind.is_some() || ns.is_some() {
                n.listeners.remove(kind, ns);
            }
        }
        Ok(())
    }

    /// Removes every binding made by one [`Scene::on`] call.
    pub fn off_handler(&mut self, node: NodeId, id: HandlerId) -> bool {
        self.node_mut(node)
            .map(|n| n.listeners.remove_id(id))
            .unwrap_or(false)
    }

    /// Whether `node` has any binding for `kind`.
    pub fn has_listeners(&self, node: NodeId, kind: EventType) -> bool {
        self.get(node).is_some_and(|n| n.listeners.count(kind) > 0)
    }

    /// Handlers currently bound to `node` for `kind`.
    pub fn handlers(&self, node: NodeId, kind: EventType) -> SmallVec<[Handler; 2]> {
        self.get(node)
            .map(|n| n.listeners.snapshot(kind))
            .unwrap_or_default()
    }

    /// Runs the handlers bound to `node` for `event.kind`, with
    /// `current_target` set to `node`.
    ///
    /// Handlers are snapshotted first, so bindings added or removed by a
    /// handler take effect on the next event. A handler that is already
    /// running (re-entrant fire) is skipped.
    pub fn fire(&mut self, node: NodeId, event: &mut Event) {
        event.current_target = node;
        for handler in self.handlers(node, event.kind) {
            match handler.try_borrow_mut() {
                Ok(mut f) => f(self, event),
                Err(_) => {
                    tracing::warn!(?node, kind = %event.kind, "skipping re-entrant handler");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;
    use kurbo::Size;

    #[test]
    fn names_round_trip() {
        for kind in EventType::ALL {
            assert_eq!(kind.as_str().parse::<EventType>(), Ok(kind));
        }
        assert_eq!(
            "wheel".parse::<EventType>(),
            Err(SceneError::UnknownEvent("wheel".to_string()))
        );
    }

    #[test]
    fn off_by_type_and_namespace() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let n = scene.create(Node::group());
        scene.on(n, "click mouseover.a", |_, _| {}).unwrap();
        scene.on(n, "click.a", |_, _| {}).unwrap();
        scene.on(n, "click.b", |_, _| {}).unwrap();
        assert_eq!(scene.handlers(n, EventType::Click).len(), 3);

        scene.off(n, "click.a").unwrap();
        assert_eq!(scene.handlers(n, EventType::Click).len(), 2);
        assert!(scene.has_listeners(n, EventType::MouseOver));

        scene.off(n, ".a").unwrap();
        assert!(!scene.has_listeners(n, EventType::MouseOver));

        scene.off(n, "click").unwrap();
        assert!(!scene.has_listeners(n, EventType::Click));
    }

    #[test]
    fn unknown_type_binds_nothing() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let n = scene.create(Node::group());
        assert!(scene.on(n, "click bogus", |_, _| {}).is_err());
        assert!(!scene.has_listeners(n, EventType::Click));
    }

    #[test]
    fn off_handler_removes_all_types_of_one_call() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let n = scene.create(Node::group());
        let id = scene.on(n, "mousedown mouseup", |_, _| {}).unwrap();
        let keep = scene.on(n, "mouseup", |_, _| {}).unwrap();
        assert_ne!(id, keep);
        assert!(scene.off_handler(n, id));
        assert!(!scene.has_listeners(n, EventType::MouseDown));
        assert_eq!(scene.handlers(n, EventType::MouseUp).len(), 1);
        assert!(!scene.off_handler(n, id));
    }

    #[test]
    fn fire_sets_current_target_and_mutates_scene() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let n = scene.create(Node::group());
        scene
            .on(n, "click", move |scene, ev| {
                assert_eq!(ev.current_target, n);
                scene.move_by(n, 1.0, 0.0);
                ev.cancel_bubble = true;
            })
            .unwrap();
        let mut ev = Event::new(EventType::Click, n);
        scene.fire(n, &mut ev);
        scene.fire(n, &mut ev);
        assert!(ev.cancel_bubble);
        assert_eq!(scene.get(n).unwrap().position().x, 2.0);
    }
}
