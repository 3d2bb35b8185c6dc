// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `proscenium_scene` crate.
//!
//! These build small scenes through the public API and check what ends up on
//! the layer surfaces, how bounds react to edits, and how transitions and
//! listeners interact with structural changes.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use peniko::Color;
use proscenium_geom::BoundsRect;
use proscenium_render::{CanvasOp, ImageHandle, ImageId, RecordingCanvas};
use proscenium_scene::shapes::{Circle, RectShape, Star, TileMap};
use proscenium_scene::tiles::{TileSet, TileSheetConfig};
use proscenium_scene::{Easing, Event, EventType, Node, NodeId, Scene, TransitionConfig};

fn scene_with_layer(culling: bool) -> (Scene, NodeId) {
    let mut scene = Scene::new(Size::new(200.0, 100.0));
    let layer = scene.create(if culling {
        Node::culling_layer()
    } else {
        Node::layer()
    });
    scene.add_layer(layer).unwrap();
    (scene, layer)
}

fn fills(scene: &Scene, layer: NodeId) -> usize {
    scene
        .layer_surface_as::<RecordingCanvas>(layer)
        .unwrap()
        .fill_count()
}

#[test]
fn nested_group_transforms_compose() {
    let (mut scene, layer) = scene_with_layer(false);
    let outer = scene.create(Node::group().with_position(50.0, 0.0).with_scale(2.0, 2.0));
    let inner = scene.create(Node::group().with_position(10.0, 10.0));
    let rect = scene.create(Node::shape(RectShape::new(5.0, 5.0)));
    scene.add(layer, outer).unwrap();
    scene.add(outer, inner).unwrap();
    scene.add(inner, rect).unwrap();

    let t = scene.transform_view(rect).unwrap();
    assert_eq!(t.transform_point(Point::new(5.0, 5.0)), Point::new(80.0, 30.0));
    assert_eq!(
        scene.bounds_local(outer).unwrap(),
        BoundsRect::new(70.0, 20.0, 10.0, 10.0)
    );
    assert_eq!(scene.absolute_position(rect).unwrap(), Point::new(60.0, 10.0));
}

#[test]
fn bounds_cache_survives_moves_but_not_reshapes() {
    let (mut scene, layer) = scene_with_layer(false);
    let group = scene.create(Node::group());
    let star = scene.create(Node::shape(Star::new(5, 4.0, 10.0)));
    scene.add(layer, group).unwrap();
    scene.add(group, star).unwrap();

    let first = scene.bounds_local(group).unwrap();
    let computed = scene.bounds_computations();
    let _ = scene.bounds_local(group).unwrap();
    assert_eq!(scene.bounds_computations(), computed);

    // Moving the child dirties the group but not the star itself.
    scene.move_by(star, 5.0, 0.0);
    let moved = scene.bounds_local(group).unwrap();
    assert_eq!(scene.bounds_computations(), computed + 1);
    assert_eq!(moved.x, first.x + 5.0);

    scene.set_scale(star, 2.0, 2.0);
    let scaled = scene.bounds_local(group).unwrap();
    assert_eq!(scene.bounds_computations(), computed + 3);
    assert!((scaled.width - first.width * 2.0).abs() < 1e-9);
}

#[test]
fn culling_layer_only_draws_visible_children() {
    let (mut scene, layer) = scene_with_layer(true);
    for i in 0..10 {
        let rect = scene.create(
            Node::shape(RectShape::new(10.0, 10.0))
                .with_position(f64::from(i) * 50.0, 10.0)
                .with_fill(Color::BLACK),
        );
        scene.add(layer, rect).unwrap();
    }
    // x = 0, 50, 100 and 150 fall inside a 200 wide view.
    let report = scene.draw_layer(layer).unwrap();
    assert_eq!(report.drawn, 4);
    assert_eq!(fills(&scene, layer), 4);

    scene.view_mut().set_target_pos(105.0, 0.0);
    scene.mark_layers_for_redraw();
    let report = scene.draw_layer(layer).unwrap();
    assert_eq!(report.drawn, 5);
}

#[test]
fn hidden_nodes_are_not_drawn() {
    let (mut scene, layer) = scene_with_layer(false);
    let group = scene.create(Node::group().with_visible(false));
    let a = scene.create(Node::shape(Circle::new(3.0)).with_fill(Color::BLACK));
    let b = scene.create(Node::shape(Circle::new(3.0)).with_fill(Color::BLACK));
    scene.add(layer, group).unwrap();
    scene.add(group, a).unwrap();
    scene.add(layer, b).unwrap();
    scene.draw_layer(layer).unwrap();
    assert_eq!(fills(&scene, layer), 1);

    scene.set_visible(layer, false);
    scene.draw_layer(layer).unwrap();
    assert_eq!(fills(&scene, layer), 0);
}

#[test]
fn tile_map_in_scene_draws_visible_tiles() {
    let (mut scene, layer) = scene_with_layer(false);
    let mut set = TileSet::new();
    set.add_tile_sheet(TileSheetConfig {
        image: Some(ImageHandle::loaded(ImageId(1), Size::new(64.0, 32.0))),
        image_size: Size::new(64.0, 32.0),
        tile_size: Size::new(32.0, 32.0),
        first_gid: 1,
        ..TileSheetConfig::default()
    });
    let map = TileMap::new(
        20,
        20,
        Size::new(32.0, 32.0),
        set,
        (0..400).map(|i| Some(1 + i % 2)),
    );
    let node = scene.create(Node::shape(map));
    scene.add(layer, node).unwrap();
    scene.draw_layer(layer).unwrap();

    let surface = scene.layer_surface_as::<RecordingCanvas>(layer).unwrap();
    let images = surface
        .ops()
        .iter()
        .filter(|op| matches!(op, CanvasOp::Image { .. }))
        .count();
    // A 200x100 view over 32px spots touches 7 columns and 4 rows.
    assert_eq!(images, 28);
    let first = surface.ops().iter().find_map(|op| match op {
        CanvasOp::Image { src, dst, .. } => Some((*src, *dst)),
        _ => None,
    });
    assert_eq!(
        first,
        Some((Some(Rect::new(0.0, 0.0, 32.0, 32.0)), Rect::new(0.0, 0.0, 32.0, 32.0)))
    );
}

#[test]
fn transition_moves_node_and_runs_callback() {
    let (mut scene, layer) = scene_with_layer(false);
    let ball = scene.create(Node::shape(Circle::new(5.0)));
    scene.add(layer, ball).unwrap();
    let finished = Rc::new(RefCell::new(false));
    let flag = finished.clone();
    scene
        .transition_to(
            ball,
            TransitionConfig::new(0.5)
                .to_position(100.0, 50.0)
                .to_alpha(0.0)
                .with_easing(Easing::EaseIn)
                .on_finish(move |scene: &mut Scene| {
                    *flag.borrow_mut() = true;
                    let _ = scene.take_wake_request();
                }),
        )
        .unwrap();
    assert!(scene.take_wake_request());

    assert!(scene.advance_transitions(layer, 250.0));
    let mid = scene.get(ball).unwrap().position();
    // Ease-in is slower than linear at the halfway mark.
    assert!(mid.x < 50.0 && mid.x > 0.0, "{mid:?}");
    assert!(!*finished.borrow());

    scene.advance_transitions(layer, 300.0);
    let node = scene.get(ball).unwrap();
    assert_eq!(node.position(), Point::new(100.0, 50.0));
    assert_eq!(node.alpha(), 0.0);
    assert!(*finished.borrow());
    assert!(!scene.has_transition(ball));
}

#[test]
fn bubbling_stops_at_cancel() {
    let (mut scene, layer) = scene_with_layer(false);
    let group = scene.create(Node::group());
    let leaf = scene.create(Node::shape(Circle::new(1.0)));
    scene.add(layer, group).unwrap();
    scene.add(group, leaf).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    for (node, cancel) in [(leaf, false), (group, true), (layer, false)] {
        let seen = seen.clone();
        scene
            .on(node, "click", move |_: &mut Scene, event: &mut Event| {
                seen.borrow_mut().push(event.current_target);
                if cancel {
                    event.cancel_bubble = true;
                }
            })
            .unwrap();
    }

    let mut event = Event::new(EventType::Click, leaf);
    let mut cur = Some(leaf);
    while let Some(node) = cur {
        scene.fire(node, &mut event);
        if event.cancel_bubble {
            break;
        }
        cur = scene.parent(node).and_then(|p| p.node());
    }
    assert_eq!(*seen.borrow(), vec![leaf, group]);
}

#[test]
fn reparenting_moves_drawing_between_layers() {
    let mut scene = Scene::new(Size::new(100.0, 100.0));
    let back = scene.create(Node::layer().with_name("back"));
    let front = scene.create(Node::layer().with_name("front"));
    scene.add_layer(back).unwrap();
    scene.add_layer(front).unwrap();
    assert_eq!(scene.layer_by_name("front"), Some(front));
    assert_eq!(scene.get(front).unwrap().z_index(), 1);

    let shape = scene.create(Node::shape(Circle::new(4.0)).with_fill(Color::BLACK));
    scene.add(back, shape).unwrap();
    scene.draw_layer(back).unwrap();
    scene.draw_layer(front).unwrap();

    scene.move_to(shape, front).unwrap();
    assert!(scene.needs_redraw(back));
    assert!(scene.needs_redraw(front));
    scene.draw_layer(back).unwrap();
    scene.draw_layer(front).unwrap();
    assert_eq!(fills(&scene, back), 0);
    assert_eq!(fills(&scene, front), 1);

    scene.move_to_bottom(front);
    assert_eq!(scene.layers(), &[front, back]);
}
