// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the frame loop in the `proscenium_stage` crate.

use std::cell::RefCell;
use std::rc::Rc;

use proscenium_scene::shapes::Circle;
use proscenium_scene::{Node, Scene};
use proscenium_stage::{FrameInfo, FrameScheduler, RuntimeConfig, SceneRuntime, StageConfig};

#[derive(Clone, Default)]
struct Requests(Rc<RefCell<Vec<f64>>>);

impl FrameScheduler for Requests {
    fn request_frame(&mut self, interval_ms: f64) {
        self.0.borrow_mut().push(interval_ms);
    }
}

#[test]
fn frame_callback_drives_an_animation_until_stopped() {
    let requests = Requests::default();
    let mut rt = SceneRuntime::new(requests.clone(), RuntimeConfig::default());
    let stage = rt.create_stage(StageConfig::new(200.0, 200.0));
    let ball = rt
        .with_stage(stage, |s| {
            let scene = s.scene_mut();
            let layer = scene.create(Node::layer());
            scene.add_layer(layer).unwrap();
            let ball = scene.create(Node::shape(Circle::new(5.0)));
            scene.add(layer, ball).unwrap();
            s.on_frame(move |scene: &mut Scene, frame: &FrameInfo| {
                // 0.1 px per millisecond.
                scene.move_by(ball, frame.time_diff_ms / 10.0, 0.0);
            });
            ball
        })
        .unwrap();
    rt.start(stage);
    assert!(rt.is_loop_active());

    for now in [1000.0, 1100.0, 1250.0] {
        rt.run_frame(now);
    }
    let x = rt.stage(stage).unwrap().scene().get(ball).unwrap().position().x;
    assert_eq!(x, 25.0);
    assert_eq!(rt.frame().time_ms, 250.0);

    rt.stop(stage);
    rt.run_frame(1300.0);
    assert!(!rt.is_loop_active());
    let x = rt.stage(stage).unwrap().scene().get(ball).unwrap().position().x;
    assert_eq!(x, 25.0);
}

#[test]
fn frame_rate_sets_the_requested_interval() {
    let requests = Requests::default();
    let mut rt = SceneRuntime::new(requests.clone(), RuntimeConfig::default());
    rt.set_frame_rate(25.0);
    let stage = rt.create_stage(StageConfig::new(10.0, 10.0));
    rt.start(stage);
    assert_eq!(requests.0.borrow().last(), Some(&40.0));
}
