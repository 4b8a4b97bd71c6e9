mod common;

use common::*;
use serde_json::json;
use std::time::Duration;
use tracewise::config::{Config, ExecutionForm, MatcherKind};
use tracewise::engine::protocol::{Inbound, Outbound};
use tracewise::engine::{
    select_evaluator, BackgroundEvaluator, EvaluatorKind, StrokeEvaluator, StrokeId,
};
use tracewise::geometry::{Direction, Point};
use tracewise::render::FrameRecorder;

#[test]
fn test_forms_agree_on_canonical_strokes() {
    let config = Config::default();
    let mut fg = foreground(&config);
    let mut bg = background(&config);
    fg.set_letter("A").unwrap();
    bg.set_letter("A").unwrap();
    assert_eq!(bg.scorer_name(), "alignment");

    for idx in 0..3 {
        let stroke = path_stroke(idx, 15);
        let a = trace(&mut fg, &stroke).expect("foreground evaluation");
        let b = trace(&mut bg, &stroke).expect("background evaluation");
        assert_eq!(a.complete, b.complete, "path {}", idx);
        assert_eq!(a.path_index, b.path_index, "path {}", idx);
        assert_eq!(a.letter_complete, b.letter_complete, "path {}", idx);
        assert!(b.score > 90.0, "near-perfect trace scored {}", b.score);
    }
    assert!(bg.start_stroke(Point::new(100.0, 200.0)).is_none());
}

#[test]
fn test_background_rejects_noise_like_foreground() {
    let config = Config::default();
    let mut bg = background(&config);
    bg.set_letter("A").unwrap();

    let short = line((100.0, 200.0), (105.0, 185.0), 12);
    let result = trace(&mut bg, &short).expect("evaluation");
    assert!(!result.complete);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.path_index, None);
}

#[test]
fn test_coverage_matcher_can_drive_the_worker() {
    let mut config = Config::default();
    config.session.background_matcher = MatcherKind::Coverage;
    let mut bg = background(&config);
    assert_eq!(bg.scorer_name(), "coverage");
    bg.set_letter("A").unwrap();

    let result = trace(&mut bg, &path_stroke(0, 15)).expect("evaluation");
    assert!(result.complete);
    assert!((result.score - 100.0).abs() < 1e-3);
}

#[test]
fn test_no_strokes_before_a_letter_is_set() {
    let config = Config::default();
    let mut bg = background(&config);
    assert!(bg.start_stroke(Point::new(1.0, 1.0)).is_none());
    assert!(bg.set_letter("Z").is_err());
    assert!(bg.start_stroke(Point::new(1.0, 1.0)).is_none());
}

#[test]
fn test_stale_ids_do_not_block() {
    let config = Config::default();
    let mut bg = background(&config);
    bg.set_letter("A").unwrap();

    assert!(bg.end_stroke(StrokeId(5)).is_none());

    let id = bg.start_stroke(Point::new(100.0, 200.0)).unwrap();
    bg.cancel_stroke(id);
    assert!(bg.end_stroke(id).is_none());

    // A real stroke still goes through afterwards
    assert!(trace(&mut bg, &path_stroke(0, 15)).is_some());
}

#[test]
fn test_deviations_arrive_from_the_worker() {
    let config = Config::default();
    let mut bg = background(&config);
    bg.set_letter("A").unwrap();
    bg.clear(false);

    let id = bg.start_stroke(Point::new(200.0, 200.0)).unwrap();
    let mut devs = bg.update_stroke(id, Point::new(240.0, 200.0));
    if devs.is_empty() {
        devs = bg.wait_for_deviations(Duration::from_secs(1));
    }
    assert_eq!(devs.len(), 1);
    assert_eq!(devs[0].direction, Direction::Left);
    assert!((devs[0].distance - 40.0).abs() < 1e-3);

    // Nothing else is pending for an on-path sample
    bg.update_stroke(id, Point::new(200.0, 199.0));
    assert!(bg.wait_for_deviations(Duration::from_millis(100)).is_empty());
}

#[test]
fn test_worker_owns_the_surface() {
    let config = Config::default();
    let recorder = FrameRecorder::new();
    {
        let mut bg =
            BackgroundEvaluator::spawn(&config, store(), Box::new(recorder.clone())).unwrap();
        bg.set_letter("A").unwrap();
        trace(&mut bg, &path_stroke(0, 15)).expect("evaluation");
    }
    // Dropping joins the worker, so every frame has been presented
    let frame = recorder.last_frame().expect("frames presented");
    assert_eq!(frame.completed_strokes.len(), 1);
    assert!(!frame.overlay[0].visible);
    // init, set letter, start, 14 updates, end
    assert_eq!(recorder.frame_count(), 18);
}

#[test]
fn test_select_evaluator_honours_configuration() {
    let mut config = Config::default();
    config.session.execution = ExecutionForm::Background;
    let ev = select_evaluator(&config, store(), Box::new(tracewise::render::NullSurface));
    assert_eq!(ev.kind(), EvaluatorKind::Background);

    config.session.execution = ExecutionForm::Foreground;
    let ev = select_evaluator(&config, store(), Box::new(tracewise::render::NullSurface));
    assert_eq!(ev.kind(), EvaluatorKind::Foreground);
}

#[test]
fn test_protocol_wire_shapes() {
    let msg = Inbound::StartStroke {
        id: StrokeId(3),
        point: Point::at(10.0, 20.0, 5),
    };
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({"type": "startStroke", "data": {"id": 3, "point": {"x": 10.0, "y": 20.0, "timestamp": 5}}})
    );

    let init: Inbound =
        serde_json::from_value(json!({"type": "init", "data": {"showTemplate": false}})).unwrap();
    assert_eq!(
        init,
        Inbound::Init {
            letter: None,
            show_template: false
        }
    );

    let config = Config::default();
    let mut fg = foreground(&config);
    fg.handle(Inbound::SetLetter { letter: "A".into() });
    let stroke = path_stroke(0, 15);
    let id = StrokeId(11);
    fg.handle(Inbound::StartStroke { id, point: stroke[0] });
    for p in &stroke[1..] {
        fg.handle(Inbound::UpdateStroke { id, point: *p });
    }
    let out = fg.handle(Inbound::EndStroke { id });
    let value = serde_json::to_value(&out[0]).unwrap();
    assert_eq!(value["type"], "evaluation");
    assert_eq!(value["data"]["strokeId"], 11);
    assert_eq!(value["data"]["pathIndex"], 0);
    assert_eq!(value["data"]["complete"], true);
    assert_eq!(value["data"]["letterComplete"], false);

    let err = Outbound::Error {
        message: "unknown letter".into(),
    };
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({"type": "error", "data": {"message": "unknown letter"}})
    );
}

#[test]
fn test_stroke_ids_render_compactly() {
    assert_eq!(StrokeId(0).to_string(), "0");
    assert_eq!(StrokeId(35).to_string(), "z");
    assert_eq!(StrokeId(36).to_string(), "10");
    assert_eq!(StrokeId(1295).to_string(), "zz");
    assert_ne!(StrokeId::fresh(), StrokeId::fresh());
}
