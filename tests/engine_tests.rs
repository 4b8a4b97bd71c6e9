mod common;

use common::*;
use rstest::rstest;
use tracewise::config::Config;
use tracewise::engine::protocol::{Inbound, Outbound};
use tracewise::engine::{EvaluatorKind, StrokeEvaluator, StrokeId};
use tracewise::geometry::{Direction, Point};

fn ready(config: &Config) -> tracewise::engine::ForegroundEvaluator {
    let mut ev = foreground(config);
    ev.set_letter("A").unwrap();
    ev
}

#[test]
fn test_stroke_along_first_path_completes_it() {
    let config = Config::default();
    let mut ev = ready(&config);

    let stroke = path_stroke(0, 15);
    // Samples are at least 10 units apart along a 158-unit path
    assert!(stroke.windows(2).all(|w| w[0].distance_to(&w[1]) >= 10.0));

    let result = trace(&mut ev, &stroke).expect("evaluation");
    assert!(result.complete);
    assert_eq!(result.path_index, Some(0));
    assert!((result.score - 100.0).abs() < 1e-3);
    assert!(!result.letter_complete);
    assert!(ev.completed_paths().contains(&0));
    assert_eq!(ev.coverage()[0].len(), 2);
}

#[test]
fn test_tap_is_rejected_without_touching_coverage() {
    let config = Config::default();
    let mut ev = ready(&config);

    let tap: Vec<Point> = (0..5)
        .map(|i| Point::at(100.0 + i as f32 * 2.0, 195.0 + i as f32 * 2.0, i * 10))
        .collect();
    let result = trace(&mut ev, &tap).expect("evaluation");

    assert!(!result.complete);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.path_index, None);
    assert!(ev.coverage().iter().all(|c| c.is_empty()));
    assert!(ev.completed_paths().is_empty());
}

#[rstest]
#[case(9, 100.0)] // too few points, long enough
#[case(12, 30.0)] // enough points, too short
fn test_noise_rejection(#[case] points: usize, #[case] length: f32) {
    let config = Config::default();
    let mut ev = ready(&config);
    let stroke = line((100.0, 200.0), (100.0 + length * 0.316, 200.0 - length * 0.949), points);
    let result = trace(&mut ev, &stroke).expect("evaluation");
    assert_eq!(result.score, 0.0);
    assert!(!result.complete);
}

/// Scribbles over the first crossbar segment only, staying clear of the second.
fn first_crossbar_half() -> Vec<Point> {
    let mut stroke = line((115.0, 140.0), (133.0, 140.0), 8);
    stroke.extend(line((133.0, 140.0), (115.0, 140.0), 8));
    stroke.extend(line((115.0, 140.0), (133.0, 140.0), 8));
    timed(stroke)
}

#[test]
fn test_partial_stroke_leaves_path_open_but_keeps_coverage() {
    let config = Config::default();
    let mut ev = ready(&config);

    let result = trace(&mut ev, &first_crossbar_half()).expect("evaluation");
    assert!(!result.complete);
    assert_eq!(ev.coverage()[2].len(), 1);

    // The rest of the bar finishes it on top of the accumulated coverage
    let stroke = line((140.0, 140.0), (185.0, 140.0), 12);
    let result = trace(&mut ev, &stroke).expect("evaluation");
    assert!(result.complete);
    assert_eq!(result.path_index, Some(2));
}

#[test]
fn test_coverage_is_idempotent() {
    let config = Config::default();
    let mut ev = ready(&config);

    trace(&mut ev, &first_crossbar_half());
    let before = ev.coverage().to_vec();
    trace(&mut ev, &first_crossbar_half());
    assert_eq!(ev.coverage(), before.as_slice());
}

#[test]
fn test_completed_path_is_frozen() {
    let config = Config::default();
    let mut ev = ready(&config);

    trace(&mut ev, &path_stroke(0, 15));
    let frozen = ev.coverage()[0].clone();

    // Retracing path 0 can only ever match another open path
    let again = trace(&mut ev, &path_stroke(0, 15)).expect("evaluation");
    assert_ne!(again.path_index, Some(0));
    assert_eq!(ev.coverage()[0], frozen);
    assert_eq!(ev.completed_paths().len(), 1);
}

#[test]
fn test_ties_go_to_lowest_path_index() {
    let config = Config::default();
    let mut ev = ready(&config);

    // Across the apex: touches the upper segment of both diagonals
    let stroke = line((135.0, 70.0), (165.0, 70.0), 12);
    let result = trace(&mut ev, &stroke).expect("evaluation");
    assert_eq!(ev.coverage()[0].len(), ev.coverage()[1].len());
    assert_eq!(result.path_index, Some(0));
}

#[test]
fn test_all_paths_complete_the_letter_and_block_new_strokes() {
    let config = Config::default();
    let mut ev = ready(&config);

    for idx in 0..3 {
        let r = trace(&mut ev, &path_stroke(idx, 15)).unwrap();
        assert!(r.complete);
        assert_eq!(r.letter_complete, idx == 2);
    }
    assert!(ev.start_stroke(Point::new(100.0, 200.0)).is_none());
}

#[test]
fn test_stale_and_cancelled_strokes_are_ignored() {
    let config = Config::default();
    let mut ev = ready(&config);

    let stroke = path_stroke(0, 15);
    let id = ev.start_stroke(stroke[0]).unwrap();
    for p in &stroke[1..] {
        ev.update_stroke(id, *p);
    }
    ev.cancel_stroke(id);
    assert!(ev.end_stroke(id).is_none(), "cancelled id is stale");
    assert!(ev.coverage().iter().all(|c| c.is_empty()));

    assert!(ev.update_stroke(StrokeId(7), Point::new(1.0, 1.0)).is_empty());
    assert!(ev.end_stroke(StrokeId(7)).is_none());
}

#[test]
fn test_new_stroke_supersedes_live_one() {
    let config = Config::default();
    let mut ev = ready(&config);

    let first = ev.start_stroke(Point::new(100.0, 200.0)).unwrap();
    let second = ev.start_stroke(Point::new(100.0, 200.0)).unwrap();
    assert_ne!(first, second);
    assert!(ev.end_stroke(first).is_none());
    assert!(ev.end_stroke(second).is_some());
}

#[test]
fn test_guided_deviation_points_back_to_path() {
    let config = Config::default();
    let mut ev = ready(&config);
    ev.clear(false);

    let id = ev.start_stroke(Point::new(200.0, 200.0)).unwrap();
    let devs = ev.update_stroke(id, Point::new(240.0, 200.0));
    assert_eq!(devs.len(), 1);
    assert_eq!(devs[0].direction, Direction::Left);
    assert!((devs[0].distance - 40.0).abs() < 1e-3);

    // Back on the path: nothing to report
    assert!(ev.update_stroke(id, Point::new(201.0, 200.0)).is_empty());
}

#[test]
fn test_template_stage_never_reports_deviations() {
    let config = Config::default();
    let mut ev = ready(&config);
    let id = ev.start_stroke(Point::new(10.0, 10.0)).unwrap();
    assert!(ev.update_stroke(id, Point::new(290.0, 290.0)).is_empty());
}

#[test]
fn test_frames_hide_completed_overlay_paths() {
    let config = Config::default();
    let (mut ev, recorder) = foreground_with_recorder(&config);
    ev.set_letter("A").unwrap();

    let frame = recorder.last_frame().unwrap();
    assert_eq!(frame.overlay.len(), 3);
    assert!(frame.overlay.iter().all(|o| o.visible));

    trace(&mut ev, &path_stroke(0, 15));
    let frame = recorder.last_frame().unwrap();
    assert_eq!(frame.completed_strokes.len(), 1);
    assert!(frame.current_stroke.is_empty());
    assert!(!frame.overlay[0].visible);
    assert!(frame.overlay[1].visible);

    ev.clear(false);
    let frame = recorder.last_frame().unwrap();
    assert!(frame.overlay.is_empty());
    assert!(frame.completed_strokes.is_empty());
}

#[test]
fn test_frames_follow_every_mutation() {
    let config = Config::default();
    let (mut ev, recorder) = foreground_with_recorder(&config);
    ev.set_letter("A").unwrap();
    let base = recorder.frame_count();

    let id = ev.start_stroke(Point::new(100.0, 200.0)).unwrap();
    ev.update_stroke(id, Point::new(101.0, 198.0));
    assert_eq!(recorder.frame_count(), base + 2);
    assert_eq!(recorder.last_frame().unwrap().current_stroke.len(), 2);
}

#[test]
fn test_scaled_surface_matches_logical_behaviour() {
    let mut config = Config::default();
    config.session.surface_size = 600.0;
    let mut ev = ready(&config);

    let stroke = scaled(&path_stroke(1, 15), 2.0);
    let result = trace(&mut ev, &stroke).unwrap();
    assert!(result.complete);
    assert_eq!(result.path_index, Some(1));
}

#[test]
fn test_protocol_messages_drive_the_foreground_form() {
    let config = Config::default();
    let mut ev = foreground(&config);
    assert_eq!(ev.kind(), EvaluatorKind::Foreground);

    ev.handle(Inbound::Init {
        letter: Some("A".into()),
        show_template: true,
    });
    let id = StrokeId(99);
    let stroke = path_stroke(2, 15);
    ev.handle(Inbound::StartStroke { id, point: stroke[0] });
    for p in &stroke[1..] {
        assert!(ev.handle(Inbound::UpdateStroke { id, point: *p }).is_empty());
    }
    let out = ev.handle(Inbound::EndStroke { id });
    match out.as_slice() {
        [Outbound::Evaluation(e)] => {
            assert_eq!(e.stroke_id, id);
            assert!(e.complete);
            assert_eq!(e.path_index, Some(2));
        }
        other => panic!("unexpected output {:?}", other),
    }

    let out = ev.handle(Inbound::SetLetter { letter: "Q".into() });
    assert!(matches!(out.as_slice(), [Outbound::Error { .. }]));
}

#[test]
fn test_unknown_letter_is_an_error() {
    let config = Config::default();
    let mut ev = foreground(&config);
    assert!(ev.set_letter("Z").is_err());
    assert!(ev.start_stroke(Point::new(0.0, 0.0)).is_none());
}
