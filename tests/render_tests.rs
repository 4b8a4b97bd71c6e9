use tracewise::geometry::{Direction, Point};
use tracewise::render::ascii::rasterize;
use tracewise::render::{DeviationMarker, Frame, OverlayPath};

fn count(lines: &[String], c: char) -> usize {
    lines.iter().map(|l| l.chars().filter(|&x| x == c).count()).sum()
}

#[test]
fn test_empty_frame_is_blank_grid() {
    let lines = rasterize(&Frame::default(), 300.0, 30, 10);
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|l| l.chars().count() == 30 && l.trim().is_empty()));
    assert!(rasterize(&Frame::default(), 300.0, 0, 10).is_empty());
}

#[test]
fn test_layers_overwrite_in_order() {
    let bar = vec![Point::new(0.0, 150.0), Point::new(299.0, 150.0)];
    let frame = Frame {
        completed_strokes: vec![bar.clone()],
        current_stroke: vec![Point::new(0.0, 150.0), Point::new(100.0, 150.0)],
        overlay: vec![
            OverlayPath {
                points: bar.clone(),
                visible: true,
            },
            OverlayPath {
                points: vec![Point::new(150.0, 0.0), Point::new(150.0, 299.0)],
                visible: false,
            },
        ],
        deviation: Some(DeviationMarker {
            point: Point::new(295.0, 295.0),
            direction: Direction::Left,
        }),
    };
    let lines = rasterize(&frame, 300.0, 30, 30);

    // Ink covers the overlay it was traced over; the hidden path is absent
    assert_eq!(count(&lines, '.'), 0);
    assert!(count(&lines, '#') > 0);
    assert!(count(&lines, '*') >= 10);
    assert_eq!(lines[29].chars().nth(29), Some('<'));
    assert_eq!(lines[15].chars().nth(0), Some('*'));
    assert_eq!(lines[15].chars().nth(29), Some('#'));
}

#[test]
fn test_points_outside_surface_are_clipped() {
    let frame = Frame {
        current_stroke: vec![Point::new(-50.0, -50.0), Point::new(400.0, 400.0)],
        ..Frame::default()
    };
    let lines = rasterize(&frame, 300.0, 20, 20);
    assert_eq!(lines.len(), 20);
    // Diagonal through the grid, one cell per row at least
    assert!(count(&lines, '*') >= 20);
}
