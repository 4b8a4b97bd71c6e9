use super::Frame;
use crate::geometry::{Direction, Point};

const OVERLAY: char = '.';
const INK: char = '#';
const PEN: char = '*';

/// Rasterizes a frame into `rows` lines of `cols` characters covering a `size`x`size` surface.
/// Later layers overwrite earlier ones: overlay, completed ink, current stroke, marker.
pub fn rasterize(frame: &Frame, size: f32, cols: usize, rows: usize) -> Vec<String> {
    if cols == 0 || rows == 0 || size <= 0.0 {
        return Vec::new();
    }
    let mut grid = vec![vec![' '; cols]; rows];

    let plot = |p: &Point, c: char, grid: &mut [Vec<char>]| {
        let cx = ((p.x / size) * cols as f32).floor();
        let cy = ((p.y / size) * rows as f32).floor();
        if cx >= 0.0 && cy >= 0.0 && (cx as usize) < cols && (cy as usize) < rows {
            grid[cy as usize][cx as usize] = c;
        }
    };

    let cell = size / cols.max(rows) as f32;
    let draw_polyline = |points: &[Point], c: char, grid: &mut [Vec<char>]| {
        if points.len() == 1 {
            plot(&points[0], c, grid);
        }
        for w in points.windows(2) {
            let steps = ((w[0].distance_to(&w[1]) / (cell * 0.5)).ceil() as usize).max(1);
            for s in 0..=steps {
                let t = s as f32 / steps as f32;
                let p = Point::new(
                    w[0].x + t * (w[1].x - w[0].x),
                    w[0].y + t * (w[1].y - w[0].y),
                );
                plot(&p, c, grid);
            }
        }
    };

    for path in frame.overlay.iter().filter(|p| p.visible) {
        draw_polyline(&path.points, OVERLAY, &mut grid);
    }
    for stroke in &frame.completed_strokes {
        draw_polyline(stroke, INK, &mut grid);
    }
    draw_polyline(&frame.current_stroke, PEN, &mut grid);

    if let Some(marker) = &frame.deviation {
        let arrow = match marker.direction {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        };
        draw_polyline(&[marker.point], arrow, &mut grid);
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}
