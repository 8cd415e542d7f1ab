//! End-to-end contour of a single ball.
//!
//! A lone ball of radius 20 has `radius / distance > 1` exactly inside a
//! circle of radius 20, so the traced contour must be a closed ring of that
//! size, accurate to within one grid cell.

use std::collections::HashMap;

use glam::Vec2;
use metaballs::renderer::RasterSurface;
use metaballs::sim::{Ball, BallSet, ContourExtractor, Segment, SimState};
use metaballs::FrameDriver;

const CENTER: Vec2 = Vec2::new(50.0, 50.0);
const RADIUS: f32 = 20.0;
const CELL: u32 = 3;

fn single_ball_segments() -> Vec<Segment> {
    let balls = BallSet::from_balls(vec![Ball::new(CENTER, Vec2::ZERO, RADIUS as u32)]);
    let mut state = SimState::with_balls(100, 100, CELL, balls, 0);
    state.field.sample(state.balls.as_slice());

    let extractor = ContourExtractor::default();
    extractor.segments(&state.field).collect()
}

#[test]
fn ring_follows_circle() {
    let segments = single_ball_segments();
    assert!(!segments.is_empty());

    for s in &segments {
        for p in [s.a, s.b] {
            let r = p.distance(CENTER);
            assert!(
                (r - RADIUS).abs() <= CELL as f32,
                "endpoint {p:?} at distance {r}"
            );
        }
    }
}

#[test]
fn ring_is_closed() {
    let segments = single_ball_segments();

    // Neighbouring cells interpolate shared edges identically, so every
    // endpoint of a closed ring is shared by exactly two segments
    let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
    for s in &segments {
        for p in [s.a, s.b] {
            *uses.entry((p.x.to_bits(), p.y.to_bits())).or_default() += 1;
        }
    }
    assert!(uses.values().all(|&n| n == 2), "open ends: {uses:?}");
}

#[test]
fn ring_length_matches_circumference() {
    let segments = single_ball_segments();
    let length: f32 = segments.iter().map(|s| s.a.distance(s.b)).sum();
    let circumference = std::f32::consts::TAU * RADIUS;
    assert!(
        (length - circumference).abs() / circumference < 0.05,
        "length {length} vs {circumference}"
    );
}

#[test]
fn ring_has_no_saddles() {
    let balls = BallSet::from_balls(vec![Ball::new(CENTER, Vec2::ZERO, RADIUS as u32)]);
    let mut state = SimState::with_balls(100, 100, CELL, balls, 0);
    let mut surface = RasterSurface::new(100, 100);
    let stats = FrameDriver::default().draw(&mut state, &mut surface);

    assert_eq!(stats.saddle_cells, 0);
    assert_eq!(stats.segments, single_ball_segments().len());
    assert_eq!(surface.lines_drawn(), stats.segments);
    // The center of the ring stays black
    assert_eq!(surface.pixel(50, 50), Some(0));
}

#[test]
fn colors_follow_position() {
    for s in single_ball_segments() {
        let [r, g, b, a] = s.color;
        assert!((0.0..1.0).contains(&r));
        assert!((0.0..1.0).contains(&g));
        assert_eq!(b, 0.0);
        assert_eq!(a, 1.0);
        // Red tracks the cell's x, which sits within one cell of the endpoints
        let min_x = s.a.x.min(s.b.x);
        assert!((r * 100.0 - min_x).abs() <= CELL as f32, "{r} vs x {min_x}");
    }
}
