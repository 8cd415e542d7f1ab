//! Marching squares contour extraction
//!
//! Every grid cell is classified by which of its four corners exceed the
//! threshold. The resulting 4-bit case selects, from [`CASE_TABLE`], the cell
//! edges the contour crosses; each crossing is placed by linear interpolation
//! between the two corner samples of that edge.
//!
//! Corner bits: top-left `a` = 1, top-right `b` = 2, bottom-right `c` = 4,
//! bottom-left `d` = 8.

use glam::Vec2;

use super::field::FieldBuffer;
use crate::consts::THRESHOLD;

/// A side of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Two edges joined by one contour segment
pub type EdgePair = (Edge, Edge);

use Edge::{Bottom, Left, Right, Top};

const NONE: &[EdgePair] = &[];
/// Saddle resolution that cuts off the top-left and bottom-right corners
const CUT_TL_BR: &[EdgePair] = &[(Left, Top), (Bottom, Right)];
/// Saddle resolution that cuts off the top-right and bottom-left corners
const CUT_TR_BL: &[EdgePair] = &[(Top, Right), (Left, Bottom)];

/// Crossed edges for each case index
pub const CASE_TABLE: [&[EdgePair]; 16] = [
    NONE,               // 0
    &[(Left, Top)],     // 1  a
    &[(Top, Right)],    // 2  b
    &[(Left, Right)],   // 3  a b
    &[(Bottom, Right)], // 4  c
    CUT_TR_BL,          // 5  a c (saddle)
    &[(Top, Bottom)],   // 6  b c
    &[(Left, Bottom)],  // 7  a b c
    &[(Left, Bottom)],  // 8  d
    &[(Top, Bottom)],   // 9  a d
    CUT_TL_BR,          // 10 b d (saddle)
    &[(Bottom, Right)], // 11 a b d
    &[(Left, Right)],   // 12 c d
    &[(Top, Right)],    // 13 a c d
    &[(Left, Top)],     // 14 b c d
    NONE,               // 15
];

pub const SADDLE_A_C: u8 = 5;
pub const SADDLE_B_D: u8 = 10;

/// Case index from the four corner classifications
#[inline]
pub const fn case_index(a: bool, b: bool, c: bool, d: bool) -> u8 {
    (d as u8) << 3 | (c as u8) << 2 | (b as u8) << 1 | a as u8
}

#[inline]
pub const fn is_saddle(case: u8) -> bool {
    case == SADDLE_A_C || case == SADDLE_B_D
}

/// One grid cell: its top-left corner in canvas space and its corner samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub origin: Vec2,
    pub size: f32,
    /// Samples in order top-left, top-right, bottom-right, bottom-left
    pub values: [f32; 4],
}

impl Cell {
    /// The cell whose top-left vertex is `(col, row)`
    pub fn from_field(field: &FieldBuffer, col: usize, row: usize) -> Self {
        Self {
            origin: field.vertex_pos(col, row),
            size: field.cell_size() as f32,
            values: [
                field.get(col, row),
                field.get(col + 1, row),
                field.get(col + 1, row + 1),
                field.get(col, row + 1),
            ],
        }
    }

    pub fn case(&self, threshold: f32) -> u8 {
        let [a, b, c, d] = self.values.map(|v| v > threshold);
        case_index(a, b, c, d)
    }

    /// Mean of the corner samples, used as the cell center estimate
    pub fn center_value(&self) -> f32 {
        self.values.iter().sum::<f32>() / 4.0
    }

    /// Corner positions in order top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let o = self.origin;
        let s = self.size;
        [
            o,
            o + Vec2::new(s, 0.0),
            o + Vec2::new(s, s),
            o + Vec2::new(0.0, s),
        ]
    }

    /// Point on `edge` where the field crosses `threshold`
    pub fn crossing(&self, edge: Edge, threshold: f32) -> Vec2 {
        let (i, j) = match edge {
            Top => (0, 1),
            Right => (1, 2),
            Bottom => (3, 2),
            Left => (0, 3),
        };
        let p = self.corners();
        interpolate(p[i], self.values[i], p[j], self.values[j], threshold)
    }
}

/// Solve for the threshold crossing between two samples along `p_a -> p_b`
#[inline]
pub fn interpolate(p_a: Vec2, v_a: f32, p_b: Vec2, v_b: f32, threshold: f32) -> Vec2 {
    let dv = v_b - v_a;
    let t = if dv.abs() <= f32::EPSILON {
        0.5
    } else {
        ((threshold - v_a) / dv).clamp(0.0, 1.0)
    };
    // Axis shared by both endpoints stays bit-identical across neighboring cells
    p_a + (p_b - p_a) * t
}

/// Chooses the edge pairs for the ambiguous saddle cases 5 and 10
pub trait SaddlePolicy: std::fmt::Debug {
    fn resolve(&self, case: u8, cell: &Cell, threshold: f32) -> &'static [EdgePair];
}

/// Emit the two corner cuts from the case table without consulting the center
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparateSaddles;

impl SaddlePolicy for SeparateSaddles {
    fn resolve(&self, case: u8, _cell: &Cell, _threshold: f32) -> &'static [EdgePair] {
        CASE_TABLE[case as usize]
    }
}

/// Sample the cell center: when it is inside, the inside corners stay joined
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterSampled;

impl SaddlePolicy for CenterSampled {
    fn resolve(&self, case: u8, cell: &Cell, threshold: f32) -> &'static [EdgePair] {
        let center_inside = cell.center_value() > threshold;
        match (case, center_inside) {
            // a and c inside: cutting b and d keeps a joined to c
            (SADDLE_A_C, true) | (SADDLE_B_D, false) => CUT_TR_BL,
            (SADDLE_A_C, false) | (SADDLE_B_D, true) => CUT_TL_BR,
            _ => CASE_TABLE[case as usize],
        }
    }
}

/// A contour segment with its gradient color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    pub color: [f32; 4],
}

/// Gradient keyed to the cell's canvas position: red follows x, green follows y
pub fn cell_color(origin: Vec2, width: u32, height: u32) -> [f32; 4] {
    let r = (origin.x / width.max(1) as f32).clamp(0.0, 1.0);
    let g = (origin.y / height.max(1) as f32).clamp(0.0, 1.0);
    [r, g, 0.0, 1.0]
}

/// Marching squares over a [`FieldBuffer`]
#[derive(Debug)]
pub struct ContourExtractor {
    pub threshold: f32,
    policy: Box<dyn SaddlePolicy>,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self::new(Box::new(SeparateSaddles))
    }
}

impl ContourExtractor {
    pub fn new(policy: Box<dyn SaddlePolicy>) -> Self {
        Self {
            threshold: THRESHOLD,
            policy,
        }
    }

    /// Edge pairs for one cell, saddles routed through the policy
    pub fn cell_edges(&self, cell: &Cell) -> &'static [EdgePair] {
        let case = cell.case(self.threshold);
        if is_saddle(case) {
            self.policy.resolve(case, cell, self.threshold)
        } else {
            CASE_TABLE[case as usize]
        }
    }

    /// Lazily walk every cell of `field`, row by row
    pub fn segments<'a>(&'a self, field: &'a FieldBuffer) -> Segments<'a> {
        let has_cells = field.cols() >= 2 && field.rows() >= 2;
        Segments {
            extractor: self,
            field,
            col: 0,
            row: if has_cells { 0 } else { field.rows() },
            pending: None,
            saddle_cells: 0,
        }
    }
}

/// Iterator over the segments of one field, 0-2 per cell
#[derive(Debug)]
pub struct Segments<'a> {
    extractor: &'a ContourExtractor,
    field: &'a FieldBuffer,
    col: usize,
    row: usize,
    /// Second segment of a saddle cell
    pending: Option<Segment>,
    saddle_cells: usize,
}

impl Segments<'_> {
    /// Saddle cells visited so far
    pub fn saddle_cells(&self) -> usize {
        self.saddle_cells
    }

    fn advance(&mut self) {
        self.col += 1;
        if self.col + 1 >= self.field.cols() {
            self.col = 0;
            self.row += 1;
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }

        while self.row + 1 < self.field.rows() {
            let cell = Cell::from_field(self.field, self.col, self.row);
            self.advance();

            let threshold = self.extractor.threshold;
            let case = cell.case(threshold);
            if case == 0 || case == 15 {
                continue;
            }
            if is_saddle(case) {
                self.saddle_cells += 1;
            }

            let (width, height) = self.field.canvas();
            let color = cell_color(cell.origin, width, height);
            let make = |&(from, to): &EdgePair| Segment {
                a: cell.crossing(from, threshold),
                b: cell.crossing(to, threshold),
                color,
            };

            match self.extractor.cell_edges(&cell) {
                [] => continue,
                [only] => return Some(make(only)),
                [first, second, ..] => {
                    self.pending = Some(make(second));
                    return Some(make(first));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: u32 = 3;

    fn single_cell(values: [f32; 4]) -> FieldBuffer {
        // Row-major 2x2: tl, tr / bl, br
        FieldBuffer::from_values(2, 2, CELL, vec![values[0], values[1], values[3], values[2]])
            .unwrap()
    }

    fn corner_values(case: u8) -> [f32; 4] {
        let mut values = [0.5; 4];
        for (bit, value) in values.iter_mut().enumerate() {
            if case & (1 << bit) != 0 {
                *value = 2.0;
            }
        }
        values
    }

    fn on_cell_edge(p: Vec2) -> bool {
        let s = CELL as f32;
        let inside = (0.0..=s).contains(&p.x) && (0.0..=s).contains(&p.y);
        let on_edge = p.x == 0.0 || p.x == s || p.y == 0.0 || p.y == s;
        inside && on_edge
    }

    #[test]
    fn test_case_index_bits() {
        assert_eq!(case_index(false, false, false, false), 0);
        assert_eq!(case_index(true, false, false, false), 1);
        assert_eq!(case_index(false, true, false, false), 2);
        assert_eq!(case_index(false, false, true, false), 4);
        assert_eq!(case_index(false, false, false, true), 8);
        assert_eq!(case_index(true, true, true, true), 15);
    }

    #[test]
    fn test_cell_classification_matches_corner_order() {
        for case in 0..16u8 {
            let field = single_cell(corner_values(case));
            let cell = Cell::from_field(&field, 0, 0);
            assert_eq!(cell.case(THRESHOLD), case);
        }
    }

    #[test]
    fn test_uniform_cells_emit_nothing() {
        let extractor = ContourExtractor::default();
        for case in [0u8, 15] {
            let field = single_cell(corner_values(case));
            assert_eq!(extractor.segments(&field).count(), 0);
        }
    }

    #[test]
    fn test_single_segment_cases() {
        let extractor = ContourExtractor::default();
        for case in [1u8, 2, 3, 4, 6, 7, 8, 9, 11, 12, 13, 14] {
            let field = single_cell(corner_values(case));
            let segments: Vec<_> = extractor.segments(&field).collect();
            assert_eq!(segments.len(), 1, "case {case}");
            let s = segments[0];
            assert!(on_cell_edge(s.a), "case {case}: {:?}", s.a);
            assert!(on_cell_edge(s.b), "case {case}: {:?}", s.b);
            assert_ne!(s.a, s.b, "case {case}");
        }
    }

    #[test]
    fn test_saddles_emit_two_segments() {
        let separate = ContourExtractor::default();
        let centered = ContourExtractor::new(Box::new(CenterSampled));
        for case in [SADDLE_A_C, SADDLE_B_D] {
            let field = single_cell(corner_values(case));
            let mut iter = separate.segments(&field);
            assert_eq!(iter.by_ref().count(), 2, "case {case}");
            assert_eq!(iter.saddle_cells(), 1);
            assert_eq!(centered.segments(&field).count(), 2, "case {case}");
        }
    }

    #[test]
    fn test_interpolation_not_midpoint() {
        // Top edge from 0.0 to 4.0 crosses 1.0 a quarter of the way along
        let field = single_cell([0.0, 4.0, 4.0, 0.0]);
        let cell = Cell::from_field(&field, 0, 0);
        let p = cell.crossing(Edge::Top, THRESHOLD);
        assert!((p.x - 0.75).abs() < 1e-6);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn test_interpolate_degenerate_is_midpoint() {
        let p = interpolate(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0, 1.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_center_policy_flips_on_low_center() {
        // Case 5 with a center below threshold
        let mut cell = Cell {
            origin: Vec2::ZERO,
            size: 3.0,
            values: [1.1, 0.1, 1.1, 0.1],
        };
        assert_eq!(cell.case(THRESHOLD), SADDLE_A_C);
        assert_eq!(CenterSampled.resolve(SADDLE_A_C, &cell, THRESHOLD), CUT_TL_BR);
        assert_eq!(SeparateSaddles.resolve(SADDLE_A_C, &cell, THRESHOLD), CUT_TR_BL);

        cell.values = [3.0, 0.5, 3.0, 0.5];
        assert_eq!(CenterSampled.resolve(SADDLE_A_C, &cell, THRESHOLD), CUT_TR_BL);
    }

    #[test]
    fn test_center_policy_case_10() {
        // b and d inside with a low center: each is cut off on its own
        let mut cell = Cell {
            origin: Vec2::ZERO,
            size: 3.0,
            values: [0.1, 1.1, 0.1, 1.1],
        };
        assert_eq!(cell.case(THRESHOLD), SADDLE_B_D);
        assert_eq!(CenterSampled.resolve(SADDLE_B_D, &cell, THRESHOLD), CUT_TR_BL);
        assert_eq!(SeparateSaddles.resolve(SADDLE_B_D, &cell, THRESHOLD), CUT_TL_BR);

        // A high center joins b to d, so a and c are cut instead
        cell.values = [0.5, 3.0, 0.5, 3.0];
        assert_eq!(cell.case(THRESHOLD), SADDLE_B_D);
        assert_eq!(CenterSampled.resolve(SADDLE_B_D, &cell, THRESHOLD), CUT_TL_BR);
    }

    #[test]
    fn test_color_gradient() {
        assert_eq!(cell_color(Vec2::ZERO, 100, 100), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(cell_color(Vec2::new(50.0, 25.0), 100, 100), [0.5, 0.25, 0.0, 1.0]);
    }

    #[test]
    fn test_degenerate_grid_has_no_cells() {
        let field = FieldBuffer::from_values(1, 3, CELL, vec![2.0, 0.0, 2.0]).unwrap();
        assert_eq!(ContourExtractor::default().segments(&field).count(), 0);
    }
}
