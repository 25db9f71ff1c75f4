//! Eight-neighborhood contour walk over both track edges at once.
//!
//! Each step scans the neighbor ring of a cursor for an outside→inside pair `(i, i+1)`.
//! The recorded direction code is `i`, the slot where the outside pixel was seen; the cursor
//! moves to slot `i + 1`. Every pattern template downstream is written against the recorded
//! code, so the offset must not be "corrected".
//!
//! Recorded code → taken step, left table (clockwise) / right table (counter-clockwise):
//!
//! | code | left | right |
//! |---|---|---|
//! | 0 | down-left | down-right |
//! | 1 | left (outward) | right (outward) |
//! | 2 | up-left | up-right |
//! | 3 | up | up |
//! | 4 | up-right | up-left |
//! | 5 | right (inward) | left (inward) |
//! | 6 | down-right | down-left |
//! | 7 | down | down |

use crate::frame::{Mask, Point};
use crate::seed::Seeds;
use crate::{CONTOUR_CAPACITY, INSIDE, OUTSIDE};

use serde_derive::Serialize;
use std::fmt;

/// Left cursor neighbor ring: down, down-left, left, up-left, up, up-right, right, down-right.
pub const LEFT_NEIGHBORS: [(i8, i8); 8] = [
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Right cursor neighbor ring: down, down-right, right, up-right, up, up-left, left, down-left.
pub const RIGHT_NEIGHBORS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Recorded code whose taken step points straight down.
pub const CODE_DOWN: u8 = 7;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn neighbors(self) -> &'static [(i8, i8); 8] {
        match self {
            Side::Left => &LEFT_NEIGHBORS,
            Side::Right => &RIGHT_NEIGHBORS,
        }
    }
}

/// Traced points of one edge and the direction code recorded at each of them.
#[derive(Clone)]
pub struct Contour {
    points: [Point; CONTOUR_CAPACITY],
    dirs: [u8; CONTOUR_CAPACITY],
    len: usize,
}

impl Contour {
    pub fn new() -> Self {
        Self {
            points: [Point::default(); CONTOUR_CAPACITY],
            dirs: [0; CONTOUR_CAPACITY],
            len: 0,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.dirs.fill(0);
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points[..self.len]
    }

    #[inline]
    pub fn dirs(&self) -> &[u8] {
        &self.dirs[..self.len]
    }

    /// Appends a point with its recorded code. Returns `false` once the contour is full.
    pub fn push(&mut self, point: Point, dir: u8) -> bool {
        if self.len >= CONTOUR_CAPACITY {
            return false;
        }

        self.points[self.len] = point;
        self.dirs[self.len] = dir & 7;
        self.len += 1;

        true
    }

    /// First index at or after `from` whose point lies on image row `y`.
    pub fn index_of_row(&self, y: u16, from: usize) -> Option<usize> {
        self.points()
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, p)| p.y == y)
            .map(|(i, _)| i)
    }
}

impl Default for Contour {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Contour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contour")
            .field("len", &self.len)
            .field("first", &self.points().first())
            .field("last", &self.points().last())
            .finish()
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A cursor sat on the same pixel for three entries.
    Stagnation,
    /// The cursors met.
    Convergence,
    /// Iteration budget ran out.
    Budget,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growth {
    pub iterations: usize,
    /// Row where the two walks met.
    pub apex: Option<u16>,
    pub termination: Termination,
}

/// One transition scan. Among all outside→inside pairs the topmost target wins,
/// earlier slots win ties. Returns the target and its recorded code.
fn step(mask: &Mask, cursor: Point, ring: &[(i8, i8); 8]) -> Option<(Point, u8)> {
    let mut best: Option<(Point, u8)> = None;

    for i in 0..8 {
        let (dx, dy) = ring[i];
        let (nx, ny) = ring[(i + 1) & 7];
        let (x0, y0) = cursor.offset(dx, dy);
        let (x1, y1) = cursor.offset(nx, ny);

        if mask.pixel(x0, y0) == OUTSIDE && mask.pixel(x1, y1) == INSIDE {
            // inside pixels are always on-frame
            let candidate = Point::new(x1 as u16, y1 as u16);

            if best.map_or(true, |(b, _)| candidate.y < b.y) {
                best = Some((candidate, i as u8));
            }
        }
    }

    best
}

/// Walks both edges up from the seeds until they meet, one of them stalls, or `budget`
/// iterations pass. Both contours are overwritten.
///
/// The right walk waits while it is above the left one. When the left walk turns straight
/// down while still above the right one, its last step is undone and it waits instead.
pub fn grow(
    mask: &Mask,
    seeds: Seeds,
    budget: usize,
    left: &mut Contour,
    right: &mut Contour,
) -> Growth {
    left.clear();
    right.clear();

    let budget = budget.min(CONTOUR_CAPACITY);
    let mut cursor_l = seeds.left;
    let mut cursor_r = seeds.right;
    let mut nl = 0;
    let mut nr = 0;
    let mut iterations = 0;
    let mut apex = None;
    let mut termination = Termination::Budget;

    while iterations < budget {
        iterations += 1;

        left.points[nl] = cursor_l;
        nl += 1;
        // pending until the right step is committed below
        right.points[nr] = cursor_r;

        if let Some((next, code)) = step(mask, cursor_l, Side::Left.neighbors()) {
            left.dirs[nl - 1] = code;
            cursor_l = next;
        }

        let last_l = left.points[nl - 1];
        let pending_r = right.points[nr];

        let right_stuck =
            nr >= 2 && right.points[nr - 1] == pending_r && right.points[nr - 2] == pending_r;
        let left_stuck =
            nl >= 3 && left.points[nl - 2] == last_l && left.points[nl - 3] == last_l;

        if right_stuck || left_stuck {
            termination = Termination::Stagnation;
            break;
        }

        if pending_r.touches(&last_l) {
            apex = Some((pending_r.y + last_l.y) / 2);
            termination = Termination::Convergence;
            break;
        }

        if pending_r.y < last_l.y {
            continue;
        }

        if left.dirs[nl - 1] == CODE_DOWN && pending_r.y > last_l.y {
            cursor_l = last_l;
            nl -= 1;
        }

        nr += 1;

        if let Some((next, code)) = step(mask, cursor_r, Side::Right.neighbors()) {
            right.dirs[nr - 1] = code;
            cursor_r = next;
        }
    }

    left.len = nl;
    right.len = nr;

    tracing::trace!(
        "growth stopped: {:?} after {} iterations (left {}, right {})",
        termination,
        iterations,
        nl,
        nr
    );

    Growth {
        iterations,
        apex,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::{IMAGE_H, IMAGE_W};

    fn corridor(left: usize, right: usize) -> Mask {
        let mut mask = Mask::new();
        mask.fill_rect(left..right + 1, 0..IMAGE_H, INSIDE);
        mask.stamp_border();
        mask
    }

    fn run(mask: &Mask, budget: usize) -> (Contour, Contour, Growth) {
        let seeds = seed::locate(mask, IMAGE_H - 3).unwrap();
        let mut left = Contour::new();
        let mut right = Contour::new();
        let growth = grow(mask, seeds, budget, &mut left, &mut right);

        (left, right, growth)
    }

    fn assert_taken_step_follows_code(contour: &Contour, ring: &[(i8, i8); 8]) {
        let points = contour.points();

        for k in 0..points.len().saturating_sub(1) {
            let code = contour.dirs()[k];
            assert!(code < 8);

            let (dx, dy) = ring[(code as usize + 1) & 7];
            let (x, y) = points[k].offset(dx, dy);

            assert_eq!(
                (x, y),
                (points[k + 1].x as i16, points[k + 1].y as i16),
                "step {}",
                k
            );
        }
    }

    #[test]
    fn corridor_converges_at_top() {
        let mask = corridor(60, 127);
        let (left, right, growth) = run(&mask, CONTOUR_CAPACITY);

        assert_eq!(growth.termination, Termination::Convergence);
        assert_eq!(growth.apex, Some(1));
        assert!(growth.iterations <= CONTOUR_CAPACITY);

        // straight climb is recorded as code 3 on both sides
        assert!(left.dirs()[..100].iter().all(|&d| d == 3));
        assert!(right.dirs()[..100].iter().all(|&d| d == 3));
        assert!(left.points()[..100].iter().all(|p| p.x == 60));
        assert!(right.points()[..100].iter().all(|p| p.x == 127));

        assert_taken_step_follows_code(&left, &LEFT_NEIGHBORS);
        assert_taken_step_follows_code(&right, &RIGHT_NEIGHBORS);
    }

    #[test]
    fn budget_bounds_the_walk() {
        let mask = corridor(60, 127);
        let (left, right, growth) = run(&mask, 10);

        assert_eq!(growth.termination, Termination::Budget);
        assert_eq!(growth.iterations, 10);
        assert!(left.len() <= 10);
        assert!(right.len() <= 10);
    }

    #[test]
    fn isolated_seeds_stagnate() {
        let mut mask = Mask::new();
        mask.set(40, 100, INSIDE);
        mask.set(140, 100, INSIDE);

        let seeds = Seeds {
            left: Point::new(40, 100),
            right: Point::new(140, 100),
        };

        let mut left = Contour::new();
        let mut right = Contour::new();
        let growth = grow(&mask, seeds, CONTOUR_CAPACITY, &mut left, &mut right);

        assert_eq!(growth.termination, Termination::Stagnation);
        assert_eq!(growth.iterations, 3);
    }

    #[test]
    fn left_walk_waits_at_a_downward_turn() {
        // track widens to the right above row 60, the left walk reaches the
        // top early and has to wait for the right one at the far corner
        let mut mask = corridor(60, 127);
        mask.fill_rect(128..IMAGE_W, 40..60, INSIDE);
        mask.stamp_border();

        let (left, right, growth) = run(&mask, CONTOUR_CAPACITY);

        assert_eq!(growth.termination, Termination::Convergence);
        assert!(left.points().iter().all(|p| p.y >= 1));
        // the left walk never commits a downward step
        assert!(left
            .points()
            .windows(2)
            .all(|w| w[1].y <= w[0].y));

        assert_taken_step_follows_code(&left, &LEFT_NEIGHBORS);
        assert_taken_step_follows_code(&right, &RIGHT_NEIGHBORS);
    }

    #[test]
    fn right_walk_waits_while_left_detours() {
        // notch on the left edge, the left walk spends extra steps below the right one
        let mut mask = corridor(60, 127);
        mask.fill_rect(30..60, 80..91, INSIDE);
        mask.stamp_border();

        let (left, right, growth) = run(&mask, CONTOUR_CAPACITY);

        assert_eq!(growth.termination, Termination::Convergence);
        assert_eq!(growth.apex, Some(1));
        assert!(right.len() < left.len());
        assert!(right.points().iter().all(|p| p.x == 127 || p.y == 1));
        assert!(left.points().iter().any(|p| p.x == 30));

        assert_taken_step_follows_code(&left, &LEFT_NEIGHBORS);
        assert_taken_step_follows_code(&right, &RIGHT_NEIGHBORS);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut contour = Contour::new();

        for i in 0..CONTOUR_CAPACITY {
            assert!(contour.push(Point::new(1, (i % IMAGE_H) as u16), 3));
        }

        assert!(!contour.push(Point::new(1, 1), 3));
        assert_eq!(contour.len(), CONTOUR_CAPACITY);
    }

    #[test]
    fn index_of_row_scans_forward() {
        let mask = corridor(60, 127);
        let (left, _, _) = run(&mask, CONTOUR_CAPACITY);

        let idx = left.index_of_row(100, 0).unwrap();
        assert_eq!(left.points()[idx].y, 100);
        assert_eq!(left.index_of_row(100, idx + 1), None);
    }
}
