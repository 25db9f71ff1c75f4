//! Island corner: one side opens up while the opposite edge stays straight.

use crate::border::Border;
use crate::frame::Point;
use crate::growth::Contour;
use crate::matcher::{self, MatchResult, SearchDirection};
use crate::straight::StraightFlags;
use crate::{Smoother, IMAGE_H};

use serde_derive::Serialize;

/// Climb, outward turn, outward run. The neighbor tables mirror each other, so both
/// sides record the same codes for the same shape.
pub const CORNER: [u8; 6] = [3, 3, 2, 1, 1, 1];

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CornerKind {
    #[default]
    None,
    RightIsland,
    LeftIsland,
}

/// Follow-up corner stage, armed while the hold-down counter runs.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SecondCorner {
    #[default]
    Inactive,
    // TODO: classify the exit corner once a template for it is settled
    Pending,
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct Corner {
    pub kind: CornerKind,
    /// Frames left before the corner is dropped.
    pub hold: u8,
    /// Image coordinates of the last confirmed corner.
    pub position: Point,
    /// Survives the hold-down running out.
    pub valid: bool,
    pub last_match: MatchResult,
}

#[derive(Debug, Clone)]
pub struct IslandDetector<S: Smoother> {
    max_gap: usize,
    hold_frames: u8,
    frame_interval: f32,
    state: Corner,
    smoother: S,
}

impl<S: Smoother> IslandDetector<S> {
    pub fn new(max_gap: usize, hold_frames: u8, frame_interval: f32, smoother: S) -> Self {
        Self {
            max_gap,
            hold_frames,
            frame_interval,
            state: Corner::default(),
            smoother,
        }
    }

    #[inline]
    pub fn corner(&self) -> &Corner {
        &self.state
    }

    #[inline]
    pub fn smoother(&self) -> &S {
        &self.smoother
    }

    pub fn second_corner(&self) -> SecondCorner {
        if self.state.hold > 0 {
            SecondCorner::Pending
        } else {
            SecondCorner::Inactive
        }
    }

    /// Searches back from the start of the interior gap for the corner template.
    fn search(&self, contour: &Contour, border: &Border) -> Option<MatchResult> {
        let first = contour.points().first()?;
        let interior_start = border.loss.interior_start as usize;
        let y = (IMAGE_H - 1).checked_sub(interior_start)? as u16;

        // rows climb by at most one per contour index
        let from = interior_start.saturating_sub(first.flipped_row());
        let index = contour.index_of_row(y, from)?;

        let m = matcher::find(
            contour.dirs(),
            &CORNER,
            self.max_gap,
            index,
            SearchDirection::Reverse,
        );

        m.matched.then(|| m)
    }

    /// Runs once per frame. `left` and `right` pair each contour with its extracted border.
    pub fn update(
        &mut self,
        left: (&Contour, &Border),
        right: (&Contour, &Border),
        straight: &StraightFlags,
    ) -> &Corner {
        // time passes for the smoother whether or not the corner is seen
        self.smoother.predict(self.frame_interval);

        let candidate = match (left.1.loss.has_interior(), right.1.loss.has_interior()) {
            (false, true) if straight.left.is_straight() => self
                .search(right.0, right.1)
                .map(|m| (CornerKind::RightIsland, right.0, m)),
            (true, false) if straight.right.is_straight() => self
                .search(left.0, left.1)
                .map(|m| (CornerKind::LeftIsland, left.0, m)),
            _ => None,
        };

        match candidate {
            Some((kind, contour, m)) => {
                self.state.kind = kind;
                self.state.hold = self.hold_frames;
                self.state.position = self.smoother.update(contour.points()[m.start]);
                self.state.valid = true;
                self.state.last_match = m;

                tracing::trace!(
                    "{:?} at {:?}, confidence {}",
                    kind,
                    self.state.position,
                    m.confidence
                );
            }
            None => {
                self.state.hold = self.state.hold.saturating_sub(1);

                if self.state.hold == 0 {
                    self.state.kind = CornerKind::None;
                }
            }
        }

        &self.state
    }
}
