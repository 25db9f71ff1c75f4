//! Cross intersection: on both sides the edge climbs, runs inward along the far side of the
//! crossing road, then climbs inward again.

use crate::border::Border;
use crate::growth::Contour;
use crate::matcher::{self, SearchDirection};
use crate::IMAGE_H;

use serde_derive::Serialize;

/// Sustained climb.
pub const UP: [u8; 6] = [3; 6];
/// Sustained run toward the track center.
pub const INWARD: [u8; 6] = [5; 6];
/// Sustained diagonal climb toward the track center.
pub const UP_INWARD: [u8; 6] = [4; 6];

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrossSide {
    /// Contour index where the inward run ends.
    pub inward_end: usize,
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrossMatch {
    pub left: CrossSide,
    pub right: CrossSide,
}

/// Runs the three stages on one side's codes, each stage starting where the previous one ended.
pub fn match_side(dirs: &[u8], gaps: [usize; 3]) -> Option<CrossSide> {
    let up = matcher::find(dirs, &UP, gaps[0], 0, SearchDirection::Forward);

    if !up.matched {
        return None;
    }

    let inward = matcher::find(dirs, &INWARD, gaps[1], up.end, SearchDirection::Forward);

    if !inward.matched {
        return None;
    }

    let up_inward = matcher::find(
        dirs,
        &UP_INWARD,
        gaps[2],
        inward.end,
        SearchDirection::Forward,
    );

    up_inward.matched.then(|| CrossSide {
        inward_end: inward.end,
    })
}

/// Both sides must complete the chain.
pub fn detect(left: &Contour, right: &Contour, gaps: [usize; 3]) -> Option<CrossMatch> {
    let l = match_side(left.dirs(), gaps)?;
    let r = match_side(right.dirs(), gaps)?;

    Some(CrossMatch { left: l, right: r })
}

/// Overwrites the rows below the crossing with a vertical bridge. Each side takes the
/// boundary value three rows above the end of its inward run.
pub fn bridge(
    found: &CrossMatch,
    left: &Contour,
    right: &Contour,
    left_border: &mut Border,
    right_border: &mut Border,
) {
    let row_l = left.points()[found.left.inward_end].flipped_row();
    let row_r = right.points()[found.right.inward_end].flipped_row();

    let value_l = left_border.values()[(row_l + 3).min(IMAGE_H - 1)];
    let value_r = right_border.values()[(row_r + 3).min(IMAGE_H - 1)];

    let top = row_l.max(row_r);

    left_border.values_mut()[..=top].fill(value_l);
    right_border.values_mut()[..=top].fill(value_r);

    tracing::trace!("bridged rows 0..={} with {}/{}", top, value_l, value_r);
}
