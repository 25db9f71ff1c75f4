//! Per-row boundaries extracted from a traced contour.
//!
//! Rows here are counted from the bottom of the frame: row 0 is the image row closest
//! to the vehicle.

use crate::growth::{Contour, Side};
use crate::{BORDER_MAX, BORDER_MIN, IMAGE_H};

use serde_derive::Serialize;
use std::fmt;

/// Where the boundary of one side could not be determined.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LossSegments {
    /// First found row from the bottom. Equals the number of lost rows below it.
    pub bottom: u16,
    /// First found row from the top.
    pub top: u16,
    /// Lowest row of the interior gap, 0 when there is none.
    pub interior_start: u16,
    /// Highest row of the interior gap, 0 when there is none.
    pub interior_end: u16,
    pub lost_rows: u16,
}

impl LossSegments {
    #[inline]
    pub fn has_interior(&self) -> bool {
        self.interior_start != 0 || self.interior_end != 0
    }

    #[inline]
    fn clear_interior(&mut self) {
        self.interior_start = 0;
        self.interior_end = 0;
    }
}

#[derive(Clone)]
pub struct Border {
    side: Side,
    values: [u8; IMAGE_H],
    lost: [bool; IMAGE_H],
    pub loss: LossSegments,
}

impl Border {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            values: [Self::sentinel(side); IMAGE_H],
            lost: [true; IMAGE_H],
            loss: LossSegments {
                bottom: IMAGE_H as u16,
                lost_rows: IMAGE_H as u16,
                ..Default::default()
            },
        }
    }

    /// "No data" value: the outermost column a boundary of this side can take.
    #[inline]
    pub fn sentinel(side: Side) -> u8 {
        match side {
            Side::Left => BORDER_MIN,
            Side::Right => BORDER_MAX,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn values(&self) -> &[u8; IMAGE_H] {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [u8; IMAGE_H] {
        &mut self.values
    }

    #[inline]
    pub fn lost(&self) -> &[bool; IMAGE_H] {
        &self.lost
    }

    #[inline]
    fn tighter(&self, col: u8, current: u8) -> bool {
        match self.side {
            Side::Left => col > current,
            Side::Right => col < current,
        }
    }

    /// Rebuilds the row values, the loss bitmap and the loss segments from `contour`.
    ///
    /// An interior gap is only reported when it is more than `margin` rows long. A gap
    /// starting within `noise_rows` of the bottom is merged into the bottom run instead.
    pub fn extract(&mut self, contour: &Contour, margin: u16, noise_rows: u16) {
        self.values.fill(Self::sentinel(self.side));
        self.lost.fill(true);

        let mut lost_rows = IMAGE_H as u16;

        for p in contour.points() {
            if p.y as usize >= IMAGE_H {
                continue;
            }

            let row = p.flipped_row();
            let col = (p.x.min(BORDER_MAX as u16) as u8).max(BORDER_MIN);

            if self.tighter(col, self.values[row]) {
                self.values[row] = col;

                if self.lost[row] {
                    self.lost[row] = false;
                    lost_rows -= 1;
                }
            }
        }

        self.loss = LossSegments {
            lost_rows,
            ..Default::default()
        };

        let bottom = self.lost.iter().position(|&l| !l).unwrap_or(IMAGE_H);
        let top = match self.lost.iter().rposition(|&l| !l) {
            Some(top) => top,
            None => {
                self.loss.bottom = IMAGE_H as u16;
                return;
            }
        };

        self.loss.bottom = bottom as u16;
        self.loss.top = top as u16;

        let edge_runs = bottom + (IMAGE_H - 1 - top);

        if lost_rows as usize <= edge_runs + margin as usize {
            return;
        }

        let mut end = None;

        for row in (bottom..top).rev() {
            match end {
                None if self.lost[row] => end = Some(row),
                Some(e) if !self.lost[row] => {
                    self.loss.interior_start = (row + 1) as u16;
                    self.loss.interior_end = e as u16;
                    break;
                }
                _ => (),
            }
        }

        if self.loss.has_interior() && self.loss.interior_start < noise_rows {
            // loss around the bottom corner, not a real opening
            self.loss.bottom = self.loss.interior_end + 1;
            self.loss.clear_interior();
        }
    }
}

impl fmt::Debug for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Border")
            .field("side", &self.side)
            .field("loss", &self.loss)
            .finish()
    }
}
