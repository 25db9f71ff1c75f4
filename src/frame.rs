use crate::error::Error;
use crate::{IMAGE_H, IMAGE_W, INSIDE, OUTSIDE};

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Pixel coordinate, `x` is the column and `y` the row (0 = top)
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    #[inline(always)]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Row in the boundary-array numbering, where row 0 is the bottom of the frame.
    #[inline(always)]
    pub fn flipped_row(&self) -> usize {
        IMAGE_H - 1 - self.y as usize
    }

    #[inline(always)]
    pub fn offset(&self, dx: i8, dy: i8) -> (i16, i16) {
        (self.x as i16 + dx as i16, self.y as i16 + dy as i16)
    }

    /// Chebyshev distance below 2.
    #[inline]
    pub fn touches(&self, other: &Point) -> bool {
        (self.x as i16 - other.x as i16).abs() < 2 && (self.y as i16 - other.y as i16).abs() < 2
    }
}

/// Binary frame of fixed geometry. Values are [`OUTSIDE`] or [`INSIDE`] after binarization;
/// the visualization pass writes small color codes into a copy.
#[derive(Clone, PartialEq)]
pub struct Mask {
    pixels: [[u8; IMAGE_W]; IMAGE_H],
}

impl Mask {
    #[inline]
    pub fn new() -> Self {
        Self::filled(OUTSIDE)
    }

    #[inline]
    pub fn filled(value: u8) -> Self {
        Self {
            pixels: [[value; IMAGE_W]; IMAGE_H],
        }
    }

    /// Builds a mask from a row-major buffer of `IMAGE_W * IMAGE_H` binary pixels.
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let expected = IMAGE_W * IMAGE_H;

        if data.len() != expected {
            return Err(Error::MaskSize {
                expected,
                actual: data.len(),
            });
        }

        let mut mask = Self::new();

        for (y, row) in data.chunks_exact(IMAGE_W).enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != INSIDE && value != OUTSIDE {
                    return Err(Error::NonBinaryPixel { x, y, value });
                }

                mask.pixels[y][x] = value;
            }
        }

        Ok(mask)
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y][x] = value;
    }

    /// Signed access used by the neighborhood walk; anything off-frame reads as outside.
    #[inline(always)]
    pub fn pixel(&self, x: i16, y: i16) -> u8 {
        if x < 0 || y < 0 || x as usize >= IMAGE_W || y as usize >= IMAGE_H {
            return OUTSIDE;
        }

        self.pixels[y as usize][x as usize]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8; IMAGE_W] {
        &self.pixels[y]
    }

    #[inline]
    pub fn rows(&self) -> &[[u8; IMAGE_W]; IMAGE_H] {
        &self.pixels
    }

    pub fn fill_rect(&mut self, xs: Range<usize>, ys: Range<usize>, value: u8) {
        let xs = xs.start.min(IMAGE_W)..xs.end.min(IMAGE_W);

        for row in self.pixels[ys.start.min(IMAGE_H)..ys.end.min(IMAGE_H)].iter_mut() {
            row[xs.clone()].fill(value);
        }
    }

    /// Paints a one pixel outside frame on the left, right and top edges.
    /// The bottom row stays as is, the seed rows sit right above it.
    pub fn stamp_border(&mut self) {
        for row in self.pixels.iter_mut() {
            row[0] = OUTSIDE;
            row[IMAGE_W - 1] = OUTSIDE;
        }

        self.pixels[0].fill(OUTSIDE);
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inside = self.pixels.iter().flatten().filter(|&&p| p == INSIDE).count();

        f.debug_struct("Mask")
            .field("dims", &(IMAGE_W, IMAGE_H))
            .field("inside", &inside)
            .finish()
    }
}
