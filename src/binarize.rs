use crate::error::Error;
use crate::frame::Mask;
use crate::{IMAGE_H, IMAGE_W, INSIDE, OUTSIDE};

/// Stage that turns a grayscale frame into a binary track mask.
pub trait Binarize {
    fn binarize(&mut self, gray: &[u8], out: &mut Mask) -> Result<(), Error>;
}

/// Fixed-level threshold: pixels at or above the level are track.
#[derive(Debug, Clone, Copy)]
pub struct Threshold(pub u8);

impl Binarize for Threshold {
    fn binarize(&mut self, gray: &[u8], out: &mut Mask) -> Result<(), Error> {
        let expected = IMAGE_W * IMAGE_H;

        if gray.len() != expected {
            return Err(Error::MaskSize {
                expected,
                actual: gray.len(),
            });
        }

        for (y, row) in gray.chunks_exact(IMAGE_W).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                out.set(x, y, if v >= self.0 { INSIDE } else { OUTSIDE });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_splits_at_level() {
        let mut gray = vec![10u8; IMAGE_W * IMAGE_H];
        gray[IMAGE_W * 4 + 7] = 128;
        gray[IMAGE_W * 4 + 8] = 127;

        let mut mask = Mask::filled(INSIDE);
        Threshold(128).binarize(&gray, &mut mask).unwrap();

        assert_eq!(mask.get(7, 4), INSIDE);
        assert_eq!(mask.get(8, 4), OUTSIDE);
        assert_eq!(mask.get(0, 0), OUTSIDE);
    }
}
