use crate::frame::{Mask, Point};
use crate::{BORDER_MAX, BORDER_MIN, IMAGE_W, INSIDE, OUTSIDE};

use serde_derive::Serialize;

/// Start points of the left and right contour walks.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seeds {
    pub left: Point,
    pub right: Point,
}

/// Scans `row` outward from the frame center. The left seed is the first track pixel with
/// an outside pixel to its left, the right seed the first track pixel with one to its right.
/// Both must exist.
pub fn locate(mask: &Mask, row: usize) -> Option<Seeds> {
    let line = mask.row(row);
    let center = IMAGE_W / 2;

    let left = (BORDER_MIN as usize..=center)
        .rev()
        .find(|&i| line[i] == INSIDE && line[i - 1] == OUTSIDE)?;

    let right = (center..=BORDER_MAX as usize)
        .find(|&i| line[i] == INSIDE && line[i + 1] == OUTSIDE)?;

    Some(Seeds {
        left: Point::new(left as u16, row as u16),
        right: Point::new(right as u16, row as u16),
    })
}

/// Tries each row in turn and returns the first that yields both seeds.
pub fn locate_any<I: IntoIterator<Item = usize>>(mask: &Mask, rows: I) -> Option<Seeds> {
    rows.into_iter().find_map(|row| locate(mask, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IMAGE_H;

    fn corridor(left: usize, right: usize) -> Mask {
        let mut mask = Mask::new();
        mask.fill_rect(left..right + 1, 0..IMAGE_H, INSIDE);
        mask.stamp_border();
        mask
    }

    #[test]
    fn finds_both_edges() {
        let mask = corridor(60, 127);
        let seeds = locate(&mask, IMAGE_H - 3).unwrap();

        assert_eq!(seeds.left, Point::new(60, IMAGE_H as u16 - 3));
        assert_eq!(seeds.right, Point::new(127, IMAGE_H as u16 - 3));
    }

    #[test]
    fn row_without_outside_pixels_fails() {
        let mask = Mask::filled(INSIDE);

        assert_eq!(locate(&mask, IMAGE_H - 3), None);
    }

    #[test]
    fn one_sided_transition_fails() {
        let mut mask = Mask::new();
        mask.fill_rect(60..IMAGE_W, 0..IMAGE_H, INSIDE);

        assert_eq!(locate(&mask, IMAGE_H - 3), None);
    }

    #[test]
    fn falls_through_to_later_rows() {
        let mut mask = corridor(60, 127);
        mask.fill_rect(0..IMAGE_W, IMAGE_H - 4..IMAGE_H, INSIDE);

        let seeds = locate_any(&mask, [IMAGE_H - 3, IMAGE_H - 5]).unwrap();

        assert_eq!(seeds.left.y as usize, IMAGE_H - 5);
    }
}
