//! Diagnostic overlay. Writes small color codes into a copy of the frame.

use crate::border::Border;
use crate::frame::{Mask, Point};
use crate::growth::Contour;
use crate::IMAGE_H;

pub const LEFT_POINT: u8 = 1;
pub const RIGHT_POINT: u8 = 2;
pub const CENTER_LINE: u8 = 3;
pub const LEFT_BORDER: u8 = 4;
pub const RIGHT_BORDER: u8 = 5;
pub const CORNER: u8 = 6;

/// Per-frame pipeline output the overlay is drawn from.
pub struct Overlay<'a> {
    pub left: &'a Contour,
    pub right: &'a Contour,
    pub left_border: &'a Border,
    pub right_border: &'a Border,
    pub center: &'a [u8; IMAGE_H],
    pub corner: Option<Point>,
}

fn column(canvas: &mut Mask, values: &[u8; IMAGE_H], color: u8) {
    for (row, &x) in values.iter().enumerate() {
        canvas.set(x as usize, IMAGE_H - 1 - row, color);
    }
}

fn marker(canvas: &mut Mask, at: Point) {
    let (x, y) = (at.x as i16, at.y as i16);

    for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (px, py) = (x + dx, y + dy);

        if px >= 0 && py >= 0 && (px as usize) < crate::IMAGE_W && (py as usize) < IMAGE_H {
            canvas.set(px as usize, py as usize, CORNER);
        }
    }
}

/// Boundaries go down first, then the center line, then the raw contour points and the
/// corner marker on top.
pub fn draw(canvas: &mut Mask, overlay: &Overlay<'_>) {
    column(canvas, overlay.left_border.values(), LEFT_BORDER);
    column(canvas, overlay.right_border.values(), RIGHT_BORDER);
    column(canvas, overlay.center, CENTER_LINE);

    for p in overlay.left.points() {
        canvas.set(p.x as usize, p.y as usize, LEFT_POINT);
    }

    for p in overlay.right.points() {
        canvas.set(p.x as usize, p.y as usize, RIGHT_POINT);
    }

    if let Some(at) = overlay.corner {
        marker(canvas, at);
    }
}
