pub mod binarize;
pub mod border;
pub mod config;
pub mod cross;
pub mod draw;
pub mod error;
pub mod frame;
pub mod growth;
pub mod island;
pub mod matcher;
pub mod math;
pub mod pipeline;
pub mod predictor;
pub mod seed;
pub mod straight;

pub use border::Border;
pub use config::Config;
pub use error::Error;
pub use frame::{Mask, Point};
pub use growth::Contour;
pub use matcher::{MatchResult, SearchDirection};
pub use pipeline::{FrameSummary, Pipeline};
pub use predictor::Predictor;

/// Frame height in rows. Row 0 is the top of the frame.
pub const IMAGE_H: usize = 120;

/// Frame width in columns.
pub const IMAGE_W: usize = 188;

/// Pixel value of everything outside the track.
pub const OUTSIDE: u8 = 0;

/// Pixel value of the track surface.
pub const INSIDE: u8 = 255;

/// Leftmost column a boundary can take. Also the "no data" value of the left boundary.
pub const BORDER_MIN: u8 = 1;

/// Rightmost column a boundary can take. Also the "no data" value of the right boundary.
pub const BORDER_MAX: u8 = (IMAGE_W - 2) as u8;

/// Capacity of a contour point list, and the hard iteration limit of the growth engine.
pub const CONTOUR_CAPACITY: usize = IMAGE_H * 3;

/// Cross-frame smoothing of a detected position.
///
/// The pipeline works without one: [`Passthrough`] returns the raw measurement.
pub trait Smoother {
    fn predict(&mut self, dt: f32);
    fn update(&mut self, measurement: Point) -> Point;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Smoother for Passthrough {
    #[inline]
    fn predict(&mut self, _dt: f32) {}

    #[inline]
    fn update(&mut self, measurement: Point) -> Point {
        measurement
    }
}
