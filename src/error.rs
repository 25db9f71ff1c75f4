use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Mask size mismatch: expected {expected} pixels, got {actual}")]
    MaskSize { expected: usize, actual: usize },

    #[error("Non-binary pixel value {value} at ({x}, {y})")]
    NonBinaryPixel { x: usize, y: usize, value: u8 },

    #[error("Growth budget {budget} exceeds contour capacity {capacity}")]
    GrowthBudget { budget: usize, capacity: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(&'static str),
}
