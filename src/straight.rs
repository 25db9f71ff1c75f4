use crate::border::Border;
use crate::math::{mean_squared_residual, LineSums};

use serde_derive::Serialize;

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Straightness {
    #[default]
    NotStraight,
    Loose,
    Strict,
}

impl Straightness {
    #[inline]
    pub fn is_straight(self) -> bool {
        self != Straightness::NotStraight
    }
}

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct StraightFlags {
    pub left: Straightness,
    pub right: Straightness,
    /// Weaker of the two sides.
    pub both: Straightness,
    pub left_variance: f32,
    pub right_variance: f32,
}

/// Least-squares straightness of the boundary rows.
#[derive(Debug, Clone)]
pub struct StraightDetector {
    strict: f32,
    loose: f32,
    // reused when a span is too degenerate to fit
    slope_last: f32,
}

impl StraightDetector {
    pub fn new(strict: f32, loose: f32) -> Self {
        Self {
            strict,
            loose,
            slope_last: 0.0,
        }
    }

    #[inline]
    pub fn slope_last(&self) -> f32 {
        self.slope_last
    }

    /// Mean squared residual of `border[begin..end]` around its fitted line, row index
    /// against column. Returns `-1.0` for an empty or out-of-range span.
    pub fn variance(&mut self, border: &[u8], begin: usize, end: usize) -> f32 {
        if end <= begin || end > border.len() {
            return -1.0;
        }

        let samples = || (begin..end).map(|i| (i as f32, border[i] as f32));
        let sums = LineSums::from_samples(samples());

        let slope = match sums.linear_ls() {
            Some(beta) => {
                self.slope_last = beta[0];
                beta[0]
            }
            None => self.slope_last,
        };

        let (x_mean, y_mean) = sums.mean();
        let intercept = y_mean - slope * x_mean;

        mean_squared_residual(samples(), slope, intercept)
    }

    pub fn classify(&self, variance: f32) -> Straightness {
        if variance < 0.0 {
            Straightness::NotStraight
        } else if variance < self.strict {
            Straightness::Strict
        } else if variance < self.loose {
            Straightness::Loose
        } else {
            Straightness::NotStraight
        }
    }

    /// Fits each side between its bottom and top loss boundaries.
    pub fn detect(&mut self, left: &Border, right: &Border) -> StraightFlags {
        let left_variance = self.variance(
            left.values(),
            left.loss.bottom as usize,
            left.loss.top as usize,
        );
        let right_variance = self.variance(
            right.values(),
            right.loss.bottom as usize,
            right.loss.top as usize,
        );

        let l = self.classify(left_variance);
        let r = self.classify(right_variance);

        StraightFlags {
            left: l,
            right: r,
            both: l.min(r),
            left_variance,
            right_variance,
        }
    }
}
