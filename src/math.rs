use nalgebra as na;
use num_traits::Float;

/// Running sums of a least-squares line fit `y = a * x + b`.
#[derive(Debug, Clone, Copy)]
pub struct LineSums<T> {
    pub n: T,
    pub s_x: T,
    pub s_y: T,
    pub s_xy: T,
    pub s_x2: T,
}

impl<T: na::RealField + Float> LineSums<T> {
    pub fn from_samples<I: IntoIterator<Item = (T, T)>>(samples: I) -> Self {
        let zero = T::zero();
        let mut sums = Self {
            n: zero,
            s_x: zero,
            s_y: zero,
            s_xy: zero,
            s_x2: zero,
        };

        for (x, y) in samples {
            sums.n = sums.n + T::one();
            sums.s_x = sums.s_x + x;
            sums.s_y = sums.s_y + y;
            sums.s_xy = sums.s_xy + x * y;
            sums.s_x2 = sums.s_x2 + x * x;
        }

        sums
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == T::zero()
    }

    #[inline]
    pub fn mean(&self) -> (T, T) {
        (self.s_x / self.n, self.s_y / self.n)
    }

    /// Solves the normal equations, `None` when they are singular
    /// (a single sample, or all samples on one `x`).
    pub fn linear_ls(&self) -> Option<na::Vector2<T>> {
        let a = na::Matrix2::new(self.s_x2, self.s_x, self.s_x, self.n);
        let b = na::Vector2::new(self.s_xy, self.s_y);

        a.try_inverse().map(|inv| inv * b)
    }
}

/// Mean squared vertical residual of the samples around `y = slope * x + intercept`.
pub fn mean_squared_residual<T, I>(samples: I, slope: T, intercept: T) -> T
where
    T: na::RealField + Float,
    I: IntoIterator<Item = (T, T)>,
{
    let mut n = T::zero();
    let mut sum = T::zero();

    for (x, y) in samples {
        let residual = y - (slope * x + intercept);

        sum = sum + residual * residual;
        n = n + T::one();
    }

    if n == T::zero() {
        return T::zero();
    }

    sum / n
}
