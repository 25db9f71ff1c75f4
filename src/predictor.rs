use crate::config::Config;
use crate::frame::Point;
use crate::{Smoother, IMAGE_H, IMAGE_W};

use nalgebra as na;
use num_traits::Float;

/// Constant-velocity Kalman filter over `[x, y, vx, vy]`, measuring position only.
#[derive(Debug, Clone)]
pub struct Predictor<F>
where
    F: na::RealField + Float,
{
    pub state: na::Vector4<F>,
    pub covariance: na::Matrix4<F>,
    process_noise: na::Matrix4<F>,
    measurement_noise: na::Matrix2<F>,
    initialized: bool,
}

impl<F> Predictor<F>
where
    F: na::RealField + Float,
{
    pub fn new(process_noise: F, measurement_noise: F) -> Self {
        Self {
            state: na::Vector4::zeros(),
            covariance: Self::initial_covariance(),
            process_noise: na::Matrix4::identity() * process_noise,
            measurement_noise: na::Matrix2::identity() * measurement_noise,
            initialized: false,
        }
    }

    fn initial_covariance() -> na::Matrix4<F> {
        let one = F::one();
        let wide = F::from(1000.0).unwrap();

        na::Matrix4::from_diagonal(&na::Vector4::new(one, one, wide, wide))
    }

    #[inline]
    fn observation() -> na::Matrix2x4<F> {
        let (o, z) = (F::one(), F::zero());

        na::Matrix2x4::new(o, z, z, z, z, o, z, z)
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Restarts at a known position with zero velocity.
    pub fn reset(&mut self, x: F, y: F) {
        self.state = na::Vector4::new(x, y, F::zero(), F::zero());
        self.covariance = Self::initial_covariance();
        self.initialized = true;
    }

    /// Advances the state by `dt` seconds.
    pub fn propagate(&mut self, dt: F) {
        let mut f = na::Matrix4::identity();
        f[(0, 2)] = dt;
        f[(1, 3)] = dt;

        self.state = f * self.state;
        self.covariance = f * self.covariance * f.transpose() + self.process_noise;
    }

    /// Folds in a position measurement. Skipped when the innovation covariance is singular.
    pub fn correct(&mut self, measurement: na::Vector2<F>) {
        let h = Self::observation();
        let s = h * self.covariance * h.transpose() + self.measurement_noise;

        let s_inv = if let Some(m) = s.try_inverse() {
            m
        } else {
            return;
        };

        let gain = self.covariance * h.transpose() * s_inv;
        let innovation = measurement - h * self.state;

        self.state += gain * innovation;
        self.covariance = (na::Matrix4::identity() - gain * h) * self.covariance;
    }

    #[inline]
    pub fn position(&self) -> na::Point2<F> {
        na::Point2::new(self.state[0], self.state[1])
    }

    #[inline]
    pub fn velocity(&self) -> na::Vector2<F> {
        na::Vector2::new(self.state[2], self.state[3])
    }
}

impl Predictor<f32> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.process_noise, config.measurement_noise)
    }
}

impl Smoother for Predictor<f32> {
    fn predict(&mut self, dt: f32) {
        if self.initialized {
            self.propagate(dt);
        }
    }

    fn update(&mut self, measurement: Point) -> Point {
        let (x, y) = (measurement.x as f32, measurement.y as f32);

        if !self.initialized {
            self.reset(x, y);
            return measurement;
        }

        self.correct(na::Vector2::new(x, y));

        let p = self.position();

        Point::new(
            p.x.round().clamp(0.0, (IMAGE_W - 1) as f32) as u16,
            p.y.round().clamp(0.0, (IMAGE_H - 1) as f32) as u16,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_measurement_initializes() {
        let mut predictor = Predictor::<f32>::new(0.01, 1.0);

        assert!(!predictor.is_initialized());
        assert_eq!(predictor.update(Point::new(30, 40)), Point::new(30, 40));
        assert!(predictor.is_initialized());
        assert_eq!(predictor.position(), na::Point2::new(30.0, 40.0));
    }

    #[test]
    fn velocity_starts_uncertain() {
        let mut predictor = Predictor::<f64>::new(0.01, 1.0);
        predictor.reset(5.0, 5.0);

        assert_eq!(
            predictor.covariance.diagonal(),
            na::Vector4::new(1.0, 1.0, 1000.0, 1000.0)
        );
    }

    #[test]
    fn learns_constant_velocity() {
        let mut predictor = Predictor::<f64>::new(0.01, 1.0);
        predictor.reset(10.0, 50.0);

        for k in 1..60 {
            predictor.propagate(1.0);
            predictor.correct(na::Vector2::new(10.0 + 2.0 * k as f64, 50.0));
        }

        let v = predictor.velocity();
        assert!((v.x - 2.0).abs() < 0.1, "vx {}", v.x);
        assert!(v.y.abs() < 0.1, "vy {}", v.y);
    }

    #[test]
    fn propagate_moves_by_velocity() {
        let mut predictor = Predictor::<f64>::new(0.01, 1.0);
        predictor.reset(0.0, 0.0);
        predictor.state[2] = 3.0;
        predictor.state[3] = -1.0;

        predictor.propagate(2.0);

        assert_eq!(predictor.position(), na::Point2::new(6.0, -2.0));
        assert!(predictor.covariance[(0, 0)] > 1.0);
    }

    #[test]
    fn smoothing_stays_in_frame() {
        let mut predictor = Predictor::<f32>::new(0.01, 1.0);
        predictor.update(Point::new(0, 0));
        predictor.state[2] = -500.0;
        predictor.predict(1.0);

        let p = predictor.update(Point::new(0, 0));
        assert!((p.x as usize) < IMAGE_W);
    }
}
