use crate::error::Error;
use crate::{CONTOUR_CAPACITY, IMAGE_H};

use serde_derive::{Deserialize, Serialize};

/// What the intersection detector does once both sides match.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossStrategy {
    /// Raise the intersection flag only.
    #[default]
    FlagOnly,
    /// Raise the flag and overwrite the lower boundary rows with a vertical bridge.
    BridgeGap,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Seed scan rows as offsets from the bottom row, tried in order.
    pub seed_rows: Vec<u16>,
    pub growth_budget: usize,
    pub strict_variance: f32,
    pub loose_variance: f32,
    pub interior_loss_margin: u16,
    pub corner_noise_rows: u16,
    pub cross_gaps: [usize; 3],
    pub cross_strategy: CrossStrategy,
    pub corner_max_gap: usize,
    pub corner_hold_frames: u8,
    // in seconds
    pub frame_interval: f32,
    pub process_noise: f32,
    pub measurement_noise: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_rows: vec![3, 5, 7],
            growth_budget: CONTOUR_CAPACITY,
            strict_variance: 10.0,
            loose_variance: 50.0,
            interior_loss_margin: 3,
            corner_noise_rows: 10,
            cross_gaps: [0, 0, 2],
            cross_strategy: CrossStrategy::FlagOnly,
            corner_max_gap: 4,
            corner_hold_frames: 8,
            frame_interval: 0.02,
            process_noise: 0.01,
            measurement_noise: 1.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.growth_budget > CONTOUR_CAPACITY {
            return Err(Error::GrowthBudget {
                budget: self.growth_budget,
                capacity: CONTOUR_CAPACITY,
            });
        }

        if self.seed_rows.is_empty() {
            return Err(Error::InvalidConfig("no seed rows"));
        }

        if self
            .seed_rows
            .iter()
            .any(|&r| r == 0 || r as usize > IMAGE_H)
        {
            return Err(Error::InvalidConfig("seed row outside the frame"));
        }

        if self.loose_variance < self.strict_variance {
            return Err(Error::InvalidConfig(
                "loose variance threshold below strict threshold",
            ));
        }

        if self.corner_hold_frames == 0 {
            return Err(Error::InvalidConfig("corner hold-down must be at least one frame"));
        }

        if self.process_noise <= 0.0 || self.measurement_noise <= 0.0 {
            return Err(Error::InvalidConfig("filter noise must be positive"));
        }

        Ok(())
    }

    /// Image rows the seed locator scans.
    pub fn seed_scan_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.seed_rows.iter().map(|&r| IMAGE_H - r as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_oversized_budget() {
        let config = Config {
            growth_budget: CONTOUR_CAPACITY + 1,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(Error::GrowthBudget { .. })
        ));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = Config {
            loose_variance: 5.0,
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "corner_hold_frames": 4, "cross_strategy": "BridgeGap" }"#)
                .unwrap();

        assert_eq!(config.corner_hold_frames, 4);
        assert_eq!(config.cross_strategy, CrossStrategy::BridgeGap);
        assert_eq!(config.seed_rows, vec![3, 5, 7]);
    }

    #[test]
    fn seed_rows_count_from_bottom() {
        let rows: Vec<_> = Config::default().seed_scan_rows().collect();

        assert_eq!(rows, vec![IMAGE_H - 3, IMAGE_H - 5, IMAGE_H - 7]);
    }
}
