use crate::binarize::Binarize;
use crate::border::{Border, LossSegments};
use crate::config::{Config, CrossStrategy};
use crate::cross::{self, CrossMatch};
use crate::draw::{self, Overlay};
use crate::error::Error;
use crate::frame::Mask;
use crate::growth::{self, Contour, Growth, Side};
use crate::island::{Corner, CornerKind, IslandDetector, SecondCorner};
use crate::seed::{self, Seeds};
use crate::straight::{StraightDetector, StraightFlags};
use crate::{Passthrough, Smoother, IMAGE_H};

use serde_derive::Serialize;

/// What one frame produced. Values the frame could not refresh keep their previous state.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub frame: u64,
    pub seeds: Option<Seeds>,
    pub growth: Option<Growth>,
    pub left_points: usize,
    pub right_points: usize,
    pub left_loss: LossSegments,
    pub right_loss: LossSegments,
    pub straight: StraightFlags,
    pub cross: Option<CrossMatch>,
    pub corner: Corner,
    pub second_corner: SecondCorner,
}

/// Per-frame driver. Owns every buffer the stages write into, so a frame allocates nothing.
#[derive(Debug)]
pub struct Pipeline<S: Smoother = Passthrough> {
    config: Config,
    left: Contour,
    right: Contour,
    left_border: Border,
    right_border: Border,
    center: [u8; IMAGE_H],
    straight_detector: StraightDetector,
    island: IslandDetector<S>,
    straight: StraightFlags,
    cross: Option<CrossMatch>,
    frame: u64,
}

impl Pipeline<Passthrough> {
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_smoother(config, Passthrough)
    }
}

impl<S: Smoother> Pipeline<S> {
    /// Corner positions go through `smoother` before they are reported.
    pub fn with_smoother(config: Config, smoother: S) -> Result<Self, Error> {
        config.validate()?;

        let left_border = Border::new(Side::Left);
        let right_border = Border::new(Side::Right);
        let mut center = [0; IMAGE_H];
        center_line(&left_border, &right_border, &mut center);

        Ok(Self {
            straight_detector: StraightDetector::new(config.strict_variance, config.loose_variance),
            island: IslandDetector::new(
                config.corner_max_gap,
                config.corner_hold_frames,
                config.frame_interval,
                smoother,
            ),
            config,
            left: Contour::new(),
            right: Contour::new(),
            left_border,
            right_border,
            center,
            straight: StraightFlags::default(),
            cross: None,
            frame: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn left_contour(&self) -> &Contour {
        &self.left
    }

    #[inline]
    pub fn right_contour(&self) -> &Contour {
        &self.right
    }

    #[inline]
    pub fn left_border(&self) -> &Border {
        &self.left_border
    }

    #[inline]
    pub fn right_border(&self) -> &Border {
        &self.right_border
    }

    /// Midpoint of the two boundaries, row 0 at the bottom of the frame.
    #[inline]
    pub fn center(&self) -> &[u8; IMAGE_H] {
        &self.center
    }

    #[inline]
    pub fn straight(&self) -> &StraightFlags {
        &self.straight
    }

    #[inline]
    pub fn cross(&self) -> bool {
        self.cross.is_some()
    }

    #[inline]
    pub fn corner(&self) -> &Corner {
        self.island.corner()
    }

    #[inline]
    pub fn smoother(&self) -> &S {
        self.island.smoother()
    }

    /// Binarizes `gray` into `mask`, then processes it.
    pub fn process_gray<B: Binarize>(
        &mut self,
        gray: &[u8],
        binarizer: &mut B,
        mask: &mut Mask,
    ) -> Result<FrameSummary, Error> {
        binarizer.binarize(gray, mask)?;

        Ok(self.process(mask))
    }

    /// Runs every stage over one binary frame. The frame border is stamped in place.
    pub fn process(&mut self, mask: &mut Mask) -> FrameSummary {
        self.frame += 1;
        mask.stamp_border();

        let seeds = match seed::locate_any(mask, self.config.seed_scan_rows()) {
            Some(seeds) => seeds,
            None => {
                tracing::debug!(frame = self.frame, "no seed pair on any scan row");

                return self.summary(None, None);
            }
        };

        let growth = growth::grow(
            mask,
            seeds,
            self.config.growth_budget,
            &mut self.left,
            &mut self.right,
        );

        let margin = self.config.interior_loss_margin;
        let noise_rows = self.config.corner_noise_rows;
        self.left_border.extract(&self.left, margin, noise_rows);
        self.right_border.extract(&self.right, margin, noise_rows);

        self.cross = cross::detect(&self.left, &self.right, self.config.cross_gaps);

        if let (Some(found), CrossStrategy::BridgeGap) = (&self.cross, self.config.cross_strategy) {
            cross::bridge(
                found,
                &self.left,
                &self.right,
                &mut self.left_border,
                &mut self.right_border,
            );
        }

        self.straight = self
            .straight_detector
            .detect(&self.left_border, &self.right_border);

        self.island.update(
            (&self.left, &self.left_border),
            (&self.right, &self.right_border),
            &self.straight,
        );

        center_line(&self.left_border, &self.right_border, &mut self.center);

        let summary = self.summary(Some(seeds), Some(growth));

        tracing::debug!(
            frame = summary.frame,
            left_points = summary.left_points,
            right_points = summary.right_points,
            apex = ?growth.apex,
            termination = ?growth.termination,
            left_loss = ?summary.left_loss,
            right_loss = ?summary.right_loss,
            straight_left = ?summary.straight.left,
            straight_right = ?summary.straight.right,
            left_variance = summary.straight.left_variance,
            right_variance = summary.straight.right_variance,
            cross = summary.cross.is_some(),
            corner = ?summary.corner.kind,
            hold = summary.corner.hold,
            dir_l = ?self.left.dirs(),
            dir_r = ?self.right.dirs(),
            lost_l = ?&self.left_border.lost()[..],
            lost_r = ?&self.right_border.lost()[..],
            "frame processed"
        );

        summary
    }

    fn summary(&self, seeds: Option<Seeds>, growth: Option<Growth>) -> FrameSummary {
        FrameSummary {
            frame: self.frame,
            seeds,
            growth,
            left_points: self.left.len(),
            right_points: self.right.len(),
            left_loss: self.left_border.loss,
            right_loss: self.right_border.loss,
            straight: self.straight,
            cross: self.cross,
            corner: *self.island.corner(),
            second_corner: self.island.second_corner(),
        }
    }

    /// Writes the overlay of the last processed frame into `canvas`.
    pub fn draw(&self, canvas: &mut Mask) {
        let corner = self.corner();

        draw::draw(
            canvas,
            &Overlay {
                left: &self.left,
                right: &self.right,
                left_border: &self.left_border,
                right_border: &self.right_border,
                center: &self.center,
                corner: (corner.kind != CornerKind::None).then(|| corner.position),
            },
        );
    }
}

fn center_line(left: &Border, right: &Border, out: &mut [u8; IMAGE_H]) {
    for ((c, &l), &r) in out.iter_mut().zip(left.values()).zip(right.values()) {
        *c = ((l as u16 + r as u16) / 2) as u8;
    }
}
