//! Cross-section of a tapered trench.
//!
//! A trench is a trapezoid hanging below its top edge: the top edge has the
//! configured `width` and sits at the profile `center`, the bottom edge lies
//! `depth` below it. The sidewalls follow `taper_direction`: `(1, 0)` gives
//! vertical walls, `(1, k)` moves each bottom corner inward by `depth * k`.

use derive_more::Deref;
use log::debug;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{
    error::{Result, TrenchError},
    polygon::Polygon,
    r2::R2,
};

/// Slack for the bottom-width check, relative to the trench width.
const BOTTOM_WIDTH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase", default)]
pub struct TaperedTrenchProfile {
    /// Top-center of the trench
    pub center: R2<f64>,
    /// Sidewall direction; `x` must be non-zero
    pub taper_direction: R2<f64>,
    /// Width at the top of the trench
    pub width: f64,
    pub depth: f64,
}

impl Default for TaperedTrenchProfile {
    fn default() -> Self {
        Self {
            center: R2::new(0., 0.),
            taper_direction: R2::new(1., 0.),
            width: 20.,
            depth: 50.,
        }
    }
}

/// The four corners of a trench cross-section, in the order top-left,
/// top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Deref, Serialize, Deserialize)]
pub struct ProfilePoints(pub [R2<f64>; 4]);

impl ProfilePoints {
    pub fn top_left(&self) -> R2<f64> { self.0[0] }
    pub fn top_right(&self) -> R2<f64> { self.0[1] }
    pub fn bottom_right(&self) -> R2<f64> { self.0[2] }
    pub fn bottom_left(&self) -> R2<f64> { self.0[3] }

    pub fn bottom_width(&self) -> f64 {
        self.bottom_right().x - self.bottom_left().x
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.0.to_vec())
    }
}

impl TaperedTrenchProfile {
    pub fn new(center: R2<f64>, taper_direction: R2<f64>, width: f64, depth: f64) -> Self {
        Self { center, taper_direction, width, depth }
    }

    /// Horizontal distance each bottom corner moves inward relative to the top corner.
    pub fn bottom_inset(&self) -> f64 {
        self.depth * self.taper_direction.y / self.taper_direction.x
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() || !self.taper_direction.is_finite() || !self.width.is_finite() || !self.depth.is_finite() {
            return Err(TrenchError::InvalidProfile(format!("non-finite value in {:?}", self)));
        }
        if self.taper_direction.x == 0. {
            return Err(TrenchError::InvalidProfile(format!(
                "taper direction {} has no horizontal component",
                self.taper_direction,
            )));
        }
        if self.width <= 0. {
            return Err(TrenchError::InvalidProfile(format!("width must be positive, got {}", self.width)));
        }
        if self.depth <= 0. {
            return Err(TrenchError::InvalidProfile(format!("depth must be positive, got {}", self.depth)));
        }
        let bottom_width = self.width - 2. * self.bottom_inset();
        if !bottom_width.is_finite() {
            return Err(TrenchError::InvalidProfile(format!(
                "taper direction {} is too shallow for depth {}: bottom corners overflow",
                self.taper_direction, self.depth,
            )));
        }
        if bottom_width < -BOTTOM_WIDTH_TOLERANCE * self.width {
            return Err(TrenchError::InvalidProfile(format!(
                "sidewalls cross above the bottom: width {} at depth {} with taper {} leaves bottom width {}",
                self.width, self.depth, self.taper_direction, bottom_width,
            )));
        }
        Ok(())
    }

    /// Corner points of the trench cross-section, translated to `center`.
    pub fn points(&self) -> Result<ProfilePoints> {
        self.validate()?;
        let half = self.width / 2.;
        let inset = self.bottom_inset();
        let local = [
            R2::new(-half, 0.),
            R2::new(half, 0.),
            R2::new(half - inset, -self.depth),
            R2::new(-half + inset, -self.depth),
        ];
        let points = ProfilePoints(local.map(|p| p + self.center));
        debug!("trench profile points: {}", points.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", "));
        Ok(points)
    }
}
