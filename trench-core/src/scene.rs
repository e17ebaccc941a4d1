//! Substrate-with-trench scene composition.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{
    error::{Result, TrenchError},
    kernel::{BoundaryCondition, Domain, GeoKernel, GeometryKernel},
    mesh::{SurfaceMesh, DEFAULT_OUTPUT},
    profile::TaperedTrenchProfile,
    r2::R2,
};

/// Vertical half-extent of the domain, as a multiple of the horizontal one.
const VERTICAL_EXTENT_FACTOR: f64 = 3.;

/// Upper bound on surface mesh lines a configuration may produce.
const MAX_SURFACE_LINES: f64 = 1e7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    /// Sampling resolution of the surface
    pub grid_delta: f64,
    /// Half-width of the simulation domain
    pub extent: f64,
    pub profile: TaperedTrenchProfile,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid_delta: 1.,
            extent: 20.,
            profile: TaperedTrenchProfile::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.grid_delta > 0.) || !self.grid_delta.is_finite() {
            return Err(TrenchError::InvalidConfig(format!("grid delta must be positive, got {}", self.grid_delta)));
        }
        if !(self.extent > 0.) || !self.extent.is_finite() {
            return Err(TrenchError::InvalidConfig(format!("extent must be positive, got {}", self.extent)));
        }
        let lines = self.max_surface_length() / self.grid_delta;
        if !(lines <= MAX_SURFACE_LINES) {
            return Err(TrenchError::InvalidConfig(format!(
                "grid delta {} is too fine for extent {}: up to {:.3e} surface lines (limit {:.0e})",
                self.grid_delta, self.extent, lines, MAX_SURFACE_LINES,
            )));
        }
        self.profile.validate()
    }

    /// Longest possible surface: the flat top across the box plus the trench
    /// boundary, which is convex inside the box and so no longer than its perimeter.
    pub fn max_surface_length(&self) -> f64 {
        let width = 2. * self.extent;
        let height = 2. * VERTICAL_EXTENT_FACTOR * self.extent;
        width + 2. * (width + height)
    }

    /// Simulation box: `[-extent, extent]` horizontally, three times that vertically.
    /// Reflective on every axis but the last, which is infinite.
    pub fn domain(&self) -> Domain {
        let vertical = VERTICAL_EXTENT_FACTOR * self.extent;
        Domain::new(
            [-self.extent, self.extent, -vertical, vertical],
            [BoundaryCondition::Reflective, BoundaryCondition::Infinite],
            self.grid_delta,
        )
    }
}

/// Stateful trench generator: configure, [`generate`](Trench::generate), then [`save`](Trench::save).
#[derive(Debug, Clone)]
pub struct Trench<K: GeometryKernel = GeoKernel> {
    kernel: K,
    config: SceneConfig,
    substrate: Option<K::Solid>,
}

impl Default for Trench<GeoKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl Trench<GeoKernel> {
    pub fn new() -> Self {
        Self::with_kernel(GeoKernel)
    }
}

impl<K: GeometryKernel> Trench<K> {
    pub fn with_kernel(kernel: K) -> Self {
        Trench { kernel, config: SceneConfig::default(), substrate: None }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SceneConfig) {
        self.config = config;
    }

    pub fn set_grid_delta(&mut self, delta: f64) {
        self.config.grid_delta = delta;
    }

    pub fn set_extent(&mut self, extent: f64) {
        self.config.extent = extent;
    }

    /// Trench width at the top.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.config.profile.width = diameter;
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.config.profile.depth = depth;
    }

    pub fn set_center(&mut self, x: f64, y: f64) {
        self.config.profile.center = R2::new(x, y);
    }

    pub fn set_taper_angle(&mut self, dx: f64, dy: f64) {
        self.config.profile.taper_direction = R2::new(dx, dy);
    }

    /// Most recently generated solid, if the last [`generate`](Trench::generate) succeeded.
    pub fn substrate(&self) -> Option<&K::Solid> {
        self.substrate.as_ref()
    }

    /// Build the substrate half-plane and carve the trench out of it.
    pub fn generate(&mut self) -> Result<&K::Solid> {
        self.substrate = None;
        self.config.validate()?;

        let domain = self.config.domain();
        debug!("domain: {}", domain);

        let substrate = self.kernel.make_half_plane(&domain, R2::new(0., 0.), R2::new(0., 1.))?;

        let points = self.config.profile.points()?;
        let hull = self.kernel.convex_hull(&points.0)?;
        let trench = self.kernel.surface_to_volume(&domain, &hull)?;
        let substrate = self.kernel.boolean_subtract(&substrate, &trench)?;
        info!("Generated substrate with trench, area {}", self.kernel.area(&substrate));

        Ok(self.substrate.insert(substrate))
    }

    pub fn area(&self) -> Result<f64> {
        let substrate = self.substrate.as_ref().ok_or(TrenchError::NotGenerated)?;
        Ok(self.kernel.area(substrate))
    }

    pub fn surface_mesh(&self) -> Result<SurfaceMesh> {
        let substrate = self.substrate.as_ref().ok_or(TrenchError::NotGenerated)?;
        self.kernel.extract_surface_mesh(substrate)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mesh = self.surface_mesh()?;
        info!("Saving geometry to {}", path.display());
        mesh.save_vtk(path)
    }

    pub fn save_default(&self) -> Result<()> {
        self.save(DEFAULT_OUTPUT)
    }
}
