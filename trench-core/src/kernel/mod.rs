//! Geometry kernel seam.
//!
//! Scene composition only talks to [`GeometryKernel`]; the solid
//! representation, hull and boolean machinery live behind it.

mod geo_kernel;

pub use geo_kernel::{GeoKernel, GeoSolid};

use std::fmt::{self, Display};

use geo::{LineString, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};

use crate::{error::Result, mesh::SurfaceMesh, polygon::Polygon, r2::R2};

/// How the simulation box treats geometry crossing one of its sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// Mirror-symmetric continuation of the geometry
    Reflective,
    /// Geometry extends indefinitely; the box only truncates it
    Infinite,
}

/// Axis-aligned simulation box, with a boundary condition per axis and the sampling resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// `[x_min, x_max, y_min, y_max]`
    pub bounds: [f64; 4],
    pub boundaries: [BoundaryCondition; 2],
    pub grid_delta: f64,
}

impl Domain {
    pub fn new(bounds: [f64; 4], boundaries: [BoundaryCondition; 2], grid_delta: f64) -> Self {
        Domain { bounds, boundaries, grid_delta }
    }

    pub fn x_min(&self) -> f64 { self.bounds[0] }
    pub fn x_max(&self) -> f64 { self.bounds[1] }
    pub fn y_min(&self) -> f64 { self.bounds[2] }
    pub fn y_max(&self) -> f64 { self.bounds[3] }

    /// Box corners, counter-clockwise from the lower left.
    pub fn corners(&self) -> [R2<f64>; 4] {
        [
            R2::new(self.x_min(), self.y_min()),
            R2::new(self.x_max(), self.y_min()),
            R2::new(self.x_max(), self.y_max()),
            R2::new(self.x_min(), self.y_max()),
        ]
    }

    pub fn rectangle(&self) -> GeoPolygon<f64> {
        let coords = self.corners().map(geo::Coord::from).to_vec();
        GeoPolygon::new(LineString::new(coords), vec![])
    }

    fn tolerance(&self) -> f64 {
        let scale = self.bounds.iter().fold(1f64, |m, b| m.max(b.abs()));
        scale * 1e-7
    }

    /// Whether segment `a`-`b` lies on one of the box sides.
    ///
    /// Box sides are never part of the surface: with a reflective boundary the
    /// geometry continues as its mirror image, with an infinite boundary the
    /// box merely truncates it.
    pub fn is_boundary_segment(&self, a: &R2<f64>, b: &R2<f64>) -> bool {
        let tol = self.tolerance();
        let on = |v: f64, side: f64| (v - side).abs() <= tol;
        (on(a.x, self.x_min()) && on(b.x, self.x_min()))
            || (on(a.x, self.x_max()) && on(b.x, self.x_max()))
            || (on(a.y, self.y_min()) && on(b.y, self.y_min()))
            || (on(a.y, self.y_max()) && on(b.y, self.y_max()))
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x [{}, {}] ({:?}), y [{}, {}] ({:?}), grid delta {}",
            self.x_min(), self.x_max(), self.boundaries[0],
            self.y_min(), self.y_max(), self.boundaries[1],
            self.grid_delta,
        )
    }
}

/// Operations the scene composer needs from a 2D geometry kernel.
pub trait GeometryKernel {
    type Solid: Clone + fmt::Debug;

    /// Solid filling the part of `domain` on the far side of `normal`, i.e. `(p - origin)·normal <= 0`.
    fn make_half_plane(&self, domain: &Domain, origin: R2<f64>, normal: R2<f64>) -> Result<Self::Solid>;

    /// Closed convex surface enclosing `points`.
    fn convex_hull(&self, points: &[R2<f64>]) -> Result<Polygon>;

    /// Solid bounded by a closed surface, restricted to `domain`.
    fn surface_to_volume(&self, domain: &Domain, surface: &Polygon) -> Result<Self::Solid>;

    /// Relative complement `solid \ other`.
    fn boolean_subtract(&self, solid: &Self::Solid, other: &Self::Solid) -> Result<Self::Solid>;

    /// Surface of `solid` as line segments no longer than the domain's grid delta.
    fn extract_surface_mesh(&self, solid: &Self::Solid) -> Result<SurfaceMesh>;

    fn area(&self, solid: &Self::Solid) -> f64;
}
