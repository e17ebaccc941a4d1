use geo::{Area, BooleanOps, ConvexHull, CoordsIter, LineString, MultiPoint, MultiPolygon, Point, Polygon as GeoPolygon};
use log::debug;

use crate::{
    error::{Result, TrenchError},
    mesh::SurfaceMesh,
    polygon::Polygon,
    r2::R2,
};

use super::{Domain, GeometryKernel};

/// Minimum area for a hull or half-plane to count as a solid.
const MIN_AREA: f64 = 1e-12;

/// Solid region of the plane, clipped to the domain it was built on.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSolid {
    pub shape: MultiPolygon<f64>,
    pub domain: Domain,
}

impl GeoSolid {
    pub fn contains(&self, p: &R2<f64>) -> bool {
        use geo::Contains;
        self.shape.contains(&Point::new(p.x, p.y))
    }
}

/// [`GeometryKernel`] backed by exact polygon operations from the `geo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

fn failed(msg: impl Into<String>) -> TrenchError {
    TrenchError::GeometryConstructionFailed(msg.into())
}

/// Rings of a polygon without their closing coordinates, exterior first.
fn rings(polygon: &GeoPolygon<f64>) -> impl Iterator<Item = Vec<R2<f64>>> + '_ {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring: &LineString<f64>| {
            let mut coords: Vec<R2<f64>> = ring.coords().map(|c| R2::from(*c)).collect();
            if coords.len() > 1 && coords.first() == coords.last() {
                coords.pop();
            }
            coords
        })
}

impl GeometryKernel for GeoKernel {
    type Solid = GeoSolid;

    fn make_half_plane(&self, domain: &Domain, origin: R2<f64>, normal: R2<f64>) -> Result<GeoSolid> {
        if !normal.is_finite() || !origin.is_finite() || normal.norm() == 0. {
            return Err(failed(format!("invalid half-plane: origin {}, normal {}", origin, normal)));
        }
        // Square on the inner side of the plane, large enough to cover the whole box
        let n = normal / normal.norm();
        let t = R2::new(-n.y, n.x);
        let [lo, _, hi, _] = domain.corners();
        let center = (lo + hi) / 2.;
        let foot = center - n * (center - origin).dot(&n);
        // Power-of-two size keeps axis-aligned cuts exact after boolean-op snapping
        let r = ((hi - lo).norm() + (center - foot).norm() + 1.).log2().ceil().exp2();
        let cover = GeoPolygon::new(
            LineString::from(vec![
                geo::Coord::from(foot + t * r),
                geo::Coord::from(foot - t * r),
                geo::Coord::from(foot - t * r - n * r),
                geo::Coord::from(foot + t * r - n * r),
            ]),
            vec![],
        );
        let shape = cover.intersection(&domain.rectangle());
        let area = shape.unsigned_area();
        if area < MIN_AREA {
            return Err(failed(format!("half-plane through {} with normal {} misses the domain", origin, normal)));
        }
        debug!("half-plane through {} with normal {}: area {}", origin, normal, area);
        Ok(GeoSolid { shape, domain: domain.clone() })
    }

    fn convex_hull(&self, points: &[R2<f64>]) -> Result<Polygon> {
        if points.len() < 3 {
            return Err(failed(format!("convex hull needs at least 3 points, got {}", points.len())));
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(failed(format!("non-finite hull point {}", p)));
        }
        let cloud: MultiPoint<f64> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
        let hull = Polygon::from(&cloud.convex_hull());
        if hull.num_vertices() < 3 || hull.area() < MIN_AREA {
            return Err(failed(format!("degenerate convex hull of {} points", points.len())));
        }
        debug!("convex hull: {}", hull);
        Ok(hull)
    }

    fn surface_to_volume(&self, domain: &Domain, surface: &Polygon) -> Result<GeoSolid> {
        if surface.num_vertices() < 3 || surface.vertices.iter().any(|v| !v.is_finite()) {
            return Err(failed(format!("surface is not a closed finite polygon: {}", surface)));
        }
        if surface.area() < MIN_AREA {
            return Err(failed(format!("surface encloses no area: {}", surface)));
        }
        let mut shape = GeoPolygon::from(surface).intersection(&domain.rectangle());
        if shape.unsigned_area() < MIN_AREA {
            // Nothing inside the box: an empty solid, so subtracting it is a no-op
            debug!("surface {} lies outside the domain ({})", surface, domain);
            shape = MultiPolygon::new(vec![]);
        }
        Ok(GeoSolid { shape, domain: domain.clone() })
    }

    fn boolean_subtract(&self, solid: &GeoSolid, other: &GeoSolid) -> Result<GeoSolid> {
        if solid.domain != other.domain {
            return Err(failed(format!(
                "cannot combine solids on different domains: {} vs {}",
                solid.domain, other.domain,
            )));
        }
        if other.shape.0.is_empty() {
            return Ok(solid.clone());
        }
        let shape = solid.shape.difference(&other.shape);
        if shape.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(failed("boolean subtraction produced non-finite coordinates"));
        }
        debug!(
            "relative complement: area {} minus {} -> {}",
            solid.shape.unsigned_area(),
            other.shape.unsigned_area(),
            shape.unsigned_area(),
        );
        Ok(GeoSolid { shape, domain: solid.domain.clone() })
    }

    fn extract_surface_mesh(&self, solid: &GeoSolid) -> Result<SurfaceMesh> {
        let domain = &solid.domain;
        if !(domain.grid_delta > 0.) {
            return Err(failed(format!("grid delta must be positive, got {}", domain.grid_delta)));
        }
        let mut mesh = SurfaceMesh::default();
        for polygon in &solid.shape {
            for ring in rings(polygon) {
                let n = ring.len();
                // Ring vertices are shared by the two edges meeting there
                let mut vertex_nodes: Vec<Option<usize>> = vec![None; n];
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (a, b) = (ring[i], ring[j]);
                    let len = (b - a).norm();
                    if len <= f64::EPSILON || domain.is_boundary_segment(&a, &b) {
                        continue;
                    }
                    let start = *vertex_nodes[i].get_or_insert_with(|| mesh.add_node(a));
                    let pieces = (len / domain.grid_delta).ceil().max(1.) as usize;
                    let mut prev = start;
                    for k in 1..pieces {
                        let node = mesh.add_node(a.lerp(&b, k as f64 / pieces as f64));
                        mesh.add_line(prev, node);
                        prev = node;
                    }
                    let end = *vertex_nodes[j].get_or_insert_with(|| mesh.add_node(b));
                    mesh.add_line(prev, end);
                }
            }
        }
        debug!("surface mesh: {} nodes, {} lines", mesh.nodes.len(), mesh.lines.len());
        Ok(mesh)
    }

    fn area(&self, solid: &GeoSolid) -> f64 {
        solid.shape.unsigned_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::BoundaryCondition;
    use test_log::test;

    fn domain(grid_delta: f64) -> Domain {
        Domain::new(
            [-20., 20., -60., 60.],
            [BoundaryCondition::Reflective, BoundaryCondition::Infinite],
            grid_delta,
        )
    }

    fn substrate(grid_delta: f64) -> GeoSolid {
        GeoKernel.make_half_plane(&domain(grid_delta), R2::new(0., 0.), R2::new(0., 1.)).unwrap()
    }

    #[test]
    fn test_half_plane() {
        let solid = substrate(1.);
        assert_relative_eq!(GeoKernel.area(&solid), 40. * 60., epsilon = 1e-6);
        assert!(solid.contains(&R2::new(0., -1.)));
        assert!(!solid.contains(&R2::new(0., 1.)));

        // Tilted plane through the domain center cuts it in half
        let tilted = GeoKernel.make_half_plane(&domain(1.), R2::new(0., 0.), R2::new(1., 1.)).unwrap();
        assert_relative_eq!(GeoKernel.area(&tilted), 40. * 120. / 2., epsilon = 1e-4);
        assert!(tilted.contains(&R2::new(-10., -10.)));
        assert!(!tilted.contains(&R2::new(10., 10.)));

        // Plane entirely above the box keeps all of it
        let all = GeoKernel.make_half_plane(&domain(1.), R2::new(0., 100.), R2::new(0., 1.)).unwrap();
        assert_relative_eq!(GeoKernel.area(&all), 40. * 120., epsilon = 1e-6);
    }

    #[test]
    fn test_half_plane_errors() {
        let d = domain(1.);
        assert!(GeoKernel.make_half_plane(&d, R2::new(0., 0.), R2::new(0., 0.)).is_err());
        // Whole domain on the excluded side
        let err = GeoKernel.make_half_plane(&d, R2::new(0., -100.), R2::new(0., 1.)).unwrap_err();
        assert!(matches!(err, TrenchError::GeometryConstructionFailed(_)), "{:?}", err);
    }

    #[test]
    fn test_convex_hull() {
        let points = [
            R2::new(-10., 0.),
            R2::new(10., 0.),
            R2::new(0., -5.),  // interior
            R2::new(10., -50.),
            R2::new(-10., -50.),
        ];
        let hull = GeoKernel.convex_hull(&points).unwrap();
        assert_eq!(hull.num_vertices(), 4);
        assert_relative_eq!(hull.area(), 1000., epsilon = 1e-9);
        assert!(hull.signed_area().abs() > 0.);
    }

    #[test]
    fn test_convex_hull_degenerate() {
        assert!(GeoKernel.convex_hull(&[R2::new(0., 0.), R2::new(1., 0.)]).is_err());
        let collinear = [R2::new(0., 0.), R2::new(1., 0.), R2::new(2., 0.)];
        assert!(GeoKernel.convex_hull(&collinear).is_err());
        let nan = [R2::new(0., 0.), R2::new(1., 0.), R2::new(f64::NAN, 1.)];
        assert!(GeoKernel.convex_hull(&nan).is_err());
    }

    #[test]
    fn test_subtract() {
        let d = domain(1.);
        let trench = Polygon::new(vec![
            R2::new(-10., 0.),
            R2::new(10., 0.),
            R2::new(10., -50.),
            R2::new(-10., -50.),
        ]);
        let volume = GeoKernel.surface_to_volume(&d, &trench).unwrap();
        let result = GeoKernel.boolean_subtract(&substrate(1.), &volume).unwrap();
        assert_relative_eq!(GeoKernel.area(&result), 2400. - 1000., epsilon = 1e-6);
        assert!(!result.contains(&R2::new(0., -25.)));
        assert!(result.contains(&R2::new(15., -25.)));
        assert!(result.contains(&R2::new(0., -55.)));
    }

    #[test]
    fn test_subtract_requires_same_domain() {
        let err = GeoKernel.boolean_subtract(&substrate(1.), &substrate(0.5)).unwrap_err();
        assert!(matches!(err, TrenchError::GeometryConstructionFailed(_)), "{:?}", err);
    }

    #[test]
    fn test_surface_outside_domain() {
        let d = domain(1.);
        let far = Polygon::new(vec![R2::new(100., 0.), R2::new(110., 0.), R2::new(105., -5.)]);
        let empty = GeoKernel.surface_to_volume(&d, &far).unwrap();
        assert!(empty.shape.0.is_empty());
        assert_eq!(GeoKernel.area(&empty), 0.);

        let result = GeoKernel.boolean_subtract(&substrate(1.), &empty).unwrap();
        assert_relative_eq!(GeoKernel.area(&result), 2400., epsilon = 1e-6);
    }

    #[test]
    fn test_surface_without_area() {
        let flat = Polygon::new(vec![R2::new(0., 0.), R2::new(1., 0.), R2::new(2., 0.)]);
        let err = GeoKernel.surface_to_volume(&domain(1.), &flat).unwrap_err();
        assert!(matches!(err, TrenchError::GeometryConstructionFailed(_)), "{:?}", err);
    }

    #[test]
    fn test_flat_surface_mesh() {
        let mesh = GeoKernel.extract_surface_mesh(&substrate(2.)).unwrap();
        // Only the top edge y=0 is surface: 40 / 2 = 20 lines, 21 nodes
        assert_eq!(mesh.lines.len(), 20);
        assert_eq!(mesh.nodes.len(), 21);
        assert!(mesh.nodes.iter().all(|n| n.y.abs() < 1e-12));
        assert_relative_eq!(mesh.length(), 40., epsilon = 1e-9);
        assert!(mesh.max_line_length() <= 2. + 1e-9);
    }
}
