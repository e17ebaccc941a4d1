use std::fmt::{self, Display};

use geo::{Coord, LineString, Polygon as GeoPolygon};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

/// Simple closed polygon, stored without a repeated closing vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Polygon {
    pub vertices: Vec<R2<f64>>,
}

impl Polygon {
    pub fn new(vertices: Vec<R2<f64>>) -> Self {
        assert!(vertices.len() >= 3, "Polygon must have at least 3 vertices");
        Polygon { vertices }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (R2<f64>, R2<f64>)> + '_ {
        self.vertices.iter().copied().circular_tuple_windows()
    }

    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.cross(&b)).sum::<f64>() / 2.
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
}

impl From<&Polygon> for GeoPolygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let coords: Vec<Coord<f64>> = polygon.vertices.iter().map(|v| (*v).into()).collect();
        // geo closes the ring itself
        GeoPolygon::new(LineString::new(coords), vec![])
    }
}

impl From<&GeoPolygon<f64>> for Polygon {
    /// Exterior ring only; the closing coordinate is dropped.
    fn from(polygon: &GeoPolygon<f64>) -> Self {
        let mut vertices: Vec<R2<f64>> = polygon.exterior().coords().map(|c| R2::from(*c)).collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        Polygon { vertices }
    }
}

impl Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verts: Vec<String> = self
            .vertices
            .iter()
            .map(|v| v.to_string())
            .collect();
        write!(f, "Polygon[{}]", verts.join(", "))
    }
}
