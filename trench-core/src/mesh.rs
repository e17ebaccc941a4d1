//! Surface line meshes and their legacy VTK export.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{Deserialize, Serialize};

use crate::{error::Result, r2::R2};

/// Default output path for saved geometries.
pub const DEFAULT_OUTPUT: &str = "trench.vtk";

/// 2D surface as a set of nodes joined by line segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub nodes: Vec<R2<f64>>,
    pub lines: Vec<[usize; 2]>,
}

impl SurfaceMesh {
    pub fn add_node(&mut self, node: R2<f64>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_line(&mut self, a: usize, b: usize) {
        self.lines.push([a, b]);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (R2<f64>, R2<f64>)> + '_ {
        self.lines.iter().map(|[a, b]| (self.nodes[*a], self.nodes[*b]))
    }

    /// Total length of all lines.
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    pub fn max_line_length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).fold(0., f64::max)
    }

    /// Write as an ASCII legacy VTK polydata file with line cells (z = 0).
    pub fn write_vtk<W: Write>(&self, w: &mut W, title: &str) -> io::Result<()> {
        writeln!(w, "# vtk DataFile Version 2.0")?;
        // The title line must not break the header
        writeln!(w, "{}", title.lines().next().unwrap_or(""))?;
        writeln!(w, "ASCII")?;
        writeln!(w, "DATASET POLYDATA")?;
        writeln!(w, "POINTS {} double", self.nodes.len())?;
        for node in &self.nodes {
            writeln!(w, "{} {} 0", node.x, node.y)?;
        }
        writeln!(w, "LINES {} {}", self.lines.len(), 3 * self.lines.len())?;
        for [a, b] in &self.lines {
            writeln!(w, "2 {} {}", a, b)?;
        }
        Ok(())
    }

    pub fn to_vtk(&self, title: &str) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_vtk(&mut buf, title);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn save_vtk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {} nodes, {} lines to {}", self.nodes.len(), self.lines.len(), path.display());
        let mut w = BufWriter::new(File::create(path)?);
        self.write_vtk(&mut w, "trench surface")?;
        w.flush()?;
        Ok(())
    }
}
