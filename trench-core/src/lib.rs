//! Tapered trench geometry: a half-plane substrate with a trapezoidal trench
//! carved out of it, exported as a surface line mesh.

#[cfg_attr(not(test), allow(unused_imports))]
#[macro_use]
extern crate approx;

pub mod error;
pub mod kernel;
pub mod mesh;
pub mod polygon;
pub mod profile;
pub mod r2;
pub mod scene;

// Re-export key types for external use
pub use error::TrenchError;
pub use kernel::{BoundaryCondition, Domain, GeoKernel, GeoSolid, GeometryKernel};
pub use mesh::{SurfaceMesh, DEFAULT_OUTPUT};
pub use polygon::Polygon;
pub use profile::{ProfilePoints, TaperedTrenchProfile};
pub use r2::R2;
pub use scene::{SceneConfig, Trench};

/// Parse a log level string into LevelFilter.
pub fn parse_log_level(level: Option<&str>) -> error::Result<log::LevelFilter> {
    match level {
        Some("error") => Ok(log::LevelFilter::Error),
        Some("warn") => Ok(log::LevelFilter::Warn),
        Some("info") | Some("") | None => Ok(log::LevelFilter::Info),
        Some("debug") => Ok(log::LevelFilter::Debug),
        Some("trace") => Ok(log::LevelFilter::Trace),
        Some(level) => Err(TrenchError::InvalidConfig(format!("invalid log level: {}", level))),
    }
}
