#[derive(Debug, thiserror::Error)]
pub enum TrenchError {
    #[error("Invalid trench profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid scene configuration: {0}")]
    InvalidConfig(String),

    #[error("Geometry construction failed: {0}")]
    GeometryConstructionFailed(String),

    #[error("No geometry has been generated yet; call generate() first")]
    NotGenerated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scene configuration: {0}")]
    ConfigFile(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrenchError>;
