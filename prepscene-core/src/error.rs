/// Error types for scene loading and rendering surfaces
///
/// Geometry, visibility and composition never fail: unusual input degrades to
/// an emptier drawing. Only catalog loading, literal parsing, surface
/// acquisition and file IO produce errors.
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no rendering surface: {0}")]
    Surface(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Catalog(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(SceneError::catalog("x").to_string().contains("catalog error:"));
        assert!(SceneError::parse("x").to_string().contains("parse error:"));
        assert!(SceneError::surface("x")
            .to_string()
            .contains("no rendering surface:"));
    }

    #[test]
    fn io_preserves_source() {
        let err = SceneError::from(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
