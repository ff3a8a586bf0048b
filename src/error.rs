//! Errors raised while building a track or loading its configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    /// A path needs at least two waypoints to form a segment
    #[error("track needs at least 2 waypoints, got {found}")]
    InsufficientPathPoints { found: usize },

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid level: {0}")]
    InvalidLevel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TrackError::InsufficientPathPoints { found: 1 };
        assert_eq!(err.to_string(), "track needs at least 2 waypoints, got 1");

        let err = TrackError::InvalidTuning("ball_size must be positive".into());
        assert!(err.to_string().contains("ball_size"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<u32, serde_json::Error> = serde_json::from_str("not json");
        let err: TrackError = parse.unwrap_err().into();
        assert!(matches!(err, TrackError::Json(_)));
    }

    #[test]
    fn test_io_error_converts() {
        let err: TrackError = std::io::Error::new(std::io::ErrorKind::NotFound, "level.json").into();
        assert!(matches!(err, TrackError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
