//! Error types for the workout model, position queries and the persisted store.

use thiserror::Error;

/// A workout was constructed with a metric outside its domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkoutError {
    #[error("invalid {field}: {value} (must be a positive, finite number)")]
    InvalidMetric { field: &'static str, value: f64 },

    #[error("invalid {field}: {value}")]
    InvalidDetail { field: &'static str, value: f64 },
}

/// Form input rejected before any workout is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a whole number, got {value}")]
    NotWhole { field: &'static str, value: f64 },

    #[error("no map position selected")]
    NoPendingPosition,
}

impl ValidationError {
    /// Name of the offending form field, if any.
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::NotFinite { field, .. }
            | Self::NotPositive { field, .. }
            | Self::Negative { field, .. }
            | Self::NotWhole { field, .. } => Some(field),
            Self::NoPendingPosition => None,
        }
    }
}

/// A workout the constructor refused never reaches the collection.
impl From<WorkoutError> for ValidationError {
    fn from(e: WorkoutError) -> Self {
        match e {
            WorkoutError::InvalidMetric { field, value } => Self::NotPositive { field, value },
            WorkoutError::InvalidDetail { field, value } if !value.is_finite() => {
                Self::NotFinite { field, value }
            }
            WorkoutError::InvalidDetail { field, value } if field == "cadence" => {
                Self::NotPositive { field, value }
            }
            WorkoutError::InvalidDetail { field, value } => Self::Negative { field, value },
        }
    }
}

/// The current position could not be determined.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("permission to read the position was denied")]
    Denied,

    #[error("timed out after {0:?} waiting for a position")]
    Timeout(std::time::Duration),

    #[error("no positioning capability available")]
    Unsupported,

    #[error("position source has no fix: {0}")]
    NoFix(String),

    #[error("reading position source: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the key-value store behind the workout collection.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("reading stored workouts: {0}")]
    ReadIo(#[source] std::io::Error),

    #[error("parsing stored workouts: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("writing stored workouts: {0}")]
    Write(#[from] std::io::Error),

    #[error("encoding workouts: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metric_message() {
        let err = WorkoutError::InvalidMetric {
            field: "distance",
            value: -1.0,
        };
        assert!(err.to_string().contains("distance"));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::NotPositive {
            field: "duration",
            value: 0.0,
        };
        assert_eq!(err.field(), Some("duration"));
        assert_eq!(ValidationError::NoPendingPosition.field(), None);
    }

    #[test]
    fn test_invalid_detail_maps_to_form_error() {
        let cadence = WorkoutError::InvalidDetail {
            field: "cadence",
            value: 0.0,
        };
        assert!(matches!(
            ValidationError::from(cadence),
            ValidationError::NotPositive {
                field: "cadence",
                ..
            }
        ));

        let climb = WorkoutError::InvalidDetail {
            field: "elevation gain",
            value: -50.0,
        };
        assert!(matches!(
            ValidationError::from(climb),
            ValidationError::Negative { .. }
        ));
    }

    #[test]
    fn test_read_error_keeps_source() {
        use std::error::Error as _;

        let parse = serde_json::from_str::<Vec<u32>>("{not json").unwrap_err();
        let err = PersistenceError::Parse(parse);
        assert!(err.source().is_some());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = PersistenceError::ReadIo(io);
        assert_eq!(err.source().unwrap().to_string(), "locked");
    }
}
