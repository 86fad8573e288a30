use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

/// Caller broke the `resolve_move` input contract.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MotionError {
    #[error("non-finite displacement on {axis}: {value}")]
    NonFinite { axis: Axis, value: f64 },
    #[error("displacement {value} on {axis} exceeds limit of {limit} per move")]
    ExcessiveDisplacement { axis: Axis, value: f64, limit: f64 },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Error reading config `{0}`: {1}")]
    Io(PathBuf, io::Error),
    #[error("Invalid TOML in `{0}`: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("invalid motion config: {0}")]
    Invalid(String),
}
