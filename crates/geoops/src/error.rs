//! Error taxonomy for conversions and robust operations.

use std::fmt;

use thiserror::Error;

/// External representation involved in a parse failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Wkt,
    Wkb,
    GeoJson,
    PointText,
    CellCode,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Wkt => "WKT",
            Format::Wkb => "WKB",
            Format::GeoJson => "GeoJSON",
            Format::PointText => "point text",
            Format::CellCode => "cell code",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Parse error ({format}): {reason}")]
    Parse { format: Format, reason: String },

    #[error("Required input is missing: {0}")]
    NullInput(&'static str),

    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    #[error("{axis} error val={value}, expect[{min},{max}]")]
    Range {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Kernel operation failed: {op} - {reason}")]
    Kernel { op: &'static str, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GeoError {
    pub(crate) fn parse(format: Format, reason: impl ToString) -> Self {
        GeoError::Parse {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn holes_unsupported() -> Self {
        GeoError::UnsupportedShape("holes unsupported".to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
