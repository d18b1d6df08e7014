//! Error types for the portal OGC crates.

use thiserror::Error;

/// Result type alias using PortalError.
pub type PortalResult<T> = Result<T, PortalError>;

/// Primary error type for time-dimension and filter operations.
#[derive(Debug, Error)]
pub enum PortalError {
    // === Request parameter errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Time-dimension errors ===
    #[error("Invalid time-dimension extent '{extent}': {reason}")]
    InvalidExtentSyntax { extent: String, reason: String },

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer '{layer}' has no '{dimension}' dimension")]
    DimensionNotFound { layer: String, dimension: String },

    // === Filter errors ===
    #[error("Multi-column field '{field}' has no usable parameter index")]
    FieldIndexMissing { field: String },

    // === Infrastructure errors ===
    #[error("XML error: {0}")]
    XmlError(String),
}

impl PortalError {
    /// Get the OGC ExceptionReport code for this error.
    pub fn ogc_exception_code(&self) -> &'static str {
        match self {
            PortalError::MissingParameter(_) => "MissingParameterValue",
            PortalError::InvalidParameter { .. } => "InvalidParameterValue",
            PortalError::InvalidExtentSyntax { .. } => "InvalidDimensionValue",
            PortalError::LayerNotFound(_) => "LayerNotDefined",
            PortalError::DimensionNotFound { .. } => "MissingDimensionValue",
            PortalError::FieldIndexMissing { .. } => "InvalidParameterValue",
            PortalError::XmlError(_) => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PortalError::MissingParameter(_)
            | PortalError::InvalidParameter { .. }
            | PortalError::InvalidExtentSyntax { .. }
            | PortalError::FieldIndexMissing { .. } => 400,

            PortalError::LayerNotFound(_) | PortalError::DimensionNotFound { .. } => 404,

            PortalError::XmlError(_) => 500,
        }
    }
}

// Conversion from common error types
impl From<quick_xml::Error> for PortalError {
    fn from(err: quick_xml::Error) -> Self {
        PortalError::XmlError(err.to_string())
    }
}
