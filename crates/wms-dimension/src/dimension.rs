//! Time-slider dimension assembly.
//!
//! Combines a parsed extent with the element's `default` attribute into
//! the state a time-slider control needs: the value range, the declared
//! default, and the value to start on.

use portal_common::{PortalError, PortalResult};
use tracing::debug;

use crate::capabilities::{extract_layer_extent, ExtentElement};
use crate::extent::{parse_extent, DimensionRange};

/// Declared default for a time dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DimensionDefault {
    /// The WMS `current` keyword: track the latest available value
    Current,
    /// A fixed value
    Value(f64),
}

/// A layer's time dimension, ready to drive a slider control.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDimension {
    /// Dimension name (e.g. "time")
    pub name: String,
    /// Declared default, if the service announced one
    pub default: Option<DimensionDefault>,
    /// Valid values and slider granularity
    pub range: DimensionRange,
}

impl TimeDimension {
    /// Build from an extracted capabilities element.
    pub fn from_extent(element: &ExtentElement) -> PortalResult<Self> {
        let range = parse_extent(&element.content)?;
        let default = match element.default.as_deref() {
            None => None,
            Some(d) if d.eq_ignore_ascii_case("current") => Some(DimensionDefault::Current),
            Some(d) => {
                let value: f64 = d.trim().parse().map_err(|_| PortalError::InvalidExtentSyntax {
                    extent: element.content.clone(),
                    reason: format!("default '{d}' is neither numeric nor 'current'"),
                })?;
                Some(DimensionDefault::Value(value))
            }
        };
        Ok(Self {
            name: element.name.clone(),
            default,
            range,
        })
    }

    /// Extract and assemble in one step from a GetCapabilities document.
    pub fn from_capabilities(xml: &str, layer_name: &str, dimension: &str) -> PortalResult<Self> {
        let element = extract_layer_extent(xml, layer_name, dimension)?;
        Self::from_extent(&element)
    }

    /// The value the slider starts on.
    ///
    /// A fixed default is honored when it is a member of the range;
    /// `current`, an out-of-range default, and no default at all fall
    /// back to the range maximum. `None` only for an empty range.
    pub fn initial_value(&self) -> Option<f64> {
        match self.default {
            Some(DimensionDefault::Value(v)) if self.range.contains(v) => Some(v),
            Some(DimensionDefault::Value(v)) => {
                debug!(default = v, "declared default outside extent, using maximum");
                self.range.max()
            }
            _ => self.range.max(),
        }
    }
}

/// Format a dimension value as a WMS `TIME` request parameter.
///
/// Integer-valued entries render without a fractional part, matching
/// the year-based extents this is used with.
pub fn format_time_parameter(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
