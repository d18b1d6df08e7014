//! Parsing of OGC WMS time-dimension extent strings.
//!
//! The extent grammar (WMS 1.1.1 Annex C, Table C.1) has four cases:
//! a single value, a comma-separated list of values, a
//! `min/max/resolution` interval, and a comma-separated list of
//! intervals. Mixed lists of values and intervals are accepted; each
//! segment is classified on its own.

use portal_common::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Upper bound on the number of values a single extent may expand to.
/// Capabilities documents come from remote services.
const MAX_EXPANDED_VALUES: usize = 100_000;

/// The discrete set of valid values for a time dimension.
///
/// `values` is sorted ascending and free of duplicates. `step` is the
/// slider granularity: the smallest per-interval resolution seen while
/// parsing, starting at 1 and never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub step: f64,
    #[serde(rename = "timeRange")]
    pub values: Vec<f64>,
}

impl DimensionRange {
    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check whether `value` is one of the valid dimension values.
    pub fn contains(&self, value: f64) -> bool {
        self.values
            .binary_search_by(|v| v.total_cmp(&value))
            .is_ok()
    }

    /// Snap an arbitrary position to the closest valid value.
    ///
    /// Ties resolve to the lower value. Returns `None` for an empty range.
    pub fn nearest(&self, value: f64) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let idx = self.values.partition_point(|v| *v < value);
        if idx == 0 {
            return Some(self.values[0]);
        }
        if idx == self.values.len() {
            return Some(self.values[idx - 1]);
        }
        let below = self.values[idx - 1];
        let above = self.values[idx];
        if value - below <= above - value {
            Some(below)
        } else {
            Some(above)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// Parse a WMS time-dimension extent string into a value range.
///
/// All whitespace is stripped before splitting. Value tokens must parse
/// to finite numbers; interval segments must have exactly three tokens
/// (`min/max/resolution`). A reversed interval (`max < min`) contributes
/// no values. The result is sorted ascending with duplicates removed.
pub fn parse_extent(extent: &str) -> PortalResult<DimensionRange> {
    let cleaned: String = extent.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(syntax_error(extent, "extent must not be empty"));
    }

    let mut step = 1.0_f64;
    let mut values: Vec<f64> = Vec::new();

    for segment in cleaned.split(',') {
        let tokens: Vec<&str> = segment.split('/').collect();
        match tokens.as_slice() {
            [value] => {
                values.push(parse_number(extent, value)?);
            }
            [min, max, resolution] => {
                let min = parse_number(extent, min)?;
                let max = parse_number(extent, max)?;
                let resolution = parse_resolution(extent, resolution)?;
                // Slider granularity is the smallest resolution seen,
                // never raised above the initial 1.
                if resolution < step {
                    step = resolution;
                }
                if max < min {
                    warn!(segment, "reversed interval in time extent, contributing no values");
                    continue;
                }
                let span = ((max - min) / resolution).floor();
                if span + 1.0 > (MAX_EXPANDED_VALUES - values.len()) as f64 {
                    return Err(syntax_error(
                        extent,
                        format!("interval '{segment}' expands to too many values"),
                    ));
                }
                let count = span as usize + 1;
                for i in 0..count {
                    values.push(min + i as f64 * resolution);
                }
            }
            _ => {
                return Err(syntax_error(
                    extent,
                    format!("interval '{segment}' must be min/max/resolution"),
                ));
            }
        }
    }

    values.sort_unstable_by(f64::total_cmp);
    values.dedup();

    Ok(DimensionRange { step, values })
}

/// Parse an extent resolution token.
///
/// Deliberately narrow: exactly `P` + one digit + one unit letter
/// (`P1Y` style), as emitted by the services this was written against.
/// Anything else, including multi-digit counts and `PT…` time
/// designators, is rejected rather than misparsed. The unit letter is
/// validated but not interpreted.
fn parse_resolution(extent: &str, token: &str) -> PortalResult<f64> {
    let bytes = token.as_bytes();
    if bytes.len() != 3
        || bytes[0] != b'P'
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_uppercase()
    {
        return Err(syntax_error(
            extent,
            format!("unsupported resolution '{token}'"),
        ));
    }
    let digit = (bytes[1] - b'0') as f64;
    if digit == 0.0 {
        return Err(syntax_error(extent, format!("zero resolution '{token}'")));
    }
    Ok(digit)
}

fn parse_number(extent: &str, token: &str) -> PortalResult<f64> {
    let number: f64 = token
        .parse()
        .map_err(|_| syntax_error(extent, format!("'{token}' is not a number")))?;
    if !number.is_finite() {
        return Err(syntax_error(extent, format!("'{token}' is not finite")));
    }
    Ok(number)
}

fn syntax_error(extent: &str, reason: impl Into<String>) -> PortalError {
    PortalError::InvalidExtentSyntax {
        extent: extent.to_string(),
        reason: reason.into(),
    }
}
