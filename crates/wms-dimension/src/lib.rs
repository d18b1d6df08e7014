//! WMS time-dimension handling for time-enabled (WMS-T) layers.
//!
//! Covers the path from a WMS GetCapabilities document to a time-slider
//! control: extracting a layer's `<Extent>`/`<Dimension>` element,
//! parsing the OGC WMS 1.1.1 Annex C extent grammar into a discrete
//! value range, and selecting the value a slider starts on.

pub mod capabilities;
pub mod dimension;
pub mod extent;

pub use capabilities::{extract_layer_extent, ExtentElement};
pub use dimension::{format_time_parameter, DimensionDefault, TimeDimension};
pub use extent::{parse_extent, DimensionRange};
