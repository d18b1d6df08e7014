//! Extraction of time-dimension elements from WMS GetCapabilities XML.
//!
//! WMS 1.1.1 announces dimension values in `<Extent name="time">`
//! elements nested inside `<Layer>`; WMS 1.3.0 folds them into
//! `<Dimension name="time">`. Both are accepted here.

use portal_common::{PortalError, PortalResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A layer's dimension element as found in a capabilities document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentElement {
    /// Name of the layer the element belongs to
    pub layer: String,
    /// Dimension name from the `name` attribute (e.g. "time")
    pub name: String,
    /// Units from the `units` attribute, if declared
    pub units: Option<String>,
    /// Raw `default` attribute, if declared
    pub default: Option<String>,
    /// Text content: the extent string to parse
    pub content: String,
}

/// Find the named layer's `<Extent>`/`<Dimension>` element in a WMS
/// GetCapabilities document.
///
/// The layer is identified by its `<Name>` child; the dimension by the
/// `name` attribute, compared case-insensitively (WMS 1.1.1 uses
/// lowercase "time", 1.3.0 services often uppercase it).
pub fn extract_layer_extent(
    xml: &str,
    layer_name: &str,
    dimension: &str,
) -> PortalResult<ExtentElement> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    // Element name stack, so <Name> children of <Style> etc. are not
    // mistaken for layer names.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut found_layer = false;
    let mut target_len: Option<usize> = None;
    let mut element: Option<ExtentElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if target_len.is_some() && element.is_none() && is_dimension_element(&name) {
                    if let Some(started) = dimension_attributes(&e, layer_name, dimension) {
                        element = Some(started);
                    }
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing dimension elements carry no extent text.
                if target_len.is_some()
                    && element.is_none()
                    && is_dimension_element(e.name().as_ref())
                {
                    if let Some(empty) = dimension_attributes(&e, layer_name, dimension) {
                        return Ok(empty);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape()?;
                if let Some(el) = element.as_mut() {
                    el.content.push_str(&text);
                } else if target_len.is_none()
                    && stack.last().map(Vec::as_slice) == Some(b"Name".as_slice())
                    && stack.iter().rev().nth(1).map(Vec::as_slice) == Some(b"Layer".as_slice())
                    && text.as_ref() == layer_name
                {
                    found_layer = true;
                    // Stack length at which the enclosing <Layer> is on top.
                    target_len = Some(stack.len() - 1);
                }
            }
            Ok(Event::End(e)) => {
                if is_dimension_element(e.name().as_ref()) {
                    if let Some(el) = element.take() {
                        return Ok(el);
                    }
                }
                if e.name().as_ref() == b"Layer" && Some(stack.len()) == target_len {
                    // Left the target layer without finding the dimension.
                    break;
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PortalError::XmlError(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if found_layer {
        Err(PortalError::DimensionNotFound {
            layer: layer_name.to_string(),
            dimension: dimension.to_string(),
        })
    } else {
        Err(PortalError::LayerNotFound(layer_name.to_string()))
    }
}

fn is_dimension_element(name: &[u8]) -> bool {
    name == b"Extent" || name == b"Dimension"
}

/// Read the `name`/`units`/`default` attributes off a dimension element.
/// Returns `None` when the `name` attribute does not match the wanted
/// dimension.
fn dimension_attributes(
    e: &BytesStart<'_>,
    layer_name: &str,
    dimension: &str,
) -> Option<ExtentElement> {
    let mut name = None;
    let mut units = None;
    let mut default = None;
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"name" => name = Some(value),
            b"units" => units = Some(value),
            b"default" => default = Some(value),
            _ => {}
        }
    }
    let name = name?;
    if !name.eq_ignore_ascii_case(dimension) {
        return None;
    }
    Some(ExtentElement {
        layer: layer_name.to_string(),
        name,
        units,
        default,
        content: String::new(),
    })
}
