//! OGC Filter Encoding 1.1.0 XML compilation.

use portal_common::PortalResult;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clause::{ClauseKind, ClauseNode, FieldSpec, MatchKind};

/// Special characters announced on `<ogc:PropertyIsLike>` elements.
///
/// Passed explicitly into every compilation; there is no process-wide
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LikeFilterSymbols {
    #[serde(rename = "wildCard")]
    pub wildcard: String,
    pub single_char: String,
    pub escape_char: String,
}

impl Default for LikeFilterSymbols {
    fn default() -> Self {
        Self {
            wildcard: "*".to_string(),
            single_char: "#".to_string(),
            escape_char: "!".to_string(),
        }
    }
}

/// Compile a clause tree into OGC filter XML fragments.
///
/// Depth-first over the tree. Leaves contribute only when a value was
/// entered. A composite with no contributing children contributes
/// nothing; with exactly one, that fragment passes through unwrapped;
/// with several, they are joined inside `<ogc:And>`/`<ogc:Or>`. One
/// fragment per contributing top-level node is returned; the caller
/// decides how to wrap multiple fragments (see [`to_filter_parameter`]).
pub fn build_filter(
    nodes: &[ClauseNode],
    symbols: &LikeFilterSymbols,
) -> PortalResult<Vec<String>> {
    let mut fragments = Vec::new();
    for node in nodes {
        match node {
            ClauseNode::Clause(clause) => {
                let mut inner = build_filter(&clause.literals, symbols)?;
                match inner.len() {
                    0 => debug!("clause contributed no fragments"),
                    // Single-child clauses collapse to the child itself.
                    1 => fragments.append(&mut inner),
                    _ => fragments.push(wrap_fragments(clause.kind, &inner)),
                }
            }
            ClauseNode::Field(field) => {
                if field.value.has_query_value() {
                    fragments.push(build_xml_filter(field, symbols)?);
                }
            }
        }
    }
    Ok(fragments)
}

/// Compile a single field into its comparison element.
///
/// Comparisons are case-insensitive on the service side:
/// `matchCase="false"` is fixed policy, not per-field configuration.
/// A `like` match appends the configured wildcard to the literal and
/// announces the special characters URL-encoded, ready for a KVP
/// request.
pub fn build_xml_filter(field: &FieldSpec, symbols: &LikeFilterSymbols) -> PortalResult<String> {
    let (name, comparison) = field.resolve()?;
    let name = escape(name);
    let rendered = field.value.render();
    let value = escape(&rendered);
    Ok(match comparison {
        MatchKind::Equal => format!(
            "<ogc:PropertyIsEqualTo matchCase=\"false\">\
             <ogc:PropertyName>{name}</ogc:PropertyName>\
             <ogc:Literal>{value}</ogc:Literal>\
             </ogc:PropertyIsEqualTo>"
        ),
        MatchKind::Like => format!(
            "<ogc:PropertyIsLike matchCase=\"false\" wildCard=\"{}\" singleChar=\"{}\" escapeChar=\"{}\">\
             <ogc:PropertyName>{name}</ogc:PropertyName>\
             <ogc:Literal>{value}{}</ogc:Literal>\
             </ogc:PropertyIsLike>",
            urlencoding::encode(&symbols.wildcard),
            urlencoding::encode(&symbols.single_char),
            urlencoding::encode(&symbols.escape_char),
            escape(symbols.wildcard.as_str()),
        ),
    })
}

/// Wrap compiled top-level fragments into a `filter` request parameter.
///
/// `None` when nothing contributed (no constraints entered). Several
/// fragments are joined under `<ogc:And>`.
pub fn to_filter_parameter(fragments: &[String]) -> Option<String> {
    let body = match fragments {
        [] => return None,
        [single] => single.clone(),
        many => wrap_fragments(ClauseKind::And, many),
    };
    Some(format!(
        "<ogc:Filter xmlns:ogc=\"http://www.opengis.net/ogc\">{body}</ogc:Filter>"
    ))
}

fn wrap_fragments(kind: ClauseKind, fragments: &[String]) -> String {
    let tag = match kind {
        ClauseKind::And => "And",
        ClauseKind::Or => "Or",
    };
    let mut xml = format!("<ogc:{tag}>");
    for fragment in fragments {
        xml.push_str(fragment);
    }
    xml.push_str("</ogc:");
    xml.push_str(tag);
    xml.push('>');
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{Columns, FieldValue};

    fn symbols() -> LikeFilterSymbols {
        LikeFilterSymbols::default()
    }

    #[test]
    fn test_equal_fragment() {
        let field = FieldSpec::equal("gemname", "Waldesch");
        let xml = build_xml_filter(&field, &symbols()).unwrap();
        assert_eq!(
            xml,
            "<ogc:PropertyIsEqualTo matchCase=\"false\">\
             <ogc:PropertyName>gemname</ogc:PropertyName>\
             <ogc:Literal>Waldesch</ogc:Literal>\
             </ogc:PropertyIsEqualTo>"
        );
    }

    #[test]
    fn test_like_fragment_announces_encoded_symbols() {
        let field = FieldSpec::like("strasse", "Ross");
        let xml = build_xml_filter(&field, &symbols()).unwrap();
        assert!(xml.starts_with(
            "<ogc:PropertyIsLike matchCase=\"false\" \
             wildCard=\"%2A\" singleChar=\"%23\" escapeChar=\"%21\">"
        ));
        // Wildcard appended to the literal.
        assert!(xml.contains("<ogc:Literal>Ross*</ogc:Literal>"));
    }

    #[test]
    fn test_and_clause_wraps_two_children() {
        let tree = vec![ClauseNode::and(vec![
            ClauseNode::field(FieldSpec::equal("gemname", "Waldesch")),
            ClauseNode::field(FieldSpec::equal("flur", "1")),
        ])];
        let fragments = build_filter(&tree, &symbols()).unwrap();
        assert_eq!(fragments, vec![
            "<ogc:And>\
             <ogc:PropertyIsEqualTo matchCase=\"false\">\
             <ogc:PropertyName>gemname</ogc:PropertyName>\
             <ogc:Literal>Waldesch</ogc:Literal>\
             </ogc:PropertyIsEqualTo>\
             <ogc:PropertyIsEqualTo matchCase=\"false\">\
             <ogc:PropertyName>flur</ogc:PropertyName>\
             <ogc:Literal>1</ogc:Literal>\
             </ogc:PropertyIsEqualTo>\
             </ogc:And>"
                .to_string()
        ]);
    }

    #[test]
    fn test_single_contributing_child_is_not_wrapped() {
        let tree = vec![ClauseNode::or(vec![
            ClauseNode::field(FieldSpec::equal("gemname", "Waldesch")),
            ClauseNode::field(FieldSpec::equal("flur", FieldValue::Null)),
        ])];
        let fragments = build_filter(&tree, &symbols()).unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(!fragments[0].contains("<ogc:Or>"));
        assert!(fragments[0].starts_with("<ogc:PropertyIsEqualTo"));
    }

    #[test]
    fn test_empty_values_contribute_nothing() {
        let tree = vec![ClauseNode::and(vec![
            ClauseNode::field(FieldSpec::equal("a", FieldValue::Null)),
            ClauseNode::field(FieldSpec::equal("b", "")),
            ClauseNode::field(FieldSpec::equal("c", 0.0)),
            ClauseNode::field(FieldSpec::equal("d", false)),
        ])];
        assert_eq!(build_filter(&tree, &symbols()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_nested_clauses() {
        let tree = vec![ClauseNode::and(vec![
            ClauseNode::or(vec![
                ClauseNode::field(FieldSpec::equal("kreis", "Nord")),
                ClauseNode::field(FieldSpec::equal("kreis", "Sued")),
            ]),
            ClauseNode::field(FieldSpec::equal("flur", "1")),
        ])];
        let fragments = build_filter(&tree, &symbols()).unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].starts_with("<ogc:And><ogc:Or>"));
        assert!(fragments[0].ends_with("</ogc:And>"));
    }

    #[test]
    fn test_xml_metacharacters_are_escaped() {
        let field = FieldSpec::equal("name", "Alt & <Neu>");
        let xml = build_xml_filter(&field, &symbols()).unwrap();
        assert!(xml.contains("<ogc:Literal>Alt &amp; &lt;Neu&gt;</ogc:Literal>"));
    }

    #[test]
    fn test_unresolvable_field_is_an_error() {
        let field = FieldSpec {
            field_name: Columns::Many(vec!["a".to_string(), "b".to_string()]),
            comparison: Columns::Many(vec![MatchKind::Equal, MatchKind::Like]),
            value: "x".into(),
            parameter_index: None,
        };
        let tree = vec![ClauseNode::field(field)];
        assert!(build_filter(&tree, &symbols()).is_err());
    }

    #[test]
    fn test_to_filter_parameter() {
        assert_eq!(to_filter_parameter(&[]), None);

        let one = vec!["<x/>".to_string()];
        assert_eq!(
            to_filter_parameter(&one).unwrap(),
            "<ogc:Filter xmlns:ogc=\"http://www.opengis.net/ogc\"><x/></ogc:Filter>"
        );

        let two = vec!["<x/>".to_string(), "<y/>".to_string()];
        assert_eq!(
            to_filter_parameter(&two).unwrap(),
            "<ogc:Filter xmlns:ogc=\"http://www.opengis.net/ogc\">\
             <ogc:And><x/><y/></ogc:And></ogc:Filter>"
        );
    }

    #[test]
    fn test_symbols_deserialize_from_config() {
        let symbols: LikeFilterSymbols =
            serde_json::from_str(r#"{"wildCard": "%", "singleChar": "_"}"#).unwrap();
        assert_eq!(symbols.wildcard, "%");
        assert_eq!(symbols.single_char, "_");
        assert_eq!(symbols.escape_char, "!");
    }
}
