//! The search-mask clause tree.
//!
//! Mirrors the portal's JSON tool configuration: composite nodes are
//! `{"clause": {"type": "and"|"or", "literals": [...]}}`, leaves are
//! `{"field": {"fieldName": ..., "type": ..., "value": ...}}`. Fields
//! backed by several service columns declare arrays for `fieldName` and
//! `type` plus a `parameterIndex` selecting the active column.

use portal_common::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};

/// One node of a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseNode {
    #[serde(rename = "clause")]
    Clause(Clause),
    #[serde(rename = "field")]
    Field(FieldSpec),
}

impl ClauseNode {
    /// Compose literals under a logical AND.
    pub fn and(literals: Vec<ClauseNode>) -> Self {
        ClauseNode::Clause(Clause {
            kind: ClauseKind::And,
            literals,
        })
    }

    /// Compose literals under a logical OR.
    pub fn or(literals: Vec<ClauseNode>) -> Self {
        ClauseNode::Clause(Clause {
            kind: ClauseKind::Or,
            literals,
        })
    }

    pub fn field(field: FieldSpec) -> Self {
        ClauseNode::Field(field)
    }
}

/// A composite node joining its literals with a logical operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(rename = "type")]
    pub kind: ClauseKind,
    pub literals: Vec<ClauseNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseKind {
    And,
    Or,
}

/// Comparison flavor for a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Equal,
    Like,
}

/// One or several declared entries, as the config writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Columns<T> {
    One(T),
    Many(Vec<T>),
}

/// A user-facing search field bound to one or more service columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub field_name: Columns<String>,
    #[serde(rename = "type")]
    pub comparison: Columns<MatchKind>,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_index: Option<usize>,
}

impl FieldSpec {
    /// An equality field with a value.
    pub fn equal(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field_name: Columns::One(name.into()),
            comparison: Columns::One(MatchKind::Equal),
            value: value.into(),
            parameter_index: None,
        }
    }

    /// A substring-match field with a value.
    pub fn like(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field_name: Columns::One(name.into()),
            comparison: Columns::One(MatchKind::Like),
            value: value.into(),
            parameter_index: None,
        }
    }

    /// Resolve the active column name and comparison.
    ///
    /// Single entries pass through, and a stray `parameterIndex` on them
    /// is ignored. Multi-column entries require an in-bounds
    /// `parameterIndex`.
    pub fn resolve(&self) -> PortalResult<(&str, MatchKind)> {
        let name = match &self.field_name {
            Columns::One(name) => name.as_str(),
            Columns::Many(names) => self.pick(names)?.as_str(),
        };
        let comparison = match &self.comparison {
            Columns::One(kind) => *kind,
            Columns::Many(kinds) => *self.pick(kinds)?,
        };
        Ok((name, comparison))
    }

    fn pick<'a, T>(&self, entries: &'a [T]) -> PortalResult<&'a T> {
        let index = self.parameter_index.ok_or_else(|| self.index_error())?;
        entries.get(index).ok_or_else(|| self.index_error())
    }

    fn index_error(&self) -> PortalError {
        PortalError::FieldIndexMissing {
            field: self.display_name().to_string(),
        }
    }

    /// First declared column name, for error messages.
    pub fn display_name(&self) -> &str {
        match &self.field_name {
            Columns::One(name) => name,
            Columns::Many(names) => names.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// A leaf field's value as entered in the search mask.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Whether the field carries something to filter on.
    ///
    /// The search masks treat the empty string, `0`, and `false` the
    /// same as no entry at all; a zero entered on purpose is
    /// indistinguishable from an untouched numeric field and is dropped
    /// from the request.
    pub fn has_query_value(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// Render for a request parameter or XML literal.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 9e15 => {
                format!("{}", *n as i64)
            }
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_portal_config_shape() {
        let json = r#"
        {
            "clause": {
                "type": "and",
                "literals": [
                    {"field": {"fieldName": "gemname", "type": "equal", "value": "Waldesch"}},
                    {"field": {"fieldName": "flur", "type": "equal", "value": "1"}}
                ]
            }
        }"#;
        let node: ClauseNode = serde_json::from_str(json).unwrap();
        match node {
            ClauseNode::Clause(clause) => {
                assert_eq!(clause.kind, ClauseKind::And);
                assert_eq!(clause.literals.len(), 2);
            }
            ClauseNode::Field(_) => panic!("expected a clause node"),
        }
    }

    #[test]
    fn test_deserialize_multi_column_field() {
        let json = r#"
        {
            "field": {
                "fieldName": ["strasse", "hausnummer"],
                "type": ["like", "equal"],
                "value": "Ross",
                "parameterIndex": 0
            }
        }"#;
        let node: ClauseNode = serde_json::from_str(json).unwrap();
        let ClauseNode::Field(field) = node else {
            panic!("expected a field node");
        };
        let (name, comparison) = field.resolve().unwrap();
        assert_eq!(name, "strasse");
        assert_eq!(comparison, MatchKind::Like);
    }

    #[test]
    fn test_missing_value_defaults_to_null() {
        let json = r#"{"field": {"fieldName": "flur", "type": "equal"}}"#;
        let node: ClauseNode = serde_json::from_str(json).unwrap();
        let ClauseNode::Field(field) = node else {
            panic!("expected a field node");
        };
        assert_eq!(field.value, FieldValue::Null);
        assert!(!field.value.has_query_value());
    }

    #[test]
    fn test_multi_column_without_index() {
        let field = FieldSpec {
            field_name: Columns::Many(vec!["a".to_string(), "b".to_string()]),
            comparison: Columns::One(MatchKind::Equal),
            value: "x".into(),
            parameter_index: None,
        };
        let err = field.resolve().unwrap_err();
        assert!(matches!(err, PortalError::FieldIndexMissing { .. }));
        assert!(err.to_string().contains('a'));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let field = FieldSpec {
            field_name: Columns::Many(vec!["a".to_string()]),
            comparison: Columns::Many(vec![MatchKind::Equal]),
            value: "x".into(),
            parameter_index: Some(3),
        };
        assert!(field.resolve().is_err());
    }

    #[test]
    fn test_stray_index_on_single_column_is_ignored() {
        let mut field = FieldSpec::equal("flur", "1");
        field.parameter_index = Some(7);
        let (name, comparison) = field.resolve().unwrap();
        assert_eq!(name, "flur");
        assert_eq!(comparison, MatchKind::Equal);
    }

    #[test]
    fn test_query_value_policy() {
        assert!(!FieldValue::Null.has_query_value());
        assert!(!FieldValue::Text(String::new()).has_query_value());
        assert!(!FieldValue::Number(0.0).has_query_value());
        assert!(!FieldValue::Bool(false).has_query_value());
        assert!(FieldValue::Text("0 ".to_string()).has_query_value());
        assert!(FieldValue::Number(-1.0).has_query_value());
        assert!(FieldValue::Bool(true).has_query_value());
    }

    #[test]
    fn test_render() {
        assert_eq!(FieldValue::Number(12.0).render(), "12");
        assert_eq!(FieldValue::Number(1.5).render(), "1.5");
        assert_eq!(FieldValue::Bool(true).render(), "true");
        assert_eq!(FieldValue::Text("Waldesch".to_string()).render(), "Waldesch");
    }
}
