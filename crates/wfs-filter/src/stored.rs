//! WFS 2.0 stored-query parameter compilation.

use portal_common::PortalResult;
use tracing::debug;

use crate::clause::ClauseNode;

/// Compile a clause tree into stored-query URL parameters.
///
/// Stored queries cannot nest logical operators, so composite nodes
/// only concatenate their children. Each contributing leaf appends one
/// `&field=value` pair, in document order. An all-empty tree compiles
/// to the empty string.
pub fn build_stored_filter(nodes: &[ClauseNode]) -> PortalResult<String> {
    let mut params = String::new();
    for node in nodes {
        match node {
            ClauseNode::Clause(clause) => {
                params.push_str(&build_stored_filter(&clause.literals)?);
            }
            ClauseNode::Field(field) => {
                if field.value.has_query_value() {
                    let (name, _) = field.resolve()?;
                    params.push('&');
                    params.push_str(name);
                    params.push('=');
                    params.push_str(&urlencoding::encode(&field.value.render()));
                } else {
                    debug!(field = field.display_name(), "field without value skipped");
                }
            }
        }
    }
    Ok(params)
}

/// Assemble the GetFeature request URL a compiled parameter string is
/// appended to.
pub fn stored_query_url(base_url: &str, stored_query_id: &str, params: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{base_url}{separator}service=WFS&request=GetFeature&version=2.0.0&StoredQuery_ID={}{params}",
        urlencoding::encode(stored_query_id)
    )
}
