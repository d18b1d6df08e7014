//! WFS search filter compilation.
//!
//! A portal search mask is configured as a tree of boolean clauses over
//! field/value literals. The same tree compiles two ways: into OGC
//! Filter Encoding 1.1.0 XML fragments for WFS 1.1.0 `GetFeature`
//! requests, or into flat URL parameters for WFS 2.0 stored queries.

pub mod clause;
pub mod stored;
pub mod xml;

pub use clause::{Clause, ClauseKind, ClauseNode, Columns, FieldSpec, FieldValue, MatchKind};
pub use stored::{build_stored_filter, stored_query_url};
pub use xml::{build_filter, build_xml_filter, to_filter_parameter, LikeFilterSymbols};
