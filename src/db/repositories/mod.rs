use sea_orm::IdenStatic;
use sea_orm::sea_query::{Expr, SimpleExpr};

pub mod jobs;
pub mod legacy_cache;
pub mod links;
pub mod search_terms;

/// Upper bound on identifiers bound into a single `IN (...)` list.
///
/// Older SQLite builds cap host parameters at 999 per statement.
pub(crate) const MAX_BOUND_PARAMS: usize = 500;

/// `column < bound`, compared as instants rather than as text.
///
/// Timestamp columns are written by other systems too, so offsets
/// (`+00:00`), space separators and varying precision all show up. `julianday`
/// parses every ISO-8601 form SQLite understands; unparseable values yield
/// NULL and never match.
pub(crate) fn earlier_than(column: impl IdenStatic, bound: &str) -> SimpleExpr {
    Expr::cust_with_values(
        format!("julianday(\"{}\") < julianday(?)", column.as_str()),
        [bound.to_string()],
    )
}
