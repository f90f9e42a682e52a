//! Ordering resolution for listing requests.
//!
//! A plain `order_by` resolves against the entity's sortable columns and
//! becomes a top-level `ORDER BY`. A dotted `order_by` (`relation.column`)
//! orders the eager-loaded relation collection instead: the top-level row
//! order stays at the entity default, and only the order of rows *inside*
//! each loaded collection changes. Pagination therefore stays stable under
//! relation-scoped ordering.

use sea_orm::{ColumnTrait, Order};

use super::config::{FilterConfig, split_dotted};

/// Ordering applied to an eager-loaded relation collection.
#[derive(Debug, Clone)]
pub struct RelatedOrder {
    pub relation: String,
    pub column: String,
    pub direction: Order,
}

/// Resolved ordering for one request.
#[derive(Debug, Clone)]
pub enum ResolvedOrder<C> {
    /// Sort top-level rows by an entity column.
    Column { column: C, direction: Order },
    /// Sort rows within an eager-loaded relation collection.
    Related(RelatedOrder),
}

/// Normalize a sort direction. Only `asc` and `desc` (any case) are
/// accepted; anything else falls back to descending.
#[must_use]
pub fn parse_direction(sort_by: Option<&str>) -> Order {
    match sort_by.map(|value| value.trim().to_lowercase()).as_deref() {
        Some("asc") => Order::Asc,
        _ => Order::Desc,
    }
}

/// Resolve `order_by`/`sort_by` into an ordering.
///
/// Unknown column names fall back to the default column; dotted names whose
/// relation is not declared also fall back to the default column.
pub fn resolve_order<C>(
    order_by: Option<&str>,
    sort_by: Option<&str>,
    sortable: &[(&'static str, C)],
    default_column: C,
    config: &FilterConfig,
) -> ResolvedOrder<C>
where
    C: ColumnTrait + Copy,
{
    let direction = parse_direction(sort_by);
    let Some(order_by) = order_by.map(str::trim).filter(|value| !value.is_empty()) else {
        return ResolvedOrder::Column {
            column: default_column,
            direction,
        };
    };

    if let Some((relation, column)) = split_dotted(order_by) {
        if !column.contains('.') && config.relation(relation).is_some() {
            return ResolvedOrder::Related(RelatedOrder {
                relation: relation.to_string(),
                column: column.to_string(),
                direction,
            });
        }
        tracing::debug!(order_by, "unresolvable relation ordering, using default");
        return ResolvedOrder::Column {
            column: default_column,
            direction,
        };
    }

    let column = sortable
        .iter()
        .find(|(name, _)| *name == order_by)
        .map_or(default_column, |&(_, column)| column);
    ResolvedOrder::Column { column, direction }
}
