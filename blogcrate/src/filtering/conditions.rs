//! Translation of one filter entry plus its raw value into a query predicate.
//!
//! Direct columns become plain comparisons; `relation.column` targets become
//! EXISTS-style subqueries correlated back to the parent table, so a matching
//! related row is required without joining or loading the relation.

use sea_orm::{
    DatabaseBackend, Value,
    sea_query::{Alias, Expr, ExprTrait, Func, Query, SimpleExpr},
};
use std::fmt;

use super::coerce::{CoerceError, TypedValue, coerce};
use super::config::{
    FilterConfig, FilterEntry, FilterOperator, RelationKind, RelationSpec, ValueType, split_dotted,
};
use crate::models::FilterValue;

/// A per-request filter failure. Invalid values are recoverable (the engine
/// skips the filter); unknown relations are prevented up front by
/// [`FilterConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    Value(CoerceError),
    UnknownRelation(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(err) => write!(f, "{err}"),
            Self::UnknownRelation(name) => write!(f, "relation '{name}' is not declared"),
        }
    }
}

impl std::error::Error for FilterError {}

impl From<CoerceError> for FilterError {
    fn from(err: CoerceError) -> Self {
        Self::Value(err)
    }
}

/// Column reference, optionally qualified by its table to avoid ambiguity
/// inside relation subqueries.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ColRef<'a> {
    Plain(&'a str),
    Qualified(&'a str, &'a str),
}

impl ColRef<'_> {
    fn expr(self) -> Expr {
        match self {
            Self::Plain(column) => Expr::col(Alias::new(column)),
            Self::Qualified(table, column) => Expr::col((Alias::new(table), Alias::new(column))),
        }
    }
}

/// Resolved predicate target: a parent column, or a column on a declared
/// single-hop relation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target {
    Direct {
        column: &'static str,
    },
    Related {
        relation: &'static RelationSpec,
        column: &'static str,
    },
}

/// Resolve an entry's target field and relation. An explicit `relation`
/// overrides the dot-derived one.
pub(crate) fn resolve_target(
    config: &FilterConfig,
    entry: &FilterEntry,
) -> Result<Target, FilterError> {
    let field = entry.target_field();
    if let Some((head, column)) = split_dotted(field) {
        let name = entry.relation.unwrap_or(head);
        let relation = config
            .relation(name)
            .ok_or_else(|| FilterError::UnknownRelation(name.to_string()))?;
        Ok(Target::Related { relation, column })
    } else if let Some(name) = entry.relation {
        let relation = config
            .relation(name)
            .ok_or_else(|| FilterError::UnknownRelation(name.to_string()))?;
        Ok(Target::Related {
            relation,
            column: field,
        })
    } else {
        Ok(Target::Direct { column: field })
    }
}

/// Build the predicate for one `(entry, value)` pair.
///
/// Array values, and the `in`/`not_in` operators, coerce every element and
/// produce a membership predicate; scalar values dispatch on the operator.
/// Relation targets are wrapped in an EXISTS subquery.
///
/// # Errors
///
/// Returns a [`FilterError`] when a value fails coercion or the entry names
/// an undeclared relation.
pub fn field_condition(
    config: &FilterConfig,
    entry: &FilterEntry,
    value: &FilterValue,
    backend: DatabaseBackend,
) -> Result<SimpleExpr, FilterError> {
    match resolve_target(config, entry)? {
        Target::Direct { column } => comparison(ColRef::Plain(column), entry, value, backend),
        Target::Related { relation, column } => {
            let inner = comparison(
                ColRef::Qualified(relation.table, column),
                entry,
                value,
                backend,
            )?;
            Ok(exists_related(config.table, relation, inner))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Gte,
    Lte,
}

macro_rules! compare {
    ($expr:expr, $op:expr, $value:expr) => {
        match $op {
            CmpOp::Eq => $expr.eq($value),
            CmpOp::Gte => $expr.gte($value),
            CmpOp::Lte => $expr.lte($value),
        }
    };
}

fn binary_expr<E: ExprTrait>(expr: E, op: CmpOp, value: TypedValue) -> SimpleExpr {
    match value {
        TypedValue::Str(v) => compare!(expr, op, v),
        TypedValue::Int(v) => compare!(expr, op, v),
        TypedValue::Float(v) => compare!(expr, op, v),
        TypedValue::Bool(v) => compare!(expr, op, v),
        TypedValue::Date(v) => compare!(expr, op, v),
    }
}

fn comparison(
    col: ColRef,
    entry: &FilterEntry,
    value: &FilterValue,
    backend: DatabaseBackend,
) -> Result<SimpleExpr, FilterError> {
    let raws: &[String] = match value {
        FilterValue::Many(raws) => raws,
        FilterValue::Single(raw) => std::slice::from_ref(raw),
    };

    if matches!(value, FilterValue::Many(_))
        || matches!(entry.operator, FilterOperator::In | FilterOperator::NotIn)
    {
        return membership(col, entry, raws);
    }

    let raw = &raws[0];
    match entry.operator {
        FilterOperator::Like => Ok(like_condition(col, raw.trim())),
        FilterOperator::Gte | FilterOperator::Lte => {
            let typed = coerce(raw, entry.value_type)?;
            let op = if matches!(entry.operator, FilterOperator::Gte) {
                CmpOp::Gte
            } else {
                CmpOp::Lte
            };
            // Date bounds ignore the time component of the stored column.
            if entry.value_type == ValueType::Date {
                Ok(binary_expr(date_only(col, backend), op, typed))
            } else {
                Ok(binary_expr(col.expr(), op, typed))
            }
        }
        FilterOperator::Eq | FilterOperator::In | FilterOperator::NotIn => {
            let typed = coerce(raw, entry.value_type)?;
            Ok(binary_expr(col.expr(), CmpOp::Eq, typed))
        }
    }
}

/// Membership predicate; a scalar value becomes a one-element set.
fn membership(col: ColRef, entry: &FilterEntry, raws: &[String]) -> Result<SimpleExpr, FilterError> {
    let mut values = Vec::with_capacity(raws.len());
    for raw in raws {
        values.push(Value::from(coerce(raw, entry.value_type)?));
    }
    Ok(match entry.operator {
        FilterOperator::NotIn => col.expr().is_not_in(values),
        _ => col.expr().is_in(values),
    })
}

/// Date-only view of a datetime column, per backend.
fn date_only(col: ColRef, backend: DatabaseBackend) -> SimpleExpr {
    match backend {
        DatabaseBackend::Sqlite => {
            SimpleExpr::FunctionCall(Func::cust(Alias::new("date")).arg(col.expr()))
        }
        _ => col.expr().cast_as(Alias::new("DATE")),
    }
}

/// Case-insensitive substring match with LIKE wildcards escaped.
pub(crate) fn like_condition(col: ColRef, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like_wildcards(term).to_uppercase());
    Func::upper(col.expr()).like(pattern)
}

/// Escape LIKE wildcards to prevent wildcard injection.
/// Escapes: % (match any) and _ (match single char)
pub(crate) fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// EXISTS subquery requiring at least one related row to satisfy `inner`,
/// correlated back to the parent table per the relation kind.
pub(crate) fn exists_related(
    parent_table: &str,
    relation: &RelationSpec,
    inner: SimpleExpr,
) -> SimpleExpr {
    let mut sub = Query::select();
    sub.expr(Expr::val(1));
    match relation.kind {
        RelationKind::BelongsTo { local_key } => {
            sub.from(Alias::new(relation.table)).and_where(
                Expr::col((Alias::new(relation.table), Alias::new("id")))
                    .equals((Alias::new(parent_table), Alias::new(local_key))),
            );
        }
        RelationKind::HasMany { foreign_key } => {
            sub.from(Alias::new(relation.table)).and_where(
                Expr::col((Alias::new(relation.table), Alias::new(foreign_key)))
                    .equals((Alias::new(parent_table), Alias::new("id"))),
            );
        }
        RelationKind::ManyToMany {
            pivot_table,
            pivot_local_key,
            pivot_related_key,
        } => {
            sub.from(Alias::new(pivot_table))
                .inner_join(
                    Alias::new(relation.table),
                    Expr::col((Alias::new(relation.table), Alias::new("id")))
                        .equals((Alias::new(pivot_table), Alias::new(pivot_related_key))),
                )
                .and_where(
                    Expr::col((Alias::new(pivot_table), Alias::new(pivot_local_key)))
                        .equals((Alias::new(parent_table), Alias::new("id"))),
                );
        }
    }
    sub.and_where(inner);
    Expr::exists(sub)
}
