//! Declarative per-entity filter configuration.
//!
//! Each entity service declares one static [`FilterConfig`]: which external
//! parameters are filterable, the column (or `relation.column`) they target,
//! the value type to coerce to, and the comparison operator. Configuration is
//! immutable process-wide state, validated once at service construction.

use std::fmt;

/// Coercion rule applied to raw parameter values before they are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
    Date,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// Comparison operators supported by filter entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Like,
    In,
    NotIn,
    Gte,
    Lte,
}

/// How a related table correlates back to the parent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `parent.local_key` points at the related table's `id`.
    BelongsTo { local_key: &'static str },
    /// `related.foreign_key` points back at the parent's `id`.
    HasMany { foreign_key: &'static str },
    /// Correlation runs through a pivot table.
    ManyToMany {
        pivot_table: &'static str,
        pivot_local_key: &'static str,
        pivot_related_key: &'static str,
    },
}

/// A named single-hop relation available for filtering, searching and
/// relation-scoped ordering. Multi-hop paths are unsupported by design.
#[derive(Debug, Clone, Copy)]
pub struct RelationSpec {
    pub name: &'static str,
    pub table: &'static str,
    pub kind: RelationKind,
}

/// One supported external filter parameter.
#[derive(Debug, Clone, Copy)]
pub struct FilterEntry {
    /// External parameter name.
    pub param: &'static str,
    /// Target `column` or `relation.column`; defaults to `param` when absent.
    pub field: Option<&'static str>,
    pub value_type: ValueType,
    pub operator: FilterOperator,
    /// Explicit relation to constrain, overriding the dot-derived one.
    pub relation: Option<&'static str>,
}

impl FilterEntry {
    #[must_use]
    pub fn target_field(&self) -> &'static str {
        self.field.unwrap_or(self.param)
    }
}

/// Static filter configuration for one entity.
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    /// Parent table name, used to correlate relation subqueries.
    pub table: &'static str,
    pub filters: &'static [FilterEntry],
    /// Columns combined into one OR-group by the search composer. Names
    /// resolve through `filters` first (by parameter, then by target field),
    /// so `relation.column` targets work here too.
    pub search_columns: &'static [&'static str],
    pub relations: &'static [RelationSpec],
    pub default_per_page: u64,
}

impl FilterConfig {
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationSpec> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Fail-fast validation, run once at service construction.
    ///
    /// A configured relation that does not exist is a programmer error and
    /// must never surface per-request.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for duplicate parameter names, multi-hop
    /// field paths, or relation names with no matching [`RelationSpec`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (position, entry) in self.filters.iter().enumerate() {
            if self.filters[..position]
                .iter()
                .any(|earlier| earlier.param == entry.param)
            {
                return Err(ConfigError::DuplicateKey { param: entry.param });
            }

            let field = entry.target_field();
            if let Some((head, rest)) = split_dotted(field) {
                if rest.contains('.') {
                    return Err(ConfigError::MultiHopField {
                        param: entry.param,
                        field,
                    });
                }
                let relation = entry.relation.unwrap_or(head);
                if self.relation(relation).is_none() {
                    return Err(ConfigError::UnknownRelation {
                        param: entry.param,
                        relation: relation.to_string(),
                    });
                }
            } else if let Some(relation) = entry.relation {
                if self.relation(relation).is_none() {
                    return Err(ConfigError::UnknownRelation {
                        param: entry.param,
                        relation: relation.to_string(),
                    });
                }
            }
        }

        for &column in self.search_columns {
            // Columns naming a filter entry are covered by the loop above.
            let configured = self
                .filters
                .iter()
                .any(|entry| entry.param == column || entry.target_field() == column);
            if configured {
                continue;
            }
            if let Some((head, rest)) = split_dotted(column) {
                if rest.contains('.') || self.relation(head).is_none() {
                    return Err(ConfigError::UnknownSearchColumn { column });
                }
            }
        }

        Ok(())
    }
}

/// Split a `relation.column` path at its single separator.
#[must_use]
pub(crate) fn split_dotted(field: &str) -> Option<(&str, &str)> {
    let dot = field.find('.')?;
    Some((&field[..dot], &field[dot + 1..]))
}

/// Configuration-time programmer errors, surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    DuplicateKey {
        param: &'static str,
    },
    MultiHopField {
        param: &'static str,
        field: &'static str,
    },
    UnknownRelation {
        param: &'static str,
        relation: String,
    },
    UnknownSearchColumn {
        column: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { param } => {
                write!(f, "filter parameter '{param}' is configured twice")
            }
            Self::MultiHopField { param, field } => write!(
                f,
                "filter parameter '{param}' targets '{field}': only one relation hop is supported"
            ),
            Self::UnknownRelation { param, relation } => write!(
                f,
                "filter parameter '{param}' references undeclared relation '{relation}'"
            ),
            Self::UnknownSearchColumn { column } => {
                write!(f, "search column '{column}' references an undeclared relation")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
