//! Free-text search across a configured set of columns.
//!
//! The search term is combined into a single OR-group: direct columns add a
//! `LIKE` clause, relation-qualified columns add an independent EXISTS
//! subquery each. Columns mapping to the same relation intentionally stay in
//! separate subqueries so one related row never has to satisfy two search
//! columns at once.

use sea_orm::Condition;
use std::collections::HashMap;

use super::conditions::{ColRef, FilterError, Target, exists_related, like_condition, resolve_target};
use super::config::{FilterConfig, FilterEntry, split_dotted};

/// Build the OR-group for a search term, or `None` when the term is blank or
/// nothing is configured to search.
pub(crate) fn search_condition(
    config: &FilterConfig,
    index: &HashMap<&'static str, &'static FilterEntry>,
    term: &str,
) -> Option<Condition> {
    let term = term.trim();
    if term.is_empty() || config.search_columns.is_empty() {
        return None;
    }

    let mut group = Condition::any();
    let mut matched = false;
    for &column in config.search_columns {
        let target = match search_target(config, index, column) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(column, error = %err, "skipping unresolvable search column");
                continue;
            }
        };
        let clause = match target {
            Target::Direct { column } => like_condition(ColRef::Plain(column), term),
            Target::Related { relation, column } => {
                let inner = like_condition(ColRef::Qualified(relation.table, column), term);
                exists_related(config.table, relation, inner)
            }
        };
        group = group.add(clause);
        matched = true;
    }

    matched.then_some(group)
}

/// Resolve a search column name through the filter map: configured external
/// key first, then target field, then the name itself.
fn search_target(
    config: &FilterConfig,
    index: &HashMap<&'static str, &'static FilterEntry>,
    name: &'static str,
) -> Result<Target, FilterError> {
    if let Some(entry) = index.get(name).copied() {
        return resolve_target(config, entry);
    }
    if let Some(entry) = config
        .filters
        .iter()
        .find(|entry| entry.target_field() == name)
    {
        return resolve_target(config, entry);
    }
    if let Some((head, column)) = split_dotted(name) {
        let relation = config
            .relation(head)
            .ok_or_else(|| FilterError::UnknownRelation(head.to_string()))?;
        return Ok(Target::Related { relation, column });
    }
    Ok(Target::Direct { column: name })
}
