//! Composition of search, filters, ordering and pagination into one query.
//!
//! [`FilterEngine`] is built once per entity service from a static
//! [`FilterConfig`]: construction validates the configuration and precomputes
//! the external-key lookup index, so nothing is scanned per request. All
//! inputs arrive as explicit [`ListParams`]; the engine holds no per-request
//! state.

use sea_orm::{
    Condition, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use std::collections::HashMap;

use super::conditions::field_condition;
use super::config::{ConfigError, FilterConfig, FilterEntry};
use super::search::search_condition;
use super::sort::{RelatedOrder, ResolvedOrder, resolve_order};
use crate::errors::ApiError;
use crate::models::{ListParams, Paginated, RESERVED_PARAMS};
use crate::traits::FilterableResource;

/// Declarative filtering engine for one entity.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    config: &'static FilterConfig,
    index: HashMap<&'static str, &'static FilterEntry>,
}

impl FilterEngine {
    /// Validate the configuration and build the key lookup index.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for invalid configuration; this is a
    /// programmer error surfaced at startup, never per request.
    pub fn new(config: &'static FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut index = HashMap::with_capacity(config.filters.len());
        for entry in config.filters {
            index.insert(entry.param, entry);
        }
        Ok(Self { config, index })
    }

    #[must_use]
    pub fn config(&self) -> &'static FilterConfig {
        self.config
    }

    /// Build the combined condition for a request: the search OR-group plus
    /// one predicate per recognized, non-empty filter parameter.
    ///
    /// Unknown parameters are ignored. Reserved parameter names are never
    /// treated as filter keys, even if an entry is configured for one. A
    /// value that fails coercion drops its filter with a warning instead of
    /// failing the request.
    #[must_use]
    pub fn build_condition(&self, params: &ListParams, backend: DatabaseBackend) -> Condition {
        let mut condition = Condition::all();

        if let Some(term) = params.search.as_deref() {
            if let Some(group) = search_condition(self.config, &self.index, term) {
                condition = condition.add(group);
            }
        }

        for entry in self.config.filters {
            if RESERVED_PARAMS.contains(&entry.param) {
                continue;
            }
            let Some(value) = params.filters.get(entry.param) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match field_condition(self.config, entry, value, backend) {
                Ok(expr) => condition = condition.add(expr),
                Err(err) => {
                    tracing::warn!(
                        param = entry.param,
                        error = %err,
                        "ignoring filter with invalid value"
                    );
                }
            }
        }

        condition
    }

    /// One page of results plus pagination metadata.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`]; no retries.
    pub async fn fetch_page<T>(
        &self,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<Paginated<T>, ApiError>
    where
        T: FilterableResource,
    {
        let (query, related) = self.filtered_query::<T>(params, db.get_database_backend());
        let total = PaginatorTrait::count(query.clone(), db)
            .await
            .map_err(ApiError::database)?;

        let per_page = params
            .per_page
            .unwrap_or(self.config.default_per_page)
            .max(1);
        let page = params.page.unwrap_or(1).max(1);
        let models = query
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(db)
            .await
            .map_err(ApiError::database)?;

        let data = T::from_models(db, models, related.as_ref())
            .await
            .map_err(ApiError::database)?;
        Ok(Paginated::new(data, page, per_page, total))
    }

    /// The full filtered collection, for export and report paths. Unbounded;
    /// limiting volume is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`]; no retries.
    pub async fn fetch_all<T>(
        &self,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<Vec<T>, ApiError>
    where
        T: FilterableResource,
    {
        let (query, related) = self.filtered_query::<T>(params, db.get_database_backend());
        let models = query.all(db).await.map_err(ApiError::database)?;
        T::from_models(db, models, related.as_ref())
            .await
            .map_err(ApiError::database)
    }

    /// Filtered, ordered base query plus any relation-scoped ordering to
    /// apply at load time. A relation-scoped ordering leaves the top-level
    /// order at the entity default.
    fn filtered_query<T>(
        &self,
        params: &ListParams,
        backend: DatabaseBackend,
    ) -> (Select<T::EntityType>, Option<RelatedOrder>)
    where
        T: FilterableResource,
    {
        let condition = self.build_condition(params, backend);
        let resolved = resolve_order(
            params.order_by.as_deref(),
            params.sort_by.as_deref(),
            &T::sortable_columns(),
            T::default_order().0,
            self.config,
        );
        let (column, direction, related) = match resolved {
            ResolvedOrder::Column { column, direction } => (column, direction, None),
            ResolvedOrder::Related(related) => {
                let (column, direction) = T::default_order();
                (column, direction, Some(related))
            }
        };
        (
            T::EntityType::find()
                .filter(condition)
                .order_by(column, direction),
            related,
        )
    }
}
