//! The seam between the generic filtering engine and concrete entities.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order};

use crate::filtering::RelatedOrder;

/// A listable resource backed by a Sea-ORM entity.
///
/// Implementations connect an API model to its entity, declare which columns
/// the ordering resolver may use, and attach eager-loaded relations when rows
/// are materialized. One implementation per entity, paired with one static
/// [`FilterConfig`](crate::filtering::FilterConfig).
#[async_trait]
pub trait FilterableResource: Sized + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    <Self::EntityType as EntityTrait>::Model: Send + Sync,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + Copy + Send + Sync;

    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    /// Columns `order_by` may name, as (external name, column) pairs.
    fn sortable_columns() -> Vec<(&'static str, Self::ColumnType)>;

    /// Ordering applied when none is requested, and the top-level ordering
    /// whenever a relation-scoped ordering is in effect.
    fn default_order() -> (Self::ColumnType, Order);

    /// Convert fetched rows into resources, loading whatever relations the
    /// resource embeds. `related_order` names a relation collection to sort
    /// at load time; implementations ignore relations or columns they do not
    /// recognize.
    async fn from_models(
        db: &DatabaseConnection,
        models: Vec<<Self::EntityType as EntityTrait>::Model>,
        related_order: Option<&RelatedOrder>,
    ) -> Result<Vec<Self>, DbErr>;
}
