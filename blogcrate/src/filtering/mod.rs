//! # Declarative Query Filtering
//!
//! This module translates request parameters into Sea-ORM query conditions
//! from a static per-entity configuration. It enables rich listing APIs
//! without writing per-endpoint query code.
//!
//! ## Main Components
//!
//! - **[`FilterConfig`]**: per-entity map of external keys to typed column
//!   predicates, search columns and relations
//! - **[`FilterEngine`]**: validated engine composing search, filters,
//!   ordering and pagination
//! - **[`coerce`](coerce::coerce)**: strict typed coercion of raw values
//! - **[`resolve_order`](sort::resolve_order)**: direct and relation-scoped
//!   ordering resolution
//!
//! ## Request Examples
//!
//! ```rust,ignore
//! // Equality and substring filters
//! GET /posts?status=Active&title=rust
//!
//! // Membership over a relation (at least one tag with id 2 or 5)
//! GET /posts?tag_ids[]=2&tag_ids[]=5
//!
//! // Date-only range on published_at
//! GET /posts?date_from=2024-01-01&date_to=2024-06-30
//!
//! // Free-text search across the configured columns
//! GET /posts?search=ownership
//!
//! // Ordering and pagination
//! GET /posts?order_by=title&sort_by=asc&per_page=10&page=2
//!
//! // Relation-scoped ordering: post order unchanged, each post's loaded
//! // comments sorted ascending
//! GET /posts?order_by=comments.created_at&sort_by=asc
//! ```

pub mod coerce;
pub mod conditions;
pub mod config;
pub mod engine;
pub mod search;
pub mod sort;

pub use coerce::{CoerceError, TypedValue, coerce};
pub use conditions::{FilterError, field_condition};
pub use config::{
    ConfigError, FilterConfig, FilterEntry, FilterOperator, RelationKind, RelationSpec, ValueType,
};
pub use engine::FilterEngine;
pub use sort::{RelatedOrder, ResolvedOrder, parse_direction, resolve_order};
