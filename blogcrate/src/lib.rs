//! # blogcrate
//!
//! Filterable, paginated blog post services built on Sea-ORM.
//!
//! The crate is organised around a declarative filtering engine: each entity
//! service declares a static [`FilterConfig`](filtering::FilterConfig) mapping
//! external request parameters to typed column predicates (including
//! single-hop relation constraints), and the [`FilterEngine`] turns an
//! incoming [`ListParams`] into a filtered, ordered, paginated result set.
//!
//! ```rust,ignore
//! let posts = PostService::new()?;
//! let params = ListParams::from_query("status=Active&tag_ids[]=2&tag_ids[]=5&per_page=10");
//! let page = posts.list(&db, &params).await?;
//! assert_eq!(page.meta.per_page, 10);
//! ```

pub mod entities;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod services;
pub mod traits;

pub use errors::ApiError;
pub use filtering::FilterEngine;
pub use models::{FilterParams, FilterValue, ListParams, Paginated};
pub use traits::FilterableResource;
