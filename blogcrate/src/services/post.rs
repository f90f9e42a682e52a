//! Post listing, filtering and CRUD.
//!
//! The filter map mirrors the listing UI: substring match on title and
//! content, exact status, author and tag membership, and a date-only range
//! over `published_at`. Tag membership runs through the `tags` relation, so a
//! post matches when at least one of its tags is in the requested set.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, LoaderTrait, Order, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{comment, post, post_tag, tag, user};
use crate::errors::ApiError;
use crate::filtering::{
    ConfigError, FilterConfig, FilterEngine, FilterEntry, FilterOperator, RelatedOrder,
    RelationKind, RelationSpec, ValueType,
};
use crate::models::{ListParams, Paginated};
use crate::traits::FilterableResource;

/// Filter map for post listings.
pub static POST_FILTER_CONFIG: FilterConfig = FilterConfig {
    table: "posts",
    filters: &[
        FilterEntry {
            param: "title",
            field: None,
            value_type: ValueType::Str,
            operator: FilterOperator::Like,
            relation: None,
        },
        FilterEntry {
            param: "content",
            field: None,
            value_type: ValueType::Str,
            operator: FilterOperator::Like,
            relation: None,
        },
        FilterEntry {
            param: "status",
            field: None,
            value_type: ValueType::Str,
            operator: FilterOperator::Eq,
            relation: None,
        },
        FilterEntry {
            param: "author_ids",
            field: Some("author_id"),
            value_type: ValueType::Int,
            operator: FilterOperator::In,
            relation: None,
        },
        FilterEntry {
            param: "tag_ids",
            field: Some("tags.id"),
            value_type: ValueType::Int,
            operator: FilterOperator::In,
            relation: Some("tags"),
        },
        FilterEntry {
            param: "date_from",
            field: Some("published_at"),
            value_type: ValueType::Date,
            operator: FilterOperator::Gte,
            relation: None,
        },
        FilterEntry {
            param: "date_to",
            field: Some("published_at"),
            value_type: ValueType::Date,
            operator: FilterOperator::Lte,
            relation: None,
        },
    ],
    search_columns: &["title", "content"],
    relations: &[
        RelationSpec {
            name: "author",
            table: "users",
            kind: RelationKind::BelongsTo {
                local_key: "author_id",
            },
        },
        RelationSpec {
            name: "comments",
            table: "comments",
            kind: RelationKind::HasMany {
                foreign_key: "post_id",
            },
        },
        RelationSpec {
            name: "tags",
            table: "tags",
            kind: RelationKind::ManyToMany {
                pivot_table: "post_tags",
                pivot_local_key: "post_id",
                pivot_related_key: "tag_id",
            },
        },
    ],
    default_per_page: 15,
};

/// A post with its author name, tag names and comments attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub status: String,
    pub author_id: i32,
    pub author: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub comments: Vec<PostComment>,
    pub comments_count: u64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Comment shape embedded in a post.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostComment {
    pub id: i32,
    pub content: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
}

/// Validated input for creating or updating a post. Field-level validation
/// happens upstream; this layer only persists.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub status: String,
    pub author_id: i32,
    pub published_at: Option<NaiveDateTime>,
    /// Stored image path, if an upload was processed upstream.
    pub image: Option<String>,
    /// Tag ids to sync; `None` leaves the current set untouched.
    pub tags: Option<Vec<i32>>,
}

#[async_trait]
impl FilterableResource for Post {
    type EntityType = post::Entity;
    type ColumnType = post::Column;

    const RESOURCE_NAME_SINGULAR: &'static str = "post";
    const RESOURCE_NAME_PLURAL: &'static str = "posts";

    fn sortable_columns() -> Vec<(&'static str, post::Column)> {
        vec![
            ("id", post::Column::Id),
            ("title", post::Column::Title),
            ("status", post::Column::Status),
            ("published_at", post::Column::PublishedAt),
            ("created_at", post::Column::CreatedAt),
        ]
    }

    fn default_order() -> (post::Column, Order) {
        (post::Column::Id, Order::Desc)
    }

    async fn from_models(
        db: &DatabaseConnection,
        models: Vec<post::Model>,
        related_order: Option<&RelatedOrder>,
    ) -> Result<Vec<Self>, DbErr> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let authors = models.load_one(user::Entity, db).await?;
        let mut comments = models.load_many(comment::Entity, db).await?;
        let mut tags = models
            .load_many_to_many(tag::Entity, post_tag::Entity, db)
            .await?;

        if let Some(order) = related_order {
            match order.relation.as_str() {
                "comments" => sort_comment_lists(&mut comments, order),
                "tags" => sort_tag_lists(&mut tags, order),
                _ => {}
            }
        }

        let mut posts = Vec::with_capacity(models.len());
        for (((model, author), comment_list), tag_list) in
            models.into_iter().zip(authors).zip(comments).zip(tags)
        {
            posts.push(Self {
                id: model.id,
                title: model.title,
                content: model.content,
                status: model.status,
                author_id: model.author_id,
                author: author.map(|user| user.name),
                published_at: model.published_at,
                image: model.image,
                tags: tag_list.into_iter().map(|tag| tag.name).collect(),
                comments_count: comment_list.len() as u64,
                comments: comment_list
                    .into_iter()
                    .map(|comment| PostComment {
                        id: comment.id,
                        content: comment.content,
                        created_by: comment.created_by,
                        created_at: comment.created_at,
                    })
                    .collect(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            });
        }
        Ok(posts)
    }
}

/// Sort each loaded comment collection in place. Unrecognized columns leave
/// the load order untouched.
fn sort_comment_lists(lists: &mut [Vec<comment::Model>], order: &RelatedOrder) {
    for list in lists {
        match order.column.as_str() {
            "created_at" => list.sort_by_key(|comment| comment.created_at),
            "id" => list.sort_by_key(|comment| comment.id),
            _ => return,
        }
        if matches!(order.direction, Order::Desc) {
            list.reverse();
        }
    }
}

fn sort_tag_lists(lists: &mut [Vec<tag::Model>], order: &RelatedOrder) {
    for list in lists {
        match order.column.as_str() {
            "name" => list.sort_by(|a, b| a.name.cmp(&b.name)),
            "id" => list.sort_by_key(|tag| tag.id),
            _ => return,
        }
        if matches!(order.direction, Order::Desc) {
            list.reverse();
        }
    }
}

/// Post operations over the shared filtering engine.
pub struct PostService {
    engine: FilterEngine,
}

impl PostService {
    /// Build the service, validating the static filter map.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the filter map is misconfigured.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            engine: FilterEngine::new(&POST_FILTER_CONFIG)?,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// Filtered, paginated post listing with author, tags and comments
    /// attached.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn list(
        &self,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<Paginated<Post>, ApiError> {
        self.engine.fetch_page(db, params).await
    }

    /// Same filters as [`list`](Self::list), without pagination.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn list_for_export(
        &self,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<Vec<Post>, ApiError> {
        self.engine.fetch_all(db, params).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the post does not exist.
    pub async fn get(&self, db: &DatabaseConnection, id: i32) -> Result<Post, ApiError> {
        let model = post::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::not_found("Post", Some(id.to_string())))?;
        let mut posts = Post::from_models(db, vec![model], None)
            .await
            .map_err(ApiError::database)?;
        posts
            .pop()
            .ok_or_else(|| ApiError::internal("Post materialization produced no rows", None))
    }

    /// Create a post and sync its tag set in one transaction.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn create(&self, db: &DatabaseConnection, input: PostInput) -> Result<Post, ApiError> {
        let PostInput {
            title,
            content,
            status,
            author_id,
            published_at,
            image,
            tags,
        } = input;

        let txn = db.begin().await.map_err(ApiError::database)?;
        let now = Utc::now().naive_utc();
        let model = post::ActiveModel {
            title: Set(title),
            content: Set(content),
            status: Set(status),
            author_id: Set(author_id),
            published_at: Set(published_at),
            image: Set(image),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = model.insert(&txn).await.map_err(ApiError::database)?;
        if let Some(tag_ids) = tags {
            sync_tags(&txn, model.id, &tag_ids)
                .await
                .map_err(ApiError::database)?;
        }
        txn.commit().await.map_err(ApiError::database)?;

        self.get(db, model.id).await
    }

    /// Update a post and, when tag ids are supplied, replace its tag set in
    /// the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the post does not exist.
    pub async fn update(
        &self,
        db: &DatabaseConnection,
        id: i32,
        input: PostInput,
    ) -> Result<Post, ApiError> {
        let PostInput {
            title,
            content,
            status,
            author_id,
            published_at,
            image,
            tags,
        } = input;

        let txn = db.begin().await.map_err(ApiError::database)?;
        let model = post::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::not_found("Post", Some(id.to_string())))?;

        let mut active = model.into_active_model();
        active.title = Set(title);
        active.content = Set(content);
        active.status = Set(status);
        active.author_id = Set(author_id);
        active.published_at = Set(published_at);
        if let Some(image) = image {
            active.image = Set(Some(image));
        }
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&txn).await.map_err(ApiError::database)?;

        if let Some(tag_ids) = tags {
            sync_tags(&txn, id, &tag_ids)
                .await
                .map_err(ApiError::database)?;
        }
        txn.commit().await.map_err(ApiError::database)?;

        self.get(db, id).await
    }

    /// Delete a post along with its comments and tag links.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the post does not exist.
    pub async fn delete(&self, db: &DatabaseConnection, id: i32) -> Result<(), ApiError> {
        let txn = db.begin().await.map_err(ApiError::database)?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;
        comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;
        let result = post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ApiError::database)?;
        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Post", Some(id.to_string())));
        }
        txn.commit().await.map_err(ApiError::database)?;
        Ok(())
    }

    /// Clear the stored image path. Deleting the stored bytes is the file
    /// storage layer's job.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the post does not exist or has no
    /// image.
    pub async fn remove_image(&self, db: &DatabaseConnection, id: i32) -> Result<Post, ApiError> {
        let model = post::Entity::find_by_id(id)
            .one(db)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::not_found("Post", Some(id.to_string())))?;
        if model.image.is_none() {
            return Err(ApiError::not_found("Post image", Some(id.to_string())));
        }

        let mut active = model.into_active_model();
        active.image = Set(None);
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(db).await.map_err(ApiError::database)?;

        self.get(db, id).await
    }
}

/// Replace the pivot rows for a post with the given tag set.
async fn sync_tags<C: ConnectionTrait>(db: &C, post_id: i32, tag_ids: &[i32]) -> Result<(), DbErr> {
    post_tag::Entity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(db)
        .await?;

    let mut ids = tag_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let rows: Vec<post_tag::ActiveModel> = ids
        .into_iter()
        .map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        })
        .collect();
    post_tag::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}
