//! Comments on posts: listing, creation, owner-scoped deletion.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{comment, user};
use crate::errors::ApiError;
use crate::models::{ListParams, Paginated};

const DEFAULT_PER_PAGE: u64 = 15;

/// A comment with its author's name attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentOut {
    pub id: i32,
    pub post_id: i32,
    pub content: String,
    pub created_by: i32,
    pub author: Option<String>,
    pub created_at: NaiveDateTime,
}

impl CommentOut {
    fn from_model(model: comment::Model, author: Option<user::Model>) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            content: model.content,
            created_by: model.created_by,
            author: author.map(|user| user.name),
            created_at: model.created_at,
        }
    }
}

/// Validated input for creating a comment; the acting user is passed
/// separately and never taken from the payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentInput {
    pub post_id: i32,
    pub content: String,
}

/// Comment operations.
pub struct CommentService;

impl CommentService {
    /// Comments for one post, newest first.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn list_for_post(
        db: &DatabaseConnection,
        post_id: i32,
        params: &ListParams,
    ) -> Result<Paginated<CommentOut>, ApiError> {
        let query = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by(comment::Column::CreatedAt, Order::Desc);
        let total = PaginatorTrait::count(query.clone(), db)
            .await
            .map_err(ApiError::database)?;

        let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
        let page = params.page.unwrap_or(1).max(1);
        let models = query
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(db)
            .await
            .map_err(ApiError::database)?;

        let authors = models
            .load_one(user::Entity, db)
            .await
            .map_err(ApiError::database)?;
        let data = models
            .into_iter()
            .zip(authors)
            .map(|(model, author)| CommentOut::from_model(model, author))
            .collect();
        Ok(Paginated::new(data, page, per_page, total))
    }

    /// Create a comment, stamping the acting user as its author.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn create(
        db: &DatabaseConnection,
        input: CommentInput,
        user_id: i32,
    ) -> Result<CommentOut, ApiError> {
        let txn = db.begin().await.map_err(ApiError::database)?;
        let now = Utc::now().naive_utc();
        let model = comment::ActiveModel {
            post_id: Set(input.post_id),
            content: Set(input.content),
            created_by: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = model.insert(&txn).await.map_err(ApiError::database)?;
        txn.commit().await.map_err(ApiError::database)?;

        let author = user::Entity::find_by_id(user_id)
            .one(db)
            .await
            .map_err(ApiError::database)?;
        Ok(CommentOut::from_model(model, author))
    }

    /// Delete a comment, but only when the acting user wrote it. A comment
    /// owned by someone else is indistinguishable from a missing one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no owned comment matched.
    pub async fn delete(db: &DatabaseConnection, id: i32, user_id: i32) -> Result<(), ApiError> {
        let result = comment::Entity::delete_many()
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::CreatedBy.eq(user_id))
            .exec(db)
            .await
            .map_err(ApiError::database)?;
        if result.rows_affected == 0 {
            return Err(ApiError::not_found("Comment", Some(id.to_string())));
        }
        Ok(())
    }
}
