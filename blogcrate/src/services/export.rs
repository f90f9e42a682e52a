//! Export support for post listings.
//!
//! Produces the filename, heading row and mapped data rows for a filtered,
//! unpaginated export. Rendering the actual spreadsheet is left to the
//! caller's export tooling.

use chrono::{NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

use super::post::{Post, PostService};
use crate::errors::ApiError;
use crate::models::ListParams;

/// Column headings, in row order.
pub const POST_EXPORT_HEADINGS: [&str; 7] = [
    "Sl No",
    "Title",
    "Content",
    "Author",
    "Status",
    "Published At",
    "Comments Count",
];

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PostExportRow {
    pub serial: u64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub status: String,
    pub published_at: Option<String>,
    pub comments_count: u64,
}

/// A complete export: filename, headings and rows.
#[derive(Debug, Clone, Serialize)]
pub struct PostsExport {
    pub filename: String,
    pub headings: &'static [&'static str],
    pub rows: Vec<PostExportRow>,
}

/// Export operations.
pub struct ExportService;

impl ExportService {
    /// Export posts matching the given filters. Applies the same filter map
    /// as the listing, without pagination.
    ///
    /// # Errors
    ///
    /// Data-store errors propagate as [`ApiError::Database`].
    pub async fn export_posts(
        posts: &PostService,
        db: &DatabaseConnection,
        params: &ListParams,
    ) -> Result<PostsExport, ApiError> {
        let data = posts.list_for_export(db, params).await?;
        Ok(PostsExport {
            filename: export_filename("posts", Utc::now().naive_utc()),
            headings: &POST_EXPORT_HEADINGS,
            rows: rows_from_posts(&data),
        })
    }
}

/// Standardized export filename: `{prefix}_{Y-m-d_H-i-s}.xlsx`.
#[must_use]
pub fn export_filename(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}.xlsx", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Map posts to export rows, numbering serially from 1.
#[must_use]
pub fn rows_from_posts(posts: &[Post]) -> Vec<PostExportRow> {
    posts
        .iter()
        .enumerate()
        .map(|(position, post)| PostExportRow {
            serial: position as u64 + 1,
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author.clone().unwrap_or_default(),
            status: post.status.clone(),
            published_at: post
                .published_at
                .map(|at| at.format("%d/%m/%Y %I:%M %p").to_string()),
            comments_count: post.comments_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_post(id: i32, title: &str, author: Option<&str>) -> Post {
        let stamp = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        Post {
            id,
            title: title.to_string(),
            content: "body".to_string(),
            status: "Active".to_string(),
            author_id: 1,
            author: author.map(String::from),
            published_at: Some(stamp),
            image: None,
            tags: Vec::new(),
            comments: Vec::new(),
            comments_count: 3,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn test_export_filename_format() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap();
        assert_eq!(export_filename("posts", at), "posts_2024-01-10_14-30-05.xlsx");
    }

    #[test]
    fn test_rows_are_serially_numbered() {
        let posts = vec![
            sample_post(1, "First", Some("Alice")),
            sample_post(2, "Second", None),
        ];
        let rows = rows_from_posts(&posts);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].serial, 1);
        assert_eq!(rows[1].serial, 2);
        assert_eq!(rows[0].author, "Alice");
        assert_eq!(rows[1].author, "");
    }

    #[test]
    fn test_published_at_rendering() {
        let rows = rows_from_posts(&[sample_post(1, "First", Some("Alice"))]);
        assert_eq!(rows[0].published_at.as_deref(), Some("10/01/2024 02:30 PM"));
    }
}
