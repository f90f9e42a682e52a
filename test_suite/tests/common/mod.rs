use blogcrate::entities::{comment, post, post_tag, tag, user};
use blogcrate::models::{FilterValue, ListParams};
use blogcrate::services::Post;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};

/// Fresh in-memory SQLite database with the blog schema applied.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let ddl = [
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE
        )",
        "CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            status TEXT NOT NULL,
            author_id INTEGER NOT NULL,
            published_at TEXT NULL,
            image TEXT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE TABLE comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            post_id INTEGER NOT NULL,
            content TEXT NOT NULL,
            created_by INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE TABLE tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            name TEXT NOT NULL
        )",
        "CREATE TABLE post_tags (
            post_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, tag_id)
        )",
    ];
    for statement in ddl {
        db.execute_unprepared(statement).await?;
    }
    Ok(db)
}

#[allow(dead_code)]
pub fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn user_row(id: i32, name: &str, email: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
    }
}

fn tag_row(id: i32, name: &str) -> tag::ActiveModel {
    tag::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
    }
}

fn post_row(
    id: i32,
    title: &str,
    content: &str,
    status: &str,
    author_id: i32,
    published_at: Option<NaiveDateTime>,
) -> post::ActiveModel {
    let stamp = dt(2024, 1, 1, 0, 0);
    post::ActiveModel {
        id: Set(id),
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        status: Set(status.to_string()),
        author_id: Set(author_id),
        published_at: Set(published_at),
        image: Set(None),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
}

fn comment_row(
    id: i32,
    post_id: i32,
    content: &str,
    created_by: i32,
    created_at: NaiveDateTime,
) -> comment::ActiveModel {
    comment::ActiveModel {
        id: Set(id),
        post_id: Set(post_id),
        content: Set(content.to_string()),
        created_by: Set(created_by),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
}

/// Seed the shared fixture:
///
/// | post | status   | author | published  | tags           |
/// |------|----------|--------|------------|----------------|
/// | 1    | Active   | Alice  | 2024-01-10 | rust, web      |
/// | 2    | Active   | Bob    | 2023-12-30 | async, tooling |
/// | 3    | Inactive | Alice  | 2024-02-01 | web, database  |
/// | 4    | Active   | Carol  | 2024-03-15 | database       |
/// | 5    | Active   | Bob    | 2024-02-20 | tooling        |
/// | 6    | Active   | Alice  | (draft)    | web            |
///
/// Posts 1 and 2 each carry two comments whose insertion order differs from
/// their chronological order.
#[allow(dead_code)]
pub async fn seed_blog(db: &DatabaseConnection) -> Result<(), DbErr> {
    user::Entity::insert_many(vec![
        user_row(1, "Alice", "alice@example.com"),
        user_row(2, "Bob", "bob@example.com"),
        user_row(3, "Carol", "carol@example.com"),
    ])
    .exec(db)
    .await?;

    tag::Entity::insert_many(vec![
        tag_row(1, "rust"),
        tag_row(2, "web"),
        tag_row(3, "database"),
        tag_row(4, "async"),
        tag_row(5, "tooling"),
    ])
    .exec(db)
    .await?;

    post::Entity::insert_many(vec![
        post_row(
            1,
            "Rust ownership explained",
            "Borrowing and lifetimes in practice",
            "Active",
            1,
            Some(dt(2024, 1, 10, 9, 0)),
        ),
        post_row(
            2,
            "Async patterns",
            "Streams and executors",
            "Active",
            2,
            Some(dt(2023, 12, 30, 8, 0)),
        ),
        post_row(
            3,
            "Database indexing",
            "Covering indexes for reads",
            "Inactive",
            1,
            Some(dt(2024, 2, 1, 12, 0)),
        ),
        post_row(
            4,
            "Web security basics",
            "Escaping output",
            "Active",
            3,
            Some(dt(2024, 3, 15, 10, 0)),
        ),
        post_row(
            5,
            "Tooling roundup",
            "Linters and formatters",
            "Active",
            2,
            Some(dt(2024, 2, 20, 16, 0)),
        ),
        post_row(6, "Ownership quiz", "Practice questions", "Active", 1, None),
    ])
    .exec(db)
    .await?;

    let pairs: [(i32, i32); 9] = [
        (1, 1),
        (1, 2),
        (2, 4),
        (2, 5),
        (3, 2),
        (3, 3),
        (4, 3),
        (5, 5),
        (6, 2),
    ];
    post_tag::Entity::insert_many(
        pairs
            .into_iter()
            .map(|(post_id, tag_id)| post_tag::ActiveModel {
                post_id: Set(post_id),
                tag_id: Set(tag_id),
            })
            .collect::<Vec<_>>(),
    )
    .exec(db)
    .await?;

    comment::Entity::insert_many(vec![
        comment_row(1, 1, "Great write-up", 2, dt(2024, 1, 12, 10, 0)),
        comment_row(2, 1, "Cleared things up", 3, dt(2024, 1, 11, 9, 0)),
        comment_row(3, 2, "Needs more examples", 1, dt(2024, 1, 2, 12, 0)),
        comment_row(4, 2, "Solid overview", 3, dt(2024, 1, 1, 8, 0)),
    ])
    .exec(db)
    .await?;

    Ok(())
}

#[allow(dead_code)]
pub fn single(value: &str) -> FilterValue {
    FilterValue::Single(value.to_string())
}

#[allow(dead_code)]
pub fn many(values: &[&str]) -> FilterValue {
    FilterValue::Many(values.iter().map(|value| (*value).to_string()).collect())
}

#[allow(dead_code)]
pub fn filter_params(pairs: &[(&str, FilterValue)]) -> ListParams {
    let mut params = ListParams::default();
    for (key, value) in pairs {
        params.filters.insert((*key).to_string(), value.clone());
    }
    params
}

#[allow(dead_code)]
pub fn ids(posts: &[Post]) -> Vec<i32> {
    posts.iter().map(|post| post.id).collect()
}
