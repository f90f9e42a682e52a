// Comment listing, creation and owner-scoped deletion.

mod common;

use blogcrate::ApiError;
use blogcrate::models::ListParams;
use blogcrate::services::{CommentInput, CommentService};
use common::{seed_blog, setup_test_db};

#[tokio::test]
async fn comments_list_newest_first_with_author_names() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");

    let page = CommentService::list_for_post(&db, 1, &ListParams::default())
        .await
        .expect("list");
    assert_eq!(page.meta.total, 2);
    let ids: Vec<i32> = page.data.iter().map(|comment| comment.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(page.data[0].author.as_deref(), Some("Bob"));
    assert_eq!(page.data[1].author.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn comments_paginate() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");

    let params = ListParams {
        per_page: Some(1),
        page: Some(2),
        ..Default::default()
    };
    let page = CommentService::list_for_post(&db, 1, &params)
        .await
        .expect("list");
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, 2);
    assert_eq!(page.meta.last_page, 2);
}

#[tokio::test]
async fn create_stamps_the_acting_user() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");

    let comment = CommentService::create(
        &db,
        CommentInput {
            post_id: 1,
            content: "Bookmarked".to_string(),
        },
        2,
    )
    .await
    .expect("create");
    assert_eq!(comment.created_by, 2);
    assert_eq!(comment.author.as_deref(), Some("Bob"));
    assert_eq!(comment.post_id, 1);

    let page = CommentService::list_for_post(&db, 1, &ListParams::default())
        .await
        .expect("list");
    assert_eq!(page.meta.total, 3);
}

#[tokio::test]
async fn delete_requires_ownership() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");

    // Comment 1 belongs to user 2; user 3 cannot delete it and cannot tell
    // it exists.
    let err = CommentService::delete(&db, 1, 3)
        .await
        .expect_err("foreign comment");
    assert!(matches!(err, ApiError::NotFound { .. }));

    let page = CommentService::list_for_post(&db, 1, &ListParams::default())
        .await
        .expect("list");
    assert_eq!(page.meta.total, 2);

    CommentService::delete(&db, 1, 2).await.expect("own comment");
    let page = CommentService::list_for_post(&db, 1, &ListParams::default())
        .await
        .expect("list");
    assert_eq!(page.meta.total, 1);
}
