// Scalar, membership and date filters against the shared fixture.

mod common;

use blogcrate::services::PostService;
use common::{filter_params, ids, many, seed_blog, setup_test_db, single};

#[tokio::test]
async fn scalar_equality_filter() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(&db, &filter_params(&[("status", single("Inactive"))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![3]);
    assert_eq!(page.meta.total, 1);
}

#[tokio::test]
async fn like_filter_matches_substring_case_insensitively() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(&db, &filter_params(&[("title", single("ownership"))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![6, 1]);

    let page = service
        .list(&db, &filter_params(&[("title", single("OWNERSHIP"))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![6, 1]);
}

#[tokio::test]
async fn membership_filter_on_direct_column() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(&db, &filter_params(&[("author_ids", many(&["2", "3"]))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![5, 4, 2]);
}

#[tokio::test]
async fn unknown_keys_are_silently_ignored() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(&db, &filter_params(&[("flavor", single("spicy"))]))
        .await
        .expect("list");
    assert_eq!(page.meta.total, 6);
}

#[tokio::test]
async fn empty_values_are_treated_as_not_provided() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(
            &db,
            &filter_params(&[("status", single("")), ("tag_ids", many(&[]))]),
        )
        .await
        .expect("list");
    assert_eq!(page.meta.total, 6);
}

#[tokio::test]
async fn invalid_values_degrade_gracefully() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    // Non-numeric author ids and an unparseable date both drop their filter
    // instead of failing the request or matching nothing.
    let page = service
        .list(
            &db,
            &filter_params(&[
                ("author_ids", many(&["abc"])),
                ("date_from", single("whenever")),
            ]),
        )
        .await
        .expect("list");
    assert_eq!(page.meta.total, 6);
}

#[tokio::test]
async fn filters_combine_with_and() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(
            &db,
            &filter_params(&[
                ("status", single("Active")),
                ("author_ids", many(&["1"])),
            ]),
        )
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![6, 1]);
}

#[tokio::test]
async fn date_bounds_are_date_only_and_inclusive() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    // Post 1 is published at 09:00 on the boundary day; a date-only >= keeps it.
    let page = service
        .list(&db, &filter_params(&[("date_from", single("2024-01-10"))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![5, 4, 3, 1]);

    let page = service
        .list(&db, &filter_params(&[("date_to", single("2024-01-31"))]))
        .await
        .expect("list");
    assert_eq!(ids(&page.data), vec![2, 1]);
}

#[tokio::test]
async fn drafts_never_match_date_bounds() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let page = service
        .list(&db, &filter_params(&[("date_from", single("2000-01-01"))]))
        .await
        .expect("list");
    // Post 6 has no published_at and is excluded even by a wide-open bound.
    assert!(!ids(&page.data).contains(&6));
    assert_eq!(page.meta.total, 5);
}

#[tokio::test]
async fn repeated_application_is_idempotent() {
    let db = setup_test_db().await.expect("db setup");
    seed_blog(&db).await.expect("seed");
    let service = PostService::new().expect("valid config");

    let params = filter_params(&[("status", single("Active")), ("tag_ids", many(&["2", "5"]))]);
    let first = service.list(&db, &params).await.expect("list");
    let second = service.list(&db, &params).await.expect("list");
    assert_eq!(ids(&first.data), ids(&second.data));
    assert_eq!(first.meta.total, second.meta.total);
}
