//! Tests for the article store.

mod common;

use std::{sync::Arc, time::Duration};

use common::{ids, store_for, words, Fault, FakeBlogServer};
use hospital_blog_client::{
    ArticleFilter, CacheKey, LoadState, RequestError, StatusFilter, ViewMode,
};
use hospital_blog_shared::{ArticleDraft, ArticleStatus, TagRef};
use reqwest::Method;
use serde_json::json;

fn hospital_posts() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id": "1",
            "title": "Living with Diabetes",
            "excerpt": "Daily care tips",
            "body": words(400),
            "status": "published",
            "tags": ["Endocrinology"],
            "published_at": "2025-03-05T10:00:00Z"
        }),
        json!({
            "id": "2",
            "title": "Visiting hours",
            "excerpt": "Updated policy",
            "body": "Short note",
            "status": "draft",
            "tags": [],
            "updated_at": "2025-02-01T00:00:00Z"
        }),
        json!({
            "id": "3",
            "title": "Heart checkups",
            "excerpt": "What diabetes means for your heart",
            "body": words(650),
            "status": "published",
            "tags": ["Cardiology"],
            "published_at": "2025-04-01T08:00:00Z"
        }),
    ]
}

#[tokio::test(start_paused = true)]
async fn load_all_derives_fields_newest_first() {
    let server = FakeBlogServer::with_posts(vec![json!({
        "id": "1",
        "title": "A",
        "body": words(400),
        "tags": []
    })]);
    let (mut store, _clock) = store_for(&server);

    store.load_all().await.expect("load");

    let articles = store.articles();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].reading_time_minutes, 2);
    assert_eq!(articles[0].category, "General");
    assert_eq!(articles[0].publish_date_label, "Draft");
    assert_eq!(store.load_state(), LoadState::Ready);

    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");
    assert_eq!(ids(&store), vec!["3", "1", "2"]);
    assert_eq!(store.articles()[0].reading_time_minutes, 4);
    assert_eq!(store.articles()[1].publish_date_label, "March 5, 2025");
}

#[tokio::test(start_paused = true)]
async fn load_all_is_served_from_cache_until_ttl() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, clock) = store_for(&server);

    store.load_all().await.expect("first load");
    store.load_all().await.expect("cached load");
    assert_eq!(server.requests(Method::GET, "/posts").len(), 1);

    clock.advance(Duration::from_secs(5 * 60));
    store.load_all().await.expect("refetch");
    assert_eq!(server.requests(Method::GET, "/posts").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_stale_list() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, clock) = store_for(&server);
    store.load_all().await.expect("load");

    clock.advance(Duration::from_secs(301));
    server.fail_next(Method::GET, Fault::Status(404));
    let err = store.load_all().await.expect_err("refresh fails");

    assert_eq!(
        err,
        RequestError::HttpError {
            status: 404
        }
    );
    assert_eq!(store.articles().len(), 3);
    assert_eq!(store.load_state(), LoadState::Ready);
    assert!(store
        .error()
        .is_some_and(|message| message.starts_with("Failed to load articles")));

    store.dismiss_error();
    assert_eq!(store.error(), None);
}

#[tokio::test(start_paused = true)]
async fn transient_server_errors_are_retried() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    server.fail_next(Method::GET, Fault::Status(500));
    server.fail_next(Method::GET, Fault::Network);
    let (mut store, _clock) = store_for(&server);

    store.load_all().await.expect("third attempt succeeds");
    assert_eq!(server.requests(Method::GET, "/posts").len(), 3);
    assert_eq!(store.articles().len(), 3);
    assert_eq!(store.error(), None);
}

#[tokio::test(start_paused = true)]
async fn delete_removes_article_after_confirmation() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");
    store.load_one("1").await.expect("load one");
    assert!(store.cache().post("1").is_some());

    store.delete("1").await.expect("delete");

    assert_eq!(ids(&store), vec!["3", "2"]);
    assert_eq!(store.cache().get(&CacheKey::Posts), None);
    assert!(store.cache().post("1").is_none());

    store.load_all().await.expect("reload");
    assert_eq!(server.requests(Method::GET, "/posts").len(), 2);
    assert_eq!(ids(&store), vec!["3", "2"]);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_resynchronizes_with_server() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");

    // Another editor removed post 2 meanwhile.
    server.remove_post("2");
    server.fail_next(Method::DELETE, Fault::Status(403));
    let err = store.delete("1").await.expect_err("forbidden");

    assert_eq!(err.status(), Some(403));
    assert!(store
        .error()
        .is_some_and(|message| message.starts_with("Failed to delete article")));
    assert_eq!(ids(&store), vec!["3", "1"]);
    assert_eq!(server.requests(Method::GET, "/posts").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_delete_message_survives_failed_resync() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");

    server.fail_next(Method::DELETE, Fault::Status(403));
    server.fail_next(Method::GET, Fault::Status(400));
    let err = store.delete("1").await.expect_err("forbidden");

    assert_eq!(err.status(), Some(403));
    assert!(store
        .error()
        .is_some_and(|message| message.starts_with("Failed to delete article")));
    assert_eq!(server.requests(Method::GET, "/posts").len(), 2);
    assert_eq!(ids(&store), vec!["3", "1", "2"]);
}

#[tokio::test(start_paused = true)]
async fn save_creates_post_and_returns_to_listing() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");
    store.begin_create();

    let draft = ArticleDraft {
        title: "Flu vaccine clinic".to_string(),
        excerpt: "Walk-in hours".to_string(),
        content: "Bring your card.".to_string(),
        tags: vec![
            TagRef::from("Immunology"),
            TagRef::Object {
                name: "Clinics".to_string(),
            },
        ],
        images: vec!["/uploads/flu.png".to_string()],
        ..ArticleDraft::default()
    };
    store.save(draft).await.expect("save");

    let posted = server.requests(Method::POST, "/posts");
    assert_eq!(posted.len(), 1);
    assert_eq!(
        posted[0].body,
        Some(json!({
            "title": "Flu vaccine clinic",
            "excerpt": "Walk-in hours",
            "body": "Bring your card.",
            "cover_image": "/uploads/flu.png",
            "tags": ["Immunology", "Clinics"],
            "author_id": "1",
            "status": "draft"
        }))
    );
    assert_eq!(store.mode(), &ViewMode::Listing);
    assert!(ids(&store).contains(&"100".to_string()));
    assert_eq!(server.requests(Method::GET, "/posts").len(), 2);
}

#[tokio::test(start_paused = true)]
async fn publish_updates_existing_post() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");

    store.load_one("2").await.expect("load one");
    let ViewMode::Editing(mut draft) = store.mode().clone() else {
        panic!("load_one should open the editor");
    };
    assert_eq!(draft.id.as_deref(), Some("2"));
    draft.title = "Visiting hours (updated)".to_string();

    store.publish(draft).await.expect("publish");

    let put = server.requests(Method::PUT, "/posts/2");
    assert_eq!(put.len(), 1);
    let body = put[0].body.clone().expect("json body");
    assert_eq!(body["status"], "published");
    assert!(body["published_at"].is_string());
    assert!(store.cache().post("2").is_none());

    let updated = store
        .articles()
        .iter()
        .find(|view| view.article.id == "2")
        .cloned()
        .expect("still listed");
    assert_eq!(updated.article.status, ArticleStatus::Published);
    assert_eq!(updated.article.title, "Visiting hours (updated)");
    assert_ne!(updated.publish_date_label, "Draft");
    assert_eq!(store.mode(), &ViewMode::Listing);
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_editor_open() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    server.fail_next(Method::POST, Fault::Status(422));

    let draft = ArticleDraft {
        title: "Unfinished".to_string(),
        ..ArticleDraft::default()
    };
    let err = store.save(draft.clone()).await.expect_err("rejected");

    assert_eq!(err.status(), Some(422));
    assert_eq!(store.mode(), &ViewMode::Editing(draft));
    assert!(store
        .error()
        .is_some_and(|message| message.starts_with("Failed to save article")));
    assert!(server.requests(Method::GET, "/posts").is_empty());
}

#[tokio::test(start_paused = true)]
async fn retry_shows_retrying_indicator() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    server.set_latency(Duration::from_millis(500));
    for _ in 0..3 {
        server.fail_next(Method::GET, Fault::Network);
    }
    let (mut store, _clock) = store_for(&server);

    let err = store.load_all().await.expect_err("all attempts fail");
    assert!(matches!(err, RequestError::MaxRetriesExceeded { attempts: 3, .. }));
    assert_eq!(store.load_state(), LoadState::Idle);
    assert!(store.error().is_some());

    let mut rx = store.subscribe_load_state();
    let (result, seen) = tokio::join!(store.retry(), async {
        rx.changed().await.expect("sender alive");
        *rx.borrow_and_update()
    });

    assert_eq!(seen, LoadState::Retrying);
    result.expect("retry succeeds");
    assert_eq!(store.load_state(), LoadState::Ready);
    assert_eq!(store.error(), None);
    assert_eq!(store.articles().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn unmounted_view_discards_late_results() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    server.set_latency(Duration::from_secs(5));
    let (mut store, _clock) = store_for(&server);
    let handle = store.unmount_handle();

    let (result, ()) = tokio::join!(store.load_all(), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.unmount();
    });

    assert_eq!(result, Err(RequestError::Cancelled));
    assert!(!store.is_live());
    assert!(store.articles().is_empty());
    assert_eq!(store.error(), None);
}

#[tokio::test(start_paused = true)]
async fn committed_save_is_ok_after_unmount() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");
    store.begin_create();
    server.unmount_after(Method::POST, store.unmount_handle());

    let draft = ArticleDraft {
        title: "Blood drive".to_string(),
        ..ArticleDraft::default()
    };
    store.save(draft).await.expect("server accepted the write");

    assert!(!store.is_live());
    assert!(server.post("100").is_some());
    assert_eq!(store.cache().get(&CacheKey::Posts), None);
    assert_eq!(server.requests(Method::GET, "/posts").len(), 1);
    assert_eq!(store.error(), None);
}

#[tokio::test(start_paused = true)]
async fn filtering_stays_local_and_referentially_stable() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);
    store.load_all().await.expect("load");

    store.set_filter(ArticleFilter {
        search_query: "DIABETES".to_string(),
        category: "all".parse().expect("infallible"),
        status: StatusFilter::Only(ArticleStatus::Published),
    });
    let first = store.filtered();
    let matched: Vec<_> = first.iter().map(|view| view.article.id.as_str()).collect();
    assert_eq!(matched, vec!["3", "1"]);

    store.set_search_query("DIABETES");
    assert!(Arc::ptr_eq(&first, &store.filtered()));

    store.set_category_filter("cardiology".parse().expect("infallible"));
    assert_eq!(store.filtered().len(), 1);
    assert!(!Arc::ptr_eq(&first, &store.filtered()));

    assert_eq!(store.categories(), vec!["Cardiology", "Endocrinology", "General"]);
    assert_eq!(server.requests(Method::GET, "/posts").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn load_one_reads_through_cache() {
    let server = FakeBlogServer::with_posts(hospital_posts());
    let (mut store, _clock) = store_for(&server);

    let view = store.load_one("3").await.expect("load one");
    assert_eq!(view.category, "Cardiology");
    store.load_one("3").await.expect("cached");
    assert_eq!(server.requests(Method::GET, "/posts/3").len(), 1);

    let err = store.load_one("404").await.expect_err("missing");
    assert_eq!(err.status(), Some(404));
    assert!(store
        .error()
        .is_some_and(|message| message.starts_with("Failed to load article")));
}
