use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_reads_without_a_content_type(ctx: &TestContext) {
    ctx.client
        .get("/api/feeds")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_json_among_several_media_types(ctx: &TestContext) {
    ctx.client
        .get_with_content_type("/api/feeds", "text/plain, application/json; charset=utf-8")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_register_feeds_sent_with_several_media_types(ctx: &TestContext) {
    let response = ctx
        .client
        .post_raw(
            "/api/feeds",
            br#"{"URL": "http://example.com/rss"}"#,
            Some("text/plain, application/json"),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let id = response.body.as_ref().unwrap()["ID"].as_str().unwrap().to_string();

    let stored = ctx.fixtures.stored_feeds().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].url, "http://example.com/rss");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_non_json_media_types(ctx: &TestContext) {
    ctx.client
        .get_with_content_type("/api/feeds", "text/plain")
        .await
        .unwrap()
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
        .assert_error_message("Media type (text/plain) not supported");

    ctx.client
        .post_raw("/api/feeds", br#"{"URL": "http://example.com/rss"}"#, Some("text/xml"))
        .await
        .unwrap()
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert_eq!(ctx.fixtures.raw_feed_list().await.unwrap(), None);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unparseable_media_types(ctx: &TestContext) {
    ctx.client
        .get_with_content_type("/api/feeds", "garbage")
        .await
        .unwrap()
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
        .assert_error_message("Media type (garbage) not parseable");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_a_content_type_for_posts(ctx: &TestContext) {
    ctx.client
        .post_raw("/api/feeds", br#"{"URL": "http://example.com/rss"}"#, None)
        .await
        .unwrap()
        .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert_eq!(ctx.fixtures.raw_feed_list().await.unwrap(), None);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_apply_to_health_checks(ctx: &TestContext) {
    ctx.client
        .get_with_content_type("/health", "text/plain")
        .await
        .unwrap()
        .assert_status(StatusCode::OK);
}
