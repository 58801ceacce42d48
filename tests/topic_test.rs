//! Topic detail tests: access classification, reply pagination and the
//! unread-notice side check, against wiremock servers

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fixture, mock_client, mock_config, reply_page, signed_in_client, RecordingNotifier};
use v2ex_explore::crawler::topic::MAX_REPLY_PAGES;
use v2ex_explore::crawler::V2exClient;
use v2ex_explore::notifications::Notice;
use v2ex_explore::session::{JsonFileStore, Session};
use v2ex_explore::utils::error::{AccessError, ClientError};
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOPIC_ID: u64 = 3_000_001;

async fn mount_page(server: &MockServer, id: u64, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/t/{id}")))
        .and(query_param("p", page.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, id: u64, location: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/t/{id}")))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", location))
        .mount(server)
        .await;
}

async fn mount_landing(server: &MockServer, landing: &str) {
    Mock::given(method("GET"))
        .and(path(landing))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(server)
        .await;
}

fn floors(client_result: &v2ex_explore::models::TopicDetail) -> Vec<String> {
    client_result.replies.iter().map(|r| r.floor.clone()).collect()
}

fn expected_floors(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
    range.map(|f| f.to_string()).collect()
}

/// Two-page fixture: 20 + 5 replies, declared 20
#[tokio::test]
async fn test_two_page_topic_merges_replies() {
    let server = MockServer::start().await;
    mount_page(&server, TOPIC_ID, 1, ResponseTemplate::new(200).set_body_string(fixture("topic_page1.html"))).await;
    mount_page(&server, TOPIC_ID, 2, ResponseTemplate::new(200).set_body_string(fixture("topic_page2.html"))).await;

    let client = mock_client(&server.uri());
    let detail = client.topic_detail(TOPIC_ID).await.unwrap();

    assert_eq!(detail.replies.len(), 25);
    assert_eq!(floors(&detail), expected_floors(1..=25));
    assert_eq!(detail.reply_count, 25);
    assert_eq!(detail.title, "有哪些值得一读的 Rust 项目源码？");
}

/// Later pages finish out of order; replies still follow page order
#[tokio::test]
async fn test_reply_order_under_page_latency() {
    let server = MockServer::start().await;
    let id = 42;

    mount_page(&server, id, 1, ResponseTemplate::new(200).set_body_string(reply_page(1..=10, 40, 4))).await;
    mount_page(
        &server,
        id,
        2,
        ResponseTemplate::new(200)
            .set_body_string(reply_page(11..=20, 40, 4))
            .set_delay(Duration::from_millis(600)),
    )
    .await;
    mount_page(
        &server,
        id,
        3,
        ResponseTemplate::new(200)
            .set_body_string(reply_page(21..=30, 40, 4))
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_page(&server, id, 4, ResponseTemplate::new(200).set_body_string(reply_page(31..=35, 40, 4))).await;

    let client = mock_client(&server.uri());
    let detail = client.topic_detail(id).await.unwrap();

    assert_eq!(floors(&detail), expected_floors(1..=35));
    // Declared count is larger than what was merged and is kept
    assert_eq!(detail.reply_count, 40);
}

/// A failed middle page keeps only the pages before it
#[tokio::test]
async fn test_failed_page_truncates_reply_stream() {
    let server = MockServer::start().await;
    let id = 43;

    mount_page(&server, id, 1, ResponseTemplate::new(200).set_body_string(reply_page(1..=10, 10, 4))).await;
    mount_page(&server, id, 2, ResponseTemplate::new(200).set_body_string(reply_page(11..=20, 10, 4))).await;
    mount_page(&server, id, 3, ResponseTemplate::new(500)).await;
    mount_page(&server, id, 4, ResponseTemplate::new(200).set_body_string(reply_page(31..=35, 10, 4))).await;

    let client = mock_client(&server.uri());
    let detail = client.topic_detail(id).await.unwrap();

    assert_eq!(floors(&detail), expected_floors(1..=20));
    assert_eq!(detail.reply_count, 20);
}

/// Single-page topic whose header undercounts its replies
#[tokio::test]
async fn test_single_page_reply_count_covers_parsed_replies() {
    let server = MockServer::start().await;
    mount_page(&server, 5, 1, ResponseTemplate::new(200).set_body_string(reply_page(1..=5, 3, 1))).await;

    let client = mock_client(&server.uri());
    let detail = client.topic_detail(5).await.unwrap();

    assert_eq!(detail.replies.len(), 5);
    assert_eq!(detail.reply_count, 5);
}

/// An oversized pager label is clamped before the fan-out
#[tokio::test]
async fn test_pager_label_is_clamped() {
    let server = MockServer::start().await;
    let id = 44;
    let first_page = reply_page(1..=2, 2, 2).replace(
        r#"class="page_normal">2<"#,
        r#"class="page_normal">99999<"#,
    );

    Mock::given(method("GET"))
        .and(path(format!("/t/{id}")))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(first_page))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/t/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(u64::from(MAX_REPLY_PAGES - 1))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let detail = client.topic_detail(id).await.unwrap();

    assert_eq!(floors(&detail), expected_floors(1..=2));
}

/// Redirect to sign-in is LoginRequired and drops the stored credential
#[tokio::test]
async fn test_signin_redirect_clears_credential() {
    let server = MockServer::start().await;
    mount_redirect(&server, 7, "/signin?next=/t/7").await;
    mount_landing(&server, "/signin").await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("session.json");
    let session = Session::open(JsonFileStore::new(&state_path)).unwrap();
    session.set_credential("A2=stale").unwrap();

    let client = V2exClient::new(&mock_config(&server.uri()), Arc::new(session)).unwrap();
    let err = client.topic_detail(7).await.unwrap_err();

    assert!(err.is_login_required(), "got {err:?}");
    assert_eq!(client.session().credential(), None);

    // Cleared state is persisted too
    let reopened = Session::open(JsonFileStore::new(&state_path)).unwrap();
    assert_eq!(reopened.credential(), None);
}

/// Redirect to the front page while signed in is AccessDenied
#[tokio::test]
async fn test_root_redirect_with_credential_is_access_denied() {
    let server = MockServer::start().await;
    mount_redirect(&server, 8, "/").await;
    mount_landing(&server, "/").await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let err = client.topic_detail(8).await.unwrap_err();

    assert_eq!(err.access(), Some(&AccessError::AccessDenied));
    assert_eq!(client.session().credential().as_deref(), Some("A2=valid"));
}

/// Redirect to the front page while signed out asks for a sign-in
#[tokio::test]
async fn test_root_redirect_without_credential_is_login_required() {
    let server = MockServer::start().await;
    mount_redirect(&server, 9, "/").await;
    mount_landing(&server, "/").await;

    let client = mock_client(&server.uri());
    let err = client.topic_detail(9).await.unwrap_err();
    assert!(err.is_login_required());
}

#[tokio::test]
async fn test_restricted_and_unknown_redirects() {
    let server = MockServer::start().await;
    mount_redirect(&server, 10, "/restricted").await;
    mount_landing(&server, "/restricted").await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let err = client.topic_detail(10).await.unwrap_err();
    assert_eq!(err.access(), Some(&AccessError::AccountRestricted));

    let server = MockServer::start().await;
    mount_redirect(&server, 11, "/2fa").await;
    mount_landing(&server, "/2fa").await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let err = client.topic_detail(11).await.unwrap_err();
    assert_eq!(
        err.access(),
        Some(&AccessError::UnknownError {
            path: "/2fa".to_string()
        })
    );
}

/// Page-1 transport failures are returned as they are
#[tokio::test]
async fn test_first_page_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, 12, 1, ResponseTemplate::new(502)).await;

    let client = mock_client(&server.uri());
    let err = client.topic_detail(12).await.unwrap_err();
    assert!(matches!(err, ClientError::Fetch(_)), "got {err:?}");
}

/// Unread count in the title is surfaced once per cooldown
#[tokio::test]
async fn test_unread_notice_respects_cooldown() {
    let server = MockServer::start().await;
    mount_page(&server, TOPIC_ID, 1, ResponseTemplate::new(200).set_body_string(fixture("topic_page1.html"))).await;
    mount_page(&server, TOPIC_ID, 2, ResponseTemplate::new(200).set_body_string(fixture("topic_page2.html"))).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let client = mock_client(&server.uri()).with_notifier(notifier.clone());

    client.topic_detail(TOPIC_ID).await.unwrap();
    assert_eq!(notifier.notices(), vec![Notice::UnreadMessages { count: 3 }]);
    assert!(client.session().last_notice_at().is_some());

    client.topic_detail(TOPIC_ID).await.unwrap();
    assert_eq!(notifier.notices().len(), 1);
}

/// Blank credential is rejected without any request
#[tokio::test]
async fn test_check_blank_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    assert!(!client.check_credential("").await.unwrap());
    assert!(!client.check_credential("  \n").await.unwrap());
}

#[tokio::test]
async fn test_check_credential_valid_and_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .and(wiremock::matchers::header("cookie", "A2=good"))
        .respond_with(ResponseTemplate::new(200).set_body_string("settings"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .and(wiremock::matchers::header("cookie", "A2=bad"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/signin"))
        .mount(&server)
        .await;
    mount_landing(&server, "/signin").await;

    let client = mock_client(&server.uri());
    assert!(client.check_credential("Cookie: A2=good").await.unwrap());
    assert!(!client.check_credential("A2=bad").await.unwrap());
    // Probing never stores anything
    assert_eq!(client.session().credential(), None);
}
