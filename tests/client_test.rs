//! Listing, search and action tests against wiremock servers

mod common;

use common::{fixture, mock_client, signed_in_client};
use v2ex_explore::crawler::search::SearchQuery;
use v2ex_explore::models::{DailyOutcome, NodeRef, SearchSort};
use v2ex_explore::utils::error::ClientError;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

struct NoCookie;

impl Match for NoCookie {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("cookie")
    }
}

fn html(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(fixture(name))
}

#[tokio::test]
async fn test_tab_topics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("tab", "tech"))
        .respond_with(html("tab_tech.html"))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let topics = client.tab_topics("tech").await.unwrap();

    assert_eq!(topics.len(), 4);
    assert_eq!(topics[1].node, NodeRef::new("qna", "问与答"));
    assert_eq!(topics[1].link, format!("{}/t/1001002", server.uri()));
}

#[tokio::test]
async fn test_tab_requiring_signin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("tab", "members"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/signin"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let err = client.tab_topics("members").await.unwrap_err();
    assert!(err.is_login_required());
}

#[tokio::test]
async fn test_node_topics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/go/rust"))
        .respond_with(html("go_rust.html"))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let listing = client.node_topics("rust").await.unwrap();

    assert_eq!(listing.node.title, "Rust");
    assert_eq!(listing.topics.len(), 2);
}

#[tokio::test]
async fn test_all_nodes_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/planes"))
        .respond_with(html("planes.html"))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let first = client.all_nodes().await.unwrap();
    let second = client.all_nodes().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_collected_nodes_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/my/nodes"))
        .and(header("cookie", "A2=valid"))
        .respond_with(html("my_nodes.html"))
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let nodes = client.collected_nodes().await.unwrap();
    assert_eq!(nodes[0], NodeRef::new("rust", "Rust"));
}

#[tokio::test]
async fn test_search_goes_to_external_api_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "tokio"))
        .and(query_param("sort", "created"))
        .and(query_param("from", "10"))
        .and(query_param("size", "5"))
        .and(NoCookie)
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"took": 2, "total": 1, "hits": [{"_source": {"id": 555, "member": "dave", "title": "tokio tips", "content": "...", "replies": 9, "created": "2024-02-02T12:00:00"}}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let hits = client
        .search(SearchQuery {
            q: "tokio",
            sort: SearchSort::Created,
            from: 10,
            size: 5,
        })
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 555);
    assert_eq!(hits[0].member, "dave");
}

#[tokio::test]
async fn test_post_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t/5"))
        .and(body_string_contains("content=nice+post"))
        .and(body_string_contains("once=50321"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    client.post_reply(5, "nice post", "50321").await.unwrap();
}

#[tokio::test]
async fn test_thank_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/thank/reply/90000001"))
        .and(query_param("once", "50321"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"success": true, "once": 50322}"#),
        )
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let response = client.thank_reply("90000001", "50321").await.unwrap();

    assert!(response.success);
    assert_eq!(response.once.as_deref(), Some("50322"));
}

#[tokio::test]
async fn test_thank_reply_rejects_non_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/thank/reply/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let err = client.thank_reply("1", "2").await.unwrap_err();
    assert!(matches!(err, ClientError::Json(_)));
}

#[tokio::test]
async fn test_thank_topic_with_page_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thank/topic/3000001"))
        .and(query_param("once", "50321"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    let response = client.thank_topic(3_000_001, "50321").await.unwrap();

    assert!(response.success);
    assert_eq!(response.once, None);
}

#[tokio::test]
async fn test_set_collected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favorite/topic/3000001"))
        .and(query_param("t", "zxcvbnm0123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/unfavorite/topic/3000001"))
        .and(query_param("t", "zxcvbnm0123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    client.set_collected(3_000_001, true, "zxcvbnm0123").await.unwrap();
    client.set_collected(3_000_001, false, "zxcvbnm0123").await.unwrap();
}

#[tokio::test]
async fn test_daily_checkin_redeems() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mission/daily"))
        .respond_with(html("mission_daily.html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mission/daily/redeem"))
        .and(query_param("once", "61208"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<div class=\"message\">已成功领取每日登录奖励</div>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    assert_eq!(client.daily_checkin().await.unwrap(), DailyOutcome::Redeemed);
}

#[tokio::test]
async fn test_daily_checkin_already_redeemed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mission/daily"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<span class=\"gray\">每日登录奖励已领取</span>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mission/daily/redeem"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = signed_in_client(&server.uri(), "A2=valid");
    assert_eq!(
        client.daily_checkin().await.unwrap(),
        DailyOutcome::AlreadyRedeemed
    );
}

#[tokio::test]
async fn test_daily_checkin_without_redeem_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mission/daily"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    assert_eq!(client.daily_checkin().await.unwrap(), DailyOutcome::Failed);
}
