use spell_harvest::config::HttpConfig;
use spell_harvest::{HttpLoader, PageLoader};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn loader() -> HttpLoader {
    HttpLoader::new(&HttpConfig {
        user_agent: "harvest-tests/1.0".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_ok_body_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spells/alarm"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Alarm</p>"))
        .mount(&server)
        .await;

    let body = loader().load(&format!("{}/spells/alarm", server.uri())).await;
    assert_eq!(body, "<p>Alarm</p>");
}

#[tokio::test]
async fn test_not_found_body_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Page not found</h1>"))
        .mount(&server)
        .await;

    let body = loader().load(&format!("{}/spells/missing", server.uri())).await;
    assert_eq!(body, "<h1>Page not found</h1>");
}

#[tokio::test]
async fn test_server_error_yields_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>Internal error</h1>"))
        .mount(&server)
        .await;

    assert!(loader().load(&server.uri()).await.is_empty());
}

#[tokio::test]
async fn test_redirect_target_loaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    assert_eq!(loader().load(&format!("{}/old", server.uri())).await, "moved");
}

#[tokio::test]
async fn test_user_agent_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "harvest-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(loader().load(&server.uri()).await, "hello");
}

#[tokio::test]
async fn test_invalid_utf8_decoded_lossily() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'o', b'k', 0xff, b'!']))
        .mount(&server)
        .await;

    assert_eq!(loader().load(&server.uri()).await, "ok\u{fffd}!");
}

#[tokio::test]
async fn test_malformed_url_yields_empty() {
    assert!(loader().load("not a url").await.is_empty());
}
