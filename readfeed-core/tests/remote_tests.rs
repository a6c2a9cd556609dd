use readfeed_core::{ArticleRemoteSource, HttpFeedSource, RemoteConfig, RemoteError};
use reqwest::Client;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> HttpFeedSource {
    HttpFeedSource::new(Client::new(), Url::parse(&server.uri()).unwrap())
}

#[tokio::test]
async fn fetch_returns_body_of_user_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/@alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string("<rss></rss>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = source_for(&server).fetch("alice").await.expect("fetch");
    assert_eq!(body, "<rss></rss>");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/@nobody"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch("nobody").await.unwrap_err();
    match err {
        RemoteError::Status { status, url } => {
            assert_eq!(status.as_u16(), 404);
            assert!(url.ends_with("/feed/@nobody"), "url was {url}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Bind then release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpFeedSource::new(Client::new(), Url::parse(&format!("http://{addr}/")).unwrap());
    let err = source.fetch("alice").await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)), "unexpected error: {err:?}");
}

#[test]
fn feed_url_keeps_base_path_and_escapes_identity() {
    let source = HttpFeedSource::new(Client::new(), Url::parse("https://example.com/api/").unwrap());
    assert_eq!(
        source.feed_url("alice").unwrap().as_str(),
        "https://example.com/api/feed/@alice"
    );
    assert_eq!(
        source.feed_url("a/b").unwrap().as_str(),
        "https://example.com/api/feed/@a%2Fb"
    );
}

#[test]
fn from_config_uses_default_base_url() {
    let source = HttpFeedSource::from_config(&RemoteConfig::default()).unwrap();
    assert_eq!(
        source.feed_url("alice").unwrap().as_str(),
        "https://medium.com/feed/@alice"
    );
}

#[test]
fn from_config_rejects_invalid_base_url() {
    let config = RemoteConfig {
        base_url: "not a url".into(),
        ..RemoteConfig::default()
    };
    assert!(matches!(
        HttpFeedSource::from_config(&config),
        Err(RemoteError::InvalidUrl(_))
    ));
}
