//! Integration test: blocking and async fetch against a local `/codes/` server.

mod common;

use codepoll_core::fetch::{self, FetchError, HttpTimeouts};
use codepoll_core::model::CodeId;
use codepoll_core::retry::{self, ErrorKind};
use codepoll_core::source::{CodeSource, HttpCodeSource};
use common::codes_server::{self, Reply};

const BODY: &str = r#"{"Codes":[{"Name":"GitHub","Code":"123456","Id":1},{"Name":"Mail","Code":"000111","Id":2}],"Valid":21.5}"#;

fn url(origin: &str) -> String {
    fetch::codes_url(origin).unwrap().to_string()
}

#[test]
fn fetch_decodes_codes_in_server_order() {
    let server = codes_server::serving(BODY);
    let set = fetch::fetch_codes(&url(&server.origin), HttpTimeouts::default()).unwrap();
    assert_eq!(set.valid, 21.5);
    assert_eq!(set.codes.len(), 2);
    assert_eq!(set.codes[0].id, CodeId::from(1));
    assert_eq!(set.codes[0].value, "123456");
    assert_eq!(set.codes[1].name, "Mail");
    assert_eq!(server.requests(), 1);
}

#[test]
fn fetch_reports_http_status() {
    let server = codes_server::start(|_| Reply::status("503 Service Unavailable"));
    let err = fetch::fetch_codes(&url(&server.origin), HttpTimeouts::default()).unwrap_err();
    assert!(matches!(err, FetchError::Http(503)));
    assert_eq!(retry::classify(&err), ErrorKind::Throttled);
}

#[test]
fn fetch_rejects_malformed_json() {
    let server = codes_server::serving("{\"Valid\": 30, \"Codes\": [");
    let err = fetch::fetch_codes(&url(&server.origin), HttpTimeouts::default()).unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
    assert_eq!(retry::classify(&err), ErrorKind::Other);
}

#[test]
fn fetch_connection_refused_is_a_connection_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let err = fetch::fetch_codes(
        &format!("http://127.0.0.1:{}/codes/", port),
        HttpTimeouts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FetchError::Curl(_)));
    assert_eq!(retry::classify(&err), ErrorKind::Connection);
}

#[tokio::test]
async fn http_source_fetches_from_server_origin() {
    let server = codes_server::serving(BODY);
    let source = HttpCodeSource::for_server(&server.origin, HttpTimeouts::default()).unwrap();
    assert!(source.url().ends_with("/codes/"));
    let set = source.fetch().await.unwrap();
    assert_eq!(set.codes[1].id.element_id(), "code-2");
}
