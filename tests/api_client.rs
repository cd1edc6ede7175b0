//! API client tests against a local wiremock server.
//!
//! The client is blocking, so the mock server is started on a tokio runtime
//! owned by the test and the requests are made from the test thread.

use hh_vacancies::api::{ApiClient, Endpoint, JobBoard, SearchQuery};
use hh_vacancies::error::ApiError;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_server(rt: &Runtime, mocks: Vec<Mock>) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    })
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), "hh-vacancies-test/1.0").expect("client")
}

#[test]
fn vacancies_are_returned_from_items() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .and(path("/vacancies"))
            .and(query_param("text", "rust"))
            .and(query_param("per_page", "100"))
            .and(header("user-agent", "hh-vacancies-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "1", "name": "Rust developer"}, {"id": "2", "name": "Rust lead"}],
                "found": 2
            })))],
    );

    let items = client(&server).search_vacancies(&SearchQuery::text("rust").per_page(100));
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["name"], "Rust lead");
}

#[test]
fn employer_filter_is_sent_as_query_parameter() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .and(path("/vacancies"))
            .and(query_param("employer_id", "1740"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": "9"}]})))],
    );

    let items = client(&server).search_vacancies(&SearchQuery::employer(1740));
    assert_eq!(items, vec![json!({"id": "9"})]);
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .and(path("/employers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": "3"}]})))],
    );

    let api = ApiClient::new(&format!("{}/", server.uri()), "hh-vacancies-test/1.0").unwrap();
    assert_eq!(api.search_employers(&SearchQuery::text("Beta")), vec![json!({"id": "3"})]);
}

#[test]
fn missing_items_field_gives_empty_list() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .and(path("/employers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"found": 0})))],
    );

    assert!(client(&server).search_employers(&SearchQuery::text("nobody")).is_empty());
}

#[test]
fn http_errors_degrade_to_empty_list() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))],
    );
    let api = client(&server);

    assert!(api.search_employers(&SearchQuery::text("Acme")).is_empty());
    assert!(api.search_vacancies(&SearchQuery::text("Acme")).is_empty());

    match api.fetch_items(Endpoint::Employers, &SearchQuery::text("Acme")) {
        Err(ApiError::Status { status, body, .. }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn invalid_json_is_a_decode_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        vec![Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))],
    );
    let api = client(&server);

    assert!(api.search_vacancies(&SearchQuery::default()).is_empty());
    assert!(matches!(
        api.fetch_items(Endpoint::Vacancies, &SearchQuery::default()),
        Err(ApiError::Decode { .. })
    ));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let api = ApiClient::new(&format!("http://127.0.0.1:{}", port), "hh-vacancies-test/1.0").unwrap();
    assert!(api.search_vacancies(&SearchQuery::text("rust")).is_empty());
    assert!(matches!(
        api.fetch_items(Endpoint::Vacancies, &SearchQuery::text("rust")),
        Err(ApiError::Transport { .. })
    ));
}
