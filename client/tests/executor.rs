use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ccai_client::{Api, ClientError, Session};

fn api_for(server: &MockServer) -> Api {
    Api::new(Session::new(server.uri(), "test-org", "jwt-token"))
}

#[tokio::test]
async fn unwraps_the_single_root_field_and_sends_session_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer jwt-token"))
        .and(header("x-organization", "test-org"))
        .and(body_string_contains("GetFile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": { "id": "f1", "name": "case 12" } }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let data = api
        .query_graphql("query GetFile($id: ID!) { file(id: $id) { id name } }", Some(json!({ "id": "f1" })))
        .await
        .unwrap();
    assert_eq!(data, json!({ "id": "f1", "name": "case 12" }));
}

#[tokio::test]
async fn graphql_errors_win_over_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": { "id": "f1" } },
            "errors": [ { "message": "permission denied" }, { "message": "try later" } ]
        })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .query_graphql("query GetFile { file { id } }", None)
        .await
        .unwrap_err();
    match err {
        ClientError::GraphQL(messages) => {
            assert_eq!(messages, vec!["permission denied", "try later"]);
        }
        other => panic!("expected a GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .query_graphql("query GetFile { file { id } }", None)
        .await
        .unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn ambiguous_data_objects_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": {}, "entity": {} }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.query_graphql("query Q { file { id } }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));

    let err = api.query_graphql("query Q { file { id } }", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn verify_reports_whether_the_session_still_works() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "entity": { "id": "e1", "name": "Test", "organization": { "name": "test-org" } } }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert!(api.verify().await);
    assert!(!api.verify().await);
}
