use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ccai_client::{Api, ClientError, Session};
use uploads_block::{create_slide_from_files, upload, SlideCreateOptions, UploadSource};

fn api_for(server: &MockServer) -> Api {
    Api::new(Session::new(server.uri(), "test-org", "jwt"))
}

fn bytes_source(name: &str, bytes: &[u8]) -> UploadSource {
    UploadSource::Bytes {
        name: name.to_string(),
        bytes: bytes.to_vec(),
    }
}

fn container_response(server: &MockServer, presigns: &[(&str, &str)]) -> Value {
    let files: Vec<Value> = presigns
        .iter()
        .map(|(upload_path, http_method)| {
            json!({
                "url": format!("{}{}", server.uri(), upload_path),
                "method": http_method,
                "data": null,
                "headers": null,
            })
        })
        .collect();
    json!({
        "data": {
            "uploadContainerCreate": {
                "container": { "id": "container-1" },
                "presignUpload": { "files": files }
            }
        }
    })
}

async fn mount_graphql(server: &MockServer, response: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

#[tokio::test]
async fn transfers_run_in_request_order_against_aligned_presigns() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        container_response(&server, &[("/up/a", "PUT"), ("/up/b", "PUT"), ("/up/c", "PUT")]),
    )
    .await;
    for upload_path in ["/up/a", "/up/b", "/up/c"] {
        Mock::given(method("PUT"))
            .and(path(upload_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let container = upload(
        &api_for(&server),
        vec![
            bytes_source("a.txt", b"alpha"),
            bytes_source("b.txt", b"beta"),
            bytes_source("c.txt", b"gamma"),
        ],
        vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()],
    )
    .await
    .unwrap();
    assert_eq!(container.id, "container-1");

    let requests = server.received_requests().await.unwrap();
    let transfers: Vec<(&str, &[u8])> = requests
        .iter()
        .filter(|request| request.url.path().starts_with("/up/"))
        .map(|request| (request.url.path(), request.body.as_slice()))
        .collect();
    assert_eq!(
        transfers,
        vec![
            ("/up/a", b"alpha".as_slice()),
            ("/up/b", b"beta".as_slice()),
            ("/up/c", b"gamma".as_slice()),
        ]
    );
}

#[tokio::test]
async fn first_failed_transfer_aborts_the_rest() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        container_response(&server, &[("/up/a", "PUT"), ("/up/b", "PUT"), ("/up/c", "PUT")]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/up/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/up/b"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/up/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = upload(
        &api_for(&server),
        vec![
            bytes_source("a.txt", b"alpha"),
            bytes_source("b.txt", b"beta"),
            bytes_source("c.txt", b"gamma"),
        ],
        vec!["a.txt".to_string(), "b.txt".to_string(), "c.txt".to_string()],
    )
    .await
    .unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "disk full");
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_presign_method_is_rejected_before_any_transfer() {
    let server = MockServer::start().await;
    mount_graphql(&server, container_response(&server, &[("/up/a", "DELETE")])).await;

    let err = upload(
        &api_for(&server),
        vec![bytes_source("a.txt", b"alpha")],
        vec!["a.txt".to_string()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn post_presigns_send_multipart_forms_with_server_fields() {
    let server = MockServer::start().await;
    mount_graphql(
        &server,
        json!({
            "data": {
                "uploadContainerCreate": {
                    "container": { "id": "container-1" },
                    "presignUpload": {
                        "files": [
                            {
                                "url": format!("{}/up/a", server.uri()),
                                "method": "POST",
                                "data": { "policy": "signed-policy", "key": "staging/a.txt" },
                                "headers": { "x-upload-session": "sess-1" },
                            }
                        ]
                    }
                }
            }
        }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/up/a"))
        .and(wiremock::matchers::header("x-upload-session", "sess-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    upload(
        &api_for(&server),
        vec![bytes_source("a.txt", b"alpha")],
        vec!["a.txt".to_string()],
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let transfer = requests
        .iter()
        .find(|request| request.url.path() == "/up/a")
        .unwrap();
    let body = String::from_utf8_lossy(&transfer.body);
    assert!(body.contains("name=\"policy\""));
    assert!(body.contains("signed-policy"));
    assert!(body.contains("name=\"key\""));
    assert!(body.contains("staging/a.txt"));
    assert!(body.contains("filename=\"a.txt\""));
    assert!(body.contains("alpha"));
}

#[tokio::test]
async fn slide_creation_uploads_a_directory_tree_under_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    tokio::fs::create_dir_all(root.join("level0")).await.unwrap();
    tokio::fs::create_dir_all(root.join("level1")).await.unwrap();
    tokio::fs::write(root.join("level0/tile.jpg"), b"coarse").await.unwrap();
    tokio::fs::write(root.join("level1/tile.jpg"), b"fine").await.unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(wiremock::matchers::body_string_contains("UploadContainer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(container_response(
            &server,
            &[("/up/coarse", "PUT"), ("/up/fine", "PUT")],
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(wiremock::matchers::body_string_contains("PathologySlideCreate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "pathologySlideCreate": { "file": { "id": "slide-1", "name": "case 12" } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    for upload_path in ["/up/coarse", "/up/fine"] {
        Mock::given(method("PUT"))
            .and(path(upload_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let file = create_slide_from_files(
        &api_for(&server),
        &[root.to_path_buf()],
        "parent-1",
        "case 12",
        SlideCreateOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(file.id, "slide-1");
    assert_eq!(file.name, "case 12");

    let requests = server.received_requests().await.unwrap();
    let container_request = requests
        .iter()
        .find(|request| {
            request.url.path() == "/graphql"
                && String::from_utf8_lossy(&request.body).contains("UploadContainer")
        })
        .unwrap();
    let body: Value = serde_json::from_slice(&container_request.body).unwrap();
    assert_eq!(
        body["variables"]["files"],
        json!(["level0/tile.jpg", "level1/tile.jpg"])
    );

    let transfers: Vec<(&str, &[u8])> = requests
        .iter()
        .filter(|request| request.url.path().starts_with("/up/"))
        .map(|request| (request.url.path(), request.body.as_slice()))
        .collect();
    assert_eq!(
        transfers,
        vec![
            ("/up/coarse", b"coarse".as_slice()),
            ("/up/fine", b"fine".as_slice()),
        ]
    );

    let create_request = requests
        .iter()
        .find(|request| {
            request.url.path() == "/graphql"
                && String::from_utf8_lossy(&request.body).contains("PathologySlideCreate")
        })
        .unwrap();
    let body: Value = serde_json::from_slice(&create_request.body).unwrap();
    assert_eq!(body["variables"]["container"], json!("container-1"));
    assert_eq!(body["variables"]["parent"], json!("parent-1"));
    assert_eq!(body["variables"]["name"], json!("case 12"));
}

#[tokio::test]
async fn misaligned_presign_count_is_a_decode_failure() {
    let server = MockServer::start().await;
    mount_graphql(&server, container_response(&server, &[("/up/a", "PUT")])).await;

    let err = upload(
        &api_for(&server),
        vec![bytes_source("a.txt", b"a"), bytes_source("b.txt", b"b")],
        vec!["a.txt".to_string(), "b.txt".to_string()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}
