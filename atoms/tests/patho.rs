use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ccai_atoms::patho::{self, ShapeType, UpdateAnnotationFields};
use ccai_client::{Api, ClientError, Session};

fn api_for(server: &MockServer) -> Api {
    Api::new(Session::new(server.uri(), "test-org", "jwt"))
}

fn annotation_fixture(id: &str, shape: &str) -> Value {
    json!({
        "id": id,
        "shapeType": shape,
        "shapeData": [1.0, 2.0],
        "author": null,
        "slideId": "s1",
        "number": null,
        "label": null,
        "isLabelVisible": null,
        "color": null,
        "pointType": null,
        "createdAt": "2024-03-01T10:00:00+00:00",
        "discussion": { "id": "d1", "comments": { "edges": [] } },
    })
}

#[tokio::test]
async fn shape_filter_runs_client_side() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "file": {
                    "annotations": {
                        "edges": [
                            { "node": annotation_fixture("a1", "rect") },
                            { "node": annotation_fixture("a2", "polygon") },
                            { "node": annotation_fixture("a3", "point") },
                        ]
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let hits = patho::list_annotations_of_shape(&api, "s1", &[ShapeType::Rect, ShapeType::Point])
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "a1");
    assert_eq!(hits[1].id, "a3");
}

#[tokio::test]
async fn update_annotation_submits_only_the_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "annotationUpdate": { "annotation": annotation_fixture("a1", "rect") } }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    patho::update_annotation(
        &api,
        "a1",
        UpdateAnnotationFields {
            color: Some("#00ff00".to_string()),
            ..UpdateAnnotationFields::default()
        },
    )
    .await
    .unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    let variables = body["variables"].as_object().unwrap();
    assert_eq!(variables["id"], json!("a1"));
    assert_eq!(variables["color"], json!("#00ff00"));
    assert!(!variables.contains_key("label"));
    assert!(!variables.contains_key("shapeData"));
    assert!(!variables.contains_key("isLabelVisible"));
}

#[tokio::test]
async fn download_prefers_the_content_disposition_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("SlideDownload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": { "downloadUrl": format!("{}/blob/original?sig=abc", server.uri()) } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blob/original"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"slide-7.svs\"")
                .set_body_bytes(b"svs bytes".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = api_for(&server);
    let target = patho::download_original(&api, "s1", dir.path()).await.unwrap();
    assert_eq!(target, dir.path().join("slide-7.svs"));
    assert_eq!(tokio::fs::read(&target).await.unwrap(), b"svs bytes");
}

#[tokio::test]
async fn download_falls_back_to_the_url_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": { "downloadUrl": format!("{}/blob/slide-9.tiff?sig=abc", server.uri()) } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blob/slide-9.tiff"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tiff bytes".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = api_for(&server);
    let target = patho::download_original(&api, "s1", dir.path()).await.unwrap();
    assert_eq!(target, dir.path().join("slide-9.tiff"));
}

#[tokio::test]
async fn download_without_any_derivable_name_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "file": { "downloadUrl": format!("{}/?sig=abc", server.uri()) } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"nameless bytes".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let api = api_for(&server);
    let err = patho::download_original(&api, "s1", dir.path()).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(tokio::fs::read_dir(dir.path())
        .await
        .unwrap()
        .next_entry()
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn missing_color_map_codename_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "colorMaps": { "edges": [] } }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = patho::color_map_by_codename(&api, "tumor-heat").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}
