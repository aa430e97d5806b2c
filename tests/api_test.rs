use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use grade_genie::api::{ErrorBody, GradeResponseBody, HealthBody};
use grade_genie::{build_router, AppState, Config, MockVisionModel};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

const BOUNDARY: &str = "grade-genie-boundary";

fn test_config() -> Config {
    Config {
        llm_api_key: "test-key".to_string(),
        max_images_per_request: 3,
        ..Config::default()
    }
}

fn app_with(model: Arc<MockVisionModel>, config: &Config) -> Router {
    let state = Arc::new(AppState::with_model(config, model));
    build_router(state, config.max_body_bytes)
}

fn app(model: Arc<MockVisionModel>) -> Router {
    app_with(model, &test_config())
}

fn scripted(replies: &[&str]) -> Arc<MockVisionModel> {
    Arc::new(
        MockVisionModel::new("GRADE: 0/100\nFEEDBACK: fallback")
            .with_replies(replies.iter().map(|r| Some(r.to_string()))),
    )
}

fn png_page(width: u32, height: u32) -> Vec<u8> {
    let page = RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(page.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/grade/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// 手工拼 multipart 请求体：(字段名, 文件名, 内容)
fn multipart_request(parts: &[(&str, Option<&str>, Vec<u8>)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/grade/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send<T: DeserializeOwned>(app: Router, request: Request<Body>) -> (StatusCode, T) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn decode_data_uri(uri: &str) -> Vec<u8> {
    let data = uri
        .strip_prefix("data:image/jpeg;base64,")
        .expect("jpeg data uri");
    STANDARD.decode(data).unwrap()
}

#[tokio::test]
async fn test_json_request_grades_every_image_in_order() {
    let model = scripted(&[
        "GRADE: 85/100\nFEEDBACK: Good.",
        "GRADE: 40/100\nFEEDBACK: Incomplete.",
    ]);
    let images = vec![
        STANDARD.encode(png_page(300, 400)),
        format!("data:image/png;base64,{}", STANDARD.encode(png_page(200, 100))),
    ];

    let (status, body): (_, GradeResponseBody) = send(
        app(model.clone()),
        json_request(serde_json::json!({ "images": images, "instructions": "Out of 100" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success);
    assert_eq!(body.graded_images.len(), 2);
    assert_eq!(body.grades.len(), 2);
    assert_eq!(body.grades[0].grade, "85/100");
    assert_eq!(body.grades[0].feedback, "Good.");
    assert_eq!(body.grades[1].grade, "40/100");

    // 输出图片尺寸与输入一致
    let second = image::load_from_memory(&decode_data_uri(&body.graded_images[1])).unwrap();
    assert_eq!((second.width(), second.height()), (200, 100));

    assert_eq!(model.calls(), vec!["Out of 100", "Out of 100"]);
}

#[tokio::test]
async fn test_json_request_without_instructions() {
    let model = scripted(&["GRADE: A\nFEEDBACK: Great."]);
    let (status, body): (_, GradeResponseBody) = send(
        app(model.clone()),
        json_request(serde_json::json!({ "images": [STANDARD.encode(png_page(64, 64))] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.grades[0].grade, "A");
    assert_eq!(model.calls(), vec![""]);
}

#[tokio::test]
async fn test_empty_image_list_is_bad_request() {
    let model = scripted(&[]);
    let (status, body): (_, ErrorBody) = send(
        app(model.clone()),
        json_request(serde_json::json!({ "images": [], "instructions": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.success);
    assert_eq!(body.error, "No images provided");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_base64_is_bad_request() {
    let (status, body): (_, ErrorBody) = send(
        app(scripted(&[])),
        json_request(serde_json::json!({ "images": ["@@@not-base64@@@"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.starts_with("Image 0 is not valid base64"));
}

#[tokio::test]
async fn test_non_image_payload_is_bad_request() {
    let model = scripted(&[]);
    let (status, body): (_, ErrorBody) = send(
        app(model.clone()),
        json_request(serde_json::json!({
            "images": [STANDARD.encode(png_page(10, 10)), STANDARD.encode(b"just some text")]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "Image 1 is not a supported image format");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_too_many_images_is_bad_request() {
    let image = STANDARD.encode(png_page(10, 10));
    let (status, body): (_, ErrorBody) = send(
        app(scripted(&[])),
        json_request(serde_json::json!({ "images": vec![image; 4] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.error.starts_with("Too many images"));
}

#[tokio::test]
async fn test_model_failure_fails_whole_request() {
    let model = Arc::new(
        MockVisionModel::new("GRADE: 0/100")
            .with_replies([Some("GRADE: 90/100\nFEEDBACK: ok".to_string()), None]),
    );
    let image = STANDARD.encode(png_page(50, 50));

    let (status, body): (_, ErrorBody) = send(
        app(model.clone()),
        json_request(serde_json::json!({ "images": vec![image; 3] })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.success);
    assert!(body.error.starts_with("Error grading paper 1:"));
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn test_multipart_file_upload() {
    let model = scripted(&["GRADE: 7/10\nFEEDBACK: a", "GRADE: 9/10\nFEEDBACK: b"]);
    let request = multipart_request(&[
        ("images", Some("page1.png"), png_page(120, 160)),
        ("images", Some("page2.png"), png_page(160, 120)),
        ("instructions", None, b"Each question is worth 1 point".to_vec()),
    ]);

    let (status, body): (_, GradeResponseBody) = send(app(model.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    let grades: Vec<_> = body.grades.iter().map(|g| g.grade.as_str()).collect();
    assert_eq!(grades, ["7/10", "9/10"]);
    assert!(body
        .graded_images
        .iter()
        .all(|uri| uri.starts_with("data:image/jpeg;base64,")));
    assert_eq!(model.calls(), vec!["Each question is worth 1 point"; 2]);
}

#[tokio::test]
async fn test_multipart_base64_text_fields() {
    let model = scripted(&["GRADE: 3/5\nFEEDBACK: fine"]);
    let encoded = STANDARD.encode(png_page(40, 40)).into_bytes();
    let request = multipart_request(&[("images", None, encoded)]);

    let (status, body): (_, GradeResponseBody) = send(app(model), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.grades[0].grade, "3/5");
}

#[tokio::test]
async fn test_multipart_files_take_precedence_over_text() {
    let model = scripted(&["GRADE: 1/1\nFEEDBACK: only one"]);
    let request = multipart_request(&[
        ("images", None, b"ignored because a file is present".to_vec()),
        ("images", Some("scan.png"), png_page(30, 30)),
    ]);

    let (status, body): (_, GradeResponseBody) = send(app(model.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.grades.len(), 1);
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_multipart_empty_file_field_means_no_images() {
    let model = scripted(&[]);
    let request = multipart_request(&[
        ("images", Some(""), Vec::new()),
        ("instructions", None, b"Grade strictly".to_vec()),
    ]);

    let (status, body): (_, ErrorBody) = send(app(model.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "No images provided");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/grade/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();

    let (status, body): (_, ErrorBody) = send(app(scripted(&[])), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body.error, "Unsupported content type: text/plain");
}

#[tokio::test]
async fn test_body_over_limit_is_rejected() {
    let config = Config {
        max_body_bytes: 1024,
        ..test_config()
    };
    let image = STANDARD.encode(png_page(200, 200));
    let request = json_request(serde_json::json!({ "images": [image, "x".repeat(2048)] }));

    let (status, body): (_, ErrorBody) = send(app_with(scripted(&[]), &config), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!body.success);
}

#[tokio::test]
async fn test_route_without_trailing_slash() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/grade")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "images": [STANDARD.encode(png_page(20, 20))] }).to_string(),
        ))
        .unwrap();

    let (status, _body): (_, GradeResponseBody) =
        send(app(scripted(&["GRADE: 5/5\nFEEDBACK: ok"])), request).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_on_grade_endpoint_not_allowed() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/grade/")
        .body(Body::empty())
        .unwrap();

    let response = app(scripted(&[])).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_reports_model() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body): (_, HealthBody) = send(app(scripted(&[])), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, "ok");
    assert_eq!(body.model, "mock");
}

#[tokio::test]
async fn test_home_page_posts_to_grade_endpoint() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app(scripted(&[])).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("action=\"/api/grade/\""));
}
