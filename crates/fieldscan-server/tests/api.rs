//! Route tests driving the router with a stub OCR engine.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use image::{DynamicImage, ImageFormat, RgbImage};
use pretty_assertions::assert_eq;
use tower::ServiceExt; // for `oneshot`

use fieldscan_core::error::OcrError;
use fieldscan_core::{Scanner, TextRecognizer};
use fieldscan_server::{create_app, AppState};

const BOUNDARY: &str = "fieldscan-test-boundary";

struct StaticRecognizer(&'static str);

impl TextRecognizer for StaticRecognizer {
    fn name(&self) -> &'static str {
        "static"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

struct FailingRecognizer;

impl TextRecognizer for FailingRecognizer {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::Recognition("engine crashed".to_string()))
    }
}

fn app_with(recognizer: impl TextRecognizer + 'static) -> Router {
    let state = AppState::new(Scanner::new(Arc::new(recognizer)));
    create_app(state, 1024 * 1024)
}

fn png_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(32, 16));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart_body(field_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"scan.png\"\r\n",
            field_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn ocr_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(body))
        .unwrap()
}

fn solve_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/imageocr/solve")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_ocr_returns_fields_in_order() {
    let app = app_with(StaticRecognizer("Name: Alice\nAge: 30"));
    let (status, body) = send(app, ocr_request(png_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"Name":"Alice","Age":"30"}"#);
}

#[tokio::test]
async fn test_ocr_full_width_colon() {
    let app = app_with(StaticRecognizer("姓名：张三\n年龄：28"));
    let (status, body) = send(app, ocr_request(png_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"姓名":"张三","年龄":"28"}"#);
}

#[tokio::test]
async fn test_ocr_fallback_lines() {
    let app = app_with(StaticRecognizer("Blood Report\n\nCity Hospital\n"));
    let (status, body) = send(app, ocr_request(png_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"文本1":"Blood Report","文本2":"City Hospital"}"#);
}

#[tokio::test]
async fn test_ocr_blank_text_is_empty_object() {
    let app = app_with(StaticRecognizer("  \n\n"));
    let (status, body) = send(app, ocr_request(png_bytes())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{}");
}

#[tokio::test]
async fn test_ocr_empty_body_is_client_error() {
    let app = app_with(StaticRecognizer("unused"));
    let (status, body) = send(app, ocr_request(Vec::new())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "no image data received");
}

#[tokio::test]
async fn test_ocr_undecodable_image_is_server_error() {
    let app = app_with(StaticRecognizer("unused"));
    let (status, body) = send(app, ocr_request(b"this is not an image".to_vec())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("failed to decode image"));
}

#[tokio::test]
async fn test_ocr_engine_failure_is_server_error() {
    let app = app_with(FailingRecognizer);
    let (status, body) = send(app, ocr_request(png_bytes())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("engine crashed"));
}

#[tokio::test]
async fn test_ocr_body_limit() {
    let state = AppState::new(Scanner::new(Arc::new(StaticRecognizer("A: 1"))));
    let app = create_app(state, 16);
    let (status, _) = send(app, ocr_request(vec![0u8; 1024])).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_solve_returns_items() {
    let app = app_with(StaticRecognizer("血压: 120/80\n心率: 72"));
    let (status, body) = send(app, solve_request(multipart_body("image", &png_bytes()))).await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "result": [
                {"item_name": "血压", "item_value": "120/80"},
                {"item_name": "心率", "item_value": "72"},
            ]
        })
    );
}

#[tokio::test]
async fn test_solve_without_image_field() {
    let app = app_with(StaticRecognizer("A: 1"));
    let (status, body) = send(app, solve_request(multipart_body("file", &png_bytes()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "image upload failed");
}

#[tokio::test]
async fn test_solve_rejects_non_multipart() {
    let app = app_with(StaticRecognizer("A: 1"));
    let request = Request::builder()
        .method("POST")
        .uri("/api/imageocr/solve")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "image upload failed");
}

#[tokio::test]
async fn test_solve_empty_image_is_input_missing() {
    let app = app_with(StaticRecognizer("A: 1"));
    let (status, body) = send(app, solve_request(multipart_body("image", &[]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "no image data received");
}

#[tokio::test]
async fn test_health() {
    let app = app_with(StaticRecognizer(""));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
