pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::contract::handlers as contract;
use crate::notice::handlers as notice;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/project",
            put(session::handle_update_project),
        )
        // Uploads
        .route(
            "/api/v1/sessions/:id/contract",
            post(contract::handle_upload_contract),
        )
        .route(
            "/api/v1/sessions/:id/photos",
            post(session::handle_upload_photos),
        )
        .route(
            "/api/v1/sessions/:id/photos/:index",
            delete(session::handle_remove_photo),
        )
        // Notice
        .route(
            "/api/v1/sessions/:id/notice",
            post(notice::handle_generate_notice),
        )
        .route(
            "/api/v1/sessions/:id/notice/pdf",
            get(notice::handle_download_pdf),
        )
        .route(
            "/api/v1/sessions/:id/notice/mailto",
            get(notice::handle_mailto),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notice::drafter::TemplateDrafter;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use lopdf::{content::Content, dictionary, Document, Object, Stream};
    use serde_json::{json, Value};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "change-order-test-boundary";

    struct Part<'a> {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: Vec<u8>,
    }

    fn app() -> Router {
        build_router(AppState::new(Config::local(), Arc::new(TemplateDrafter)))
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(32, 24, image::Rgb([20, 120, 200]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn contract_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content {
            operations: vec![
                lopdf::content::Operation::new("BT", vec![]),
                lopdf::content::Operation::new("Tf", vec!["F1".into(), 12.into()]),
                lopdf::content::Operation::new("Td", vec![72.into(), 700.into()]),
                lopdf::content::Operation::new("Tj", vec![Object::string_literal(text)]),
                lopdf::content::Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn multipart_request(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, part.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn photo_part(file_name: &str) -> Part<'_> {
        Part {
            name: "photos",
            file_name,
            content_type: "image/png",
            data: png_bytes(),
        }
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let response = send(app, empty_request("POST", "/api/v1/sessions")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["session_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn fill_project(app: &Router, id: &str) {
        let response = send(
            app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/project"),
                json!({"project_name": "Acme Tower", "gc_name": "BuildCo", "note": ""}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), empty_request("GET", "/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["drafting_backend"], "template");
    }

    #[tokio::test]
    async fn test_unknown_session_returns_not_found_envelope() {
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let response = send(&app(), empty_request("GET", &uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_end_to_end_notice_without_contract() {
        let app = app();
        let id = new_session(&app).await;
        fill_project(&app, &id).await;

        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/photos"),
                vec![photo_part("one.png"), photo_part("two.png")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let upload = body_json(response).await;
        assert_eq!(upload["accepted"], 2);
        assert_eq!(upload["dropped"], 0);

        let response = send(
            &app,
            empty_request("POST", &format!("/api/v1/sessions/{id}/notice")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let notice = body_json(response).await;
        let text = notice["body_text"].as_str().unwrap();
        assert!(text.contains("7.3"));
        assert!(text.contains("7.3.1"));
        assert!(text.contains("48 hours"));
        assert!(text.contains("Project: Acme Tower"));
        assert!(text.contains("To: BuildCo"));
        let evidence_lines = text
            .lines()
            .filter(|l| l.starts_with("  Photo ") && !l.contains("Field Evidence"))
            .count();
        assert_eq!(evidence_lines, 2);
        assert_eq!(notice["backend"], "template");

        let response = send(
            &app,
            empty_request("GET", &format!("/api/v1/sessions/{id}/notice/pdf")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Change-Notice-Acme-Tower-"));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let pdf = Document::load_mem(&bytes).unwrap();
        // Text page(s) plus one page per photo.
        assert!(pdf.get_pages().len() >= 3);

        let response = send(
            &app,
            empty_request("GET", &format!("/api/v1/sessions/{id}/notice/mailto")),
        )
        .await;
        let href = body_json(response).await["href"].as_str().unwrap().to_string();
        assert!(href.starts_with("mailto:?subject=Change%20Order%20Notice%20-%20Acme%20Tower"));
    }

    #[tokio::test]
    async fn test_generate_requires_project_and_photos() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            empty_request("POST", &format!("/api/v1/sessions/{id}/notice")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("at least one photo"));
    }

    #[tokio::test]
    async fn test_pdf_before_generation_is_not_found() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            empty_request("GET", &format!("/api/v1/sessions/{id}/notice/pdf")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contract_upload_extracts_facts() {
        let app = app();
        let id = new_session(&app).await;
        let pdf = contract_pdf(
            "Section 9 Change Orders. The Subcontractor shall notify the Contractor within 3 days.",
        );
        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/contract"),
                vec![Part {
                    name: "file",
                    file_name: "contract.pdf",
                    content_type: "application/pdf",
                    data: pdf,
                }],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["facts"]["source"], "extracted");
        assert_eq!(body["facts"]["value"]["notice_window"], "within 3 days");

        let session = body_json(
            send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await,
        )
        .await;
        assert_eq!(session["contract"]["file_name"], "contract.pdf");
        assert_eq!(session["contract"]["facts_extracted"], true);
    }

    #[tokio::test]
    async fn test_unreadable_contract_yields_default_facts() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/contract"),
                vec![Part {
                    name: "file",
                    file_name: "broken.pdf",
                    content_type: "application/pdf",
                    data: b"%PDF-1.4 not really".to_vec(),
                }],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["facts"]["source"], "defaulted");
        assert_eq!(body["facts"]["value"]["notice_window"], "48 hours");
        assert_eq!(body["text_length"], 0);
    }

    #[tokio::test]
    async fn test_contract_upload_requires_file_field() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/contract"),
                vec![Part {
                    name: "other",
                    file_name: "x.pdf",
                    content_type: "application/pdf",
                    data: b"x".to_vec(),
                }],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sixth_photo_is_dropped_and_removal_keeps_order() {
        let app = app();
        let id = new_session(&app).await;
        let names = ["1.png", "2.png", "3.png", "4.png", "5.png", "6.png"];
        let response = send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/photos"),
                names.iter().map(|n| photo_part(n)).collect(),
            ),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["accepted"], 5);
        assert_eq!(body["dropped"], 1);

        let response = send(
            &app,
            empty_request("DELETE", &format!("/api/v1/sessions/{id}/photos/0")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let remaining: Vec<&str> = body["photos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["file_name"].as_str().unwrap())
            .collect();
        assert_eq!(remaining, vec!["2.png", "3.png", "4.png", "5.png"]);
    }

    #[tokio::test]
    async fn test_delete_session_starts_over() {
        let app = app();
        let id = new_session(&app).await;
        let response = send(
            &app,
            empty_request("DELETE", &format!("/api/v1/sessions/{id}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_editing_after_generation_marks_notice_stale() {
        let app = app();
        let id = new_session(&app).await;
        fill_project(&app, &id).await;
        send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/photos"),
                vec![photo_part("a.png")],
            ),
        )
        .await;
        send(
            &app,
            empty_request("POST", &format!("/api/v1/sessions/{id}/notice")),
        )
        .await;
        send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/project"),
                json!({"project_name": "Acme Tower", "gc_name": "OtherCo"}),
            ),
        )
        .await;
        let session = body_json(
            send(&app, empty_request("GET", &format!("/api/v1/sessions/{id}"))).await,
        )
        .await;
        assert_eq!(session["notice"]["stale"], true);
    }

    #[tokio::test]
    async fn test_pdf_download_with_unusual_project_name() {
        let app = app();
        let id = new_session(&app).await;
        send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/sessions/{id}/project"),
                json!({"project_name": "Caf\u{e9} \u{1}Tower", "gc_name": "BuildCo"}),
            ),
        )
        .await;
        send(
            &app,
            multipart_request(
                &format!("/api/v1/sessions/{id}/photos"),
                vec![photo_part("a.png")],
            ),
        )
        .await;
        send(
            &app,
            empty_request("POST", &format!("/api/v1/sessions/{id}/notice")),
        )
        .await;

        let response = send(
            &app,
            empty_request("GET", &format!("/api/v1/sessions/{id}/notice/pdf")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"Change-Notice-Caf_-Tower-"));
        assert!(disposition.contains("filename*=UTF-8''Change-Notice-Caf%C3%A9-Tower-"));
    }
}
