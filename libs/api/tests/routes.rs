use std::sync::{Arc, Mutex};

use api::clients::image_host::{ImageFile, ImageHost};
use api::{serve, Config};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use repository::{ConnectionManager, DatabaseSettings, Repository};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "devevent-test-boundary";
const UPLOADED_URL: &str = "https://media.example.com/DevEvent/cover.png";

#[derive(Debug, Default)]
struct RecordingHost {
    uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageHost for RecordingHost {
    async fn upload(&self, image: ImageFile) -> anyhow::Result<String> {
        self.uploads.lock().unwrap().push(image.file_name);
        Ok(UPLOADED_URL.to_string())
    }
}

#[derive(Debug)]
struct BrokenHost;

#[async_trait]
impl ImageHost for BrokenHost {
    async fn upload(&self, _image: ImageFile) -> anyhow::Result<String> {
        anyhow::bail!("bucket unavailable")
    }
}

fn app(images: Arc<dyn ImageHost>) -> Router {
    app_on("sqlite::memory:", images)
}

fn app_on(url: &str, images: Arc<dyn ImageHost>) -> Router {
    let settings = DatabaseSettings {
        max_pool_size: 1,
        server_selection_timeout_ms: 2_000,
        ..Default::default()
    };
    let repository =
        Repository::new(Arc::new(ConnectionManager::new(url, settings)));

    serve(repository, images, &Config::default()).unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part]) -> Body {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .as_bytes(),
                );
            }
            Part::File(file_name, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn event_fields<'a>(title: &'a str, tags: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("title", title),
        Part::Text("description", "An evening of short talks"),
        Part::Text("overview", "Talks, pizza and questions"),
        Part::Text("venue", "Main Hall"),
        Part::Text("location", "Lisbon, Portugal"),
        Part::Text("date", "2025-11-05"),
        Part::Text("time", "18:30"),
        Part::Text("mode", "hybrid"),
        Part::Text("audience", "Developers"),
        Part::Text("organizer", "Lisbon Devs"),
        Part::Text("agenda", r#"["Doors open", "Talks"]"#),
        Part::Text("tags", tags),
    ]
}

fn post_event(parts: &[Part]) -> Request<Body> {
    Request::post("/events")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart(parts))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

async fn create_by_url(app: &Router, title: &str, tags: &str) -> Value {
    let mut parts = event_fields(title, tags);
    parts.push(Part::Text("image", "https://images.example.com/cover.png"));

    let (status, body) = send(app, post_event(&parts)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn event_created_from_image_url_is_found_by_slug() {
    let host = Arc::new(RecordingHost::default());
    let app = app(host.clone());

    let body = create_by_url(&app, "Tech Talk 2024!", r#"["rust"]"#).await;
    assert_eq!(body["message"], "Event created successfully");
    assert_eq!(body["event"]["slug"], "tech-talk-2024");
    assert_eq!(body["event"]["image"], "https://images.example.com/cover.png");
    assert_eq!(body["event"]["mode"], "hybrid");
    assert!(host.uploads.lock().unwrap().is_empty());

    let (status, body) = send(&app, get("/events/Tech-Talk-2024")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Tech Talk 2024!");
    assert_eq!(body["data"]["agenda"], json!(["Doors open", "Talks"]));
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, body) = send(&app, get("/events/nonexistent")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": "Event with slug 'nonexistent' not found"})
    );
}

#[tokio::test]
async fn blank_slug_is_a_client_error() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, body) = send(&app, get("/events/%20%20")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Invalid or missing slug parameter"})
    );
}

#[tokio::test]
async fn unreachable_database_answers_with_generic_errors() {
    let app = app_on("invalid://nowhere/devevent", Arc::new(RecordingHost::default()));

    let (status, body) = send(&app, get("/events/x")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Internal server error"}));

    let (status, body) = send(&app, get("/events")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"message": "Event fetching failed", "error": "Internal server error"})
    );

    let (status, body) = send(&app, get("/diagnostics/db")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Internal server error"}));
}

#[tokio::test]
async fn image_file_is_uploaded_and_its_url_stored() {
    let host = Arc::new(RecordingHost::default());
    let app = app(host.clone());

    let mut parts = event_fields("Rust Meetup", r#"["rust"]"#);
    parts.push(Part::File("cover.png", "image/png", b"\x89PNG\r\n"));

    let (status, body) = send(&app, post_event(&parts)).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["event"]["image"], UPLOADED_URL);
    assert_eq!(*host.uploads.lock().unwrap(), vec!["cover.png"]);
}

#[tokio::test]
async fn image_file_without_a_name_is_still_uploaded() {
    let host = Arc::new(RecordingHost::default());
    let app = app(host.clone());

    let mut parts = event_fields("Nameless Cover", r#"["rust"]"#);
    parts.push(Part::File("", "image/png", b"\x89PNG\r\n"));

    let (status, body) = send(&app, post_event(&parts)).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["event"]["image"], UPLOADED_URL);
    assert_eq!(host.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_image_is_rejected() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, body) =
        send(&app, post_event(&event_fields("No Cover", r#"["rust"]"#))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Image (file or URL string) is required"}));
}

#[tokio::test]
async fn malformed_tags_are_rejected_before_uploading() {
    let host = Arc::new(RecordingHost::default());
    let app = app(host.clone());

    let mut parts = event_fields("Bad Tags", "rust, web");
    parts.push(Part::File("cover.png", "image/png", b"\x89PNG\r\n"));

    let (status, body) = send(&app, post_event(&parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event Creation Failed");
    assert_eq!(body["error"], "tags must be a JSON array of strings");
    assert!(host.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_mode_is_rejected() {
    let app = app(Arc::new(RecordingHost::default()));

    let mut parts = event_fields("Odd Mode", r#"["rust"]"#);
    parts.retain(|part| !matches!(part, Part::Text("mode", _)));
    parts.push(Part::Text("mode", "virtual"));
    parts.push(Part::Text("image", "https://images.example.com/cover.png"));

    let (status, body) = send(&app, post_event(&parts)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Mode must be either online, offline, or hybrid");
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let host = Arc::new(RecordingHost::default());
    let app = app(host.clone());
    create_by_url(&app, "Tech Talk 2024", r#"["rust"]"#).await;

    let mut parts = event_fields("tech talk 2024", r#"["web"]"#);
    parts.push(Part::Text("image", "https://images.example.com/other.png"));
    let (status, body) = send(&app, post_event(&parts)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "An event with slug 'tech-talk-2024' already exists"
    );

    let mut parts = event_fields("Tech Talk 2024", r#"["web"]"#);
    parts.push(Part::File("cover.png", "image/png", b"\x89PNG\r\n"));
    let (status, _) = send(&app, post_event(&parts)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(host.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_upload_is_a_server_error() {
    let app = app(Arc::new(BrokenHost));

    let mut parts = event_fields("Rust Meetup", r#"["rust"]"#);
    parts.push(Part::File("cover.png", "image/png", b"\x89PNG\r\n"));

    let (status, body) = send(&app, post_event(&parts)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"message": "Event Creation Failed", "error": "Internal server error"})
    );
}

#[tokio::test]
async fn listings_are_newest_first() {
    let app = app(Arc::new(RecordingHost::default()));
    create_by_url(&app, "First", r#"["rust"]"#).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    create_by_url(&app, "Second", r#"["web"]"#).await;

    let (status, body) = send(&app, get("/events")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Events fetched successfully");
    assert_eq!(body["events"][0]["slug"], "second");
    assert_eq!(body["events"][1]["slug"], "first");

    let (status, body) = send(&app, get("/events/debug/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalEvents"], 2);
    assert_eq!(body["events"][0]["title"], "Second");
}

#[tokio::test]
async fn similar_events_share_a_tag() {
    let app = app(Arc::new(RecordingHost::default()));
    create_by_url(&app, "Rust Night", r#"["rust", "systems"]"#).await;
    create_by_url(&app, "Systems Day", r#"["systems"]"#).await;
    create_by_url(&app, "Design Jam", r#"["design"]"#).await;

    let (status, body) = send(&app, get("/events/rust-night/similar")).await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|event| event["slug"].as_str())
        .collect();
    assert_eq!(slugs, vec!["systems-day"]);

    let (_, body) = send(&app, get("/events/missing/similar")).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn booking_requires_an_existing_event() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, body) = send(
        &app,
        post_json("/bookings", json!({"eventId": "nope", "email": "a@b.co"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "error": "Event with ID nope does not exist"})
    );

    let created = create_by_url(&app, "Bookable", r#"["rust"]"#).await;
    let event_id = created["event"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        post_json(
            "/bookings",
            json!({"eventId": event_id, "email": " Ada@Example.COM "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["booking"]["eventId"], event_id);
    assert_eq!(body["booking"]["email"], "ada@example.com");

    let (status, body) = send(
        &app,
        post_json("/bookings", json!({"eventId": event_id, "email": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide a valid email address");
}

#[tokio::test]
async fn malformed_booking_body_uses_the_error_envelope() {
    let app = app(Arc::new(RecordingHost::default()));

    let request = Request::post("/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"eventId\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{body}");
}

#[tokio::test]
async fn diagnostics_report_a_connected_database() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, body) = send(&app, get("/diagnostics/db")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dbState"]["readyState"], 1);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = app(Arc::new(RecordingHost::default()));

    let (status, _) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/events/{slug}"].is_object());
}
