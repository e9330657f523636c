//! Web API File Tests
//!
//! Integration tests for file upload, progress and delete endpoints.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use grove::file::{FileRepository, FileStorage};
use grove::web::handlers::AppState;
use grove::web::router::create_router;
use grove::Database;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

struct TestApp {
    server: TestServer,
    db: Arc<Database>,
    storage: FileStorage,
    _dir: TempDir,
}

/// Create a test server with an in-memory database and temporary storage.
async fn create_test_app(max_upload_size: Option<u64>) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let shared_db = Arc::new(db);

    let dir = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::new(dir.path()).expect("Failed to create file storage");

    let mut app_state = AppState::new(shared_db.clone(), storage.clone());
    if let Some(max) = max_upload_size {
        app_state = app_state.with_max_upload_size(max);
    }

    let router = create_router(Arc::new(app_state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db: shared_db,
        storage,
        _dir: dir,
    }
}

async fn create_folder(server: &TestServer, name: &str, parent_id: Option<i64>) -> i64 {
    let response = server
        .post("/api/folders/create")
        .json(&json!({ "name": name, "parent_id": parent_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["data"]["id"].as_i64().unwrap()
}

fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}

/// Stored payload name of a file, read from the database.
async fn stored_name(db: &Database, file_id: i64) -> String {
    FileRepository::new(db.pool())
        .get_by_id(file_id)
        .await
        .unwrap()
        .expect("file row")
        .file_path
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_to_root() {
    let app = create_test_app(None).await;

    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form("report.pdf", b"%PDF-1.7 test"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "report.pdf");
    assert_eq!(body["data"]["file_type"], "pdf");
    assert_eq!(body["data"]["size"], 13);
    assert!(body["data"]["folder_id"].is_null());

    let id = body["data"]["id"].as_i64().unwrap();
    let stored = stored_name(&app.db, id).await;
    assert!(app.storage.exists(&stored));

    // Root-level files take part in root selection
    let body: Value = app.server.get("/api/folders").await.json();
    assert_eq!(body["data"][0]["type"], "file");
    assert_eq!(body["data"][0]["id"], id);
    assert_eq!(body["counts"]["total_files"], 1);
}

#[tokio::test]
async fn test_upload_into_folder() {
    let app = create_test_app(None).await;
    let docs = create_folder(&app.server, "Docs", None).await;
    let year = create_folder(&app.server, "2024", Some(docs)).await;

    let form = file_form("scan.PNG", b"\x89PNG....")
        .add_text("folder_id", year)
        .add_text("description", "Scanned receipt");
    let response = app.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["folder_id"], year);
    assert_eq!(body["data"]["file_type"], "png");
    assert_eq!(body["data"]["description"], "Scanned receipt");
    let file_id = body["data"]["id"].as_i64().unwrap();

    let body: Value = app.server.get("/api/folders").await.json();
    let root = &body["data"][0];
    assert_eq!(root["file_count"], 0);
    let child = &root["children"][0];
    assert_eq!(child["file_count"], 1);
    assert_eq!(child["children"][0]["id"], file_id);
    assert_eq!(child["children"][0]["type"], "file");
    assert_eq!(child["children"][0]["parent_id"], year);
}

#[tokio::test]
async fn test_upload_jpeg_alias() {
    let app = create_test_app(None).await;

    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form("holiday.jpeg", b"jpegdata"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["file_type"], "jpg");
}

#[tokio::test]
async fn test_upload_declared_type() {
    let app = create_test_app(None).await;

    let form = file_form("diagram", b"<svg/>").add_text("file_type", "svg");
    let response = app.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["data"]["file_type"], "svg");
}

#[tokio::test]
async fn test_upload_unsupported_type() {
    let app = create_test_app(None).await;

    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form("setup.exe", b"MZ"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "UNSUPPORTED_FILE_TYPE"
    );

    let body: Value = app.server.get("/api/folders").await.json();
    assert_eq!(body["counts"]["total_files"], 0);
}

#[tokio::test]
async fn test_upload_folder_not_found() {
    let app = create_test_app(None).await;

    let form = file_form("report.pdf", b"data").add_text("folder_id", 999);
    let response = app.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "FOLDER_NOT_FOUND");
}

#[tokio::test]
async fn test_upload_invalid_folder_id() {
    let app = create_test_app(None).await;

    let form = file_form("report.pdf", b"data").add_text("folder_id", "docs");
    let response = app.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = create_test_app(Some(1024)).await;

    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form("big.txt", &[b'x'; 4096]))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "PAYLOAD_TOO_LARGE"
    );
}

#[tokio::test]
async fn test_upload_file_name_too_long() {
    let app = create_test_app(None).await;

    let filename = format!("{}.txt", "a".repeat(256));
    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form(&filename, b"text"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    let body: Value = app.server.get("/api/folders").await.json();
    assert_eq!(body["counts"]["total_files"], 0);
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = create_test_app(None).await;

    let form = MultipartForm::new().add_text("description", "nothing attached");
    let response = app.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_REQUEST");
}

// ============================================================================
// Progress Tests
// ============================================================================

#[tokio::test]
async fn test_upload_progress_completed() {
    let app = create_test_app(None).await;
    let upload_id = Uuid::new_v4();

    let response = app
        .server
        .post("/api/files/upload")
        .add_query_param("upload_id", upload_id)
        .multipart(file_form("notes.txt", b"hello"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let file_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .get(&format!("/api/files/progress/{}", upload_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["progress"], 100);
    assert_eq!(body["data"]["file_id"], file_id);
    assert_eq!(body["data"]["received_bytes"], 5);

    // Terminal states are reported once
    let response = app
        .server
        .get(&format!("/api/files/progress/{}", upload_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_progress_failed() {
    let app = create_test_app(None).await;
    let upload_id = Uuid::new_v4();

    let response = app
        .server
        .post("/api/files/upload")
        .add_query_param("upload_id", upload_id)
        .multipart(file_form("virus.exe", b"MZ"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = app
        .server
        .get(&format!("/api/files/progress/{}", upload_id))
        .await
        .json();
    assert_eq!(body["data"]["status"], "failed");
    assert!(body["data"]["error"].as_str().unwrap().contains("exe"));
}

#[tokio::test]
async fn test_upload_progress_unknown() {
    let app = create_test_app(None).await;

    let response = app
        .server
        .get(&format!("/api/files/progress/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let app = create_test_app(None).await;

    let response = app
        .server
        .post("/api/files/upload")
        .multipart(file_form("report.pdf", b"data"))
        .await;
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();
    let stored = stored_name(&app.db, id).await;

    let response = app.server.delete(&format!("/api/files/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"]["deleted_files"], 1);
    assert!(!app.storage.exists(&stored));

    let response = app.server.delete(&format!("/api/files/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_folder_removes_files() {
    let app = create_test_app(None).await;
    let docs = create_folder(&app.server, "Docs", None).await;
    let year = create_folder(&app.server, "2024", Some(docs)).await;

    let mut stored = Vec::new();
    for (name, folder) in [("a.txt", docs), ("b.txt", year), ("c.txt", year)] {
        let form = file_form(name, b"text").add_text("folder_id", folder);
        let response = app.server.post("/api/files/upload").multipart(form).await;
        let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();
        stored.push(stored_name(&app.db, id).await);
    }
    // A root file outside the subtree survives
    app.server
        .post("/api/files/upload")
        .multipart(file_form("keep.txt", b"text"))
        .await;

    let response = app.server.delete(&format!("/api/folders/{}", docs)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["deleted_folders"], 2);
    assert_eq!(body["data"]["deleted_files"], 3);

    for name in &stored {
        assert!(!app.storage.exists(name));
    }

    let body: Value = app.server.get("/api/folders").await.json();
    assert_eq!(body["counts"]["total_folders"], 0);
    assert_eq!(body["counts"]["total_files"], 1);
    assert_eq!(body["data"][0]["name"], "keep.txt");
}
