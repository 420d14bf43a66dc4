//! End-to-end tests for the HTTP API.
//!
//! Each test builds the full router over a fresh temp-file SQLite database
//! and drives it with `tower::ServiceExt::oneshot` - no listener involved.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot
use uuid::Uuid;

use miga_api::pdf::token::PdfTokenSigner;
use miga_api::{routes, ApiConfig, AppState};
use miga_core::User;
use miga_db::{Database, DbConfig};

const PDF_TOKEN_SECRET: &str = "test-pdf-secret";

fn test_config() -> ApiConfig {
    ApiConfig {
        http_port: 0,
        database_path: ":memory:".to_string(), // unused; db handed in directly
        jwt_secret: "test-jwt-secret".to_string(),
        jwt_access_lifetime_secs: 3600,
        pdf_token_secret: PDF_TOKEN_SECRET.to_string(),
        public_base_url: None,
        chrome_executable: None,
        pdf_timeout_secs: 5,
    }
}

struct TestApp {
    app: Router,
    db: Database,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    let dir = TempDir::new().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("test.db")))
        .await
        .unwrap();
    let state = AppState::new(db.clone(), test_config());

    TestApp {
        app: routes::router(state),
        db,
        _dir: dir,
    }
}

async fn seed_user(db: &Database, email: &str, password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash,
        display_name: "Test".to_string(),
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap();
    user.id
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn sample_proforma() -> Value {
    json!({
        "clientName": "Maria Jimenez",
        "clientCompany": "Cafetal SA",
        "clientTaxId": "3-101-123456",
        "discountCents": 200,
        "notes": "Entrega viernes",
        "items": [
            { "description": "Bocadillos surtidos", "quantity": 2, "unitPriceCents": 1500 },
            { "description": "Cafe", "quantity": 1, "unitPriceCents": 500 }
        ]
    })
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "correct-horse").await;

    let (status, body) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@miga.cr", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Unknown accounts get the same answer
    let (status, _) = request(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@miga.cr", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&ctx.app, "ana@miga.cr", "correct-horse").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let ctx = setup().await;

    let (status, body) = request(&ctx.app, "GET", "/api/proformas", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = request(
        &ctx.app,
        "GET",
        "/api/proformas",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn client_crud_and_tax_id_conflict() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    let payload = json!({ "name": "Maria", "company": "Cafetal SA", "taxId": "3-101-1" });
    let (status, created) = request(
        &ctx.app,
        "POST",
        "/api/clients",
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = created["id"].as_str().unwrap().to_string();

    // Same tax id again → CONFLICT, distinct from validation failure
    let (status, body) = request(&ctx.app, "POST", "/api/clients", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Update and list
    let (status, updated) = request(
        &ctx.app,
        "PUT",
        &format!("/api/clients/{client_id}"),
        Some(&token),
        Some(json!({ "name": "Maria J.", "company": "Cafetal SA", "taxId": "3-101-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Maria J.");

    let (status, page) = request(
        &ctx.app,
        "GET",
        "/api/clients?q=cafetal",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    // Delete
    let (status, body) = request(
        &ctx.app,
        "DELETE",
        &format!("/api/clients/{client_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn proforma_create_update_duplicate_delete_flow() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    // Create: 2 x 1500 + 500 - 200 discount, DRAFT by default
    let (status, created) = request(
        &ctx.app,
        "POST",
        "/api/proformas",
        Some(&token),
        Some(sample_proforma()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["subtotalCents"], 3500);
    assert_eq!(created["totalCents"], 3300);
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["sequence"], 1);
    let number = created["number"].as_str().unwrap().to_string();
    assert!(number.starts_with("PF-"));
    assert!(number.ends_with("-0001"));
    let id = created["id"].as_str().unwrap().to_string();

    // Update: full item replacement, number untouched
    let (status, updated) = request(
        &ctx.app,
        "PUT",
        &format!("/api/proformas/{id}"),
        Some(&token),
        Some(json!({
            "clientName": "Maria Jimenez",
            "clientCompany": "Cafetal SA",
            "status": "SENT",
            "items": [
                { "description": "Queque de zanahoria", "quantity": 1, "unitPriceCents": 12000 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["items"].as_array().unwrap().len(), 1);
    assert_eq!(updated["subtotalCents"], 12000);
    assert_eq!(updated["totalCents"], 12000);
    assert_eq!(updated["status"], "SENT");
    assert_eq!(updated["number"], number.as_str());

    // Duplicate: fresh identity and number, content copied
    let (status, copy) = request(
        &ctx.app,
        "POST",
        &format!("/api/proformas/{id}/duplicate"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(copy["id"], updated["id"]);
    assert_eq!(copy["sequence"], 2);
    assert_eq!(copy["subtotalCents"], 12000);
    assert_eq!(copy["status"], "SENT");

    // Search by number finds the original
    let (status, page) = request(
        &ctx.app,
        "GET",
        &format!("/api/proformas?q={number}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);

    // Delete, then the document is gone
    let (status, _) = request(
        &ctx.app,
        "DELETE",
        &format!("/api/proformas/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &ctx.app,
        "GET",
        &format!("/api/proformas/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn foreign_client_reference_is_invalid_reference() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let other = seed_user(&ctx.db, "luis@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    let foreign_client = ctx
        .db
        .clients()
        .insert(
            &other,
            &miga_core::ClientInput {
                name: "Ajena".to_string(),
                company: "Otra SA".to_string(),
                tax_id: None,
            },
        )
        .await
        .unwrap();

    let mut payload = sample_proforma();
    payload["clientId"] = json!(foreign_client.id);

    let (status, body) = request(&ctx.app, "POST", "/api/proformas", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Distinct from NOT_FOUND: the reference is the problem
    assert_eq!(body["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn owners_cannot_see_each_others_documents() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    seed_user(&ctx.db, "luis@miga.cr", "pw").await;
    let ana = login(&ctx.app, "ana@miga.cr", "pw").await;
    let luis = login(&ctx.app, "luis@miga.cr", "pw").await;

    let (_, created) = request(
        &ctx.app,
        "POST",
        "/api/proformas",
        Some(&ana),
        Some(sample_proforma()),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = request(
        &ctx.app,
        "GET",
        &format!("/api/proformas/{id}"),
        Some(&luis),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, page) = request(&ctx.app, "GET", "/api/proformas", Some(&luis), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn validation_errors_carry_field_detail() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    let mut payload = sample_proforma();
    payload["items"][0]["quantity"] = json!(0);

    let (status, body) = request(&ctx.app, "POST", "/api/proformas", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("quantity"));

    // Empty item lists are rejected outright
    let mut payload = sample_proforma();
    payload["items"] = json!([]);
    let (status, body) = request(&ctx.app, "POST", "/api/proformas", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("items"));
}

#[tokio::test]
async fn menu_items_filter_by_category() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    for (category, name) in [
        ("BOCADILLOS", "Empanaditas"),
        ("POSTRES", "Brownies"),
        ("QUEQUES", "Queque de zanahoria"),
    ] {
        let (status, _) = request(
            &ctx.app,
            "POST",
            "/api/menu-items",
            Some(&token),
            Some(json!({ "category": category, "name": name, "priceCents": 500000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = request(
        &ctx.app,
        "GET",
        "/api/menu-items?category=POSTRES",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["name"], "Brownies");

    let (status, page) = request(&ctx.app, "GET", "/api/menu-items", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn settings_upsert_roundtrip() {
    let ctx = setup().await;
    seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    // Nothing stored yet
    let (status, body) = request(&ctx.app, "GET", "/api/company-settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    // First write creates; blank optionals normalize to null
    let (status, created) = request(
        &ctx.app,
        "PUT",
        "/api/company-settings",
        Some(&token),
        Some(json!({ "name": "Reposteria Miga", "phone": "  ", "email": "ventas@miga.cr" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Reposteria Miga");
    assert_eq!(created["phone"], Value::Null);

    // Second write updates in place
    let (status, updated) = request(
        &ctx.app,
        "PUT",
        "/api/company-settings",
        Some(&token),
        Some(json!({ "name": "Reposteria Miga CR" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Reposteria Miga CR");
    assert_eq!(updated["id"], created["id"]);
}

#[tokio::test]
async fn print_view_requires_a_valid_token() {
    let ctx = setup().await;
    let owner = seed_user(&ctx.db, "ana@miga.cr", "pw").await;
    let token = login(&ctx.app, "ana@miga.cr", "pw").await;

    let (_, created) = request(
        &ctx.app,
        "POST",
        "/api/proformas",
        Some(&token),
        Some(sample_proforma()),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let number = created["number"].as_str().unwrap().to_string();

    // No token → same 404 as a missing document
    let (status, _) = request(&ctx.app, "GET", &format!("/proformas/{id}/print"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Wrong token → 404
    let (status, _) = request(
        &ctx.app,
        "GET",
        &format!("/proformas/{id}/print?token=deadbeef"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Correct HMAC over (owner, document) → the rendered page
    let print_token = PdfTokenSigner::new(PDF_TOKEN_SECRET).sign(&owner, &id);
    let req = Request::builder()
        .method("GET")
        .uri(format!("/proformas/{id}/print?token={print_token}"))
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(&number));
    assert!(html.contains("Cafetal SA"));
    // Stored totals, in colones formatting
    assert!(html.contains("₡35,00")); // subtotal 3500 cents
    assert!(html.contains("₡33,00")); // total 3300 cents
}
