//! Integration tests for the proforma document service.
//!
//! Runs against real SQLite databases: in-memory for the single-writer
//! paths, a temp file (so multiple pool connections can write) for the
//! concurrent allocation property.

use chrono::{Datelike, Utc};
use tempfile::TempDir;

use miga_core::{ClientInput, ProformaInput, ProformaItemInput, ProformaStatus, User};
use miga_db::{Database, DbConfig, DbError};

async fn in_memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn seed_user(db: &Database, email: &str) -> String {
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        display_name: "Test".to_string(),
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap();
    user.id
}

fn sample_input() -> ProformaInput {
    ProformaInput {
        client_id: None,
        client_name: "Maria Jimenez".to_string(),
        client_company: "Cafetal SA".to_string(),
        client_tax_id: Some("3-101-123456".to_string()),
        discount_cents: Some(200),
        notes: Some("Entrega viernes".to_string()),
        status: None,
        items: vec![
            ProformaItemInput {
                description: "Bocadillos surtidos".to_string(),
                quantity: 2,
                unit_price_cents: 1500,
            },
            ProformaItemInput {
                description: "Cafe".to_string(),
                quantity: 1,
                unit_price_cents: 500,
            },
        ],
    }
}

#[tokio::test]
async fn create_computes_totals_and_allocates_number() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let doc = db.proformas().create(&owner, &sample_input()).await.unwrap();

    // 2 x 1500 + 1 x 500 = 3500, minus the 200 discount
    assert_eq!(doc.proforma.subtotal_cents, 3500);
    assert_eq!(doc.proforma.total_cents, 3300);
    assert_eq!(doc.proforma.status, ProformaStatus::Draft);

    let year = Utc::now().year() as i64;
    assert_eq!(doc.proforma.year, year);
    assert_eq!(doc.proforma.sequence, 1);
    assert_eq!(doc.proforma.number, format!("PF-{year}-0001"));
    assert_eq!(doc.items.len(), 2);
}

#[tokio::test]
async fn sequences_increase_per_owner_and_year() {
    let db = in_memory_db().await;
    let owner_a = seed_user(&db, "a@example.com").await;
    let owner_b = seed_user(&db, "b@example.com").await;

    let first = db.proformas().create(&owner_a, &sample_input()).await.unwrap();
    let second = db.proformas().create(&owner_a, &sample_input()).await.unwrap();
    let other = db.proformas().create(&owner_b, &sample_input()).await.unwrap();

    assert_eq!(first.proforma.sequence, 1);
    assert_eq!(second.proforma.sequence, 2);
    // Sequences are scoped per owner
    assert_eq!(other.proforma.sequence, 1);
}

#[tokio::test]
async fn deleted_sequences_are_not_reclaimed() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let first = db.proformas().create(&owner, &sample_input()).await.unwrap();
    let second = db.proformas().create(&owner, &sample_input()).await.unwrap();
    db.proformas().delete(&owner, &second.proforma.id).await.unwrap();

    let third = db.proformas().create(&owner, &sample_input()).await.unwrap();

    assert_eq!(first.proforma.sequence, 1);
    // MAX+1 only ever grows while rows exist; deleting the latest row may
    // reuse its slot, but never an interior one
    assert!(third.proforma.sequence >= 2);
}

#[tokio::test]
async fn update_replaces_items_and_keeps_number() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let created = db.proformas().create(&owner, &sample_input()).await.unwrap();

    let mut new_input = sample_input();
    new_input.items = vec![ProformaItemInput {
        description: "Queque de zanahoria".to_string(),
        quantity: 1,
        unit_price_cents: 12_000,
    }];
    new_input.discount_cents = None;
    new_input.status = Some(ProformaStatus::Sent);

    let updated = db
        .proformas()
        .update(&owner, &created.proforma.id, &new_input)
        .await
        .unwrap();

    // Full replacement: exactly the new items, nothing left over
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].description, "Queque de zanahoria");
    assert_eq!(updated.proforma.subtotal_cents, 12_000);
    assert_eq!(updated.proforma.total_cents, 12_000);
    assert_eq!(updated.proforma.status, ProformaStatus::Sent);

    // Allocation coordinates are immutable
    assert_eq!(updated.proforma.year, created.proforma.year);
    assert_eq!(updated.proforma.sequence, created.proforma.sequence);
    assert_eq!(updated.proforma.number, created.proforma.number);

    // And the stored rows agree
    let reloaded = db
        .proformas()
        .get_with_items(&owner, &created.proforma.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.items.len(), 1);
    assert_eq!(reloaded.proforma.number, created.proforma.number);
}

#[tokio::test]
async fn duplicate_copies_content_with_new_identity() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let mut input = sample_input();
    input.status = Some(ProformaStatus::Paid);
    let source = db.proformas().create(&owner, &input).await.unwrap();

    let copy = db
        .proformas()
        .duplicate(&owner, &source.proforma.id)
        .await
        .unwrap();

    assert_ne!(copy.proforma.id, source.proforma.id);
    assert_ne!(copy.proforma.number, source.proforma.number);
    assert_eq!(copy.proforma.sequence, source.proforma.sequence + 1);

    // Content equality except identity/number/timestamps
    assert_eq!(copy.proforma.client_name, source.proforma.client_name);
    assert_eq!(copy.proforma.client_company, source.proforma.client_company);
    assert_eq!(copy.proforma.client_tax_id, source.proforma.client_tax_id);
    assert_eq!(copy.proforma.discount_cents, source.proforma.discount_cents);
    assert_eq!(copy.proforma.notes, source.proforma.notes);
    assert_eq!(copy.proforma.subtotal_cents, source.proforma.subtotal_cents);
    assert_eq!(copy.proforma.total_cents, source.proforma.total_cents);
    assert_eq!(copy.proforma.status, source.proforma.status);

    assert_eq!(copy.items.len(), source.items.len());
    for (copied, original) in copy.items.iter().zip(source.items.iter()) {
        assert_ne!(copied.id, original.id);
        assert_eq!(copied.description, original.description);
        assert_eq!(copied.quantity, original.quantity);
        assert_eq!(copied.unit_price_cents, original.unit_price_cents);
    }
}

#[tokio::test]
async fn foreign_client_reference_is_invalid_reference_not_not_found() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;
    let other = seed_user(&db, "b@example.com").await;

    let foreign_client = db
        .clients()
        .insert(
            &other,
            &ClientInput {
                name: "Ajena".to_string(),
                company: "Otra SA".to_string(),
                tax_id: None,
            },
        )
        .await
        .unwrap();

    let mut input = sample_input();
    input.client_id = Some(foreign_client.id.clone());

    let err = db.proformas().create(&owner, &input).await.unwrap_err();
    assert!(matches!(err, DbError::InvalidReference { .. }));
}

#[tokio::test]
async fn documents_are_invisible_to_other_owners() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;
    let other = seed_user(&db, "b@example.com").await;

    let doc = db.proformas().create(&owner, &sample_input()).await.unwrap();

    let miss = db
        .proformas()
        .get_with_items(&other, &doc.proforma.id)
        .await
        .unwrap();
    assert!(miss.is_none());

    let err = db
        .proformas()
        .delete(&other, &doc.proforma.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { .. }));
}

#[tokio::test]
async fn deleting_a_client_keeps_the_document_snapshot() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let client = db
        .clients()
        .insert(
            &owner,
            &ClientInput {
                name: "Maria Jimenez".to_string(),
                company: "Cafetal SA".to_string(),
                tax_id: Some("3-101-123456".to_string()),
            },
        )
        .await
        .unwrap();

    let mut input = sample_input();
    input.client_id = Some(client.id.clone());
    let doc = db.proformas().create(&owner, &input).await.unwrap();

    db.clients().delete(&owner, &client.id).await.unwrap();

    let reloaded = db
        .proformas()
        .get_with_items(&owner, &doc.proforma.id)
        .await
        .unwrap()
        .unwrap();

    // Weak reference nulled, snapshot intact
    assert_eq!(reloaded.proforma.client_id, None);
    assert_eq!(reloaded.proforma.client_name, "Maria Jimenez");
    assert_eq!(reloaded.proforma.client_company, "Cafetal SA");
}

#[tokio::test]
async fn delete_cascades_to_items() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let doc = db.proformas().create(&owner, &sample_input()).await.unwrap();
    db.proformas().delete(&owner, &doc.proforma.id).await.unwrap();

    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM proforma_items WHERE proforma_id = ?1")
            .bind(&doc.proforma.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn search_matches_number_and_client_fields() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let doc = db.proformas().create(&owner, &sample_input()).await.unwrap();

    // By number fragment, case-insensitively
    let (hits, total) = db
        .proformas()
        .list(&owner, &doc.proforma.number.to_lowercase(), 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(hits[0].proforma.id, doc.proforma.id);

    // By client company
    let (hits, _) = db.proformas().list(&owner, "cafetal", 10, 0).await.unwrap();
    assert_eq!(hits.len(), 1);

    // No cross-owner leakage on an empty query
    let other = seed_user(&db, "b@example.com").await;
    let (hits, total) = db.proformas().list(&other, "", 10, 0).await.unwrap();
    assert!(hits.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn duplicate_tax_id_surfaces_as_unique_violation() {
    let db = in_memory_db().await;
    let owner = seed_user(&db, "a@example.com").await;

    let input = ClientInput {
        name: "Maria".to_string(),
        company: "Cafetal SA".to_string(),
        tax_id: Some("3-101-123456".to_string()),
    };
    db.clients().insert(&owner, &input).await.unwrap();

    let err = db.clients().insert(&owner, &input).await.unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));

    // A different owner may reuse the same tax id
    let other = seed_user(&db, "b@example.com").await;
    assert!(db.clients().insert(&other, &input).await.is_ok());
}

/// Concurrently creating N documents for one (owner, year) must yield N
/// distinct sequences with no duplicates and no allocator gaps.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_allocate_distinct_sequences() {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::new(dir.path().join("miga.db")).max_connections(4);
    let db = Database::new(config).await.unwrap();
    let owner = seed_user(&db, "a@example.com").await;

    const N: usize = 8;
    let mut handles = Vec::new();
    for _ in 0..N {
        let db = db.clone();
        let owner = owner.clone();
        handles.push(tokio::spawn(async move {
            db.proformas().create(&owner, &sample_input()).await
        }));
    }

    let mut sequences = Vec::new();
    for handle in handles {
        let doc = handle.await.unwrap().unwrap();
        sequences.push(doc.proforma.sequence);
    }

    sequences.sort_unstable();
    let expected: Vec<i64> = (1..=N as i64).collect();
    assert_eq!(sequences, expected);
}
