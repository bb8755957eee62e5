//! PostgreSQL repository tests
//!
//! Require a disposable database:
//! `LIBRIS_TEST_DATABASE_URL=postgres://... cargo test -p libris-providers --features full -- --ignored`

use chrono::NaiveDate;
use libris_domain::entities::{
    CirculationReturn, Gender, IdentityPatch, NewBook, NewCirculation, NewIdentity, NewMember,
};
use libris_domain::repositories::{
    BookRepository, CirculationRepository, IdentityRepository, MemberRepository,
    RoleAssignmentRepository, RoleRepository,
};
use libris_domain::value_objects::RoleName;
use libris_providers::database::{DatabaseConfig, DatabasePool, PostgresCatalog, PostgresDirectory};
use std::sync::Arc;

async fn pool() -> DatabasePool {
    let url = std::env::var("LIBRIS_TEST_DATABASE_URL")
        .expect("LIBRIS_TEST_DATABASE_URL must be set for PostgreSQL tests");
    let config = DatabaseConfig {
        enabled: true,
        url,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::new(&config).unwrap();
    pool.apply_schema().await.unwrap();
    pool
}

fn unique(label: &str) -> String {
    format!("{label}-{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_identity_roles_and_version_roundtrip() {
    let directory = PostgresDirectory::new(pool().await);
    let email = format!("{}@example.test", unique("reader"));
    let identity = IdentityRepository::create(
        &directory,
        NewIdentity {
            name: "Reader".to_string(),
            email: email.clone(),
            password_hash: "$argon2id$placeholder".to_string(),
            avatar: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(identity.token_version, 0);
    assert!(identity.roles.is_empty());

    let staff = match RoleRepository::get_by_name(&directory, RoleName::Staff)
        .await
        .unwrap()
    {
        Some(role) => role,
        None => RoleRepository::create(&directory, RoleName::Staff).await.unwrap(),
    };
    directory.assign(&identity.id, &staff.id).await.unwrap();

    let loaded = IdentityRepository::get_by_id(&directory, &identity.id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.has_role(RoleName::Staff));

    let updated = IdentityRepository::update(
        &directory,
        &identity.id,
        IdentityPatch {
            password_hash: Some("$argon2id$other".to_string()),
            ..IdentityPatch::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.token_version, 1);
    assert_eq!(
        directory.increment_token_version(&identity.id).await.unwrap(),
        2
    );

    IdentityRepository::delete(&directory, &identity.id).await.unwrap();
    assert!(directory.holders(&staff.id).await.unwrap().iter().all(|id| id != &identity.id));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_member_codes_are_unique() {
    let catalog = Arc::new(PostgresCatalog::new(pool().await));
    let mut tasks = Vec::new();
    for n in 0..8 {
        let catalog = Arc::clone(&catalog);
        tasks.push(tokio::spawn(async move {
            MemberRepository::create(
                catalog.as_ref(),
                NewMember {
                    name: unique(&format!("member{n}")),
                    gender: Gender::Male,
                    class: "X".to_string(),
                    phone: unique("phone"),
                    photo: None,
                },
            )
            .await
        }));
    }

    let mut codes = Vec::new();
    for task in tasks {
        // Contention is an acceptable outcome; duplicates are not
        if let Ok(member) = task.await.unwrap() {
            codes.push(member.code);
        }
    }
    let total = codes.len();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), total);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_open_loan_per_book_and_return_roundtrip() {
    let catalog = PostgresCatalog::new(pool().await);
    let member = MemberRepository::create(
        &catalog,
        NewMember {
            name: unique("borrower"),
            gender: Gender::Female,
            class: "XI".to_string(),
            phone: unique("phone"),
            photo: None,
        },
    )
    .await
    .unwrap();
    let book = BookRepository::create(
        &catalog,
        NewBook {
            title: unique("title"),
            ..NewBook::default()
        },
    )
    .await
    .unwrap();

    let borrowed_on = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let new_loan = NewCirculation {
        member_id: member.id.clone(),
        book_id: book.id.clone(),
        borrowed_on,
        due_on: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
        fine: 0,
    };
    let loan = CirculationRepository::create(&catalog, new_loan.clone())
        .await
        .unwrap();
    assert!(loan.code.starts_with("SKL"));
    assert_eq!(loan.borrowed_on, borrowed_on);

    let twice = CirculationRepository::create(&catalog, new_loan).await.unwrap_err();
    assert!(twice.is_conflict());

    let returned = CirculationReturn {
        returned_on: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        fine: 500,
    };
    let closed = catalog.mark_returned(&loan.id, returned).await.unwrap();
    assert_eq!(closed.returned_on, Some(returned.returned_on));
    assert!(catalog.find_open_by_book(&book.id).await.unwrap().is_none());
    assert!(catalog.mark_returned(&loan.id, returned).await.is_err());

    CirculationRepository::delete(&catalog, &loan.id).await.unwrap();
}
