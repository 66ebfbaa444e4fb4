//! Shared tests for BucketRepo implementations

use uuid::Uuid;

use crate::{
    db::{DbPool, error::DbError},
    models::{CreateBucket, CreateProject, CreateUser},
};

async fn create_project(db: &DbPool) -> Uuid {
    let owner = db
        .users()
        .create(CreateUser {
            email: format!("{}@example.com", Uuid::new_v4()),
            full_name: "Owner".into(),
            short_name: None,
            external_id: None,
        })
        .await
        .unwrap();
    db.projects()
        .create(CreateProject {
            owner_id: owner.id,
            name: "bucket-tests".into(),
        })
        .await
        .unwrap()
        .id
}

fn bucket(project_id: Uuid, name: &str, object_lock_enabled: bool) -> CreateBucket {
    CreateBucket {
        project_id,
        name: name.to_string(),
        object_lock_enabled,
    }
}

// ============================================================================
// Shared Test Functions
// ============================================================================

pub async fn test_list_by_project_pages_by_name(db: &DbPool) {
    let project = create_project(db).await;
    let other = create_project(db).await;
    for name in ["charlie", "alpha", "bravo"] {
        db.buckets().create(bucket(project, name, false)).await.unwrap();
    }
    db.buckets().create(bucket(other, "zulu", false)).await.unwrap();

    let first = db.buckets().list_by_project(project, None, 2).await.unwrap();
    assert!(first.more);
    assert_eq!(
        first.buckets.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        vec!["alpha", "bravo"]
    );

    let second = db
        .buckets()
        .list_by_project(project, Some("bravo"), 2)
        .await
        .unwrap();
    assert!(!second.more);
    assert_eq!(second.buckets.len(), 1);
    assert_eq!(second.buckets[0].name, "charlie");
}

pub async fn test_duplicate_bucket_fails(db: &DbPool) {
    let project = create_project(db).await;
    db.buckets().create(bucket(project, "dup", false)).await.unwrap();

    let result = db.buckets().create(bucket(project, "dup", true)).await;
    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_count_object_lock_buckets(db: &DbPool) {
    let project = create_project(db).await;
    assert_eq!(db.buckets().count_object_lock_buckets(project).await.unwrap(), 0);

    db.buckets().create(bucket(project, "plain", false)).await.unwrap();
    db.buckets().create(bucket(project, "locked-1", true)).await.unwrap();
    db.buckets().create(bucket(project, "locked-2", true)).await.unwrap();

    assert_eq!(db.buckets().count_object_lock_buckets(project).await.unwrap(), 2);
}

// ============================================================================
// SQLite Tests
// ============================================================================

mod sqlite_tests {
    use crate::db::tests::harness::create_test_db;

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let (db, _clock) = create_test_db().await;
                super::$name(&db).await;
            }
        };
    }

    sqlite_test!(test_list_by_project_pages_by_name);
    sqlite_test!(test_duplicate_bucket_fails);
    sqlite_test!(test_count_object_lock_buckets);
}
