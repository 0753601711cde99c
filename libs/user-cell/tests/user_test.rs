use std::sync::Arc;

use assert_matches::assert_matches;

use shared_store::{Store, StoreError};
use user_cell::models::{CreateUserRequest, UpdateUserRequest, UserError, UserRole};
use user_cell::services::UserService;

async fn store_with_clinic() -> (Arc<Store>, uuid::Uuid) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let clinic_id = uuid::Uuid::new_v4();
    let id = clinic_id.to_string();
    store
        .write(move |tx| {
            tx.execute(
                "INSERT INTO clinics (id, name) VALUES (?1, 'North Paw')",
                rusqlite::params![id],
            )
            .map_err(StoreError::from)
        })
        .await
        .unwrap();
    (store, clinic_id)
}

fn user_request(clinic_id: uuid::Uuid, email: &str) -> CreateUserRequest {
    CreateUserRequest {
        clinic_id,
        name: "Marta Lima".to_string(),
        email: email.to_string(),
        role: UserRole::FrontDesk,
    }
}

#[tokio::test]
async fn create_get_and_list() {
    let (store, clinic_id) = store_with_clinic().await;
    let service = UserService::new(store);

    let created = service
        .create_user(user_request(clinic_id, "marta@northpaw.example"))
        .await
        .unwrap();
    assert_eq!(created.role, UserRole::FrontDesk);
    assert!(created.is_active);

    let fetched = service.get_user(created.id).await.unwrap();
    assert_eq!(fetched.email, "marta@northpaw.example");

    let listed = service.list_users_by_clinic(clinic_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn email_is_globally_unique() {
    let (store, clinic_id) = store_with_clinic().await;
    let service = UserService::new(store);

    service
        .create_user(user_request(clinic_id, "marta@northpaw.example"))
        .await
        .unwrap();
    let duplicate = service
        .create_user(user_request(clinic_id, "marta@northpaw.example"))
        .await;
    assert_matches!(
        duplicate,
        Err(UserError::Store(StoreError::DuplicateUnique(_)))
    );
}

#[tokio::test]
async fn update_rejects_taken_email() {
    let (store, clinic_id) = store_with_clinic().await;
    let service = UserService::new(store);

    service
        .create_user(user_request(clinic_id, "marta@northpaw.example"))
        .await
        .unwrap();
    let second = service
        .create_user(user_request(clinic_id, "paulo@northpaw.example"))
        .await
        .unwrap();

    let result = service
        .update_user(
            second.id,
            UpdateUserRequest {
                name: None,
                email: Some("marta@northpaw.example".to_string()),
                role: None,
                is_active: None,
            },
        )
        .await;
    assert_matches!(result, Err(UserError::Store(StoreError::DuplicateUnique(_))));
}

#[tokio::test]
async fn create_for_unknown_clinic_fails() {
    let (store, _) = store_with_clinic().await;
    let service = UserService::new(store);

    let result = service
        .create_user(user_request(uuid::Uuid::new_v4(), "ghost@example.com"))
        .await;
    assert_matches!(result, Err(UserError::Store(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn role_changes_persist() {
    let (store, clinic_id) = store_with_clinic().await;
    let service = UserService::new(store);

    let user = service
        .create_user(user_request(clinic_id, "marta@northpaw.example"))
        .await
        .unwrap();
    let updated = service
        .update_user(
            user.id,
            UpdateUserRequest {
                name: None,
                email: None,
                role: Some(UserRole::Admin),
                is_active: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, UserRole::Admin);
}
