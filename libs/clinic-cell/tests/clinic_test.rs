use std::sync::Arc;

use assert_matches::assert_matches;

use clinic_cell::models::{
    ClinicError, CreateClinicRequest, CreateOperatingHoursRequest, UpdateClinicRequest,
    UpdateOperatingHoursRequest,
};
use clinic_cell::services::{ClinicService, OperatingHoursService};
use shared_store::{Store, StoreError};

fn test_store() -> Arc<Store> {
    Arc::new(Store::open_in_memory().unwrap())
}

fn clinic_request(name: &str) -> CreateClinicRequest {
    CreateClinicRequest {
        name: name.to_string(),
        address: Some("Rua das Flores, 100".to_string()),
        settings: None,
    }
}

#[tokio::test]
async fn create_and_get_clinic() {
    let store = test_store();
    let service = ClinicService::new(store.clone());

    let created = service.create_clinic(clinic_request("North Paw")).await.unwrap();
    assert!(created.is_active);
    assert_eq!(created.settings, serde_json::json!({}));

    let fetched = service.get_clinic(created.id).await.unwrap();
    assert_eq!(fetched.name, "North Paw");
}

#[tokio::test]
async fn duplicate_clinic_name_is_rejected() {
    let store = test_store();
    let service = ClinicService::new(store.clone());

    service.create_clinic(clinic_request("North Paw")).await.unwrap();
    let result = service.create_clinic(clinic_request("North Paw")).await;
    assert_matches!(result, Err(ClinicError::Store(StoreError::DuplicateUnique(_))));
}

#[tokio::test]
async fn short_clinic_name_is_rejected() {
    let store = test_store();
    let service = ClinicService::new(store.clone());
    let result = service.create_clinic(clinic_request("ab")).await;
    assert_matches!(result, Err(ClinicError::ValidationError(_)));
}

#[tokio::test]
async fn deactivated_clinic_drops_out_of_listing() {
    let store = test_store();
    let service = ClinicService::new(store.clone());

    let clinic = service.create_clinic(clinic_request("North Paw")).await.unwrap();
    service.create_clinic(clinic_request("South Paw")).await.unwrap();

    service.deactivate_clinic(clinic.id).await.unwrap();

    let listed = service.list_clinics().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "South Paw");

    // Still reachable directly.
    let fetched = service.get_clinic(clinic.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn update_refreshes_updated_at_automatically() {
    let store = test_store();
    let service = ClinicService::new(store.clone());

    let clinic = service.create_clinic(clinic_request("North Paw")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let updated = service
        .update_clinic(
            clinic.id,
            UpdateClinicRequest {
                name: None,
                address: Some("Av. Central, 9".to_string()),
                settings: None,
                is_active: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("Av. Central, 9"));
    assert!(updated.updated_at > clinic.updated_at);
    assert_eq!(updated.created_at, clinic.created_at);
}

#[tokio::test]
async fn hours_enforce_one_row_per_weekday() {
    let store = test_store();
    let clinics = ClinicService::new(store.clone());
    let hours = OperatingHoursService::new(store.clone());

    let clinic = clinics.create_clinic(clinic_request("North Paw")).await.unwrap();
    hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 1,
                opens_at: "09:00".to_string(),
                closes_at: "17:00".to_string(),
            },
        )
        .await
        .unwrap();

    let duplicate = hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 1,
                opens_at: "08:00".to_string(),
                closes_at: "12:00".to_string(),
            },
        )
        .await;
    assert_matches!(
        duplicate,
        Err(ClinicError::Store(StoreError::DuplicateUnique(_)))
    );
}

#[tokio::test]
async fn hours_validation_rejects_inverted_window() {
    let store = test_store();
    let clinics = ClinicService::new(store.clone());
    let hours = OperatingHoursService::new(store.clone());

    let clinic = clinics.create_clinic(clinic_request("North Paw")).await.unwrap();
    let result = hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 2,
                opens_at: "18:00".to_string(),
                closes_at: "09:00".to_string(),
            },
        )
        .await;
    assert_matches!(result, Err(ClinicError::InvalidHours));
}

#[tokio::test]
async fn hours_update_keeps_weekday_unique() {
    let store = test_store();
    let clinics = ClinicService::new(store.clone());
    let hours = OperatingHoursService::new(store.clone());

    let clinic = clinics.create_clinic(clinic_request("North Paw")).await.unwrap();
    hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 1,
                opens_at: "09:00".to_string(),
                closes_at: "17:00".to_string(),
            },
        )
        .await
        .unwrap();
    let tuesday = hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 2,
                opens_at: "09:00".to_string(),
                closes_at: "17:00".to_string(),
            },
        )
        .await
        .unwrap();

    let result = hours
        .update_hours(
            tuesday.id,
            UpdateOperatingHoursRequest {
                weekday: Some(1),
                opens_at: None,
                closes_at: None,
            },
        )
        .await;
    assert_matches!(
        result,
        Err(ClinicError::Store(StoreError::DuplicateUnique(_)))
    );
}

#[tokio::test]
async fn clinic_delete_removes_hours() {
    let store = test_store();
    let clinics = ClinicService::new(store.clone());
    let hours = OperatingHoursService::new(store.clone());

    let clinic = clinics.create_clinic(clinic_request("North Paw")).await.unwrap();
    let monday = hours
        .create_hours(
            clinic.id,
            CreateOperatingHoursRequest {
                weekday: 1,
                opens_at: "09:00".to_string(),
                closes_at: "17:00".to_string(),
            },
        )
        .await
        .unwrap();

    clinics.delete_clinic(clinic.id).await.unwrap();

    assert_matches!(
        clinics.get_clinic(clinic.id).await,
        Err(ClinicError::Store(StoreError::NotFound { .. }))
    );
    assert_matches!(
        hours.get_hours(monday.id).await,
        Err(ClinicError::Store(StoreError::NotFound { .. }))
    );
}
