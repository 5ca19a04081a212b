use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_cell::models::{Availability, Doctor};
use doctor_cell::router::doctor_routes;
use doctor_cell::services::InMemoryDirectory;

#[tokio::test]
async fn test_availability_endpoint_returns_descriptor() {
    let directory = Arc::new(InMemoryDirectory::new());
    let doctor_id = Uuid::new_v4();
    directory
        .insert_doctor(Doctor {
            id: doctor_id,
            user_id: Uuid::new_v4(),
            specialities: Default::default(),
            qualifications: Default::default(),
            hospital_id: None,
            availability: Availability::new(["Friday"], ["09:00-10:00", "14:00-15:00"]),
        })
        .await;

    let response = doctor_routes(directory)
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["availability"]["days"], serde_json::json!(["Friday"]));
    assert_eq!(json["availability"]["time_slots"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_doctor_is_not_found() {
    let response = doctor_routes(Arc::new(InMemoryDirectory::new()))
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
