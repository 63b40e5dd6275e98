use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use shared::domain::{Coordinate, FoundReportId, LostReportId, PetCategory};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{
    ClientConfig, NewFoundFromLost, NewFoundReport, NewLostReport, PetMapClient,
    MAX_LOST_REPORT_PHOTOS,
};

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
    part_names: Arc<Mutex<Vec<String>>>,
    coordinate_part: Arc<Mutex<Option<String>>>,
    from_lost_path_id: Arc<Mutex<Option<String>>>,
    fail_found_listing: bool,
}

fn lost_json(id: &str, date: &str) -> Value {
    json!({
        "_id": id,
        "nombre": "Max",
        "fotos_perdida": ["uploads/max.jpg"],
        "tipo_mascota": "perro",
        "contacto": "555-1234",
        "ubicacion_perdida": "Parque Central",
        "fecha_perdida": date,
        "descripcion": "Golden retriever, red collar",
        "coordenadas": [-58.08, -32.31]
    })
}

fn found_json(id: &str) -> Value {
    json!({
        "_id": id,
        "foto_encontrada": "uploads/found.jpg",
        "tipo_mascota": "gato",
        "coordenadas": [-58.07, -32.30],
        "ubicacion_encontrada": "Plaza Norte",
        "fecha_encontrada": "2024-01-20T00:00:00.000Z",
        "contacto": "555-9999"
    })
}

async fn list_pets(State(state): State<MockState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": [lost_json("lost-1", "2024-01-10")] }))
}

async fn list_found(State(state): State<MockState>) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.fail_found_listing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "code": "internal", "message": "listing unavailable" })),
        );
    }
    (StatusCode::OK, Json(json!({ "data": [found_json("found-1")] })))
}

async fn get_found(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "code": "not_found", "message": "no such found report" })),
        );
    }
    (StatusCode::OK, Json(found_json(&id)))
}

async fn record_parts(state: &MockState, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.expect("field bytes");
        if name == "coordenadas" {
            *state.coordinate_part.lock().await =
                Some(String::from_utf8_lossy(&bytes).into_owned());
        }
        state.part_names.lock().await.push(name);
    }
}

async fn create_pet(State(state): State<MockState>, multipart: Multipart) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    record_parts(&state, multipart).await;
    Json(lost_json("created-lost", "2024-02-05"))
}

async fn create_found(State(state): State<MockState>, multipart: Multipart) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    record_parts(&state, multipart).await;
    Json(found_json("created-found"))
}

async fn create_from_lost(
    State(state): State<MockState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.from_lost_path_id.lock().await = Some(id);
    record_parts(&state, multipart).await;
    Json(found_json("converted-found"))
}

async fn spawn_mock(state: MockState) -> SocketAddr {
    let router = Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/found-pets", get(list_found).post(create_found))
        .route("/found-pets/from-lost/:id", post(create_from_lost))
        .route("/found-pets/:id", get(get_found))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

fn client_for(addr: SocketAddr) -> PetMapClient {
    PetMapClient::new(ClientConfig {
        server_url: format!("http://{addr}"),
    })
    .expect("client")
}

fn temp_photo(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .expect("temp photo");
    file.write_all(bytes).expect("write photo");
    file
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

#[tokio::test]
async fn fetch_reports_joins_both_listings() {
    let addr = spawn_mock(MockState::default()).await;
    let client = client_for(addr);

    let (lost, found) = client.fetch_reports().await.expect("fetch");
    assert_eq!(lost.len(), 1);
    assert_eq!(lost[0].id, LostReportId("lost-1".to_string()));
    assert_eq!(lost[0].loss_date, date(2024, 1, 10));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].found_date, date(2024, 1, 20));
}

#[tokio::test]
async fn fetch_reports_fails_as_a_whole_when_either_listing_fails() {
    let addr = spawn_mock(MockState {
        fail_found_listing: true,
        ..MockState::default()
    })
    .await;
    let client = client_for(addr);

    let err = client.fetch_reports().await.expect_err("should fail");
    assert!(err.to_string().to_lowercase().contains("listing unavailable"));
}

#[tokio::test]
async fn create_lost_report_sends_the_backend_part_names() {
    let state = MockState::default();
    let addr = spawn_mock(state.clone()).await;
    let client = client_for(addr);

    let photo_a = temp_photo(b"jpeg-a");
    let photo_b = temp_photo(b"jpeg-b");
    let draft = NewLostReport {
        name: "Max".to_string(),
        category: PetCategory::Dog,
        contact: "555-1234".to_string(),
        location: "Parque Central".to_string(),
        loss_date: date(2024, 1, 10),
        description: "Golden retriever".to_string(),
        coordinate: Coordinate::new(-58.08, -32.31),
        photos: vec![photo_a.path().to_path_buf(), photo_b.path().to_path_buf()],
    };

    let created = client.create_lost_report(&draft).await.expect("create");
    assert_eq!(created.id, LostReportId("created-lost".to_string()));

    let parts = state.part_names.lock().await.clone();
    for expected in [
        "nombre",
        "tipo_mascota",
        "contacto",
        "ubicacion_perdida",
        "fecha_perdida",
        "descripcion",
        "coordenadas",
    ] {
        assert!(parts.contains(&expected.to_string()), "missing part {expected}");
    }
    assert_eq!(
        parts.iter().filter(|name| *name == "fotos_perdida").count(),
        2
    );

    let coordinate = state.coordinate_part.lock().await.clone().expect("coordinate part");
    let decoded: [f64; 2] = serde_json::from_str(&coordinate).expect("lng/lat pair");
    assert_eq!(decoded, [-58.08, -32.31]);
}

#[tokio::test]
async fn lost_report_photo_cap_is_enforced_before_any_request() {
    let state = MockState::default();
    let addr = spawn_mock(state.clone()).await;
    let client = client_for(addr);

    let draft = NewLostReport {
        name: "Max".to_string(),
        category: PetCategory::Dog,
        contact: "555-1234".to_string(),
        location: "Parque Central".to_string(),
        loss_date: date(2024, 1, 10),
        description: "Golden retriever".to_string(),
        coordinate: Coordinate::new(-58.08, -32.31),
        photos: (0..MAX_LOST_REPORT_PHOTOS + 1)
            .map(|i| PathBuf::from(format!("photo-{i}.jpg")))
            .collect(),
    };

    let err = client.create_lost_report(&draft).await.expect_err("over cap");
    assert!(err.to_string().contains("at most"));
    assert_eq!(state.hits.load(Ordering::SeqCst), 0, "no request may be issued");
}

#[tokio::test]
async fn create_found_report_attaches_the_single_photo() {
    let state = MockState::default();
    let addr = spawn_mock(state.clone()).await;
    let client = client_for(addr);

    let photo = temp_photo(b"jpeg");
    let draft = NewFoundReport {
        category: PetCategory::Cat,
        location: "Plaza Norte".to_string(),
        found_date: date(2024, 1, 20),
        contact: "555-9999".to_string(),
        description: String::new(),
        coordinate: Coordinate::new(-58.07, -32.30),
        photo: photo.path().to_path_buf(),
    };

    client.create_found_report(&draft).await.expect("create");
    let parts = state.part_names.lock().await.clone();
    assert!(parts.contains(&"foto_encontrada".to_string()));
    assert!(parts.contains(&"tipo_mascota".to_string()));
}

#[tokio::test]
async fn found_from_lost_posts_to_the_linked_route_without_a_category() {
    let state = MockState::default();
    let addr = spawn_mock(state.clone()).await;
    let client = client_for(addr);

    let photo = temp_photo(b"jpeg");
    let draft = NewFoundFromLost {
        location: "Plaza Norte".to_string(),
        found_date: date(2024, 1, 20),
        contact: "555-9999".to_string(),
        description: "Seems healthy".to_string(),
        coordinate: Coordinate::new(-58.07, -32.30),
        photo: photo.path().to_path_buf(),
    };

    let created = client
        .create_found_from_lost(&LostReportId("lost-42".to_string()), &draft)
        .await
        .expect("convert");
    assert_eq!(created.id, FoundReportId("converted-found".to_string()));
    assert_eq!(
        state.from_lost_path_id.lock().await.clone(),
        Some("lost-42".to_string())
    );

    let parts = state.part_names.lock().await.clone();
    assert!(parts.contains(&"foto_encontrada".to_string()));
    assert!(
        !parts.contains(&"tipo_mascota".to_string()),
        "the category is inherited from the lost report"
    );
}

#[tokio::test]
async fn fetch_matches_aborts_when_any_lookup_fails() {
    let addr = spawn_mock(MockState::default()).await;
    let client = client_for(addr);

    let ok = client
        .fetch_matches(&[
            FoundReportId("match-1".to_string()),
            FoundReportId("match-2".to_string()),
        ])
        .await
        .expect("all present");
    assert_eq!(ok.len(), 2);
    assert_eq!(ok[0].id, FoundReportId("match-1".to_string()));
    assert_eq!(ok[1].id, FoundReportId("match-2".to_string()));

    let err = client
        .fetch_matches(&[
            FoundReportId("match-1".to_string()),
            FoundReportId("missing".to_string()),
        ])
        .await
        .expect_err("one missing fails the batch");
    assert!(err.to_string().contains("no such found report"));
}

#[test]
fn photo_url_prefixes_the_backend_base() {
    let client = PetMapClient::new(ClientConfig {
        server_url: "http://127.0.0.1:3000".to_string(),
    })
    .expect("client");

    let url = client.photo_url("uploads/max.jpg").expect("url");
    assert_eq!(url.as_str(), "http://127.0.0.1:3000/uploads/max.jpg");

    let url = client.photo_url("/uploads/max.jpg").expect("url");
    assert_eq!(url.as_str(), "http://127.0.0.1:3000/uploads/max.jpg");
}
