//! FruitApiClient against a local stand-in for the fruit API.

use serde_json::json;
use smoothie_core::{LookupError, NutritionConfig, NutritionLookup};
use smoothie_nutrition::FruitApiClient;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

/// Serve a fake fruit API and return its base URL plus a request counter
fn spawn_fruit_api() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let routes = warp::path!("api" / "fruit" / String)
        .and(warp::get())
        .map(move |name: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            let (body, status) = match name.as_str() {
                "apple" => (
                    json!({
                        "name": "Apple",
                        "id": 6,
                        "family": "Rosaceae",
                        "order": "Rosales",
                        "genus": "Malus",
                        "nutritions": {"calories": 52, "fat": 0.4, "sugar": 10.3, "carbohydrates": 11.4, "protein": 0.3}
                    }),
                    StatusCode::OK,
                ),
                "ghost" => (json!({"error": "Not found"}), StatusCode::OK),
                "teapot" => (json!({"message": "brewing"}), StatusCode::INTERNAL_SERVER_ERROR),
                "garbled" => (json!([1, 2, 3]), StatusCode::OK),
                _ => (json!({"error": "Not found"}), StatusCode::NOT_FOUND),
            };
            warp::reply::with_status(warp::reply::json(&body), status)
        });

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (format!("http://{addr}/api/fruit"), hits)
}

fn client(base_url: String) -> FruitApiClient {
    FruitApiClient::new(&NutritionConfig {
        base_url,
        timeout_secs: 2,
        ..NutritionConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_and_decodes_record() {
    let (base_url, _) = spawn_fruit_api();
    let facts = client(base_url).lookup("apple").await.unwrap();

    assert_eq!(facts.name, "Apple");
    assert_eq!(facts.genus.as_deref(), Some("Malus"));
    assert_eq!(facts.nutritions["sugar"], 10.3);
}

#[tokio::test]
async fn successful_records_are_cached() {
    let (base_url, hits) = spawn_fruit_api();
    let client = client(base_url);

    client.lookup("apple").await.unwrap();
    client.lookup("apple").await.unwrap();
    client.lookup(" apple ").await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let (base_url, hits) = spawn_fruit_api();
    let client = client(base_url);

    assert!(client.lookup("kiwi").await.is_err());
    assert!(client.lookup("kiwi").await.is_err());

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn not_found_by_status_or_body() {
    let (base_url, _) = spawn_fruit_api();
    let client = client(base_url);

    assert_eq!(
        client.lookup("kiwi").await.unwrap_err(),
        LookupError::NotFound("kiwi".to_string())
    );
    assert_eq!(
        client.lookup("ghost").await.unwrap_err(),
        LookupError::NotFound("ghost".to_string())
    );
}

#[tokio::test]
async fn server_error_and_bad_body_are_distinguished() {
    let (base_url, _) = spawn_fruit_api();
    let client = client(base_url);

    assert_eq!(
        client.lookup("teapot").await.unwrap_err(),
        LookupError::Status {
            key: "teapot".to_string(),
            status: 500
        }
    );
    assert!(matches!(
        client.lookup("garbled").await.unwrap_err(),
        LookupError::Decode(_)
    ));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let addr: SocketAddr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client(format!("http://{addr}/api/fruit"));

    assert!(matches!(
        client.lookup("apple").await.unwrap_err(),
        LookupError::Transport(_)
    ));
}

#[tokio::test]
async fn blank_key_never_hits_the_network() {
    let (base_url, hits) = spawn_fruit_api();
    let client = client(base_url);

    assert!(client.lookup("   ").await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
