// API Integration Tests
//
// Exercises the HTTP surface against the bundled sample catalogue.
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use garden_optimizer::{create_router, AppState};
    use serde_json::Value;
    use tower::ServiceExt; // for oneshot

    // Helper: Create test app over the bundled data directory
    fn create_test_app() -> Result<axum::Router, Box<dyn std::error::Error>> {
        let data_dir = std::env::var("TEST_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        let state = AppState::new(&data_dir)?;
        Ok(create_router(state))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let app = match create_test_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Skipping test (sample data not available): {}", e);
                return;
            }
        };

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    // =========================================================================
    // Section 2: Catalogue listing
    // =========================================================================

    #[tokio::test]
    async fn test_list_plants() {
        let app = match create_test_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                return;
            }
        };

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/plants")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert!(body["rows"].as_u64().unwrap() > 0);
        let data = body["data"].as_array().unwrap();
        for plant in data {
            assert!(plant["id"].is_number());
            assert!(plant["species"].is_string());
            assert!(!plant["types"].as_array().unwrap().is_empty());
        }
    }

    // =========================================================================
    // Section 3: Optimization round-trips
    // =========================================================================

    #[tokio::test]
    async fn test_optimize_minimal_request() {
        let app = match create_test_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                return;
            }
        };

        let request = serde_json::json!({
            "userId": "u-1",
            "userExperience": 2,
            "ga": { "seed": 42, "populationSize": 24, "maxGenerations": 30 }
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/gardens/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["success"], true);

        let solutions = body["solutions"].as_array().unwrap();
        assert!(!solutions.is_empty() && solutions.len() <= 3);

        for solution in solutions {
            let fitness = solution["metrics"]["fitness"].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&fitness));
            assert!(solution["layout"]["dimensions"]["totalArea"].as_f64().unwrap() > 0.0);
            assert!(solution["validation"]["isValid"].is_boolean());
        }

        let metadata = &body["metadata"];
        assert!(metadata["totalGenerations"].as_u64().unwrap() >= 1);
        assert!(metadata["stoppingReason"].is_string());
        assert!(!metadata["selectedPlants"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_optimize_rejects_bad_experience() {
        let app = match create_test_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                return;
            }
        };

        let request = serde_json::json!({
            "userId": "u-1",
            "userExperience": 7
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/gardens/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = json_response(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_optimize_is_deterministic_with_a_seed() {
        let app = match create_test_app() {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Skipping test: {}", e);
                return;
            }
        };

        let request = serde_json::json!({
            "userId": "u-1",
            "userExperience": 2,
            "dimensions": { "width": 3.0, "height": 2.0 },
            "waterLimit": 120.0,
            "ga": { "seed": 7, "populationSize": 24, "maxGenerations": 30 }
        });

        let response1 = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/gardens/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body1: Value = json_response(response1).await;

        let response2 = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/gardens/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(request.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body2: Value = json_response(response2).await;

        assert_eq!(body1["solutions"], body2["solutions"]);
    }
}
