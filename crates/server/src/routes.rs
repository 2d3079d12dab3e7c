use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use salit_core::{Recommender, ShoppingPrediction};
use salit_db::repositories::PredictionRepository;
use salit_db::{AnalyticsRunError, AnalyticsRunner, RunSummary};

/// Shared application state.
///
/// The recommender is scoped to a single user session; concurrent flushes
/// are last-writer-wins by design, so a plain mutex is enough.
#[derive(Clone)]
pub struct AppState {
    runner: Arc<AnalyticsRunner>,
    recommender: Arc<Mutex<Recommender>>,
    predictions: Arc<dyn PredictionRepository>,
}

impl AppState {
    pub fn new(
        runner: AnalyticsRunner,
        recommender: Recommender,
        predictions: Arc<dyn PredictionRepository>,
    ) -> Self {
        Self {
            runner: Arc::new(runner),
            recommender: Arc::new(Mutex::new(recommender)),
            predictions,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Storage(message) => (StatusCode::BAD_GATEWAY, message),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<AnalyticsRunError> for ApiError {
    fn from(value: AnalyticsRunError) -> Self {
        match value {
            AnalyticsRunError::MissingUser => ApiError::InvalidInput(value.to_string()),
            AnalyticsRunError::Repository(error) => ApiError::Storage(error.to_string()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analytics/runs", post(run_analytics))
        .route("/recommendations/{item}", get(recommendations))
        .route("/purchases", post(add_purchase))
        .route("/predictions/latest/{user_id}", get(latest_prediction))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AnalyticsRunRequest {
    #[serde(default)]
    user_id: String,
}

async fn run_analytics(
    State(state): State<AppState>,
    Json(request): Json<AnalyticsRunRequest>,
) -> Result<Json<RunSummary>, ApiError> {
    let summary = state.runner.run(&request.user_id).await?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    item: String,
    suggestions: Vec<String>,
}

async fn recommendations(
    State(state): State<AppState>,
    Path(item): Path<String>,
) -> Json<RecommendationsResponse> {
    let recommender = state.recommender.lock().await;
    let suggestions = recommender.get_recommendations(&item);
    Json(RecommendationsResponse { item, suggestions })
}

#[derive(Debug, Deserialize)]
struct PurchaseRequest {
    #[serde(default)]
    items: Vec<String>,
}

async fn add_purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> StatusCode {
    let mut recommender = state.recommender.lock().await;
    recommender.add_purchase_data(&request.items);
    StatusCode::NO_CONTENT
}

async fn latest_prediction(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ShoppingPrediction>, ApiError> {
    let prediction = state
        .predictions
        .latest_for_user(&user_id)
        .await
        .map_err(|error| ApiError::Storage(error.to_string()))?;

    prediction
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no prediction for user `{user_id}`")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tower::ServiceExt;

    use salit_core::{FixedClock, ItemRecord, MemoryStore, Recommender};
    use salit_db::repositories::{
        InMemoryItemHistoryRepository, InMemoryPatternRepository, InMemoryPredictionRepository,
        InMemoryProductAnalyticsRepository,
    };
    use salit_db::AnalyticsRunner;

    use super::{router, AppState};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    async fn state_with_history(records: Vec<ItemRecord>) -> AppState {
        let items = Arc::new(InMemoryItemHistoryRepository::default());
        items.seed("user-1", records).await;
        let predictions = Arc::new(InMemoryPredictionRepository::default());

        let runner = AnalyticsRunner::new(
            items,
            Arc::new(InMemoryProductAnalyticsRepository::default()),
            predictions.clone(),
            Arc::new(InMemoryPatternRepository::default()),
            Arc::new(FixedClock(now())),
        );

        let recommender =
            Recommender::new(Box::new(MemoryStore::default()), Box::new(FixedClock(now())));

        AppState::new(runner, recommender, predictions)
    }

    fn item(name: &str, days_ago: i64) -> ItemRecord {
        ItemRecord {
            name: name.to_string(),
            category: "מזון".to_string(),
            quantity: 1,
            created_at: now() - Duration::days(days_ago),
            completed_at: None,
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn analytics_run_reports_summary() {
        let state =
            state_with_history(vec![item("חלב", 19), item("חלב", 9), item("לחם", 1)]).await;
        let app = router(state);

        let response = app
            .oneshot(post_json("/analytics/runs", serde_json::json!({ "user_id": "user-1" })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["processed_products"], 2);
        assert_eq!(payload["predictions_generated"], 1);
    }

    #[tokio::test]
    async fn analytics_run_without_user_is_rejected() {
        let state = state_with_history(Vec::new()).await;
        let app = router(state);

        let response = app
            .oneshot(post_json("/analytics/runs", serde_json::json!({})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert!(payload["error"].as_str().expect("message").contains("user identity"));
    }

    #[tokio::test]
    async fn purchases_feed_recommendations() {
        let state = state_with_history(Vec::new()).await;
        let app = router(state);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/purchases",
                    serde_json::json!({ "items": ["פסטה", "פטריות"] }),
                ))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/recommendations/%D7%A4%D7%A1%D7%98%D7%94")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        let suggestions: Vec<&str> = payload["suggestions"]
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|value| value.as_str())
            .collect();
        assert!(suggestions.len() <= 3);
        assert_eq!(suggestions[0], "פטריות");
    }

    #[tokio::test]
    async fn latest_prediction_round_trips_after_run() {
        let state = state_with_history(vec![item("חלב", 19), item("חלב", 9)]).await;
        let app = router(state);

        let run_response = app
            .clone()
            .oneshot(post_json("/analytics/runs", serde_json::json!({ "user_id": "user-1" })))
            .await
            .expect("response");
        assert_eq!(run_response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/predictions/latest/user-1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["user_id"], "user-1");
        assert_eq!(payload["prediction_period"], "weekly");
        assert_eq!(payload["predicted_items"][0]["product_name"], "חלב");
    }

    #[tokio::test]
    async fn missing_prediction_is_not_found() {
        let state = state_with_history(Vec::new()).await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/predictions/latest/nobody")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
