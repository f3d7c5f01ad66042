//! HTTP query service: `/names`, `/aggregate` and `/health` over a shared
//! read-only dataset.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::data::model::{AggregateRow, Dataset, Field, Record};
use crate::data::query::{self, QueryParams, SortOrder};
use crate::data::store::DatasetStore;
use crate::error::Error;

pub type AppState = Arc<Dataset>;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// Query string of `GET /names`.
#[derive(Debug, Default, Deserialize)]
pub struct NamesQuery {
    pub nome: Option<String>,
    pub cittadinanza: Option<String>,
    pub sesso: Option<String>,
    pub anno_min: Option<i32>,
    pub anno_max: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl NamesQuery {
    pub fn into_params(self) -> Result<QueryParams, Error> {
        let sort_field = non_empty(self.sort_by)
            .map(|f| f.parse::<Field>())
            .transpose()?;
        let sort_order = match non_empty(self.sort_order) {
            Some(o) => o.parse::<SortOrder>()?,
            None => SortOrder::Descending,
        };

        Ok(QueryParams {
            name_contains: self.nome,
            citizenship_group: self.cittadinanza,
            sex: self.sesso,
            birth_year_min: self.anno_min,
            birth_year_max: self.anno_max,
            sort_field,
            sort_order,
            group_field: None,
        })
    }
}

/// Query string of `GET /aggregate`. `by` is required.
#[derive(Debug, Deserialize)]
pub struct AggregateQuery {
    pub by: String,
    pub cittadinanza: Option<String>,
    pub sesso: Option<String>,
    pub anno_min: Option<i32>,
    pub anno_max: Option<i32>,
}

impl AggregateQuery {
    pub fn into_params(self) -> Result<QueryParams, Error> {
        Ok(QueryParams {
            citizenship_group: self.cittadinanza,
            sex: self.sesso,
            birth_year_min: self.anno_min,
            birth_year_max: self.anno_max,
            group_field: Some(self.by.parse::<Field>()?),
            ..Default::default()
        })
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Engine error rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            log::warn!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            log::error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

/// Query strings the extractor cannot decode (missing `by`, non-integer
/// years) get the same JSON error body as engine errors.
fn rejected(rejection: QueryRejection) -> ApiError {
    ApiError(Error::InvalidParameter(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn names(
    State(dataset): State<AppState>,
    query: Result<Query<NamesQuery>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Query(q) = query.map_err(rejected)?;
    log::debug!("GET /names {q:?}");
    let params = q.into_params()?;
    Ok(Json(query::filter_and_sort(&dataset, &params)?))
}

pub async fn aggregate(
    State(dataset): State<AppState>,
    query: Result<Query<AggregateQuery>, QueryRejection>,
) -> Result<Json<Vec<AggregateRow>>, ApiError> {
    let Query(q) = query.map_err(rejected)?;
    log::debug!("GET /aggregate {q:?}");
    let params = q.into_params()?;
    Ok(Json(query::aggregate(&dataset, &params)?))
}

pub async fn health(State(dataset): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: dataset.len(),
    })
}

/// All routes, open to any origin so a browser front-end can call them.
pub fn router(dataset: AppState) -> Router {
    Router::new()
        .route("/names", get(names))
        .route("/aggregate", get(aggregate))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(dataset)
}

// ---------------------------------------------------------------------------
// Service entry-point
// ---------------------------------------------------------------------------

/// Load the dataset, then serve until Ctrl-C. A missing or malformed
/// dataset aborts startup before the socket is bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = DatasetStore::new(&config.dataset_path);
    let dataset = store.load().context("loading names dataset")?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    log::info!("Listening on http://{}", config.bind);

    axum::serve(listener, router(dataset))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    log::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    fn dataset() -> AppState {
        let rec = |name: &str, group: &str, sex: &str, year: i32, occ: u64| Record {
            name: name.into(),
            citizenship_group: group.into(),
            sex: sex.into(),
            birth_year: year,
            occurrences: occ,
        };
        Arc::new(Dataset::from_records(vec![
            rec("Mario", "Italiani", "M", 2020, 5),
            rec("Mario", "Stranieri", "M", 2020, 2),
            rec("Sofia", "Italiani", "F", 2021, 9),
        ]))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = router(dataset())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn names_filters_by_substring() {
        let (status, body) = get_json("/names?nome=MAR").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["Cittadinanza"], "Italiani");
    }

    #[tokio::test]
    async fn names_sorts_descending_by_default() {
        let (status, body) = get_json("/names?sort_by=Occorrenze").await;
        assert_eq!(status, StatusCode::OK);
        let occ: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Occorrenze"].as_u64().unwrap())
            .collect();
        assert_eq!(occ, [9, 5, 2]);
    }

    #[tokio::test]
    async fn names_with_inverted_years_is_empty() {
        let (status, body) = get_json("/names?anno_min=2022&anno_max=2019").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn unknown_sort_field_is_a_client_error() {
        let (status, body) = get_json("/names?sort_by=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("colour"));
    }

    #[tokio::test]
    async fn aggregate_sums_by_group() {
        let (status, body) = get_json("/aggregate?by=Nome&sesso=m").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "Nome": "Mario", "Occorrenze": 7 }]));
    }

    #[tokio::test]
    async fn aggregate_by_year_orders_by_total() {
        let (_, body) = get_json("/aggregate?by=Anno%20Nascita").await;
        assert_eq!(
            body,
            json!([
                { "Anno Nascita": 2021, "Occorrenze": 9 },
                { "Anno Nascita": 2020, "Occorrenze": 7 }
            ])
        );
    }

    #[tokio::test]
    async fn aggregate_rejects_ungroupable_field() {
        let (status, _) = get_json("/aggregate?by=Occorrenze").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn aggregate_requires_by() {
        let (status, body) = get_json("/aggregate").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("by"));
    }

    #[tokio::test]
    async fn names_sorts_ascending_on_request() {
        let (status, body) = get_json("/names?sort_by=Occorrenze&sort_order=asc").await;
        assert_eq!(status, StatusCode::OK);
        let occ: Vec<u64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Occorrenze"].as_u64().unwrap())
            .collect();
        assert_eq!(occ, [2, 5, 9]);
    }

    #[tokio::test]
    async fn unknown_sort_order_is_a_client_error() {
        let (status, body) = get_json("/names?sort_by=Occorrenze&sort_order=up").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("'up'"));
    }

    #[tokio::test]
    async fn non_integer_year_is_a_json_client_error() {
        for uri in ["/names?anno_min=abc", "/aggregate?by=Nome&anno_max=abc"] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "records": 3 }));
    }
}
