use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::core::{
    CalculatedProperty, EntryId, Investment, InvestmentReturn, InvestmentTotals, Results, Snapshot,
    calculate_investment_return, calculate_properties, summarize_investments,
};
use crate::errors::{Error, Result};
use crate::store::FileStore;

#[derive(Clone)]
struct AppState {
    store: Arc<FileStore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SavePayload {
    username: Option<String>,
    data: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoadQuery {
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReport {
    pub id: EntryId,
    #[serde(flatten)]
    pub investment: Investment,
    #[serde(flatten)]
    pub returns: InvestmentReturn,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    pub results: Results,
    pub properties: Vec<CalculatedProperty>,
    pub investments: Vec<InvestmentReport>,
    pub investment_totals: InvestmentTotals,
}

pub fn calculation_report(snapshot: &Snapshot) -> CalculationReport {
    CalculationReport {
        results: snapshot.results(),
        properties: calculate_properties(&snapshot.properties),
        investments: snapshot
            .investments
            .iter()
            .map(|entry| InvestmentReport {
                id: entry.id.clone(),
                investment: entry.data.clone(),
                returns: calculate_investment_return(&entry.data),
            })
            .collect(),
        investment_totals: summarize_investments(&snapshot.investments),
    }
}

pub fn report_from_json(raw: &str) -> Result<CalculationReport> {
    let snapshot: Snapshot = serde_json::from_str(raw)
        .map_err(|e| Error::validation(format!("invalid document: {e}")))?;
    Ok(calculation_report(&snapshot))
}

pub fn router(store: FileStore) -> Router {
    let state = AppState {
        store: Arc::new(store),
    };
    Router::new()
        .route("/api/save", post(save_handler))
        .route("/api/load", get(load_query_handler))
        .route("/api/load/:username", get(load_path_handler))
        .route("/api/calculate", post(calculate_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_http_server(config: ServerConfig) -> Result<()> {
    let app = router(FileStore::new(&config.save_dir));

    let listener = TcpListener::bind(config.addr).await?;
    info!(
        addr = %config.addr,
        save_dir = %config.save_dir.display(),
        "income calculator API listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn save_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SavePayload>, JsonRejection>,
) -> Response {
    let result: Result<()> = async {
        let Json(payload) =
            payload.map_err(|e| Error::validation(format!("invalid request body: {e}")))?;
        let (Some(username), Some(data)) = (payload.username, payload.data) else {
            return Err(Error::validation("username and data are required"));
        };
        let snapshot: Snapshot = serde_json::from_value(data)
            .map_err(|e| Error::validation(format!("invalid document: {e}")))?;
        state.store.save_document(&username, &snapshot).await
    }
    .await;

    match result {
        Ok(()) => json_response(
            StatusCode::OK,
            MessageResponse {
                message: "Data saved.".to_string(),
            },
        ),
        Err(e) => e.into_response(),
    }
}

async fn load_path_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    load_impl(&state, &username).await
}

async fn load_query_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<LoadQuery>, QueryRejection>,
) -> Response {
    match query.ok().and_then(|Query(q)| q.username) {
        Some(username) => load_impl(&state, &username).await,
        None => Error::validation("username is required").into_response(),
    }
}

async fn load_impl(state: &AppState, username: &str) -> Response {
    match state.store.load_raw(username).await {
        Ok(raw) => with_cache_control((
            [(header::CONTENT_TYPE, "application/json")],
            raw,
        )),
        Err(e) => e.into_response(),
    }
}

async fn calculate_handler(
    payload: std::result::Result<Json<Snapshot>, JsonRejection>,
) -> Response {
    let snapshot = match payload {
        Ok(Json(snapshot)) => snapshot,
        Err(e) => {
            return Error::validation(format!("invalid document: {e}")).into_response();
        }
    };
    json_response(StatusCode::OK, calculation_report(&snapshot))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(msg) => {
                warn!(error = %msg, "rejected request");
                error_response(StatusCode::BAD_REQUEST, &msg)
            }
            Error::NotFound(msg) => error_response(StatusCode::NOT_FOUND, &msg),
            Error::Io(e) => {
                error!(error = %e, "storage failure");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
            }
            Error::Json(e) => {
                error!(error = %e, "stored document is unreadable");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
            }
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn temp_store() -> FileStore {
        FileStore::new(
            std::env::temp_dir().join(format!("rendas-api-{}", uuid::Uuid::new_v4().simple())),
        )
    }

    fn sample_document() -> Value {
        json!({
            "capitalHumano": [
                { "id": "h1", "nome": "Salario", "rendimentoLiquido": 1500 }
            ],
            "imoveis": [
                {
                    "id": "p1",
                    "nome": "T2",
                    "valor": 150000,
                    "valorVenda": 0,
                    "renda": 750,
                    "irPercent": 25,
                    "imi": 300,
                    "condominio": 50,
                    "seguro": 20
                }
            ],
            "despesasExtras": [
                { "id": "e1", "nome": "Internet", "valorMensal": 30, "valorAnual": 360 }
            ],
            "investimentos": [
                {
                    "id": "i1",
                    "nome": "Deposito",
                    "valor": 10000,
                    "rendimentoBruto": 12,
                    "impostoPercent": 28,
                    "tipoJuros": "nominal"
                }
            ]
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("request should complete");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request")
    }

    #[tokio::test]
    async fn save_then_load_by_path_and_query() {
        let store = temp_store();
        let app = router(store.clone());

        let (status, body) = send(
            app.clone(),
            post_json(
                "/api/save",
                &json!({ "username": "ana.maria", "data": sample_document() }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
        assert!(store.dir().join("anamaria.json").exists());

        let (status, by_path) = send(app.clone(), get("/api/load/anamaria")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_path["imoveis"][0]["renda"], json!(750.0));
        assert_eq!(by_path["capitalHumano"][0]["id"], json!("h1"));

        let (status, by_query) = send(app, get("/api/load?username=ana.maria")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_query, by_path);

        std::fs::remove_dir_all(store.dir()).ok();
    }

    #[tokio::test]
    async fn save_requires_username_and_data() {
        let app = router(temp_store());

        let (status, body) = send(
            app.clone(),
            post_json("/api/save", &json!({ "data": sample_document() })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(
            app.clone(),
            post_json("/api/save", &json!({ "username": "ana" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app,
            post_json(
                "/api/save",
                &json!({ "username": "!!!", "data": sample_document() }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn save_rejects_malformed_documents() {
        let app = router(temp_store());

        let (status, _) = send(
            app.clone(),
            post_json("/api/save", &json!({ "username": "ana", "data": { "imoveis": 3 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app,
            post_json("/api/save", &json!({ "username": "ana", "data": "not a document" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn save_reports_storage_failure_as_server_error() {
        let blocker = std::env::temp_dir().join(format!(
            "rendas-api-file-{}",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::write(&blocker, b"not a directory").expect("write");
        let app = router(FileStore::new(&blocker));

        let (status, body) = send(
            app,
            post_json(
                "/api/save",
                &json!({ "username": "ana", "data": sample_document() }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("storage error"));

        std::fs::remove_file(blocker).ok();
    }

    #[tokio::test]
    async fn calculate_treats_zero_day_compounding_as_simple_interest() {
        let app = router(temp_store());
        let mut document = sample_document();
        document["investimentos"][0]["tipoJuros"] = json!("composto");
        document["investimentos"][0]["diasCapitalizacao"] = json!(0);

        let (status, body) = send(app, post_json("/api/calculate", &document)).await;
        assert_eq!(status, StatusCode::OK);
        let investment = &body["investments"][0];
        assert_eq!(investment["diasCapitalizacao"], json!(0));
        assert_approx(investment["grossAnnual"].as_f64().expect("number"), 1_200.0);
        assert_approx(investment["netMonthly"].as_f64().expect("number"), 72.0);
    }

    #[tokio::test]
    async fn load_reports_missing_user_and_data() {
        let app = router(temp_store());

        let (status, _) = send(app.clone(), get("/api/load/ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app.clone(), get("/api/load")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, get("/api/load?username=%2F%2F")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn calculate_returns_results_for_document() {
        let app = router(temp_store());

        let (status, body) = send(app, post_json("/api/calculate", &sample_document())).await;
        assert_eq!(status, StatusCode::OK);

        let results = &body["results"];
        assert_approx(results["humanCapitalMonthly"].as_f64().expect("number"), 1_500.0);
        assert_approx(results["netAfterExpensesMonthly"].as_f64().expect("number"), 467.5);
        assert_approx(results["finalPropertyIncomeMonthly"].as_f64().expect("number"), 437.5);
        assert_approx(results["investmentsMonthly"].as_f64().expect("number"), 72.0);
        assert_approx(results["totalIncomeMonthly"].as_f64().expect("number"), 2_009.5);
        assert_approx(results["totalIncomeAnnual"].as_f64().expect("number"), 24_114.0);

        let property = &body["properties"][0];
        assert_eq!(property["id"], json!("p1"));
        assert_eq!(property["nome"], json!("T2"));
        assert_approx(property["annualNetIncomeAfterExpenses"].as_f64().expect("number"), 5_610.0);

        let investment = &body["investments"][0];
        assert_eq!(investment["id"], json!("i1"));
        assert_eq!(investment["nome"], json!("Deposito"));
        assert_eq!(investment["tipoJuros"], json!("nominal"));
        assert_approx(investment["netAnnual"].as_f64().expect("number"), 864.0);
        assert_approx(body["investmentTotals"]["principal"].as_f64().expect("number"), 10_000.0);
    }

    #[tokio::test]
    async fn calculate_accepts_documents_without_human_capital() {
        let app = router(temp_store());
        let mut document = sample_document();
        document
            .as_object_mut()
            .expect("object")
            .remove("capitalHumano");

        let (status, body) = send(app, post_json("/api/calculate", &document)).await;
        assert_eq!(status, StatusCode::OK);
        assert_approx(body["results"]["humanCapitalMonthly"].as_f64().expect("number"), 0.0);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let app = router(temp_store());
        let (status, body) = send(app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Not found"));
    }

    #[test]
    fn report_from_json_accepts_english_keys() {
        let raw = r#"{
          "humanCapital": [{ "name": "Salary", "netMonthlyIncome": 2000 }],
          "properties": [],
          "extraExpenses": [{ "name": "Gym", "monthlyAmount": 40, "annualAmount": 480 }],
          "investments": [{
            "name": "Bond",
            "principal": 10000,
            "grossAnnualRatePercent": 12,
            "taxPercent": 28,
            "interestMode": "compound",
            "compoundingPeriodDays": 365
          }]
        }"#;
        let report = report_from_json(raw).expect("valid document");
        assert_approx(report.results.human_capital_monthly, 2_000.0);
        assert_approx(report.results.extra_expenses_annual, 480.0);
        assert_approx(report.investment_totals.net_annual, 864.0);
    }

    #[test]
    fn report_from_json_rejects_missing_collections() {
        let err = report_from_json(r#"{ "imoveis": [] }"#).expect_err("incomplete document");
        assert!(matches!(err, Error::Validation(_)));
    }
}
