use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use handlebars::TemplateError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::catalog::{BUSINESS_TYPES, CATEGORIES, positions};
use crate::config::ServerArgs;
use crate::pages::{BazaarView, ErrorView, HomeView, LeaderboardView, Pages, ParticipantsView};
use crate::records::{BazaarFilter, BazaarStats, ParticipantFilter, ParticipantStats};
use crate::service::{EventService, FallbackPolicy, Fetched, ServiceError};
use crate::sheets::{SheetsError, cell_text};
use crate::standings::{Medal, Standing, compute_standings, ranked, short_team_name};
use crate::validation::{BazaarSubmission, FieldErrors, RegistrationSubmission, ResultSubmission};

pub struct AppState {
    service: EventService,
    roster: Vec<String>,
    pages: Pages,
}

impl AppState {
    pub fn new(service: EventService, roster: Vec<String>) -> Result<Self, TemplateError> {
        Ok(AppState {
            service,
            roster,
            pages: Pages::new()?,
        })
    }
}

#[derive(Deserialize)]
struct RangeQuery {
    range: Option<String>,
}

#[derive(Deserialize)]
struct AppendRequest {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// One row of the standings API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedStanding<'a> {
    rank: usize,
    short_name: &'a str,
    medal: Option<Medal>,
    #[serde(flatten)]
    standing: &'a Standing,
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared state holding the event service, roster and page templates
///
/// # Returns
/// * `Router` - All pages and API routes with a permissive CORS layer
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(serve_home))
        .route("/leaderboard", get(serve_leaderboard))
        .route("/participants", get(serve_participants))
        .route("/bazaar", get(serve_bazaar))
        .route("/api/catalog", get(get_catalog))
        .route("/api/standings", get(get_standings))
        .route(
            "/api/sheets/leaderboard",
            get(list_results)
                .post(add_result)
                .put(update_result)
                .delete(delete_result),
        )
        .route("/api/participants", get(list_participants).post(add_participant))
        .route("/api/bazaar", get(list_bazaar).post(add_bazaar))
        .route("/api/sheets/get", get(read_range))
        .route("/api/sheets/append", post(append_range))
        .route("/api/sheets/test", get(test_connection))
        .layer(cors)
        .with_state(state)
}

/// Resolve configuration, open the store and serve until the process is stopped
pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.source.resolve()?;
    let service = config.service()?;
    if config.fallback == FallbackPolicy::Demo {
        log::warn!("Demo fallback is on: failed reads will serve sample data");
    }

    let state = Arc::new(AppState::new(service, config.roster)?);
    let app = build_router(state);

    let listener = TcpListener::bind(args.bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn store_failure(context: &str, e: &SheetsError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": context,
            "details": {
                "code": e.code(),
                "message": e.to_string(),
                "suggestions": e.suggestions(),
            },
        })),
    )
        .into_response()
}

fn service_failure(context: &str, e: &ServiceError) -> Response {
    match e {
        ServiceError::Invalid(fields) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Missing or invalid fields",
                "fields": fields,
            })),
        )
            .into_response(),
        ServiceError::Store(e) => store_failure(context, e),
    }
}

/// A body that is not JSON of the expected shape gets the same 400 envelope as a failed validation
fn rejected_body(rejection: JsonRejection) -> Response {
    log::debug!("Rejected request body: {}", rejection.body_text());
    let mut fields = FieldErrors::new();
    fields.add("body", &rejection.body_text());
    service_failure("Invalid request body", &ServiceError::Invalid(fields))
}

fn fetched_json<T: Serialize>(fetched: &Fetched<T>, extra: serde_json::Value) -> Response {
    let mut body = json!({
        "success": true,
        "data": fetched.data,
        "source": fetched.source,
    });
    if let Some(warning) = &fetched.warning {
        body["warning"] = json!(warning);
    }
    if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    Json(body).into_response()
}

fn render(result: Result<String, handlebars::RenderError>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
        }
    }
}

fn error_page(state: &AppState, e: &SheetsError) -> Response {
    let view = ErrorView::new(e.to_string(), e.suggestions());
    let mut response = render(state.pages.error(&view));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

async fn serve_home(State(state): State<Arc<AppState>>) -> Response {
    render(state.pages.home(&HomeView::new(&state.roster)))
}

async fn serve_leaderboard(State(state): State<Arc<AppState>>) -> Response {
    match state.service.fetch_results().await {
        Ok(results) => {
            let standings = compute_standings(&state.roster, &results.data);
            let view = LeaderboardView::new(&standings, &results.data, results.warning.clone());
            render(state.pages.leaderboard(&view))
        }
        Err(e) => error_page(&state, &e),
    }
}

async fn serve_participants(
    Query(filter): Query<ParticipantFilter>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.service.participants().await {
        Ok(fetched) => {
            let view = ParticipantsView::new(&fetched.data, &filter, &state.roster, fetched.warning.clone());
            render(state.pages.participants(&view))
        }
        Err(e) => error_page(&state, &e),
    }
}

async fn serve_bazaar(Query(filter): Query<BazaarFilter>, State(state): State<Arc<AppState>>) -> Response {
    match state.service.bazaar().await {
        Ok(fetched) => {
            let view = BazaarView::new(&fetched.data, &filter, &state.roster, fetched.warning.clone());
            render(state.pages.bazaar(&view))
        }
        Err(e) => error_page(&state, &e),
    }
}

async fn get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "teams": state.roster,
        "categories": CATEGORIES,
        "businessTypes": BUSINESS_TYPES,
        "positions": positions(),
    }))
}

async fn get_standings(State(state): State<Arc<AppState>>) -> Response {
    match state.service.standings(&state.roster).await {
        Ok(fetched) => {
            let rows: Vec<RankedStanding> = ranked(&fetched.data)
                .map(|(rank, standing)| RankedStanding {
                    rank,
                    short_name: short_team_name(&standing.team),
                    medal: Medal::for_rank(rank),
                    standing,
                })
                .collect();
            let count = rows.len();
            fetched_json(&fetched.with_data(rows), json!({ "count": count }))
        }
        Err(e) => store_failure("Failed to compute standings", &e),
    }
}

async fn list_results(State(state): State<Arc<AppState>>) -> Response {
    match state.service.fetch_results().await {
        Ok(fetched) => {
            let count = fetched.data.len();
            fetched_json(&fetched, json!({ "count": count }))
        }
        Err(e) => store_failure("Failed to fetch leaderboard data", &e),
    }
}

async fn add_result(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResultSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };
    match state.service.add_result(submission).await {
        Ok(result) => Json(json!({
            "success": true,
            "message": "Leaderboard result added successfully",
            "data": result,
        }))
        .into_response(),
        Err(e) => service_failure("Failed to add leaderboard result", &e),
    }
}

async fn update_result() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "success": false,
            "error": "Update functionality not implemented yet",
            "message": "Please delete and re-add the result for now",
        })),
    )
        .into_response()
}

async fn delete_result() -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "success": false,
            "error": "Delete functionality not implemented yet",
            "message": "Manual deletion from the spreadsheet required for now",
        })),
    )
        .into_response()
}

async fn list_participants(
    Query(filter): Query<ParticipantFilter>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.service.participants().await {
        Ok(fetched) => {
            let stats = ParticipantStats::summarize(&fetched.data);
            let matching: Vec<_> = filter.apply(&fetched.data).into_iter().cloned().collect();
            let count = matching.len();
            fetched_json(
                &fetched.with_data(matching),
                json!({ "count": count, "stats": stats }),
            )
        }
        Err(e) => store_failure("Failed to fetch participants", &e),
    }
}

async fn add_participant(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };
    match state.service.add_participant(submission).await {
        Ok(participant) => Json(json!({
            "success": true,
            "message": "Registration received",
            "data": participant,
        }))
        .into_response(),
        Err(e) => service_failure("Failed to register participant", &e),
    }
}

async fn list_bazaar(Query(filter): Query<BazaarFilter>, State(state): State<Arc<AppState>>) -> Response {
    match state.service.bazaar().await {
        Ok(fetched) => {
            let stats = BazaarStats::summarize(&fetched.data);
            let matching: Vec<_> = filter.apply(&fetched.data).into_iter().cloned().collect();
            let count = matching.len();
            fetched_json(
                &fetched.with_data(matching),
                json!({ "count": count, "stats": stats }),
            )
        }
        Err(e) => store_failure("Failed to fetch bazaar registrations", &e),
    }
}

async fn add_bazaar(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BazaarSubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };
    match state.service.add_bazaar(submission).await {
        Ok(entry) => Json(json!({
            "success": true,
            "message": "Bazaar registration received",
            "data": entry,
        }))
        .into_response(),
        Err(e) => service_failure("Failed to register bazaar stand", &e),
    }
}

fn missing_range() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": "Range parameter is required" })),
    )
        .into_response()
}

async fn read_range(Query(query): Query<RangeQuery>, State(state): State<Arc<AppState>>) -> Response {
    let Some(range) = query.range.filter(|r| !r.trim().is_empty()) else {
        return missing_range();
    };
    match state.service.read_raw(&range).await {
        Ok(values) => Json(json!({
            "success": true,
            "data": values.rows,
            "range": values.range,
        }))
        .into_response(),
        Err(e) => store_failure("Failed to get data from the spreadsheet", &e),
    }
}

async fn append_range(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AppendRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected_body(rejection),
    };
    if request.range.trim().is_empty() {
        return missing_range();
    }
    let rows = request
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();
    match state.service.append_raw(&request.range, rows).await {
        Ok(updated) => Json(json!({ "success": true, "updatedRows": updated })).into_response(),
        Err(e) => store_failure("Failed to append data to the spreadsheet", &e),
    }
}

async fn test_connection(State(state): State<Arc<AppState>>) -> Response {
    let report = state.service.test_connection().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}
