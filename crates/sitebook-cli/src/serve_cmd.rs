use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use sitebook_core::classify::{self, NoteClassifier, SiteNote};
use sitebook_core::epo::{self, EpoError};
use sitebook_core::reference::ReferenceData;
use sitebook_core::schedule::{
    DISPLAY_FORMAT, MudOrder, Phase, Schedule, build_schedule, order_mud,
    parse_date,
};
use sitebook_store::models::{EpoRecord, EpoStatus, NoteRecord};
use sitebook_store::queries::epos::NewEpo;
use sitebook_store::queries::notes as note_db;
use sitebook_store::{StateStore, StoreError};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared handler state. The store is the only mutable part and sits behind a
/// single mutex.
#[derive(Clone)]
pub struct AppState {
    pub reference: Arc<ReferenceData>,
    pub store: Arc<Mutex<StateStore>>,
    pub classifier: Arc<dyn NoteClassifier>,
}

impl AppState {
    pub fn new(
        reference: ReferenceData,
        store: StateStore,
        classifier: Arc<dyn NoteClassifier>,
    ) -> Self {
        Self {
            reference: Arc::new(reference),
            store: Arc::new(Mutex::new(store)),
            classifier,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    /// The classifier backend failed or answered with something unusable.
    pub fn bad_gateway(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("{err:#}"),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }

    /// Map an EPO update failure: unknown index is 404, a disallowed status
    /// change is 409.
    fn from_epo_update(err: anyhow::Error) -> Self {
        if let Some(store_err) = err.downcast_ref::<StoreError>() {
            Self::not_found(store_err.to_string())
        } else if let Some(epo_err) = err.downcast_ref::<EpoError>() {
            Self::conflict(epo_err.to_string())
        } else {
            Self::internal(err)
        }
    }
}

// Extractor rejections keep axum's status code but use the JSON error body.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CommunityResponse {
    pub name: String,
    /// Crew per phase after default and sentinel fallback.
    pub subcontractors: BTreeMap<Phase, String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub community: String,
    pub start: String,
}

#[derive(Debug, Deserialize)]
pub struct MudOrderRequest {
    pub lot: String,
    pub community: String,
    pub start: String,
}

#[derive(Debug, Serialize)]
pub struct MudOrderResponse {
    #[serde(flatten)]
    pub order: MudOrder,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EpoRequest {
    pub lot: String,
    pub community: String,
    pub recipient: String,
    pub amount: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EpoResponse {
    pub index: usize,
    pub status: EpoStatus,
    #[serde(flatten)]
    pub epo: EpoRecord,
}

impl EpoResponse {
    fn new(index: usize, epo: EpoRecord) -> Self {
        Self {
            index,
            status: epo.status(),
            epo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub lot: String,
    pub community: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub index: usize,
    #[serde(flatten)]
    pub note: NoteRecord,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/communities", get(list_communities))
        .route("/api/schedule", get(get_schedule))
        .route("/api/mud-orders", post(create_mud_order))
        .route("/api/epos", get(list_epos).post(create_epo))
        .route("/api/epos/{index}/replied", post(epo_replied))
        .route("/api/epos/{index}/follow-up", post(epo_follow_up))
        .route("/api/notes", get(list_notes).post(create_note))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("sitebook serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("sitebook serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let header: String = Phase::ALL
        .iter()
        .map(|p| format!("<th>{p}</th>"))
        .collect();
    let communities = state
        .reference
        .communities()
        .iter()
        .map(|c| {
            let crews: String = Phase::ALL
                .iter()
                .map(|p| {
                    format!(
                        "<td>{}</td>",
                        escape_html(state.reference.subcontractor(&c.name, *p))
                    )
                })
                .collect();
            format!("<tr><td>{}</td>{crews}</tr>", escape_html(&c.name))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let epos = epo::list_epos(&*state.store.lock().await);
    let epo_rows = if epos.is_empty() {
        "<tr><td colspan=\"6\">No EPOs recorded.</td></tr>".to_string()
    } else {
        epos.iter()
            .map(|(i, e)| {
                format!(
                    "<tr><td>{i}</td><td>{lot}</td><td>{community}</td><td>{to}</td><td>{amount}</td><td>{status}</td></tr>",
                    lot = escape_html(&e.lot),
                    community = escape_html(&e.community),
                    to = escape_html(&e.recipient),
                    amount = escape_html(&e.amount),
                    status = e.status(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>sitebook</title></head><body>\
<h1>sitebook</h1>\
<p><a href=\"/api/communities\">/api/communities</a> | <a href=\"/api/epos\">/api/epos</a> | <a href=\"/api/notes\">/api/notes</a></p>\
<h2>Communities</h2>\
<table><tr><th>Community</th>{header}</tr>{communities}</table>\
<h2>EPO tracker</h2>\
<table><tr><th>#</th><th>Lot</th><th>Community</th><th>To</th><th>Amount</th><th>Status</th></tr>{epo_rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn list_communities(State(state): State<AppState>) -> Json<Vec<CommunityResponse>> {
    let reference = &state.reference;
    let communities = reference
        .communities()
        .iter()
        .map(|c| CommunityResponse {
            name: c.name.clone(),
            subcontractors: Phase::ALL
                .iter()
                .map(|p| (*p, reference.subcontractor(&c.name, *p).to_owned()))
                .collect(),
        })
        .collect();
    Json(communities)
}

fn schedule_for(
    reference: &ReferenceData,
    community: &str,
    start: &str,
) -> Result<Schedule, AppError> {
    let start_date =
        parse_date(start).map_err(|e| AppError::bad_request(e.to_string()))?;
    build_schedule(reference, community, start_date)
        .map_err(|e| AppError::bad_request(e.to_string()))
}

async fn get_schedule(
    State(state): State<AppState>,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
) -> Result<Json<Schedule>, AppError> {
    let Query(query) = query?;
    schedule_for(&state.reference, &query.community, &query.start).map(Json)
}

async fn create_mud_order(
    State(state): State<AppState>,
    req: Result<Json<MudOrderRequest>, JsonRejection>,
) -> Result<Json<MudOrderResponse>, AppError> {
    let Json(req) = req?;
    let schedule = schedule_for(&state.reference, &req.community, &req.start)?;
    let order = order_mud(&schedule, &req.lot);
    tracing::info!(
        lot = %order.lot,
        community = %order.community,
        scrap_date = %order.scrap_date.format(DISPLAY_FORMAT),
        subcontractor = %order.subcontractor,
        "mud order queued"
    );
    let message = order.summary();
    Ok(Json(MudOrderResponse { order, message }))
}

async fn list_epos(State(state): State<AppState>) -> Json<Vec<EpoResponse>> {
    let store = state.store.lock().await;
    let epos = epo::list_epos(&store)
        .into_iter()
        .map(|(i, e)| EpoResponse::new(i, e))
        .collect();
    Json(epos)
}

async fn create_epo(
    State(state): State<AppState>,
    req: Result<Json<EpoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EpoResponse>), AppError> {
    let Json(req) = req?;
    let new = NewEpo {
        lot: &req.lot,
        community: &req.community,
        recipient: &req.recipient,
        amount: &req.amount,
        attachments: &req.attachments,
    };
    let mut store = state.store.lock().await;
    let (index, record) = epo::record_epo(&mut store, &new).map_err(AppError::internal)?;
    Ok((StatusCode::CREATED, Json(EpoResponse::new(index, record))))
}

async fn epo_replied(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<EpoResponse>, AppError> {
    let Path(index) = index?;
    let mut store = state.store.lock().await;
    let record = epo::mark_replied(&mut store, index).map_err(AppError::from_epo_update)?;
    Ok(Json(EpoResponse::new(index, record)))
}

async fn epo_follow_up(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<EpoResponse>, AppError> {
    let Path(index) = index?;
    let mut store = state.store.lock().await;
    let record = epo::send_follow_up(&mut store, index).map_err(AppError::from_epo_update)?;
    Ok(Json(EpoResponse::new(index, record)))
}

async fn list_notes(State(state): State<AppState>) -> Json<Vec<NoteRecord>> {
    let store = state.store.lock().await;
    Json(note_db::list_notes(&store))
}

async fn create_note(
    State(state): State<AppState>,
    req: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    let Json(req) = req?;
    let note = SiteNote::new(req.lot, req.community, req.text);
    // Classify before locking so a slow model does not block other requests.
    let classification = state
        .classifier
        .classify(&note)
        .await
        .map_err(AppError::bad_gateway)?;

    let mut store = state.store.lock().await;
    let (index, record) = classify::store_classified(&mut store, &note, &classification)
        .map_err(AppError::internal)?;
    Ok((
        StatusCode::CREATED,
        Json(NoteResponse {
            index,
            note: record,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
