use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::ApiError;
use crate::domain::names::{self, ListParams, NamesTable};
use crate::metrics::Metrics;

// ============================================================================
// HTTP Routes
// ============================================================================
//
//   GET /api/v1/name?year&limit&page   list one page of a year's names
//   GET /api/v1/name/{id}?year         look up a single name
//   GET /metrics                       prometheus text exposition
//   GET /health                        liveness
//
// ============================================================================

/// Shared state handed to every worker
#[derive(Clone)]
pub struct ApiState {
    pub table: Arc<NamesTable>,
    pub metrics: Arc<Metrics>,
    pub debug: bool,
    pub current_year: fn() -> i64,
}

impl ApiState {
    pub fn new(table: Arc<NamesTable>, metrics: Arc<Metrics>, debug: bool) -> Self {
        Self {
            table,
            metrics,
            debug,
            current_year: names::current_year,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NameEntry {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NamesPage {
    pub limit: u64,
    pub names: Vec<NameEntry>,
    pub page: u64,
    pub total: u64,
    pub year: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct YearParam {
    pub year: Option<i64>,
}

/// Builds the application with request metrics around every route.
pub fn app(
    state: ApiState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let metrics = state.metrics.clone();

    App::new()
        .app_data(web::Data::new(state))
        .wrap_fn(move |req, srv| {
            let metrics = metrics.clone();
            let started = Instant::now();
            let method = req.method().to_string();
            let route = req
                .match_pattern()
                .unwrap_or_else(|| "unmatched".to_string());
            let response = srv.call(req);

            async move {
                let response = response.await?;
                let status = response.status().as_u16();
                metrics.record_http_request(
                    &method,
                    &route,
                    status,
                    started.elapsed().as_secs_f64(),
                );
                tracing::debug!(%method, %route, status, "HTTP request");
                Ok(response)
            }
        })
        .configure(routes)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler))
        .service(
            web::scope("/api/v1")
                .route("/name", web::get().to(list_names_handler))
                .route("/name/{id}", web::get().to(get_name_handler)),
        );
}

async fn list_names_handler(
    state: web::Data<ApiState>,
    params: web::Query<ListParams>,
) -> Result<web::Json<NamesPage>, ApiError> {
    let page = names::list_names(&state.table, params.into_inner(), (state.current_year)())
        .map_err(|e| ApiError::from_query(e, state.debug))?;

    Ok(web::Json(NamesPage {
        limit: page.limit,
        names: page
            .records
            .into_iter()
            .map(|r| NameEntry { name: r.name })
            .collect(),
        page: page.page,
        total: page.total,
        year: page.year,
    }))
}

async fn get_name_handler(
    state: web::Data<ApiState>,
    id: web::Path<i64>,
    params: web::Query<YearParam>,
) -> Result<web::Json<NameEntry>, ApiError> {
    let record = names::get_name(
        &state.table,
        id.into_inner(),
        params.year,
        (state.current_year)(),
    )
    .map_err(|e| ApiError::from_query(e, state.debug))?;

    Ok(web::Json(NameEntry { name: record.name }))
}

async fn metrics_handler(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    let buffer = state
        .metrics
        .encode()
        .map_err(|e| ApiError::internal(format!("{e:#}"), state.debug))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer))
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "names-service"
    }))
}
