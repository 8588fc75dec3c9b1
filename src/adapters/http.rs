//! HTTP surface for the analytics report.
//!
//! - `GET /health`
//! - `GET /analytics/:restaurant_id?timeRange=7days|30days|custom&startDate=&endDate=`
//! - `GET /api/analytics/:restaurant_id` (same handler, legacy path)

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::period::TimeRangeSelector;
use crate::core::reporter::AnalyticsReporter;
use crate::domain::model::AnalyticsReport;
use crate::domain::ports::{OrderStore, ReviewStore};
use crate::utils::error::{AnalyticsError, ErrorCategory};
use crate::utils::validation::validate_restaurant_id;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    pub time_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AnalyticsParams {
    pub fn selector(&self) -> TimeRangeSelector {
        TimeRangeSelector::from_params(
            self.time_range.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Input => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "analytics request failed");
        }

        let body = serde_json::json!({ "error": self.user_friendly_message() });
        (status, Json(body)).into_response()
    }
}

/// Build the axum router (separated for testing).
pub fn router<O, R>(reporter: Arc<AnalyticsReporter<O, R>>) -> Router
where
    O: OrderStore + 'static,
    R: ReviewStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/analytics/:restaurant_id", get(analytics_handler::<O, R>))
        .route("/api/analytics/:restaurant_id", get(analytics_handler::<O, R>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(reporter)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn analytics_handler<O, R>(
    State(reporter): State<Arc<AnalyticsReporter<O, R>>>,
    Path(restaurant_id): Path<i64>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsReport>, AnalyticsError>
where
    O: OrderStore + 'static,
    R: ReviewStore + 'static,
{
    validate_restaurant_id(restaurant_id)?;
    let report = reporter
        .compute_analytics(restaurant_id, &params.selector())
        .await?;
    Ok(Json(report))
}

/// Bind `address` and serve until Ctrl+C or SIGTERM.
pub async fn serve<O, R>(
    reporter: Arc<AnalyticsReporter<O, R>>,
    address: &str,
) -> Result<(), AnalyticsError>
where
    O: OrderStore + 'static,
    R: ReviewStore + 'static,
{
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(reporter))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
