//! HTTP intake surface: per-domain submission routes and the health probe.
//!
//! Handlers are deliberately thin adapters - parse the body, hand the
//! payload to the matching pipeline, translate the outcome to a status
//! code. A `202 Accepted` acknowledges buffering, not completion.

use super::domain::{Item, Order, Payment, User};
use super::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use conveyor::{Error, Pipeline};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builds the service router with request-level tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/order", post(submit_order))
        .route("/item", post(submit_item))
        .route("/payment", post(submit_payment))
        .route("/user", post(submit_user))
        .route("/healthz", get(healthz))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Body of a successful submission response.
#[derive(Debug, Serialize)]
struct Accepted {
    id: u64,
}

async fn submit_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.orders.submit(order).await?;
    Ok((StatusCode::ACCEPTED, Json(Accepted { id: id.get() })))
}

async fn submit_item(
    State(state): State<AppState>,
    Json(item): Json<Item>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.items.submit(item).await?;
    Ok((StatusCode::ACCEPTED, Json(Accepted { id: id.get() })))
}

async fn submit_payment(
    State(state): State<AppState>,
    Json(payment): Json<Payment>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.payments.submit(payment).await?;
    Ok((StatusCode::ACCEPTED, Json(Accepted { id: id.get() })))
}

async fn submit_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.users.submit(user).await?;
    Ok((StatusCode::ACCEPTED, Json(Accepted { id: id.get() })))
}

/// Reports queue state and depth per domain; flips to 503 once shutdown has
/// begun so load balancers stop routing here while buffered items drain.
async fn healthz(State(state): State<AppState>) -> Response {
    let serving = state.is_serving();
    let body = json!({
        "status": if serving { "serving" } else { "shutting_down" },
        "queues": {
            "order": probe(&state.orders),
            "item": probe(&state.items),
            "payment": probe(&state.payments),
            "user": probe(&state.users),
        },
    });

    let status = if serving {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

fn probe<T: Send + 'static>(pipeline: &Pipeline<T>) -> serde_json::Value {
    json!({
        "state": format!("{:?}", pipeline.queue_state()),
        "depth": pipeline.queue_depth(),
    })
}

/// Translates pipeline errors into HTTP statuses.
///
/// Backpressure and shutdown are both "try again elsewhere/later" from the
/// caller's point of view, matching the unavailability contract; anything
/// else would be a bug and maps to 500.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::QueueClosed | Error::Rejected { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::PartialShutdown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
